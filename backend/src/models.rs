pub use oncf_shared::{
    ApiError, Coordinate, GpxResponse, Incident, IncidentMarker, MapStatistics, MarkerStyle,
    NetworkResponse, PlacementStrategy, PositionsResponse, ResolvedPosition, RouteSummary,
    StationRecord, StatusCounts, TypeCount,
};
