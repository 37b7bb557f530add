use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Waypoint};

use crate::error::LocatorError;
use crate::models::IncidentMarker;

/// One GPX waypoint per marker, base64-encoded for the JSON response.
pub fn encode_markers_as_gpx(markers: &[IncidentMarker]) -> Result<String, LocatorError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("oncf-backend".into()),
        ..Default::default()
    };
    gpx.waypoints.extend(markers.iter().map(to_waypoint));

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn to_waypoint(marker: &IncidentMarker) -> Waypoint {
    let coord = marker.position.coordinate;
    let mut waypoint = Waypoint::new(Point::new(coord.lon, coord.lat));
    waypoint.name = Some(format!("Incident #{}", marker.id));
    waypoint.description = Some(marker.title.clone());
    waypoint
}
