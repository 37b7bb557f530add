use std::{collections::HashMap, io};

use crate::geometry::{approximate_distance_km, point_along_polyline, NETWORK_BOUNDS};
use crate::models::{Coordinate, RouteSummary, StationRecord};
use crate::tables::{ClusterCorridor, ReferenceTables, RouteSegment};

#[derive(Debug, thiserror::Error)]
pub enum TablesError {
    #[error("failed to read reference tables: {0}")]
    Io(#[from] io::Error),
    #[error("invalid reference tables: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reference tables contain no station")]
    NoStations,
    #[error("reference tables contain no network point")]
    NoNetworkPoints,
    #[error("reference tables contain no kilometer-point band")]
    NoPkBands,
    #[error("{context} references unknown station `{station}`")]
    UnknownStation { context: String, station: String },
    #[error("kilometer-point band references unknown route `{0}`")]
    UnknownRoute(String),
    #[error("route `{0}` needs at least two vertices")]
    DegenerateRoute(String),
    #[error("corridor `{0}` needs non-blank labels and both ends inside the network bounds")]
    InvalidCorridor(String),
}

/// Read-only, validated view over [`ReferenceTables`].
///
/// Every name stored in the lookup maps is guaranteed to point at an existing
/// station or route, so lookups only fail on unknown *input*.
#[derive(Clone, Debug)]
pub struct NetworkIndex {
    tables: ReferenceTables,
    /// Lower-cased station names, table order preserved.
    lowered_names: Vec<String>,
    station_by_name: HashMap<String, usize>,
    station_by_code: HashMap<String, usize>,
    keywords: Vec<(String, usize)>,
    partial_keywords: Vec<(String, usize)>,
    kilometer_points: Vec<(f64, usize)>,
    pk_bands: Vec<(Option<f64>, usize)>,
    corridors: Vec<(Vec<String>, usize)>,
    hub: usize,
}

impl NetworkIndex {
    pub fn new(tables: ReferenceTables) -> Result<Self, TablesError> {
        if tables.stations.is_empty() {
            return Err(TablesError::NoStations);
        }
        if tables.network_points.is_empty() {
            return Err(TablesError::NoNetworkPoints);
        }
        if tables.pk_bands.is_empty() {
            return Err(TablesError::NoPkBands);
        }
        if let Some(route) = tables.routes.iter().find(|route| route.points.len() < 2) {
            return Err(TablesError::DegenerateRoute(route.name.clone()));
        }
        // a blank label would match every station name
        if let Some(corridor) = tables.corridors.iter().find(|corridor| {
            corridor.labels.is_empty()
                || corridor.labels.iter().any(|label| label.trim().is_empty())
                || !NETWORK_BOUNDS.contains(corridor.from)
                || !NETWORK_BOUNDS.contains(corridor.to)
        }) {
            return Err(TablesError::InvalidCorridor(corridor.name.clone()));
        }

        let lowered_names: Vec<String> = tables
            .stations
            .iter()
            .map(|station| normalize(&station.name))
            .collect();
        let mut station_by_name = HashMap::with_capacity(lowered_names.len());
        for (idx, name) in lowered_names.iter().enumerate() {
            station_by_name.entry(name.clone()).or_insert(idx);
        }

        let lookup = |context: &str, station: &str| {
            station_by_name
                .get(&normalize(station))
                .copied()
                .ok_or_else(|| TablesError::UnknownStation {
                    context: context.to_string(),
                    station: station.to_string(),
                })
        };

        let hub = lookup("hub", &tables.hub)?;

        let mut station_by_code = HashMap::with_capacity(tables.code_aliases.len());
        for alias in &tables.code_aliases {
            let idx = lookup(&format!("code alias `{}`", alias.code), &alias.station)?;
            station_by_code.insert(normalize_code(&alias.code), idx);
        }

        let keywords = tables
            .keywords
            .iter()
            .map(|alias| {
                let idx = lookup(&format!("keyword `{}`", alias.keyword), &alias.station)?;
                Ok((normalize(&alias.keyword), idx))
            })
            .collect::<Result<Vec<_>, TablesError>>()?;

        let partial_keywords = tables
            .partial_keywords
            .iter()
            .map(|alias| {
                let idx = lookup(&format!("keyword `{}`", alias.keyword), &alias.station)?;
                Ok((normalize(&alias.keyword), idx))
            })
            .collect::<Result<Vec<_>, TablesError>>()?;

        let kilometer_points = tables
            .kilometer_points
            .iter()
            .map(|point| {
                let idx = lookup(&format!("kilometer point {}", point.pk), &point.station)?;
                Ok((point.pk, idx))
            })
            .collect::<Result<Vec<_>, TablesError>>()?;

        let pk_bands = tables
            .pk_bands
            .iter()
            .map(|band| {
                tables
                    .routes
                    .iter()
                    .position(|route| route.name == band.route)
                    .map(|idx| (band.max_pk, idx))
                    .ok_or_else(|| TablesError::UnknownRoute(band.route.clone()))
            })
            .collect::<Result<Vec<_>, TablesError>>()?;

        let corridors = tables
            .corridors
            .iter()
            .enumerate()
            .map(|(idx, corridor)| {
                let labels = corridor.labels.iter().map(|label| normalize(label)).collect();
                (labels, idx)
            })
            .collect();

        Ok(Self {
            lowered_names,
            station_by_name,
            station_by_code,
            keywords,
            partial_keywords,
            kilometer_points,
            pk_bands,
            corridors,
            hub,
            tables,
        })
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn station(&self, idx: usize) -> &StationRecord {
        &self.tables.stations[idx]
    }

    pub fn hub(&self) -> &StationRecord {
        self.station(self.hub)
    }

    pub fn network_points(&self) -> &[Coordinate] {
        &self.tables.network_points
    }

    /// Station referenced by a line/segment code such as `LIN01.T001.FES`.
    pub fn station_for_code(&self, code: &str) -> Option<&StationRecord> {
        self.station_by_code
            .get(&normalize_code(code))
            .map(|&idx| self.station(idx))
    }

    /// Station for an operator-entered name: exact match, then substring in
    /// either direction, then the keyword tables.
    pub fn match_station_name(&self, name: &str) -> Option<&StationRecord> {
        let needle = normalize(name);
        if needle.is_empty() {
            return None;
        }
        if let Some(&idx) = self.station_by_name.get(&needle) {
            return Some(self.station(idx));
        }
        if let Some(station) = self.station_containing(&needle) {
            return Some(station);
        }
        self.keywords
            .iter()
            .chain(&self.partial_keywords)
            .find(|(keyword, _)| needle.contains(keyword.as_str()))
            .map(|&(_, idx)| self.station(idx))
    }

    /// First station (table order) whose name contains the label or is
    /// contained in it.
    pub fn find_station_in_label(&self, label: &str) -> Option<&StationRecord> {
        let needle = normalize(label);
        if needle.is_empty() {
            return None;
        }
        self.station_containing(&needle)
    }

    fn station_containing(&self, needle: &str) -> Option<&StationRecord> {
        self.lowered_names
            .iter()
            .position(|name| name.contains(needle) || needle.contains(name.as_str()))
            .map(|idx| self.station(idx))
    }

    /// Station listed at the kilometer point closest to `pk`; the earlier
    /// entry wins a tie.
    pub fn nearest_station_by_pk(&self, pk: f64) -> Option<&StationRecord> {
        let mut best: Option<(f64, usize)> = None;
        for &(point, idx) in &self.kilometer_points {
            let distance = (pk - point).abs();
            if best.map_or(true, |(min, _)| distance < min) {
                best = Some((distance, idx));
            }
        }
        best.map(|(_, idx)| self.station(idx))
    }

    /// Route serving the kilometer point: first band whose inclusive upper
    /// bound is not below `pk`.
    pub fn route_for_pk(&self, pk: f64) -> Option<&RouteSegment> {
        self.pk_bands
            .iter()
            .find(|(max_pk, _)| max_pk.map_or(true, |max| pk <= max))
            .map(|&(_, idx)| &self.tables.routes[idx])
    }

    /// Position along the band's route, cycling every 300 km.
    pub fn point_for_pk(&self, pk: f64) -> Option<Coordinate> {
        let route = self.route_for_pk(pk)?;
        let ratio = pk.rem_euclid(300.0) / 300.0;
        point_along_polyline(&route.points, ratio)
    }

    /// Known corridor whose label appears in one of the given station names.
    pub fn corridor_for_labels(&self, labels: &[&str]) -> Option<&ClusterCorridor> {
        let lowered: Vec<String> = labels
            .iter()
            .map(|label| label.to_lowercase())
            .filter(|label| !label.is_empty())
            .collect();
        if lowered.is_empty() {
            return None;
        }
        self.corridors
            .iter()
            .find(|(patterns, _)| {
                patterns
                    .iter()
                    .any(|pattern| lowered.iter().any(|label| label.contains(pattern.as_str())))
            })
            .map(|&(_, idx)| &self.tables.corridors[idx])
    }

    pub fn route_summaries(&self) -> Vec<RouteSummary> {
        self.tables
            .routes
            .iter()
            .map(|route| RouteSummary {
                name: route.name.clone(),
                points: route.points.clone(),
                length_km: approximate_distance_km(&route.points),
            })
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{CodeAlias, PkBand};

    fn oncf() -> NetworkIndex {
        NetworkIndex::new(ReferenceTables::oncf()).unwrap()
    }

    #[test]
    fn test_builtin_tables_are_consistent() {
        let index = oncf();
        assert_eq!(index.hub().name, "Casablanca Voyageurs");
    }

    #[test]
    fn test_code_lookup_is_normalized() {
        let index = oncf();
        assert_eq!(
            index.station_for_code(" lin01.t001.sidi_kacem ").unwrap().name,
            "Sidi Kacem"
        );
        assert!(index.station_for_code("LIN99.T001.NOWHERE").is_none());
    }

    #[test]
    fn test_name_matching_order() {
        let index = oncf();
        let name = |label: &str| index.match_station_name(label).map(|s| s.name.clone());

        assert_eq!(name("MARRAKECH").as_deref(), Some("Marrakech"));
        // substring: "rabat" is inside "Rabat Agdal", which comes first
        assert_eq!(name("Rabat").as_deref(), Some("Rabat Agdal"));
        assert_eq!(name("Gare de Settat").as_deref(), Some("Settat"));
        // a station name inside the label beats the keyword table
        assert_eq!(name("casa/marrakech v2").as_deref(), Some("Marrakech"));
        assert_eq!(name("TANGER/FESV1").as_deref(), Some("Fes"));
        // keyword table
        assert_eq!(name("casa/skacem").as_deref(), Some("Casablanca Voyageurs"));
        assert_eq!(name("nouaceur/eljadidav2").as_deref(), Some("El Jadida"));
        assert_eq!(name("Tanger Med").as_deref(), Some("Tanger Ville"));
        assert_eq!(name("Zagora"), None);
        assert_eq!(name("   "), None);
    }

    #[test]
    fn test_find_station_in_label() {
        let index = oncf();
        let station = index.find_station_in_label("Quai 2 gare de Kenitra").unwrap();
        assert_eq!(station.name, "Kenitra");
        assert!(index.find_station_in_label("").is_none());
        assert!(index.find_station_in_label("PN 112").is_none());
    }

    #[test]
    fn test_nearest_station_by_pk() {
        let index = oncf();
        assert_eq!(index.nearest_station_by_pk(0.0).unwrap().name, "Tanger Ville");
        assert_eq!(index.nearest_station_by_pk(245.4).unwrap().name, "Sidi Yahya El Gharb");
        // equidistant between 300 and 350: first entry wins
        assert_eq!(index.nearest_station_by_pk(325.0).unwrap().name, "Kenitra");
        assert_eq!(index.nearest_station_by_pk(2000.0).unwrap().name, "Marrakech");
    }

    #[test]
    fn test_pk_bands_use_inclusive_upper_bounds() {
        let index = oncf();
        let route = |pk: f64| index.route_for_pk(pk).unwrap().name.clone();
        assert_eq!(route(12.0), "Tanger-Kenitra-Classique");
        assert_eq!(route(300.0), "Tanger-Kenitra-Classique");
        assert_eq!(route(300.5), "Kenitra-Casablanca-LGV");
        assert_eq!(route(650.0), "Kenitra-Casablanca-LGV");
        assert_eq!(route(650.001), "Casablanca-Marrakech");
        assert_eq!(route(900.0), "Casablanca-Marrakech");
        assert_eq!(route(1200.0), "Fes-Oujda-Real");
    }

    #[test]
    fn test_corridor_labels() {
        let index = oncf();
        let corridor = index
            .corridor_for_labels(&["CASAVOYAGEURS/SKACEM", ""])
            .unwrap();
        assert_eq!(corridor.name, "Casablanca-Sidi Kacem");
        let corridor = index
            .corridor_for_labels(&["", "Casa Voyageurs/Marrakech V2"])
            .unwrap();
        assert_eq!(corridor.name, "Casablanca-Marrakech");
        assert!(index.corridor_for_labels(&["Casablanca Voyageurs"]).is_none());
        assert!(index.corridor_for_labels(&[]).is_none());
    }

    #[test]
    fn test_route_summaries_have_lengths() {
        let index = oncf();
        let routes = index.route_summaries();
        assert_eq!(routes.len(), 10);
        assert!(routes.iter().all(|route| route.length_km > 0.0));
    }

    #[test]
    fn test_rejects_unknown_alias_target() {
        let mut tables = ReferenceTables::oncf();
        tables.code_aliases.push(CodeAlias {
            code: "LIN09.T001.ZAGORA".into(),
            station: "Zagora".into(),
        });
        let err = NetworkIndex::new(tables).unwrap_err();
        assert!(matches!(err, TablesError::UnknownStation { station, .. } if station == "Zagora"));
    }

    #[test]
    fn test_rejects_unknown_band_route() {
        let mut tables = ReferenceTables::oncf();
        tables.pk_bands.insert(
            0,
            PkBand {
                max_pk: Some(10.0),
                route: "Marrakech-Agadir".into(),
            },
        );
        assert!(matches!(
            NetworkIndex::new(tables),
            Err(TablesError::UnknownRoute(route)) if route == "Marrakech-Agadir"
        ));
    }

    #[test]
    fn test_rejects_empty_tables() {
        let mut tables = ReferenceTables::oncf();
        tables.network_points.clear();
        assert!(matches!(
            NetworkIndex::new(tables),
            Err(TablesError::NoNetworkPoints)
        ));

        let mut tables = ReferenceTables::oncf();
        tables.hub = "Agadir".into();
        assert!(matches!(
            NetworkIndex::new(tables),
            Err(TablesError::UnknownStation { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_corridors() {
        let mut tables = ReferenceTables::oncf();
        tables.corridors[0].labels.clear();
        let name = tables.corridors[0].name.clone();
        assert!(matches!(
            NetworkIndex::new(tables),
            Err(TablesError::InvalidCorridor(corridor)) if corridor == name
        ));

        let mut tables = ReferenceTables::oncf();
        tables.corridors[0].labels.push("  ".into());
        assert!(matches!(
            NetworkIndex::new(tables),
            Err(TablesError::InvalidCorridor(_))
        ));

        let mut tables = ReferenceTables::oncf();
        tables.corridors[0].to = Coordinate::new(40.4, -3.7);
        assert!(matches!(
            NetworkIndex::new(tables),
            Err(TablesError::InvalidCorridor(_))
        ));
    }
}
