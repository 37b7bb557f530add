use once_cell::sync::Lazy;
use rayon::prelude::*;

use crate::geometry::{spread_fraction, Jitter, NETWORK_BOUNDS};
use crate::models::{Coordinate, Incident, PlacementStrategy, ResolvedPosition, StationRecord};
use crate::network::{NetworkIndex, TablesError};
use crate::pk::parse_pk;
use crate::tables::ReferenceTables;

/// Places incidents on the map.
///
/// Implementations must be total: every incident gets a position, the worst
/// case being a degraded fallback rather than an error.
pub trait PositionResolver: Send + Sync {
    fn resolve(&self, incident: &Incident) -> ResolvedPosition;
}

/// Location evidence an incident may carry, in the order it is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSignal {
    /// Free-text label that field teams reuse for a whole corridor.
    Corridor,
    StationCodes,
    StationNames,
    KilometerPoint,
    LocationName,
}

impl LocationSignal {
    pub const CASCADE: [LocationSignal; 5] = [
        LocationSignal::Corridor,
        LocationSignal::StationCodes,
        LocationSignal::StationNames,
        LocationSignal::KilometerPoint,
        LocationSignal::LocationName,
    ];

    pub fn strategy(self) -> PlacementStrategy {
        match self {
            LocationSignal::Corridor => PlacementStrategy::ClusterCorridor,
            LocationSignal::StationCodes => PlacementStrategy::StationCodes,
            LocationSignal::StationNames => PlacementStrategy::StationNames,
            LocationSignal::KilometerPoint => PlacementStrategy::KilometerPoint,
            LocationSignal::LocationName => PlacementStrategy::LocationName,
        }
    }
}

static ONCF_LOCATOR: Lazy<IncidentLocator> = Lazy::new(|| {
    IncidentLocator::new(ReferenceTables::oncf()).expect("built-in ONCF tables are consistent")
});

#[derive(Clone, Debug)]
pub struct IncidentLocator {
    index: NetworkIndex,
}

/// Per-incident values shared by every placement step.
struct Subject<'a> {
    incident: &'a Incident,
    unique_factor: i64,
    in_station: bool,
}

impl<'a> Subject<'a> {
    fn new(incident: &'a Incident) -> Self {
        Self {
            incident,
            unique_factor: incident.unique_factor(),
            in_station: is_in_station(incident),
        }
    }

    fn fraction(&self) -> f64 {
        spread_fraction(self.unique_factor)
    }
}

impl PositionResolver for IncidentLocator {
    fn resolve(&self, incident: &Incident) -> ResolvedPosition {
        IncidentLocator::resolve(self, incident)
    }
}

impl IncidentLocator {
    pub fn new(tables: ReferenceTables) -> Result<Self, TablesError> {
        Ok(Self {
            index: NetworkIndex::new(tables)?,
        })
    }

    /// Locator over the built-in ONCF tables, built on first use.
    pub fn oncf() -> &'static IncidentLocator {
        &ONCF_LOCATOR
    }

    pub fn index(&self) -> &NetworkIndex {
        &self.index
    }

    pub fn resolve(&self, incident: &Incident) -> ResolvedPosition {
        let subject = Subject::new(incident);

        let placed = LocationSignal::CASCADE.iter().find_map(|&signal| {
            self.place(signal, &subject)
                .map(|coordinate| (coordinate, signal.strategy()))
        });

        let (mut coordinate, mut strategy) = match placed {
            Some(placed) => placed,
            None if has_location_fields(incident) => {
                (self.hub_position(&subject), PlacementStrategy::HubFallback)
            }
            None => (self.spread_position(&subject), PlacementStrategy::NetworkSpread),
        };

        if !NETWORK_BOUNDS.contains(coordinate) {
            tracing::warn!(
                "Incident {} placed outside the network at {:?} by {:?}, using hub",
                incident.id,
                coordinate,
                strategy
            );
            coordinate = self.hub_position(&subject);
            strategy = PlacementStrategy::HubFallback;
        }

        tracing::debug!(
            "Incident {} placed at ({:.5}, {:.5}) by {:?}",
            incident.id,
            coordinate.lat,
            coordinate.lon,
            strategy
        );

        ResolvedPosition {
            coordinate,
            strategy,
            in_station: subject.in_station,
        }
    }

    /// Resolves a batch in parallel; output order follows input order.
    pub fn resolve_all(&self, incidents: &[Incident]) -> Vec<ResolvedPosition> {
        incidents
            .par_iter()
            .map(|incident| self.resolve(incident))
            .collect()
    }

    fn place(&self, signal: LocationSignal, subject: &Subject<'_>) -> Option<Coordinate> {
        match signal {
            LocationSignal::Corridor => self.place_on_corridor(subject),
            LocationSignal::StationCodes => self.place_by_codes(subject),
            LocationSignal::StationNames => self.place_by_names(subject),
            LocationSignal::KilometerPoint => self.place_by_pk(subject),
            LocationSignal::LocationName => self.place_by_location_name(subject),
        }
    }

    fn place_on_corridor(&self, subject: &Subject<'_>) -> Option<Coordinate> {
        let incident = subject.incident;
        let labels: Vec<&str> = [&incident.gare_debut_nom, &incident.gare_fin_nom]
            .into_iter()
            .filter_map(|label| present(label))
            .collect();
        let corridor = self.index.corridor_for_labels(&labels)?;
        let base = corridor.from.interpolate(corridor.to, subject.fraction());
        Some(Jitter::CORRIDOR.apply(base, subject.unique_factor))
    }

    fn place_by_codes(&self, subject: &Subject<'_>) -> Option<Coordinate> {
        let incident = subject.incident;
        let start_code = present(&incident.gare_debut_id);
        let end_code = present(&incident.gare_fin_id);
        if start_code.is_none() && end_code.is_none() {
            return None;
        }
        let start = self.code_or_name(start_code, &incident.gare_debut_nom);
        let end = self.code_or_name(end_code, &incident.gare_fin_nom);
        self.place_between(start, end, subject)
    }

    fn place_by_names(&self, subject: &Subject<'_>) -> Option<Coordinate> {
        let incident = subject.incident;
        let start_name = present(&incident.gare_debut_nom);
        let end_name = present(&incident.gare_fin_nom);
        if start_name.is_none() && end_name.is_none() {
            return None;
        }
        let start = start_name.and_then(|name| self.index.match_station_name(name));
        let end = end_name.and_then(|name| self.index.match_station_name(name));
        self.place_between(start, end, subject)
    }

    fn place_by_pk(&self, subject: &Subject<'_>) -> Option<Coordinate> {
        let incident = subject.incident;
        let pk = [&incident.pk_debut, &incident.pk_fin]
            .into_iter()
            .filter_map(|raw| raw.as_deref())
            .find_map(parse_pk)?;

        let base = if subject.in_station {
            self.index.nearest_station_by_pk(pk)?.coordinate()
        } else {
            self.index.point_for_pk(pk)?
        };
        Some(Jitter::STATION.apply(base, subject.unique_factor))
    }

    fn place_by_location_name(&self, subject: &Subject<'_>) -> Option<Coordinate> {
        let label = present(&subject.incident.localisation_nom)?;
        let station = self.index.find_station_in_label(label)?;
        Some(Jitter::STATION.apply(station.coordinate(), subject.unique_factor))
    }

    fn code_or_name(&self, code: Option<&str>, name: &Option<String>) -> Option<&StationRecord> {
        code.and_then(|code| self.index.station_for_code(code))
            .or_else(|| present(name).and_then(|name| self.index.match_station_name(name)))
    }

    /// Shared by the code and name signals once both ends are looked up.
    fn place_between(
        &self,
        start: Option<&StationRecord>,
        end: Option<&StationRecord>,
        subject: &Subject<'_>,
    ) -> Option<Coordinate> {
        if subject.in_station {
            let station = start.or(end)?;
            return Some(Jitter::STATION.apply(station.coordinate(), subject.unique_factor));
        }
        match (start, end) {
            (Some(start), Some(end)) => {
                let base = start
                    .coordinate()
                    .interpolate(end.coordinate(), subject.fraction());
                Some(Jitter::LINE.apply(base, subject.unique_factor))
            }
            (Some(station), None) | (None, Some(station)) => {
                Some(Jitter::STATION.apply(station.coordinate(), subject.unique_factor))
            }
            (None, None) => None,
        }
    }

    fn spread_position(&self, subject: &Subject<'_>) -> Coordinate {
        let points = self.index.network_points();
        let slot = subject.incident.id.rem_euclid(points.len() as i64) as usize;
        Jitter::SPREAD.apply(points[slot], subject.unique_factor)
    }

    fn hub_position(&self, subject: &Subject<'_>) -> Coordinate {
        Jitter::STATION.apply(self.index.hub().coordinate(), subject.unique_factor)
    }
}

/// `type_localisation` mentions a station, a platform or a `gare`.
pub fn is_in_station(incident: &Incident) -> bool {
    incident.type_localisation.as_deref().is_some_and(|kind| {
        let kind = kind.to_lowercase();
        ["gare", "station", "quai"]
            .iter()
            .any(|keyword| kind.contains(keyword))
    })
}

/// Unparseable kilometer points such as `N/A` do not count as a location.
fn has_location_fields(incident: &Incident) -> bool {
    let text_present = [
        &incident.gare_debut_id,
        &incident.gare_fin_id,
        &incident.gare_debut_nom,
        &incident.gare_fin_nom,
        &incident.localisation_nom,
    ]
    .into_iter()
    .any(|field| present(field).is_some());

    text_present
        || [&incident.pk_debut, &incident.pk_fin]
            .into_iter()
            .filter_map(|raw| raw.as_deref())
            .any(|raw| parse_pk(raw).is_some())
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}
