use std::collections::HashMap;

use crate::models::{Incident, MapStatistics, StatusCounts, TypeCount};

const UNDEFINED_TYPE: &str = "Non défini";

/// Dashboard counters for a set of incidents.
///
/// Only the four workflow statuses are counted; any other value still counts
/// towards `total`. The station/line split only looks for `gare`, which is
/// narrower than the resolver's in-station test.
pub fn map_statistics(incidents: &[Incident]) -> MapStatistics {
    let mut by_status = StatusCounts::default();
    let mut by_type: HashMap<&str, usize> = HashMap::new();
    let mut in_station = 0;

    for incident in incidents {
        match incident.status() {
            Some("Ouvert") => by_status.open += 1,
            Some("En cours") => by_status.in_progress += 1,
            Some("Résolu") => by_status.resolved += 1,
            Some("Fermé") => by_status.closed += 1,
            _ => {}
        }

        let type_name = incident.type_name.as_deref().unwrap_or(UNDEFINED_TYPE);
        *by_type.entry(type_name).or_default() += 1;

        if incident
            .type_localisation
            .as_deref()
            .is_some_and(|kind| kind.to_lowercase().contains("gare"))
        {
            in_station += 1;
        }
    }

    let mut by_type: Vec<TypeCount> = by_type
        .into_iter()
        .map(|(name, count)| TypeCount {
            name: name.to_string(),
            count,
        })
        .collect();
    by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    MapStatistics {
        total: incidents.len(),
        by_status,
        by_type,
        in_station,
        on_line: incidents.len() - in_station,
    }
}
