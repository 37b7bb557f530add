use rayon::prelude::*;

use crate::models::{Incident, IncidentMarker, MarkerStyle, ResolvedPosition};
use crate::resolver::PositionResolver;

// First fragment contained in the lower-cased type name wins.
const TYPE_STYLES: &[(&str, &str, &str)] = &[
    ("signal", "#ffc107", "fas fa-traffic-light"),
    ("voie", "#dc3545", "fas fa-train"),
    ("électrique", "#6f42c1", "fas fa-bolt"),
    ("sécurité", "#fd7e14", "fas fa-shield-alt"),
];

const STATUS_STYLES: &[(&str, u32, &str)] = &[
    ("Ouvert", 18, "#dc3545"),
    ("En cours", 16, "#ffc107"),
    ("Résolu", 14, "#28a745"),
    ("Fermé", 12, "#6c757d"),
];

/// Icon from the incident type, then size and color from its status.
pub fn marker_style(incident: &Incident) -> MarkerStyle {
    let mut style = MarkerStyle::default();

    if let Some(type_name) = incident.type_name.as_deref() {
        let lowered = type_name.to_lowercase();
        if let Some(&(_, color, icon)) = TYPE_STYLES
            .iter()
            .find(|(fragment, _, _)| lowered.contains(fragment))
        {
            style.color = color.to_string();
            style.icon = icon.to_string();
        }
    }

    if let Some(&(_, size, color)) = incident
        .status()
        .and_then(|status| STATUS_STYLES.iter().find(|(name, _, _)| *name == status))
    {
        style.size = size;
        style.color = color.to_string();
    }

    style
}

pub fn marker_title(incident: &Incident) -> String {
    format!(
        "{} - {}",
        incident.type_name.as_deref().unwrap_or("Incident"),
        incident.status().unwrap_or("Statut inconnu")
    )
}

/// `"<debut>"` or `"<debut> - <fin>"`; `N/A` placeholders are skipped.
pub fn pk_label(incident: &Incident) -> Option<String> {
    let start = known_pk(&incident.pk_debut)?;
    match known_pk(&incident.pk_fin) {
        Some(end) if end != start => Some(format!("{start} - {end}")),
        _ => Some(start.to_string()),
    }
}

fn known_pk(raw: &Option<String>) -> Option<&str> {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "N/A")
}

pub fn build_marker(incident: &Incident, position: ResolvedPosition) -> IncidentMarker {
    IncidentMarker {
        id: incident.id,
        position,
        style: marker_style(incident),
        title: marker_title(incident),
        pk_label: pk_label(incident),
        location_label: incident.localisation_nom.clone(),
    }
}

pub fn build_markers<R>(resolver: &R, incidents: &[Incident]) -> Vec<IncidentMarker>
where
    R: PositionResolver + ?Sized,
{
    incidents
        .par_iter()
        .map(|incident| build_marker(incident, resolver.resolve(incident)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, PlacementStrategy};

    struct FixedResolver;

    impl PositionResolver for FixedResolver {
        fn resolve(&self, incident: &Incident) -> ResolvedPosition {
            ResolvedPosition {
                coordinate: Coordinate::new(33.0, -7.0 - incident.id as f64 / 100.0),
                strategy: PlacementStrategy::HubFallback,
                in_station: false,
            }
        }
    }

    fn incident(type_name: Option<&str>, status: Option<&str>) -> Incident {
        Incident {
            type_name: type_name.map(String::from),
            statut: status.map(String::from),
            ..Incident::new(1)
        }
    }

    #[test]
    fn test_default_style() {
        let style = marker_style(&incident(None, None));
        assert_eq!(style, MarkerStyle::default());
        assert_eq!(style.color, "#007bff");
        assert_eq!(style.font_size, 10);
    }

    #[test]
    fn test_type_then_status_styling() {
        let style = marker_style(&incident(Some("Défaut de signalisation"), None));
        assert_eq!(style.icon, "fas fa-traffic-light");
        assert_eq!(style.color, "#ffc107");
        assert_eq!(style.size, 16);

        let style = marker_style(&incident(Some("Panne ÉLECTRIQUE"), Some("Résolu")));
        assert_eq!(style.icon, "fas fa-bolt");
        assert_eq!(style.color, "#28a745");
        assert_eq!(style.size, 14);

        let style = marker_style(&incident(Some("Sécurité"), Some("Ouvert")));
        assert_eq!(style.icon, "fas fa-shield-alt");
        assert_eq!(style.color, "#dc3545");
        assert_eq!(style.size, 18);
    }

    #[test]
    fn test_status_must_match_exactly() {
        let style = marker_style(&incident(Some("Voie"), Some("ouvert")));
        assert_eq!(style.color, "#dc3545");
        assert_eq!(style.size, 16);

        let style = marker_style(&incident(None, Some("Fermé")));
        assert_eq!(style.size, 12);
        assert_eq!(style.icon, "fas fa-exclamation-triangle");
    }

    #[test]
    fn test_title() {
        assert_eq!(marker_title(&incident(None, None)), "Incident - Statut inconnu");
        assert_eq!(
            marker_title(&incident(Some("Voie"), Some("En cours"))),
            "Voie - En cours"
        );
    }

    #[test]
    fn test_pk_label() {
        let with_pk = |start: Option<&str>, end: Option<&str>| Incident {
            pk_debut: start.map(String::from),
            pk_fin: end.map(String::from),
            ..Incident::new(1)
        };
        assert_eq!(pk_label(&with_pk(Some("12+300"), None)).as_deref(), Some("12+300"));
        assert_eq!(
            pk_label(&with_pk(Some("12+300"), Some("14+000"))).as_deref(),
            Some("12+300 - 14+000")
        );
        assert_eq!(
            pk_label(&with_pk(Some("12+300"), Some("12+300"))).as_deref(),
            Some("12+300")
        );
        assert_eq!(pk_label(&with_pk(Some("12+300"), Some("N/A"))).as_deref(), Some("12+300"));
        assert_eq!(pk_label(&with_pk(Some("N/A"), Some("14+000"))), None);
        assert_eq!(pk_label(&with_pk(None, None)), None);
    }

    #[test]
    fn test_build_markers_keeps_order() {
        let incidents: Vec<Incident> = (0..20)
            .map(|id| Incident {
                localisation_nom: Some(format!("PN {id}")),
                ..Incident::new(id)
            })
            .collect();
        let markers = build_markers(&FixedResolver, &incidents);
        assert_eq!(markers.len(), 20);
        for (idx, marker) in markers.iter().enumerate() {
            assert_eq!(marker.id, idx as i64);
            assert_eq!(marker.location_label.as_deref(), Some(format!("PN {idx}").as_str()));
            assert_eq!(marker.position, FixedResolver.resolve(&incidents[idx]));
        }
    }
}
