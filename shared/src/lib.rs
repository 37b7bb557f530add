use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

/// Incident record as served by the dashboard's `/api/evenements` endpoint.
///
/// Every location field is optional: the backend only fills what the
/// operator entered, and numeric kilometer points sometimes arrive as JSON
/// numbers rather than strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gare_debut_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gare_fin_id: Option<String>,
    #[serde(default)]
    pub gare_debut_nom: Option<String>,
    #[serde(default)]
    pub gare_fin_nom: Option<String>,
    #[serde(default)]
    pub type_localisation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pk_debut: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pk_fin: Option<String>,
    #[serde(default)]
    pub localisation_nom: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub etat: Option<String>,
    #[serde(default)]
    pub type_id: Option<i64>,
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub system_id: Option<i64>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub date_debut: Option<String>,
    #[serde(default)]
    pub heure_debut: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Incident {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Workflow status; older payloads use `etat`, the list endpoint `statut`.
    pub fn status(&self) -> Option<&str> {
        self.etat.as_deref().or(self.statut.as_deref())
    }

    /// Length of `type_name` in UTF-16 code units, matching the browser's
    /// `String.length` so that jitter stays identical to the legacy map.
    pub fn type_name_len(&self) -> i64 {
        self.type_name
            .as_deref()
            .map_or(0, |name| name.encode_utf16().count() as i64)
    }

    /// Wraps on overflow so that extreme ids still resolve.
    pub fn unique_factor(&self) -> i64 {
        self.id.wrapping_add(self.type_name_len())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Int(value) => value.to_string(),
        Raw::Float(value) => value.to_string(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    ClusterCorridor,
    StationCodes,
    StationNames,
    KilometerPoint,
    LocationName,
    NetworkSpread,
    HubFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub coordinate: Coordinate,
    pub strategy: PlacementStrategy,
    pub in_station: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub size: u32,
    pub color: String,
    pub icon: String,
    pub font_size: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: 16,
            color: "#007bff".to_string(),
            icon: "fas fa-exclamation-triangle".to_string(),
            font_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentMarker {
    pub id: i64,
    pub position: ResolvedPosition,
    pub style: MarkerStyle,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStatistics {
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_type: Vec<TypeCount>,
    pub in_station: usize,
    pub on_line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsResponse {
    pub markers: Vec<IncidentMarker>,
    pub statistics: MapStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpxResponse {
    pub gpx_base64: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl StationRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    pub name: String,
    pub points: Vec<Coordinate>,
    pub length_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkResponse {
    pub stations: Vec<StationRecord>,
    pub routes: Vec<RouteSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
