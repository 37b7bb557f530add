//! Reference data for the ONCF network.
//!
//! The built-in tables are literal data taken from the operator's published
//! station list and line drawings. They can be swapped for a JSON file with
//! the same shape (see [`ReferenceTables::from_path`]).

use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, StationRecord};
use crate::network::TablesError;

pub const HUB_STATION: &str = "Casablanca Voyageurs";

const STATIONS: &[(&str, f64, f64)] = &[
    // LGV Al Boraq
    ("Tanger Ville", 35.7595, -5.8340),
    ("Kenitra", 34.2610, -6.5802),
    ("Rabat Agdal", 33.9591, -6.8498),
    ("Casablanca Voyageurs", 33.5970, -7.6186),
    // Northern classic line
    ("Assilah", 35.4650, -6.0366),
    ("Larache", 35.1933, -6.1558),
    ("Ksar El Kebir", 35.0019, -5.9083),
    ("Souk El Arbaa", 34.6908, -5.9886),
    ("Sidi Yahya El Gharb", 34.3008, -6.3106),
    ("Sidi Slimane", 34.2628, -5.9222),
    ("Sidi Kacem", 34.2214, -5.7031),
    // Atlantic corridor
    ("Sale", 34.0531, -6.7985),
    ("Rabat Ville", 34.0209, -6.8417),
    ("Temara", 33.9281, -6.9067),
    ("Skhirat", 33.8519, -7.0306),
    ("Bouznika", 33.7869, -7.1608),
    ("Mohammedia", 33.6866, -7.3837),
    ("Casablanca Port", 33.6036, -7.6233),
    ("Ain Sebaa", 33.6147, -7.5263),
    // Casablanca - Marrakech
    ("Berrechid", 33.2582, -7.5870),
    ("Settat", 33.0013, -7.6216),
    ("Ben Ahmed", 32.7367, -7.9833),
    ("Benguerir", 32.2372, -7.9549),
    ("Marrakech", 31.6295, -7.9811),
    // Eastern line
    ("Meknes", 33.8839, -5.5406),
    ("Fes", 34.0334, -4.9998),
    ("Oued Amlil", 34.0833, -4.6167),
    ("Taza", 34.2130, -4.0100),
    ("Msoun", 34.0667, -3.4833),
    ("Guercif", 34.2264, -3.3519),
    ("Taourirt", 34.4092, -2.8953),
    ("Oujda", 34.6867, -1.9114),
    ("Nador", 35.1681, -2.9287),
    // Phosphate lines and branches
    ("Khouribga", 32.8811, -6.9063),
    ("Oued Zem", 32.8631, -6.5738),
    ("El Jadida", 33.2316, -8.5007),
    ("Safi", 32.2833, -9.2333),
    ("Youssoufia", 32.2450, -8.5308),
    ("Bouarfa", 32.5333, -1.9667),
];

const CODE_ALIASES: &[(&str, &str)] = &[
    ("LIN01.T001.TANGER", "Tanger Ville"),
    ("LIN01.T001.ASILAH", "Assilah"),
    ("LIN01.T001.LARACHE", "Larache"),
    ("LIN01.T001.KENITRA", "Kenitra"),
    ("LIN01.T001.SALE", "Sale"),
    ("LIN01.T001.RABAT", "Rabat Ville"),
    ("LIN01.T001.TEMARA", "Temara"),
    ("LIN01.T001.SKHIRAT", "Skhirat"),
    ("LIN01.T001.BOUZNIKA", "Bouznika"),
    ("LIN01.T001.MOHAMMEDIA", "Mohammedia"),
    ("LIN01.T001.CASABLANCA", "Casablanca Voyageurs"),
    ("LIN01.T001.BERRECHID", "Berrechid"),
    ("LIN01.T001.SETTAT", "Settat"),
    ("LIN01.T001.BEN_AHMED", "Ben Ahmed"),
    ("LIN01.T001.BENGUERIR", "Benguerir"),
    ("LIN01.T001.MARRAKECH", "Marrakech"),
    ("LIN01.T001.SIDI_KACEM", "Sidi Kacem"),
    ("LIN01.T001.MEKNES", "Meknes"),
    ("LIN01.T001.FES", "Fes"),
    ("LIN01.T001.TAZA", "Taza"),
    ("LIN01.T001.GUERCIF", "Guercif"),
    ("LIN01.T001.TAOURIRT", "Taourirt"),
    ("LIN01.T001.OUJDA", "Oujda"),
    ("LIN01.T001.NADOR", "Nador"),
    ("LIN01.T001.KHOURIBGA", "Khouribga"),
    ("LIN01.T001.OUED_ZEM", "Oued Zem"),
    ("LIN01.T001.EL_JADIDA", "El Jadida"),
    ("LIN01.T001.SAFI", "Safi"),
];

// Order matters: the first keyword contained in the label wins, so the short
// `casa` entry shadows every longer `casa...` label after it.
const KEYWORDS: &[(&str, &str)] = &[
    ("casa", "Casablanca Voyageurs"),
    ("casablanca", "Casablanca Voyageurs"),
    ("casa voyageurs", "Casablanca Voyageurs"),
    ("casa/marrakech", "Casablanca Voyageurs"),
    ("casa/marrakech v2", "Casablanca Voyageurs"),
    ("casa/skacem", "Casablanca Voyageurs"),
    ("rabat", "Rabat Ville"),
    ("rabat ville", "Rabat Ville"),
    ("rabat agdal", "Rabat Agdal"),
    ("tanger", "Tanger Ville"),
    ("tanger ville", "Tanger Ville"),
    ("tanger/fes", "Tanger Ville"),
    ("tanger/fes rac", "Tanger Ville"),
    ("tanger/fes u", "Tanger Ville"),
    ("tanger/fesv1", "Tanger Ville"),
    ("marrakech", "Marrakech"),
    ("casa voitureurs/marrakech", "Marrakech"),
    ("casa voyageurs/marrakech", "Marrakech"),
    ("casa voyageurs/marrakech v2", "Marrakech"),
    ("fes", "Fes"),
    ("fes/oujda", "Fes"),
    ("fes/oujda real", "Fes"),
    ("meknes", "Meknes"),
    ("oujda", "Oujda"),
    ("nador", "Nador"),
    ("kenitra", "Kenitra"),
    ("sale", "Sale"),
    ("mohammedia", "Mohammedia"),
    ("settat", "Settat"),
    ("benguerir", "Benguerir"),
    ("benguerir/safi", "Benguerir"),
    ("benguerir/safi u", "Benguerir"),
    ("el jadida", "El Jadida"),
    ("nouaceur/eljadida", "El Jadida"),
    ("nouaceur/eljadidav2", "El Jadida"),
    ("safi", "Safi"),
    ("sidi kacem", "Sidi Kacem"),
    ("sidi slimane", "Sidi Slimane"),
    ("sidi yahya", "Sidi Yahya El Gharb"),
    ("ksar el kebir", "Ksar El Kebir"),
    ("larache", "Larache"),
    ("assilah", "Assilah"),
    ("temara", "Temara"),
    ("skhirat", "Skhirat"),
    ("bouznika", "Bouznika"),
    ("berrechid", "Berrechid"),
    ("ben ahmed", "Ben Ahmed"),
    ("taourirt", "Taourirt"),
    ("taourirt/nador", "Taourirt"),
    ("khouribga", "Khouribga"),
    ("oued zem", "Oued Zem"),
    ("youssoufia", "Youssoufia"),
];

const PARTIAL_KEYWORDS: &[(&str, &str)] = &[
    ("casa", "Casablanca Voyageurs"),
    ("rabat", "Rabat Ville"),
    ("tanger", "Tanger Ville"),
    ("marrakech", "Marrakech"),
    ("fes", "Fes"),
    ("meknes", "Meknes"),
    ("oujda", "Oujda"),
    ("nador", "Nador"),
    ("kenitra", "Kenitra"),
    ("sale", "Sale"),
    ("mohammedia", "Mohammedia"),
    ("settat", "Settat"),
    ("benguerir", "Benguerir"),
    ("el jadida", "El Jadida"),
    ("safi", "Safi"),
];

const KILOMETER_POINTS: &[(f64, &str)] = &[
    (0.0, "Tanger Ville"),
    (50.0, "Assilah"),
    (100.0, "Larache"),
    (150.0, "Ksar El Kebir"),
    (200.0, "Souk El Arbaa"),
    (250.0, "Sidi Yahya El Gharb"),
    (300.0, "Kenitra"),
    (350.0, "Sale"),
    (400.0, "Rabat Ville"),
    (450.0, "Temara"),
    (500.0, "Skhirat"),
    (550.0, "Bouznika"),
    (600.0, "Mohammedia"),
    (650.0, "Casablanca Voyageurs"),
    (700.0, "Berrechid"),
    (750.0, "Settat"),
    (800.0, "Ben Ahmed"),
    (850.0, "Benguerir"),
    (900.0, "Marrakech"),
];

const ROUTES: &[(&str, &[(f64, f64)])] = &[
    (
        "LGV-Al-Boraq",
        &[
            (35.7595, -5.8340),
            (35.6000, -5.8000),
            (35.4000, -5.7000),
            (35.2000, -5.6000),
            (35.0000, -5.5000),
            (34.8000, -5.6000),
            (34.6000, -5.7000),
            (34.4000, -5.8000),
            (34.3000, -5.9000),
            (34.2610, -6.5802),
        ],
    ),
    (
        "Tanger-Kenitra-Classique",
        &[
            (35.7595, -5.8340),
            (35.4650, -6.0366),
            (35.1933, -6.1558),
            (35.0019, -5.9083),
            (34.6908, -5.9886),
            (34.3008, -6.3106),
            (34.2610, -6.5802),
        ],
    ),
    (
        "Kenitra-Casablanca-LGV",
        &[
            (34.2610, -6.5802),
            (34.0531, -6.7985),
            (33.9591, -6.8498),
            (34.0209, -6.8417),
            (33.9281, -6.9067),
            (33.8519, -7.0306),
            (33.7869, -7.1608),
            (33.6866, -7.3837),
            (33.5970, -7.6186),
        ],
    ),
    (
        "Mohammedia-Bouznika-Direct",
        &[(33.6866, -7.3837), (33.7500, -7.3000), (33.7869, -7.1608)],
    ),
    (
        "Casablanca-Marrakech",
        &[
            (33.5970, -7.6186),
            (33.2582, -7.5870),
            (33.0013, -7.6216),
            (32.7367, -7.9833),
            (32.2372, -7.9549),
            (31.6295, -7.9811),
        ],
    ),
    (
        "Fes-Oujda-Real",
        &[
            (34.0334, -4.9998),
            (34.0833, -4.6167),
            (34.2130, -4.0100),
            (34.0667, -3.4833),
            (34.2264, -3.3519),
            (34.4092, -2.8953),
            (34.6867, -1.9114),
        ],
    ),
    (
        "Taourirt-Nador",
        &[(34.4092, -2.8953), (34.8000, -2.9000), (35.1681, -2.9287)],
    ),
    (
        "Phosphates",
        &[
            (34.2214, -5.7031),
            (32.8811, -6.9063),
            (32.8631, -6.5738),
            (32.2450, -8.5308),
            (32.2833, -9.2333),
        ],
    ),
    (
        "El-Jadida-Casablanca",
        &[(33.2316, -8.5007), (33.5970, -7.6186)],
    ),
    (
        "Nouaceur-El-Jadida",
        &[(33.3670, -7.6470), (33.2316, -8.5007)],
    ),
];

const PK_BANDS: &[(Option<f64>, &str)] = &[
    (Some(300.0), "Tanger-Kenitra-Classique"),
    (Some(650.0), "Kenitra-Casablanca-LGV"),
    (Some(900.0), "Casablanca-Marrakech"),
    (None, "Fes-Oujda-Real"),
];

// Free-text labels that the field teams reuse for whole corridors. Derived
// from label frequencies in production data, not from a documented rule.
const CORRIDORS: &[(&str, &[&str], (f64, f64), (f64, f64))] = &[
    (
        "Casablanca-Sidi Kacem",
        &["casavoyageurs/skacem"],
        (33.5970, -7.6186),
        (34.2214, -5.7031),
    ),
    (
        "Benguerir-Safi",
        &["benguerir/safi"],
        (32.2372, -7.9549),
        (32.2833, -9.2333),
    ),
    (
        "Casablanca-Marrakech",
        &["casavoyageurs/marrakech", "casa voyageurs/marrakech"],
        (33.5970, -7.6186),
        (31.6295, -7.9811),
    ),
    (
        "Nouaceur-El Jadida",
        &["nouaceur/eljadida"],
        (33.3670, -7.6470),
        (33.2316, -8.5007),
    ),
    // No surveyed coordinate for S. Elaidi; both ends sit on Oued Zem.
    (
        "S. Elaidi-Oued Zem",
        &["s.elaidi/oued zem"],
        (32.8631, -6.5738),
        (32.8631, -6.5738),
    ),
    (
        "Tanger-Fes",
        &["tanger/fes u"],
        (35.7595, -5.8340),
        (34.0334, -4.9998),
    ),
];

const NETWORK_POINTS: &[(f64, f64)] = &[
    // LGV Al Boraq
    (35.7595, -5.8340),
    (35.6800, -5.8170),
    (35.6000, -5.8000),
    (35.5000, -5.7500),
    (35.4000, -5.7000),
    (35.3000, -5.6500),
    (35.2000, -5.6000),
    (35.1000, -5.5500),
    (35.0000, -5.5000),
    (34.9000, -5.5500),
    (34.8000, -5.6000),
    (34.7000, -5.6500),
    (34.6000, -5.7000),
    (34.5000, -5.7500),
    (34.4000, -5.8000),
    (34.3500, -5.8500),
    (34.3000, -5.9000),
    (34.2805, -6.2406),
    (34.2610, -6.5802),
    // Northern classic line
    (35.4650, -6.0366),
    (35.3292, -6.0962),
    (35.1933, -6.1558),
    (35.0976, -6.0321),
    (35.0019, -5.9083),
    (34.8464, -5.9485),
    (34.6908, -5.9886),
    (34.4958, -6.1496),
    (34.3008, -6.3106),
    (34.2619, -6.0068),
    (34.2628, -5.9222),
    (34.2421, -6.3127),
    (34.2214, -5.7031),
    // Kenitra - Casablanca
    (34.0531, -6.7985),
    (34.0060, -6.8241),
    (33.9591, -6.8498),
    (33.9900, -6.8458),
    (34.0209, -6.8417),
    (33.9745, -6.8742),
    (33.9281, -6.9067),
    (33.8900, -6.9687),
    (33.8519, -7.0306),
    (33.8194, -7.0957),
    (33.7869, -7.1608),
    (33.7368, -7.2723),
    (33.6866, -7.3837),
    (33.6418, -7.5012),
    (33.5970, -7.6186),
    // Casablanca - Marrakech
    (33.2582, -7.5870),
    (33.1298, -7.6043),
    (33.0013, -7.6216),
    (32.8690, -7.8025),
    (32.7367, -7.9833),
    (32.4869, -7.9691),
    (32.2372, -7.9549),
    (31.9334, -7.9680),
    (31.6295, -7.9811),
    // Fes - Oujda
    (34.0334, -4.9998),
    (34.0584, -4.8078),
    (34.0833, -4.6167),
    (34.1482, -4.3134),
    (34.2130, -4.0100),
    (34.1399, -3.7467),
    (34.0667, -3.4833),
    (34.1466, -3.4176),
    (34.2264, -3.3519),
    (34.3178, -3.1236),
    (34.4092, -2.8953),
    (34.5480, -2.4034),
    (34.6867, -1.9114),
    // Phosphates
    (32.8811, -6.9063),
    (32.8721, -6.7401),
    (32.8631, -6.5738),
    (32.5541, -7.5521),
    (32.2450, -8.5308),
    (32.2642, -8.8821),
    (32.2833, -9.2333),
    // El Jadida branch
    (33.2316, -8.5007),
    (33.2993, -8.0739),
    (33.3670, -7.6470),
    // Secondary axes
    (34.8000, -5.9000),
    (34.7000, -6.0000),
    (34.6000, -6.1000),
    (34.5000, -6.2000),
    (34.4000, -6.3000),
    (34.3000, -6.4000),
    (34.2000, -6.5000),
    (34.1000, -6.6000),
    (34.0000, -6.7000),
    (33.9000, -6.8000),
    (33.8000, -6.9000),
    (33.7000, -7.0000),
    (33.6000, -7.1000),
    (33.5000, -7.2000),
    (33.4000, -7.3000),
    (33.3000, -7.4000),
    (33.2000, -7.5000),
    (33.1000, -7.6000),
    (33.0000, -7.7000),
    (32.9000, -7.8000),
    (32.8000, -7.9000),
    (32.7000, -8.0000),
    (32.6000, -8.1000),
    (32.5000, -8.2000),
    (32.4000, -8.3000),
    (32.3000, -8.4000),
    (32.2000, -8.5000),
    (32.1000, -8.6000),
    (32.0000, -8.7000),
    (31.9000, -8.8000),
    (31.8000, -8.9000),
    (31.7000, -9.0000),
    (31.6000, -9.1000),
    (31.5000, -9.2000),
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeAlias {
    pub code: String,
    pub station: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeywordAlias {
    pub keyword: String,
    pub station: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KilometerPoint {
    pub pk: f64,
    pub station: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteSegment {
    pub name: String,
    pub points: Vec<Coordinate>,
}

/// Kilometer-point range (inclusive upper bound) served by one route.
/// `max_pk: None` closes the list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PkBand {
    #[serde(default)]
    pub max_pk: Option<f64>,
    pub route: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterCorridor {
    pub name: String,
    pub labels: Vec<String>,
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub hub: String,
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub code_aliases: Vec<CodeAlias>,
    #[serde(default)]
    pub keywords: Vec<KeywordAlias>,
    #[serde(default)]
    pub partial_keywords: Vec<KeywordAlias>,
    #[serde(default)]
    pub kilometer_points: Vec<KilometerPoint>,
    pub routes: Vec<RouteSegment>,
    pub pk_bands: Vec<PkBand>,
    #[serde(default)]
    pub corridors: Vec<ClusterCorridor>,
    pub network_points: Vec<Coordinate>,
}

impl ReferenceTables {
    /// Built-in ONCF network tables.
    pub fn oncf() -> Self {
        Self {
            hub: HUB_STATION.to_string(),
            stations: STATIONS
                .iter()
                .map(|&(name, lat, lon)| StationRecord {
                    name: name.to_string(),
                    lat,
                    lon,
                })
                .collect(),
            code_aliases: CODE_ALIASES
                .iter()
                .map(|&(code, station)| CodeAlias {
                    code: code.to_string(),
                    station: station.to_string(),
                })
                .collect(),
            keywords: keyword_aliases(KEYWORDS),
            partial_keywords: keyword_aliases(PARTIAL_KEYWORDS),
            kilometer_points: KILOMETER_POINTS
                .iter()
                .map(|&(pk, station)| KilometerPoint {
                    pk,
                    station: station.to_string(),
                })
                .collect(),
            routes: ROUTES
                .iter()
                .map(|&(name, points)| RouteSegment {
                    name: name.to_string(),
                    points: coordinates(points),
                })
                .collect(),
            pk_bands: PK_BANDS
                .iter()
                .map(|&(max_pk, route)| PkBand {
                    max_pk,
                    route: route.to_string(),
                })
                .collect(),
            corridors: CORRIDORS
                .iter()
                .map(|&(name, labels, from, to)| ClusterCorridor {
                    name: name.to_string(),
                    labels: labels.iter().map(|label| label.to_string()).collect(),
                    from: Coordinate::new(from.0, from.1),
                    to: Coordinate::new(to.0, to.1),
                })
                .collect(),
            network_points: coordinates(NETWORK_POINTS),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TablesError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, TablesError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

fn keyword_aliases(entries: &[(&str, &str)]) -> Vec<KeywordAlias> {
    entries
        .iter()
        .map(|&(keyword, station)| KeywordAlias {
            keyword: keyword.to_string(),
            station: station.to_string(),
        })
        .collect()
}

fn coordinates(points: &[(f64, f64)]) -> Vec<Coordinate> {
    points
        .iter()
        .map(|&(lat, lon)| Coordinate::new(lat, lon))
        .collect()
}
