use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::LocatorError;
use crate::models::Incident;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Quarter,
    Year,
}

impl FromStr for Period {
    type Err = LocatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(LocatorError::InvalidFilter(format!("unknown period `{other}`"))),
        }
    }
}

impl Period {
    pub fn contains(self, date: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Period::Today => date.date() == now.date(),
            Period::Week => date >= now - Duration::days(7),
            Period::Month => date.year() == now.year() && date.month() == now.month(),
            Period::Quarter => {
                let first_month = (now.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(now.year(), first_month, 1)
                    .and_then(|start| start.and_hms_opt(0, 0, 0))
                    .is_some_and(|start| date >= start)
            }
            Period::Year => date.year() == now.year(),
        }
    }
}

/// Raw query string of `GET /api/map/incidents`. Empty values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    pub source: Option<String>,
    pub system: Option<String>,
    pub location: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentFilter {
    pub status: Option<String>,
    pub type_id: Option<i64>,
    pub source_id: Option<i64>,
    pub system_id: Option<i64>,
    pub location: Option<String>,
    pub period: Option<Period>,
}

impl TryFrom<&MapQuery> for IncidentFilter {
    type Error = LocatorError;

    fn try_from(query: &MapQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: non_empty(&query.status).map(String::from),
            type_id: parse_id("type", &query.type_id)?,
            source_id: parse_id("source", &query.source)?,
            system_id: parse_id("system", &query.system)?,
            location: non_empty(&query.location).map(String::from),
            period: non_empty(&query.period).map(str::parse::<Period>).transpose()?,
        })
    }
}

impl IncidentFilter {
    pub fn is_empty(&self) -> bool {
        *self == IncidentFilter::default()
    }

    pub fn matches(&self, incident: &Incident, now: NaiveDateTime) -> bool {
        if let Some(status) = &self.status {
            if incident.status() != Some(status.as_str()) {
                return false;
            }
        }
        if self.type_id.is_some() && incident.type_id != self.type_id {
            return false;
        }
        if self.source_id.is_some() && incident.source_id != self.source_id {
            return false;
        }
        if self.system_id.is_some() && incident.system_id != self.system_id {
            return false;
        }
        if let Some(location) = &self.location {
            if incident.type_localisation.as_deref() != Some(location.as_str()) {
                return false;
            }
        }
        if let Some(period) = self.period {
            // undated incidents never fall inside a period
            return incident
                .date_debut
                .as_deref()
                .and_then(parse_incident_date)
                .is_some_and(|date| period.contains(date, now));
        }
        true
    }

    pub fn apply(&self, incidents: Vec<Incident>, now: NaiveDateTime) -> Vec<Incident> {
        if self.is_empty() {
            return incidents;
        }
        incidents
            .into_iter()
            .filter(|incident| self.matches(incident, now))
            .collect()
    }
}

/// Dates come either as ISO strings or, from older dashboards, as RFC 2822
/// (`Mon, 15 Jan 2024 00:00:00 GMT`).
pub fn parse_incident_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|parsed| parsed.naive_local())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_id(name: &str, value: &Option<String>) -> Result<Option<i64>, LocatorError> {
    non_empty(value)
        .map(|raw| {
            raw.parse().map_err(|_| {
                LocatorError::InvalidFilter(format!("`{name}` must be an integer, got `{raw}`"))
            })
        })
        .transpose()
}
