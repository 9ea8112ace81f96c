use serde::{Deserialize, Serialize};

/// A stored sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub air_quality: f64,
    pub timestamp: String,
}

/// A validated reading awaiting insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub temperature: f64,
    pub humidity: f64,
    pub air_quality: f64,
    pub timestamp: String,
}

/// Body of `POST /api/data` before validation.
///
/// Absent and `null` fields both land as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingInput {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub air_quality: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: &'static str,
    pub timestamp: String,
}

/// Placeholder returned by `/api/latest` while the store is empty
#[derive(Debug, Default, Serialize)]
pub struct EmptyReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub air_quality: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LatestResponse {
    Reading(Reading),
    Empty(EmptyReading),
}

impl From<Option<Reading>> for LatestResponse {
    fn from(reading: Option<Reading>) -> Self {
        match reading {
            Some(r) => LatestResponse::Reading(r),
            None => LatestResponse::Empty(EmptyReading::default()),
        }
    }
}
