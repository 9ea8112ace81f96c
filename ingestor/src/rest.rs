use crate::db::Store;
use crate::errors::Error;
use crate::metrics::{
    READINGS_RECEIVED_TOTAL, READINGS_REJECTED_TOTAL, READINGS_STORED_TOTAL,
    STORAGE_FAILURES_TOTAL, WRITE_LATENCY_SECONDS,
};
use crate::model::{IngestResponse, LatestResponse, Reading, ReadingInput};
use crate::validate::validate;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Upper bound on rows returned by `GET /api/data`
pub const HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
struct AppState {
    store: Store,
}

pub fn create_router(store: Store) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/api/data", get(get_history).post(post_reading))
        .route("/api/latest", get(get_latest))
        .with_state(state)
}

async fn post_reading(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    READINGS_RECEIVED_TOTAL.inc();

    let input = parse_reading_input(payload).map_err(|e| {
        READINGS_REJECTED_TOTAL.inc();
        e
    })?;

    let reading = validate(&input, Utc::now()).map_err(|e| {
        READINGS_REJECTED_TOTAL.inc();
        ApiError::validation(e)
    })?;

    let start = Instant::now();
    let id = state.store.append(&reading).await.map_err(|e| {
        STORAGE_FAILURES_TOTAL.inc();
        ApiError::storage("Database insert failed", e)
    })?;
    WRITE_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
    READINGS_STORED_TOTAL.inc();

    debug!(
        "Saved reading {}: temperature={}, humidity={}, air_quality={}",
        id, reading.temperature, reading.humidity, reading.air_quality
    );

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            message: "Data saved successfully!",
            timestamp: reading.timestamp,
        }),
    ))
}

/// Only JSON objects are readings; arrays would otherwise fill the struct positionally.
fn parse_reading_input(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ReadingInput, ApiError> {
    let Json(value) = payload.map_err(|rejection| ApiError::malformed(rejection.body_text()))?;

    if !value.is_object() {
        return Err(ApiError::malformed(
            "Expected a JSON object with temperature, humidity and air_quality".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ApiError::malformed(e.to_string()))
}

async fn get_latest(State(state): State<AppState>) -> Result<Json<LatestResponse>, ApiError> {
    let latest = state.store.latest().await.map_err(|e| {
        STORAGE_FAILURES_TOTAL.inc();
        ApiError::storage("Failed to fetch latest data", e)
    })?;

    Ok(Json(latest.into()))
}

async fn get_history(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, ApiError> {
    let readings = state.store.recent(HISTORY_LIMIT).await.map_err(|e| {
        STORAGE_FAILURES_TOTAL.inc();
        ApiError::storage("Failed to fetch data", e)
    })?;

    Ok(Json(readings))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn validation(err: Error) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: err.details(),
                details: None,
            },
        }
    }

    fn malformed(details: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "Invalid sensor payload.".to_string(),
                details: Some(details),
            },
        }
    }

    fn storage(context: &str, err: Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: context.to_string(),
                details: Some(err.details()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("API error: {} ({:?})", self.body.error, self.body.details);
        } else {
            warn!("Rejected request: {} ({:?})", self.body.error, self.body.details);
        }
        (self.status, Json(self.body)).into_response()
    }
}
