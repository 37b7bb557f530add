pub mod config;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod gpx_export;
pub mod markers;
pub mod models;
pub mod network;
pub mod pk;
pub mod resolver;
pub mod stats;
pub mod tables;
pub mod upstream;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::error::LocatorError;
use crate::filters::{IncidentFilter, MapQuery};
use crate::gpx_export::encode_markers_as_gpx;
use crate::markers::build_markers;
use crate::models::{
    ApiError, GpxResponse, Incident, NetworkResponse, PositionsResponse, ResolvedPosition,
};
use crate::resolver::IncidentLocator;
use crate::stats::map_statistics;
use crate::upstream::{UpstreamClient, UpstreamError};

#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<IncidentLocator>,
    pub upstream: Option<Arc<UpstreamClient>>,
}

impl AppState {
    pub fn new(locator: IncidentLocator, upstream: Option<UpstreamClient>) -> Self {
        Self {
            locator: Arc::new(locator),
            upstream: upstream.map(Arc::new),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/incidents/resolve", post(resolve_handler))
        .route("/api/incidents/positions", post(positions_handler))
        .route("/api/incidents/gpx", post(gpx_handler))
        .route("/api/map/incidents", get(map_incidents_handler))
        .route("/api/network", get(network_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn resolve_handler(
    State(state): State<AppState>,
    Json(incident): Json<Incident>,
) -> Json<ResolvedPosition> {
    Json(state.locator.resolve(&incident))
}

async fn positions_handler(
    State(state): State<AppState>,
    Json(incidents): Json<Vec<Incident>>,
) -> Json<PositionsResponse> {
    tracing::info!("Placing {} incidents", incidents.len());
    Json(positions(&state.locator, &incidents))
}

async fn gpx_handler(
    State(state): State<AppState>,
    Json(incidents): Json<Vec<Incident>>,
) -> ApiResult<GpxResponse> {
    tracing::info!("Exporting {} incidents as GPX", incidents.len());
    let markers = build_markers(state.locator.as_ref(), &incidents);
    let gpx_base64 = encode_markers_as_gpx(&markers).map_err(error_response)?;
    Ok(Json(GpxResponse {
        gpx_base64,
        count: markers.len(),
    }))
}

async fn map_incidents_handler(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> ApiResult<PositionsResponse> {
    let filter = IncidentFilter::try_from(&query).map_err(error_response)?;
    let upstream = state
        .upstream
        .as_ref()
        .ok_or(LocatorError::UpstreamNotConfigured)
        .map_err(error_response)?;

    let incidents = upstream
        .fetch_incidents()
        .await
        .map_err(|err| error_response(err.into()))?;
    let now = chrono::Local::now().naive_local();
    let incidents = filter.apply(incidents, now);
    tracing::info!("Serving {} incidents for the map", incidents.len());

    Ok(Json(positions(&state.locator, &incidents)))
}

async fn network_handler(State(state): State<AppState>) -> Json<NetworkResponse> {
    let index = state.locator.index();
    Json(NetworkResponse {
        stations: index.tables().stations.clone(),
        routes: index.route_summaries(),
    })
}

fn positions(locator: &IncidentLocator, incidents: &[Incident]) -> PositionsResponse {
    PositionsResponse {
        markers: build_markers(locator, incidents),
        statistics: map_statistics(incidents),
    }
}

fn error_response(err: LocatorError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        LocatorError::UpstreamNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        LocatorError::Upstream(UpstreamError::Http(_) | UpstreamError::Rejected(_)) => {
            StatusCode::BAD_GATEWAY
        }
        LocatorError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
        LocatorError::Gpx(_) | LocatorError::Tables(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {err}");
    }
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
