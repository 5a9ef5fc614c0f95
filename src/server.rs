use crate::config::AppConfig;
use crate::dashboard::{self, Dashboard};
use crate::processing::{Selection, SelectionError};
use crate::render;
use crate::types::{PopulationRecord, Province, ProvinceInfo};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use geojson::FeatureCollection;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// Province locations, indexed for the hover lookup.
type ProvincePoint = GeomWithData<[f64; 2], Province>;

pub struct AppState {
    pub dataset: &'static [PopulationRecord],
    pub tree: RTree<ProvincePoint>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, dataset: &'static [PopulationRecord]) -> Self {
        let points = Province::ALL
            .into_iter()
            .map(|p| GeomWithData::new([p.longitude(), p.latitude()], p))
            .collect();

        AppState {
            dataset,
            tree: RTree::bulk_load(points),
            config,
        }
    }
}

/// Control-surface parameters shared by every view endpoint.
#[derive(Debug, Deserialize)]
pub struct SelectionQuery {
    year: Option<i32>,
    provinces: Option<String>,
}

impl SelectionQuery {
    // Missing `provinces` means all of them; an empty value is the empty selection.
    fn resolve(&self, default_year: i32) -> Result<Selection, SelectionError> {
        let year = self.year.unwrap_or(default_year);
        match &self.provinces {
            Some(list) => Selection::new(year, Selection::parse_provinces(list)?),
            None => Selection::all(year),
        }
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
    year: Option<i32>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub enum ApiError {
    BadRequest(SelectionError),
    BadQuery(QueryRejection),
    Internal(anyhow::Error),
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        ApiError::BadRequest(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadQuery(rejection)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::BadQuery(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.server.web_dir);

    Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/export", get(export_handler))
        .route("/api/map", get(map_handler))
        .route("/api/query", get(query_handler))
        .route("/api/provinces", get(provinces_handler))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, dataset: &'static [PopulationRecord]) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let state = Arc::new(AppState::new(config, dataset));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    tracing::info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SelectionQuery>, QueryRejection>,
) -> Result<Json<Dashboard>, ApiError> {
    let Query(params) = params?;
    let selection = params.resolve(state.config.dashboard.default_year)?;
    Ok(Json(Dashboard::build(state.dataset, &selection, &state.config.dashboard)))
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SelectionQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let selection = params.resolve(state.config.dashboard.default_year)?;
    let export = dashboard::export_selection(state.dataset, &selection)?;
    tracing::info!("Exporting {} ({} bytes)", export.filename, export.bytes.len());

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.bytes).into_response())
}

async fn map_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SelectionQuery>, QueryRejection>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let Query(params) = params?;
    let selection = params.resolve(state.config.dashboard.default_year)?;
    Ok(Json(render::bubble_features(&selection.snapshot_view(state.dataset))))
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<Option<PopulationRecord>>, ApiError> {
    let Query(params) = params?;
    let year = params.year.unwrap_or(state.config.dashboard.default_year);

    let record = state
        .tree
        .nearest_neighbor(&[params.lon, params.lat])
        .and_then(|nearest| {
            state
                .dataset
                .iter()
                .find(|r| r.province == nearest.data && r.year == year)
        })
        .cloned();

    Ok(Json(record))
}

async fn provinces_handler() -> Json<Vec<ProvinceInfo>> {
    Json(Province::ALL.into_iter().map(ProvinceInfo::from).collect())
}
