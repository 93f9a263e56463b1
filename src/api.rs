//! HTTP API for the quoting engine.
//!
//! This module exposes the estimation and pricing pipeline over REST
//! using the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! submit a job and photo to receive an estimate, re-price estimates as
//! the user changes their billing options, and manage saved jobs and
//! quote settings.

use crate::config::ServerConfig;
use crate::engine::{estimate_job, price_saved_jobs};
use crate::error::{ApiError, ApiResult, EstimateError};
use crate::models::{
    AppSettings, EstimateRequest, EstimateResponse, EstimateResult, FinalPricing, JobQuote, PriceRequest,
    SaveJobRequest, SavedJob,
};
use crate::pricing::price;
use crate::provider::{ImageSource, OpenAiProvider, VisionProvider};
use crate::quote::{build_quote, QuoteDocument};
use crate::store::JobStore;
use crate::validate::{check_estimate, validate_job_inputs};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across requests.
pub struct AppState {
    pub provider: Arc<dyn VisionProvider>,
    pub store: JobStore,
    pub settings: RwLock<AppSettings>,
}

impl AppState {
    /// State over an existing store, with settings loaded from it.
    pub fn new(provider: Arc<dyn VisionProvider>, store: JobStore) -> Result<Self> {
        let settings = store.load_settings()?;
        Ok(Self {
            provider,
            store,
            settings: RwLock::new(settings),
        })
    }
}

/// Build the API router from configuration.  Returns the router and a
/// handle to the state.
pub fn build_router(config: &ServerConfig) -> Result<(Router, Arc<AppState>)> {
    let provider = OpenAiProvider::new(config.openai.clone()).context("creating vision provider")?;
    let store = JobStore::open(&config.data_dir)?;
    let state = Arc::new(AppState::new(Arc::new(provider), store)?);
    Ok((router(state.clone()), state))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/estimate", post(estimate_handler))
        .route("/api/price", post(price_handler))
        .route("/api/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/api/jobs", get(list_jobs_handler).post(save_job_handler))
        .route("/api/jobs/:id", get(get_job_handler).delete(delete_job_handler))
        .route("/api/jobs/:id/quote", get(job_quote_handler))
        .with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| EstimateError::InvalidInput(rejection.body_text()).into())
}

/// Estimates sent back by a client must obey the same rules as a model
/// answer before they are priced or stored.
fn check_client_estimate(estimate: &EstimateResult) -> ApiResult<()> {
    check_estimate(estimate).map_err(|err| {
        let message = match err {
            EstimateError::MalformedResponse(msg) => msg,
            other => other.to_string(),
        };
        EstimateError::InvalidInput(message).into()
    })
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Handler for POST /api/estimate
async fn estimate_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> ApiResult<Json<EstimateResponse>> {
    let request = json_body(payload)?;
    validate_job_inputs(&request.inputs)?;

    let image = match (request.image_base64, request.image_url) {
        (Some(data), _) if !data.is_empty() => ImageSource::inline(data, request.inputs.photo_uri.as_deref()),
        (_, Some(url)) if !url.is_empty() => ImageSource::Url(url),
        _ => return Err(ApiError::BadRequest("Image is required (base64 or URL)".to_string())),
    };

    let estimate = estimate_job(&request.inputs, &image, app_state.provider.as_ref()).await?;
    Ok(Json(EstimateResponse {
        success: true,
        data: Some(estimate),
        error: None,
    }))
}

/// Handler for POST /api/price
async fn price_handler(payload: Result<Json<PriceRequest>, JsonRejection>) -> ApiResult<Json<FinalPricing>> {
    let request = json_body(payload)?;
    check_client_estimate(&request.estimate)?;
    Ok(Json(price(&request.estimate, &request.pricing, request.job_type)))
}

async fn get_settings_handler(State(app_state): State<Arc<AppState>>) -> Json<AppSettings> {
    Json(app_state.settings.read().await.clone())
}

async fn put_settings_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AppSettings>, JsonRejection>,
) -> ApiResult<Json<AppSettings>> {
    let settings = json_body(payload)?;
    // Held across the write so concurrent updates land in order.
    let mut current = app_state.settings.write().await;
    let store = app_state.store.clone();
    let to_write = settings.clone();
    tokio::task::spawn_blocking(move || store.save_settings(&to_write))
        .await
        .context("settings writer task failed")??;
    *current = settings.clone();
    Ok(Json(settings))
}

/// Handler for GET /api/jobs.  Each job is priced with the current
/// default billing settings unless it carries its own.
async fn list_jobs_handler(State(app_state): State<Arc<AppState>>) -> ApiResult<Json<Vec<JobQuote>>> {
    let jobs = app_state.store.list()?;
    let pricing = app_state.settings.read().await.pricing_inputs();
    Ok(Json(price_saved_jobs(jobs, &pricing)))
}

async fn save_job_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SaveJobRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SavedJob>)> {
    let request = json_body(payload)?;
    validate_job_inputs(&request.inputs)?;
    check_client_estimate(&request.outputs)?;
    let job = app_state
        .store
        .save(request.inputs, request.outputs, request.photo_uri)?;
    Ok((StatusCode::CREATED, Json(job)))
}

fn find_job(app_state: &AppState, id: &str) -> ApiResult<SavedJob> {
    app_state
        .store
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("job {id}")))
}

async fn get_job_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SavedJob>> {
    Ok(Json(find_job(&app_state, &id)?))
}

async fn delete_job_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if app_state.store.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("job {id}")))
    }
}

async fn job_quote_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<QuoteDocument>> {
    let job = find_job(&app_state, &id)?;
    let settings = app_state.settings.read().await;
    Ok(Json(build_quote(&job, &settings)))
}

/// Launch the API server.  Blocks until the server terminates.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let (router, _state) = build_router(config)?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Server listening");
    axum::serve(listener, router).await.context("server error")
}
