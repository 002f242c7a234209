use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::data::load_configured_history;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, MatchRecord, PredictRequest, PredictResponse, TeamProfile, TrainingReport,
};
use crate::services::Forecaster;
use crate::utils::validate_team_name;

const MAX_RECENT_MATCHES: usize = 100;

/// Shared request state. Retraining takes the write half of the lock, every
/// other handler only reads.
#[derive(Clone)]
pub struct AppState {
    pub forecaster: Arc<RwLock<Forecaster>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(forecaster: Forecaster, config: AppConfig) -> Self {
        Self {
            forecaster: Arc::new(RwLock::new(forecaster)),
            config: Arc::new(config),
        }
    }
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let port = config.port;
    let forecaster = bootstrap(&config).await;
    let app = create_router(AppState::new(forecaster, config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Prediction API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Load the configured history and train once. A load failure is logged and
/// the server starts with no data rather than refusing to boot.
async fn bootstrap(config: &AppConfig) -> Forecaster {
    let config = config.clone();
    let built = tokio::task::spawn_blocking(move || {
        load_configured_history(&config).map(|history| Forecaster::build(history, &config).0)
    })
    .await;

    match built {
        Ok(Ok(forecaster)) => forecaster,
        Ok(Err(e)) => {
            tracing::error!("Error loading data: {:#}", e);
            Forecaster::empty()
        }
        Err(e) => {
            tracing::error!("Startup training task failed: {}", e);
            Forecaster::empty()
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let frontend = state.config.frontend_dir.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/teams", get(get_teams_handler))
        .route("/api/team-stats/{team_name}", get(get_team_stats_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/matches", get(get_matches_handler))
        .route("/api/train", post(train_handler))
        .route_service("/", ServeFile::new(frontend.join("index.html")))
        .route_service("/dashboard", ServeFile::new(frontend.join("dashboard.html")))
        .fallback_service(ServeDir::new(frontend))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Prediction API is running"))
}

// GET /api/teams - Known team ids, sorted
async fn get_teams_handler(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    let forecaster = state.forecaster.read().await;
    Json(ApiResponse::success(forecaster.teams()))
}

// GET /api/team-stats/{team_name} - Aggregated profile for one team
async fn get_team_stats_handler(
    State(state): State<AppState>,
    Path(team_name): Path<String>,
) -> Result<Json<ApiResponse<TeamProfile>>, ApiError> {
    let forecaster = state.forecaster.read().await;
    forecaster
        .team_profile(&team_name)
        .map(|profile| Json(ApiResponse::success(*profile)))
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

// POST /api/predict - Outcome distribution for a fixture
async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PredictResponse>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let (home_team, away_team) = match (&request.home_team, &request.away_team) {
        (Some(home), Some(away)) if validate_team_name(home) && validate_team_name(away) => {
            (home.trim(), away.trim())
        }
        _ => return Err(ApiError::BadRequest("Home and away teams required".to_string())),
    };

    let forecaster = state.forecaster.read().await;
    let response = forecaster.predict(
        home_team,
        away_team,
        request.home_advantage.unwrap_or(true),
    );
    Ok(Json(ApiResponse::success(response)))
}

// GET /api/matches - Most recent rows of the history
#[derive(Deserialize)]
struct MatchesQuery {
    limit: Option<usize>,
}

async fn get_matches_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchesQuery>,
) -> Json<ApiResponse<Vec<MatchRecord>>> {
    let limit = params
        .limit
        .unwrap_or(state.config.recent_matches)
        .min(MAX_RECENT_MATCHES);

    let forecaster = state.forecaster.read().await;
    Json(ApiResponse::success(forecaster.recent_matches(limit).to_vec()))
}

// POST /api/train - Reload the data source and retrain
async fn train_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TrainingReport>>, ApiError> {
    let config = Arc::clone(&state.config);

    // Build outside the lock so readers keep being served, then swap.
    let (forecaster, report) = tokio::task::spawn_blocking(move || {
        load_configured_history(&config).map(|history| Forecaster::build(history, &config))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("training task failed: {}", e)))?
    .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    *state.forecaster.write().await = forecaster;
    tracing::info!("Retrained model, accuracy {:.3}", report.accuracy);

    Ok(Json(ApiResponse::success(report)))
}
