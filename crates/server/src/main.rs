use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::PanicLogEntry,
    error::{ApiError, ErrorCode},
    protocol::{
        guardian_route, healthz_route, panic_log_route, GuardianContactDto, SaveGuardianRequest,
    },
};
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::{
    get_guardian_contact, get_panic_log, log_panic_activation, save_guardian_contact, ApiContext,
};
use app_state::AppState;
use config::{load_settings, prepare_database_url};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(healthz_route(), get(healthz))
        .route(
            guardian_route(),
            get(http_get_guardian).put(http_save_guardian),
        )
        .route(
            panic_log_route(),
            get(http_get_panic_log).post(http_log_panic),
        )
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new(ErrorCode::Internal, e.to_string())),
            )
        })?;
    Ok("ok")
}

async fn http_get_guardian(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GuardianContactDto>> {
    get_guardian_contact(&state.api)
        .await
        .map(Json)
        .map_err(into_response_error)
}

async fn http_save_guardian(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveGuardianRequest>,
) -> ApiResult<StatusCode> {
    save_guardian_contact(&state.api, req)
        .await
        .map_err(into_response_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_log_panic(State(state): State<Arc<AppState>>) -> ApiResult<Json<PanicLogEntry>> {
    log_panic_activation(&state.api)
        .await
        .map(Json)
        .map_err(into_response_error)
}

async fn http_get_panic_log(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PanicLogEntry>>> {
    get_panic_log(&state.api)
        .await
        .map(Json)
        .map_err(into_response_error)
}

fn into_response_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
