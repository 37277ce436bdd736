//! HTTP front door: accepts jobs, serves artifacts. Thin by design — the
//! decision logic lives in [`SessionRunner`].

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::config::ServerConfig;
use crate::error::Error;
use crate::model::{RunRequest, RunResult, RunStatus};
use crate::session::SessionRunner;

/// Build the application router: the job endpoint plus static serving of
/// the artifact root.
pub fn router(runner: Arc<SessionRunner>, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_origins(&server.allowed_origins)))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let artifacts = ServeDir::new(runner.config().artifact_root.clone());

    Router::new()
        .route("/api/run-automation", post(run_automation))
        .nest_service("/screenshots", artifacts)
        .layer(cors)
        .with_state(runner)
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable origin");
                None
            }
        })
        .collect()
}

async fn run_automation(
    State(runner): State<Arc<SessionRunner>>,
    Json(request): Json<RunRequest>,
) -> Response {
    match runner.run_automation(&request).await {
        Ok(result) => {
            let code = match result.status {
                RunStatus::Success => StatusCode::OK,
                RunStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(result)).into_response()
        }
        Err(e) => {
            let code = match e {
                Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(RunResult::error(e.to_string()))).into_response()
        }
    }
}
