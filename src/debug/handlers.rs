use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{MatchedPath, Path, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debug::index::IndexPage;
use crate::debug::profiler::{ProfileError, ProfileKind, Profiler};
use crate::observability::{metrics, BuildInfo, InvalidLevel, LogLevelRegistry, SetLevelError};

/// State shared by every diagnostics handler.
#[derive(Clone)]
pub struct DebugState {
    pub levels: Arc<LogLevelRegistry>,
    pub build_info: Arc<BuildInfo>,
    pub profiler: Arc<dyn Profiler>,
    pub index: Arc<IndexPage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelBody {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileEntry {
    pub name: &'static str,
    pub path: String,
    pub description: &'static str,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Why a `PUT /log/level` was refused.
#[derive(Debug, Error)]
pub enum LevelChangeError {
    #[error("invalid request")]
    MalformedBody,

    #[error("invalid level")]
    InvalidLevel(#[from] InvalidLevel),

    #[error("failed to change log level")]
    Sink(#[source] SetLevelError),
}

impl From<SetLevelError> for LevelChangeError {
    fn from(err: SetLevelError) -> Self {
        match err {
            SetLevelError::Invalid(invalid) => LevelChangeError::InvalidLevel(invalid),
            other => LevelChangeError::Sink(other),
        }
    }
}

impl IntoResponse for LevelChangeError {
    fn into_response(self) -> Response {
        let status = match self {
            LevelChangeError::MalformedBody | LevelChangeError::InvalidLevel(_) => {
                StatusCode::BAD_REQUEST
            }
            LevelChangeError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

pub async fn index_page(State(state): State<DebugState>) -> Html<String> {
    Html(state.index.render(state.levels.current()))
}

pub async fn version(State(state): State<DebugState>) -> Json<BuildInfo> {
    Json(state.build_info.as_ref().clone())
}

pub async fn get_log_level(State(state): State<DebugState>) -> Json<LevelBody> {
    Json(LevelBody {
        level: state.levels.current().to_string(),
    })
}

pub async fn put_log_level(
    State(state): State<DebugState>,
    body: Bytes,
) -> Result<Json<StatusBody>, LevelChangeError> {
    let request: LevelBody =
        serde_json::from_slice(&body).map_err(|_| LevelChangeError::MalformedBody)?;
    if request.level.is_empty() {
        return Err(LevelChangeError::MalformedBody);
    }

    let level = state.levels.set(&request.level).map_err(|e| {
        tracing::warn!(target: "server-debug", level = %request.level, error = %e, "Log level change rejected");
        LevelChangeError::from(e)
    })?;

    metrics::record_level_change(level.as_str());
    tracing::info!(target: "change-log-level", level = %level, "log level changed");

    Ok(Json(StatusBody {
        status: "ok".to_string(),
    }))
}

pub async fn profile_index() -> Json<Vec<ProfileEntry>> {
    Json(
        ProfileKind::ALL
            .into_iter()
            .map(|kind| ProfileEntry {
                name: kind.name(),
                path: kind.path(),
                description: kind.description(),
            })
            .collect(),
    )
}

pub async fn profile(State(state): State<DebugState>, Path(name): Path<String>) -> Response {
    let Some(kind) = ProfileKind::from_name(&name) else {
        return error_response(StatusCode::NOT_FOUND, "unknown profile");
    };

    match state.profiler.snapshot(kind) {
        Ok(snapshot) => (
            [(header::CONTENT_TYPE, snapshot.content_type)],
            snapshot.body,
        )
            .into_response(),
        Err(err @ ProfileError::Unsupported(_)) => {
            error_response(StatusCode::NOT_IMPLEMENTED, err.to_string())
        }
        Err(err @ ProfileError::Failed { .. }) => {
            tracing::error!(target: "server-debug", profile = %kind, error = %err, "Profile failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn track_requests(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_debug_request(&path, response.status().as_u16());
    response
}
