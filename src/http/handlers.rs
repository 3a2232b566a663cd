//! Request handlers for the render and config endpoints.

use axum::body::Bytes;
use axum::extract::{Path as RequestPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::exec::CommandRunner;
use crate::http::server::AppState;
use crate::store::Store;
use crate::tree::{self, EditOp};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub transformer: &'static str,
    pub target_file: String,
}

/// GET /v1/status — process identity for operators.
pub async fn get_status<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        transformer: state.config.transformer().name(),
        target_file: state.config.target().display().to_string(),
    })
}

/// GET /v1/render — rendered bytes of the committed document.
pub async fn get_render<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
) -> Response {
    state.config.last_render().into_response()
}

/// POST /v1/render — dry run: parse the body as a full replacement
/// document, validate it, and return its rendering. Never commits.
pub async fn post_render<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    body: Bytes,
) -> Response {
    let mut candidate = state.config.copy();
    if let Err(e) = candidate.load(&body) {
        return bad_request(format!("Bad request: {e}"));
    }
    match candidate.validate().await {
        Ok(()) => candidate.last_render().to_vec().into_response(),
        Err(ConfigError::Validation(e)) => {
            bad_request(format!("{}{}", e.output, e.input))
        }
        Err(e) => bad_request(e.to_string()),
    }
}

/// GET /v1/config/{path} — JSON value at path, `null` when absent.
pub async fn get_config<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    path: Option<RequestPath<String>>,
) -> Response {
    let path = parse_path(path);
    let value = state.config.get(&path).unwrap_or(Value::Null);
    let mut body = serde_json::to_vec_pretty(&value).unwrap_or_else(|_| b"null".to_vec());
    body.push(b'\n');
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// POST /v1/config/{path} — merge an object body into an object node,
/// append anything else to the sequence at path (creating it if absent).
/// 405 when an existing node at path is a scalar; an absent node is fair
/// game, Append creates the sequence and any missing ancestors.
pub async fn post_config<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    path: Option<RequestPath<String>>,
    body: Bytes,
) -> Response {
    let path = parse_path(path);
    let snapshot = state.config.snapshot();
    if !snapshot.is_composite(&path) && snapshot.get(&path).is_some() {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return bad_request(format!("Bad request: {e}")),
    };
    let op = match (snapshot.is_object(&path), value) {
        (true, Value::Object(object)) => EditOp::Merge { path, object },
        (_, value) => EditOp::Append { path, value },
    };
    mutate_response(state.config.mutate(op).await)
}

/// PUT /v1/config/{path} — replace the node at path wholesale.
pub async fn put_config<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    path: Option<RequestPath<String>>,
    body: Bytes,
) -> Response {
    let path = parse_path(path);
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return bad_request(format!("Bad request: {e}")),
    };
    mutate_response(state.config.mutate(EditOp::Replace { path, value }).await)
}

/// DELETE /v1/config/{path} — remove the node at path.
pub async fn delete_config<S: Store, R: CommandRunner>(
    State(state): State<AppState<S, R>>,
    path: Option<RequestPath<String>>,
) -> Response {
    let path = parse_path(path);
    mutate_response(state.config.mutate(EditOp::Delete { path }).await)
}

// The bare /v1/config route carries no wildcard segment; that is the root.
fn parse_path(path: Option<RequestPath<String>>) -> tree::Path {
    match path {
        Some(RequestPath(raw)) => tree::Path::parse(&raw),
        None => tree::Path::root(),
    }
}

fn mutate_response(result: Result<(), ConfigError>) -> Response {
    match result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(ConfigError::Validation(e)) => {
            tracing::warn!(output = %e.output.trim_end(), "Mutation rejected by check command");
            bad_request(e.output)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Mutation failed");
            bad_request(e.to_string())
        }
    }
}

fn bad_request(body: String) -> Response {
    (StatusCode::BAD_REQUEST, body).into_response()
}
