//! JSON HTTP API over the journal core.
//!
//! Each route has a synchronous handler returning `(StatusCode, Value)`; the
//! axum layer only extracts inputs and runs that handler on the blocking pool,
//! since store backends do blocking I/O. A request whose client goes away is
//! dropped with its pending response.

use crate::commands::{CommandReport, Session};
use crate::error::WriteError;
use crate::journal::audit;
use crate::journal::cycles::{CyclePlan, load_plans};
use crate::journal::paths::JournalPaths;
use crate::journal::publish::{authorize, write_entry_audited};
use crate::journal::query::FilterSpec;
use crate::journal::store::{DocumentStore, read_document};
use crate::journal::views::{cycles, entry_detail, library, thread};
use crate::journal::visibility::redact;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;

pub const COMPOSE_KEY_HEADER: &str = "x-compose-key";

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    write_key: Option<String>,
    paths: JournalPaths,
    plans: Arc<Vec<CyclePlan>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        write_key: Option<String>,
        paths: JournalPaths,
        plans: Vec<CyclePlan>,
    ) -> Self {
        Self {
            store,
            write_key,
            paths,
            plans: Arc::new(plans),
        }
    }

    fn key_matches(&self, key: Option<&str>) -> bool {
        authorize(key, self.write_key.as_deref()).is_ok()
    }
}

fn error_body(message: &str) -> Value {
    json!({ "error": message })
}

/// Public view by default; the full normalized document for the author.
pub fn handle_logs_get(state: &AppState, key: Option<&str>) -> (StatusCode, Value) {
    let entries = read_document(state.store.as_ref()).entries;
    let body = if state.key_matches(key) {
        json!(entries)
    } else {
        json!(entries.iter().filter_map(redact).collect::<Vec<_>>())
    };
    (StatusCode::OK, body)
}

pub fn handle_logs_post(state: &AppState, key: Option<&str>, body: &[u8]) -> (StatusCode, Value) {
    if let Err(err) = authorize(key, state.write_key.as_deref()) {
        audit::record(&state.paths, "publish", "rejected", "", &err.to_string());
        return (StatusCode::UNAUTHORIZED, error_body("Unauthorized"));
    }
    let raw: Value = match serde_json::from_slice(body) {
        Ok(raw) => raw,
        Err(_) => return (StatusCode::BAD_REQUEST, error_body("Invalid JSON")),
    };
    match write_entry_audited(
        &state.paths,
        state.store.as_ref(),
        key,
        state.write_key.as_deref(),
        &raw,
    ) {
        Ok(outcome) => (StatusCode::OK, json!(outcome)),
        Err(WriteError::Unauthorized) => (StatusCode::UNAUTHORIZED, error_body("Unauthorized")),
        Err(WriteError::Validation(reason)) => (
            StatusCode::BAD_REQUEST,
            error_body(&format!("Bad payload: {reason}")),
        ),
        Err(WriteError::Store(err)) => {
            log::error!("store write failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Store write failed"),
            )
        }
    }
}

pub fn handle_entry(state: &AppState, id: &str) -> (StatusCode, Value) {
    let entries = read_document(state.store.as_ref()).entries;
    match entry_detail(&entries, id) {
        Some(view) => (StatusCode::OK, json!(view)),
        None => (StatusCode::NOT_FOUND, error_body("Entry not found")),
    }
}

pub fn handle_library(state: &AppState, raw_query: &str) -> (StatusCode, Value) {
    let entries = read_document(state.store.as_ref()).entries;
    let spec = FilterSpec::from_query_string(raw_query);
    (StatusCode::OK, json!(library(&entries, &spec)))
}

pub fn handle_thread(state: &AppState, slug: &str) -> (StatusCode, Value) {
    let entries = read_document(state.store.as_ref()).entries;
    (StatusCode::OK, json!(thread(&entries, slug)))
}

pub fn handle_cycles(state: &AppState) -> (StatusCode, Value) {
    let entries = read_document(state.store.as_ref()).entries;
    (StatusCode::OK, json!(cycles(&entries, &state.plans)))
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

async fn blocking<F>(handler: F) -> Response
where
    F: FnOnce() -> (StatusCode, Value) + Send + 'static,
{
    match tokio::task::spawn_blocking(handler).await {
        Ok((status, body)) => json_response(status, body),
        Err(err) => {
            log::error!("handler task failed: {err}");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Internal error"),
            )
        }
    }
}

fn compose_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COMPOSE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

async fn get_logs(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let key = compose_key(&headers);
    blocking(move || handle_logs_get(&state, key.as_deref())).await
}

async fn post_logs(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let key = compose_key(&headers);
    blocking(move || handle_logs_post(&state, key.as_deref(), &body)).await
}

async fn get_entry(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    blocking(move || handle_entry(&state, &id)).await
}

async fn get_library(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    blocking(move || handle_library(&state, &query)).await
}

async fn get_thread(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    blocking(move || handle_thread(&state, &slug)).await
}

async fn get_cycles(State(state): State<AppState>) -> Response {
    blocking(move || handle_cycles(&state)).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/logs", get(get_logs).post(post_logs))
        .route("/api/entries/:id", get(get_entry))
        .route("/api/library", get(get_library))
        .route("/api/threads/:slug", get(get_thread))
        .route("/api/cycles", get(get_cycles))
        .with_state(state)
}

pub fn run(session: &Session, bind: Option<&str>) -> Result<CommandReport> {
    let bind = bind
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| session.config.server.bind.clone());
    let state = AppState::new(
        Arc::from(session.store()?),
        session.config.compose.write_key.clone(),
        session.paths.clone(),
        load_plans(&session.paths)?,
    );
    if state.write_key.is_none() {
        log::warn!("no write key configured; POST /api/logs will reject every request");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .with_context(|| format!("failed to bind {bind}"))?;
        let local_addr = listener.local_addr()?;
        log::info!("serving journal API on http://{local_addr}/api/logs");
        println!("Serving journal API: http://{local_addr}/api/logs");
        axum::serve(listener, router(state)).await?;
        Ok::<(), anyhow::Error>(())
    })?;

    let mut report = CommandReport::new("serve");
    report.detail(format!("server on {bind} stopped"));
    Ok(report)
}
