//! HTTP JSON API over a [`JsonFileStore`].
//!
//! | Route                | Result                                   |
//! |----------------------|------------------------------------------|
//! | `GET /`              | plain-text health string                 |
//! | `GET /tasks`         | every stored record                      |
//! | `POST /tasks`        | the created record with its generated id |
//! | `PATCH /tasks/{id}`  | the merged record, or an empty 404       |
//! | `DELETE /tasks/{id}` | empty 204, whether or not the id existed |
//!
//! Requests are serialized through one mutex around the store. Store calls
//! do blocking file I/O, so they run on tokio's blocking pool.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};

use anyhow::Context;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use kanban::model::{Record, TaskId};
use kanban::store::{JsonFileStore, StoreError, TaskStore};

pub const HEALTH_TEXT: &str = "✅ JSON API is running. Try your tasks";

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<JsonFileStore>>,
}

impl AppState {
    pub fn new(store: JsonFileStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` against the store on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut JsonFileStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|_| ApiError::Internal("store lock poisoned".into()))?;
            f(&mut guard).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
    }
}

/// Socket address for `bind` (IPv4 or IPv6 literal) and `port`.
pub fn listen_addr(bind: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{bind}'"))?;
    Ok(SocketAddr::new(ip, port))
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    NotFound,
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Internal(msg) => {
                log::error!("request failed: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn into_record(body: Value) -> Result<Record, ApiError> {
    match body {
        Value::Object(record) => Ok(record),
        _ => Err(ApiError::BadRequest("request body must be a JSON object")),
    }
}

pub async fn health() -> &'static str {
    HEALTH_TEXT
}

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    let tasks = state.with_store(|store| Ok(store.list_tasks())).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Record>, ApiError> {
    let fields = into_record(body)?;
    let record = state.with_store(move |store| store.create_task(fields)).await?;
    Ok(Json(record))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Record>, ApiError> {
    let partial = into_record(body)?;
    let id = TaskId::new(id);
    let record = state
        .with_store(move |store| store.update_task(&id, partial))
        .await?;
    Ok(Json(record))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TaskId::new(id);
    state.with_store(move |store| store.delete_task(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
