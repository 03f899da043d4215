//! RPC router exposing the storage handlers as named remote procedures.
//!
//! # Design
//! A query/mutation surface over plain HTTP+JSON: the single query
//! (`getTodos`) is a GET, every mutation is a POST, and each procedure has a
//! schema-validated input and output type. Handlers hold no state between
//! calls; the shared `Db` mutex serializes access to the single SQLite
//! connection. Store errors map onto HTTP statuses (400 validation, 404
//! missing id, 500 storage) with a `{"error": "..."}` body.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::store::{CreateTodoInput, SqliteStore, StoreError, Todo, UpdateTodoInput};

pub type Db = Arc<Mutex<SqliteStore>>;

/// Input for `toggleTodo` and `deleteTodo`.
#[derive(Debug, Deserialize)]
pub struct TodoIdInput {
    pub id: i64,
}

/// Acknowledgement returned by `deleteTodo`. `success` is `false` when no
/// matching row existed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    pub success: bool,
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/rpc/getTodos", get(get_todos))
        .route("/rpc/createTodo", post(create_todo))
        .route("/rpc/updateTodo", post(update_todo))
        .route("/rpc/toggleTodo", post(toggle_todo))
        .route("/rpc/deleteTodo", post(delete_todo))
        .with_state(db)
}

struct RpcError(StoreError);

impl From<StoreError> for RpcError {
    fn from(value: StoreError) -> Self {
        Self(value)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Sql(err) => {
                tracing::error!(error = %err, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn get_todos(State(db): State<Db>) -> Result<Json<Vec<Todo>>, RpcError> {
    let todos = db.lock().await.list()?;
    Ok(Json(todos))
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodoInput>,
) -> Result<(StatusCode, Json<Todo>), RpcError> {
    let todo = db.lock().await.create(input)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Json(input): Json<UpdateTodoInput>,
) -> Result<Json<Todo>, RpcError> {
    let todo = db.lock().await.update(input)?;
    Ok(Json(todo))
}

async fn toggle_todo(
    State(db): State<Db>,
    Json(input): Json<TodoIdInput>,
) -> Result<Json<Todo>, RpcError> {
    let todo = db.lock().await.toggle(input.id)?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(db): State<Db>,
    Json(input): Json<TodoIdInput>,
) -> Result<Json<DeleteResult>, RpcError> {
    let success = db.lock().await.delete(input.id)?;
    Ok(Json(DeleteResult { success }))
}
