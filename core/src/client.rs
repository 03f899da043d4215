//! Stateless request builder and response parser for the todo RPC surface.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each remote procedure is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies. Procedures live
//! under `/rpc/<name>`: the query (`getTodos`) is a GET, mutations are POSTs
//! with JSON bodies.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, DeleteResult, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo RPC surface.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

/// Body for the id-only mutations (`toggleTodo`, `deleteTodo`).
#[derive(Serialize)]
struct IdRequest {
    id: i64,
}

/// Body for `updateTodo`: the target id plus the flattened patch.
#[derive(Serialize)]
struct UpdateRequest<'a> {
    id: i64,
    #[serde(flatten)]
    patch: &'a UpdateTodo,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn query(&self, procedure: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/rpc/{procedure}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn mutation<T: Serialize>(&self, procedure: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/rpc/{procedure}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_get_todos(&self) -> HttpRequest {
        self.query("getTodos")
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.mutation("createTodo", input)
    }

    pub fn build_update_todo(&self, id: i64, patch: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.mutation("updateTodo", &UpdateRequest { id, patch })
    }

    pub fn build_toggle_todo(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.mutation("toggleTodo", &IdRequest { id })
    }

    pub fn build_delete_todo(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.mutation("deleteTodo", &IdRequest { id })
    }

    pub fn parse_get_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<DeleteResult, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::InvalidInput(error_message(&response.body))),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Pull the `error` field out of a JSON error body, falling back to the raw
/// text when the body is not in that shape.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
