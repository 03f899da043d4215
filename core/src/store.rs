//! Client-side state store mirroring the server's todo list.
//!
//! # Design
//! `TodoStore` drives `TodoClient` through a host-supplied [`Transport`], so
//! the store itself stays free of I/O. Each action sends one request and
//! reconciles local state with the server's response. When `offline_demo` is
//! enabled the store absorbs failures and fabricates the equivalent local
//! change instead; client and server state can then silently diverge, which
//! makes the mode a demo affordance rather than a correctness mechanism.
//! With the flag off (the default), every failure propagates to the caller
//! and local state is left untouched.

use std::fmt;

use chrono::{Duration, Utc};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo};

/// Executes an `HttpRequest` built by the core and returns the raw response.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport-level failure: the request never completed (connection refused,
/// timeout, interrupted body).
#[derive(Debug)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Errors surfaced by `TodoStore` when offline fallback is disabled.
#[derive(Debug)]
pub enum StoreError {
    /// The request never completed.
    Transport(TransportError),

    /// The server answered with an error.
    Api(ApiError),

    /// The title was empty after trimming; no request was sent.
    EmptyTitle,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport(err) => write!(f, "{err}"),
            StoreError::Api(err) => write!(f, "{err}"),
            StoreError::EmptyTitle => write!(f, "title must not be empty"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Aggregate counts for the presentation layer's stats row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
}

/// In-memory mirror of the last known server state.
///
/// The held list is a disposable cache: rebuilt on [`load`](Self::load) and
/// patched on each local action.
pub struct TodoStore<T: Transport> {
    client: TodoClient,
    transport: T,
    todos: Vec<Todo>,
    is_loading: bool,
    is_creating: bool,
    offline_demo: bool,
}

impl<T: Transport> TodoStore<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self {
            client,
            transport,
            todos: Vec::new(),
            is_loading: false,
            is_creating: false,
            offline_demo: false,
        }
    }

    /// Absorb request failures and fabricate the local state change instead
    /// of surfacing an error. Client and server state can silently diverge
    /// while this is on; keep it for demos and offline use only.
    pub fn with_offline_demo(mut self, enabled: bool) -> Self {
        self.offline_demo = enabled;
        self
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_creating(&self) -> bool {
        self.is_creating
    }

    pub fn stats(&self) -> TodoStats {
        TodoStats {
            total: self.todos.len(),
            completed: self.todos.iter().filter(|t| t.completed).count(),
        }
    }

    /// Replace local state with the server's full list. On failure in
    /// offline-demo mode the fixed demo list is substituted so the view is
    /// not left empty.
    pub fn load(&mut self) -> Result<(), StoreError> {
        self.is_loading = true;
        let result = self.fetch_todos();
        self.is_loading = false;
        match result {
            Ok(todos) => {
                self.todos = todos;
                Ok(())
            }
            Err(_) if self.offline_demo => {
                self.todos = demo_todos();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Create a todo and prepend the persisted row. The empty-title check
    /// runs locally before any request is sent.
    pub fn create(&mut self, input: CreateTodo) -> Result<&Todo, StoreError> {
        if input.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        self.is_creating = true;
        let result = self.send_create(&input);
        self.is_creating = false;
        let todo = match result {
            Ok(todo) => todo,
            Err(_) if self.offline_demo => self.fabricate_create(input),
            Err(err) => return Err(err),
        };
        self.todos.insert(0, todo);
        Ok(&self.todos[0])
    }

    /// Flip completion for `id`, replacing the local row with the server's
    /// result on success.
    pub fn toggle(&mut self, id: i64) -> Result<(), StoreError> {
        match self.send_toggle(id) {
            Ok(todo) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    *slot = todo;
                }
                Ok(())
            }
            Err(_) if self.offline_demo => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    slot.completed = !slot.completed;
                    slot.updated_at = Utc::now();
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Delete `id` remotely and drop the local row.
    pub fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        match self.send_delete(id) {
            // success=false still means no such row exists server-side, so
            // dropping it locally is the correct reconciliation either way.
            Ok(_) => {
                self.todos.retain(|t| t.id != id);
                Ok(())
            }
            Err(_) if self.offline_demo => {
                self.todos.retain(|t| t.id != id);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn fetch_todos(&self) -> Result<Vec<Todo>, StoreError> {
        let request = self.client.build_get_todos();
        let response = self.transport.execute(request).map_err(StoreError::Transport)?;
        self.client.parse_get_todos(response).map_err(StoreError::Api)
    }

    fn send_create(&self, input: &CreateTodo) -> Result<Todo, StoreError> {
        let request = self.client.build_create_todo(input).map_err(StoreError::Api)?;
        let response = self.transport.execute(request).map_err(StoreError::Transport)?;
        self.client.parse_create_todo(response).map_err(StoreError::Api)
    }

    fn send_toggle(&self, id: i64) -> Result<Todo, StoreError> {
        let request = self.client.build_toggle_todo(id).map_err(StoreError::Api)?;
        let response = self.transport.execute(request).map_err(StoreError::Transport)?;
        self.client.parse_toggle_todo(response).map_err(StoreError::Api)
    }

    fn send_delete(&self, id: i64) -> Result<(), StoreError> {
        let request = self.client.build_delete_todo(id).map_err(StoreError::Api)?;
        let response = self.transport.execute(request).map_err(StoreError::Transport)?;
        self.client.parse_delete_todo(response).map_err(StoreError::Api)?;
        Ok(())
    }

    /// Locally fabricated equivalent of a successful create: next id after
    /// the local maximum, not completed, both timestamps now.
    fn fabricate_create(&self, input: CreateTodo) -> Todo {
        let id = self.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        Todo {
            id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fixed list shown when a load fails in offline-demo mode.
fn demo_todos() -> Vec<Todo> {
    let now = Utc::now();
    vec![
        Todo {
            id: 1,
            title: "Complete the todo app".to_string(),
            description: Some("Build a working todo application end to end".to_string()),
            completed: false,
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
        },
        Todo {
            id: 2,
            title: "Read the documentation".to_string(),
            description: Some("Go through the client and server crate docs".to_string()),
            completed: true,
            created_at: now - Duration::days(1),
            updated_at: now - Duration::hours(20),
        },
        Todo {
            id: 3,
            title: "Deploy the application".to_string(),
            description: None,
            completed: false,
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(2),
        },
    ]
}
