//! SQLite-backed todo service exposing CRUD handlers as named RPC
//! procedures.
//!
//! # Overview
//! One relational table holds the todo rows; each handler in [`store`]
//! performs a single statement against it, and [`rpc`] exposes those
//! handlers as schema-validated remote procedures under `/rpc/*`.
//!
//! # Design
//! - Handlers hold no state between calls; the table exclusively owns row
//!   lifetime.
//! - Read-modify-write operations (notably toggle) execute as one atomic
//!   statement, delegated to SQLite.
//! - Failures surface directly to the caller; there are no retries and no
//!   silent swallowing on the server.

pub mod rpc;
pub mod store;

pub use rpc::{router, Db, DeleteResult, TodoIdInput};
pub use store::{CreateTodoInput, SqliteStore, StoreError, Todo, UpdateTodoInput};

use std::sync::Arc;

use tokio::{net::TcpListener, sync::Mutex};

pub fn app(store: SqliteStore) -> axum::Router {
    rpc::router(Arc::new(Mutex::new(store)))
}

pub async fn run(listener: TcpListener, store: SqliteStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}
