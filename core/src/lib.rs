//! Synchronous RPC client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! server's named procedures without touching the network (host-does-IO
//! pattern). The caller executes the actual HTTP round-trip, making the core
//! fully deterministic and testable.
//!
//! # Design
//! - `TodoClient` is stateless — it holds only `base_url`.
//! - Each remote procedure is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `TodoStore` layers client-side state on top through the `Transport`
//!   seam: it mirrors the server's list, and can optionally fabricate local
//!   changes when requests fail (offline-demo mode).
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{StoreError, TodoStats, TodoStore, Transport, TransportError};
pub use types::{CreateTodo, DeleteResult, Todo, UpdateTodo};
