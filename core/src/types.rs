//! Domain DTOs for the todo RPC surface.
//!
//! # Design
//! These types mirror the server's schema but are defined independently;
//! integration tests catch any drift between the two crates. `UpdateTodo`
//! uses a double `Option` for `description` so that "field absent" (leave
//! the stored value alone) and "field present but null" (clear it) survive
//! serialization as distinct shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for `createTodo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial-update payload for `updateTodo`. Only the fields present in the
/// JSON are applied; omitted fields remain unchanged on the server. An outer
/// `Some(None)` on `description` serializes as an explicit `null`, which
/// clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Acknowledgement returned by `deleteTodo`. `success` is `false` when no
/// row with the requested id existed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    pub success: bool,
}

/// Deserialize a present-but-possibly-null field as `Some(inner)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
