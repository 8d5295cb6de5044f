//! Persistence gateway for users.
//!
//! The handler only sees [`UserStore`]. Each backend is responsible for id
//! assignment, email uniqueness and single-write atomicity, and reports a
//! uniqueness conflict explicitly through [`StoreError::UniqueViolation`]
//! instead of leaking engine-specific error codes.

pub mod memory;
pub mod sqlite;

use crate::model::{NewUser, User, UserPatch};
use std::sync::Arc;

pub use memory::MemoryUserStore;
pub use sqlite::SqliteUserStore;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("unique constraint violated on field '{field}'")]
    UniqueViolation { field: String },
    /// The write targeted a row that does not exist
    #[error("no user with id {id}")]
    NotFound { id: i64 },
    /// Any other backend fault
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// All users ordered by ascending id
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Look up one user
    async fn get(&self, id: i64) -> StoreResult<Option<User>>;

    /// Insert a user; the store assigns the id
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Apply a partial patch and return the updated row
    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<User>;

    /// Hard delete
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Release backend resources on shutdown
    async fn close(&self) {}
}

/// Shared handle passed to the handler and the router state
pub type SharedStore = Arc<dyn UserStore>;
