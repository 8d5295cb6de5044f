//! users-api - HTTP CRUD service for a single user resource
//!
//! This library provides the handler, validation, storage backends and
//! router used by the `users-api` binary.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod model;
pub mod server;
pub mod store;
pub mod validate;

// Re-export Args for the binary
pub use config::Args;
