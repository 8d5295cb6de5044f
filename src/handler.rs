//! User resource handler.
//!
//! Each operation runs validate → store call → outcome mapping and returns
//! either a success [`Reply`] or an [`ApiError`]. For update and delete the
//! existence check always runs before the body is validated, so a missing
//! user answers 404 even when the body is also malformed.

use crate::envelope::Reply;
use crate::error::ApiError;
use crate::model::User;
use crate::store::{SharedStore, StoreError};
use crate::validate::{parse_body, validate_create, validate_id, validate_update};
use serde_json::Value;

const FETCH_USERS: &str = "Failed to fetch users";
const FETCH_USER: &str = "Failed to fetch user";
const CREATE_USER: &str = "Failed to create user";
const UPDATE_USER: &str = "Failed to update user";
const DELETE_USER: &str = "Failed to delete user";

pub type HandlerResult<T> = Result<Reply<T>, ApiError>;

#[derive(Clone)]
pub struct UserHandler {
    store: SharedStore,
}

impl UserHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// GET /users
    pub async fn list(&self) -> HandlerResult<Vec<User>> {
        let users = self
            .store
            .list()
            .await
            .map_err(|e| storage_error(FETCH_USERS, e))?;
        Ok(Reply::list(users))
    }

    /// GET /users/:id
    pub async fn get(&self, raw_id: &str) -> HandlerResult<User> {
        let id = validate_id(raw_id)?;
        let user = self.require(id, FETCH_USER).await?;
        Ok(Reply::ok(user))
    }

    /// POST /users
    pub async fn create(&self, body: &Value) -> HandlerResult<User> {
        let new_user = validate_create(body)?;
        let user = self
            .store
            .create(new_user)
            .await
            .map_err(|e| map_store_error(CREATE_USER, e))?;

        tracing::info!(id = user.id, "user created");
        Ok(Reply::created("User created successfully", user))
    }

    /// PUT /users/:id
    pub async fn update(&self, raw_id: &str, body: &Value) -> HandlerResult<User> {
        let id = validate_id(raw_id)?;
        let existing = self.require(id, UPDATE_USER).await?;
        self.apply_update(existing, body).await
    }

    /// PUT /users/:id with the body still unparsed.
    ///
    /// Parsing happens after the existence check, so a missing user answers
    /// 404 even when the body is not JSON at all.
    pub async fn update_raw(&self, raw_id: &str, body: &[u8]) -> HandlerResult<User> {
        let id = validate_id(raw_id)?;
        let existing = self.require(id, UPDATE_USER).await?;
        let value = parse_body(body)?;
        self.apply_update(existing, &value).await
    }

    async fn apply_update(&self, existing: User, body: &Value) -> HandlerResult<User> {
        let id = existing.id;
        let patch = validate_update(body)?;
        if patch.is_empty() {
            return Ok(Reply::ok_with_message("User updated successfully", existing));
        }

        let user = self
            .store
            .update(id, patch)
            .await
            .map_err(|e| map_store_error(UPDATE_USER, e))?;

        tracing::info!(id, "user updated");
        Ok(Reply::ok_with_message("User updated successfully", user))
    }

    /// DELETE /users/:id
    pub async fn delete(&self, raw_id: &str) -> HandlerResult<()> {
        let id = validate_id(raw_id)?;
        self.require(id, DELETE_USER).await?;

        self.store
            .delete(id)
            .await
            .map_err(|e| map_store_error(DELETE_USER, e))?;

        tracing::info!(id, "user deleted");
        Ok(Reply::message("User deleted successfully"))
    }

    /// Existence check; storage faults are reported under `context`
    async fn require(&self, id: i64, context: &str) -> Result<User, ApiError> {
        self.store
            .get(id)
            .await
            .map_err(|e| storage_error(context, e))?
            .ok_or(ApiError::NotFound)
    }
}

fn map_store_error(context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::UniqueViolation { field } if field == "email" => ApiError::EmailExists,
        StoreError::NotFound { .. } => ApiError::NotFound,
        other => storage_error(context, other),
    }
}

fn storage_error(context: &str, err: StoreError) -> ApiError {
    tracing::error!(error = %err, "{}", context);
    ApiError::storage(context, err.to_string())
}
