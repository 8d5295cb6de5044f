//! SQLite-backed user store using sqlx.

use super::{StoreError, StoreResult, UserStore};
use crate::model::{NewUser, User, UserPatch};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL,
    email TEXT UNIQUE
)"#;

pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Connect to `url` and make sure the `users` table exists.
    ///
    /// In-memory databases live only as long as their connection, so those
    /// get a single connection that is never recycled.
    pub async fn connect(url: &str) -> StoreResult<Arc<Self>> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend)?
            .create_if_missing(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(backend)?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool
    pub async fn with_pool(pool: SqlitePool) -> StoreResult<Arc<Self>> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(map_err)?;
        tracing::debug!("users table ready");
        Ok(Arc::new(Self { pool }))
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Translate sqlx errors, surfacing unique violations explicitly.
fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation {
                field: violated_field(db.message()),
            };
        }
    }
    backend(err)
}

// SQLite reports "UNIQUE constraint failed: users.email".
fn violated_field(message: &str) -> String {
    message
        .rsplit_once('.')
        .map(|(_, field)| field.trim().to_string())
        .unwrap_or_else(|| "email".to_string())
}

#[async_trait::async_trait]
impl UserStore for SqliteUserStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES (?, ?) RETURNING id, name, email",
        )
        .bind(user.name)
        .bind(user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        let set_email = patch.email.is_some();
        let email = patch.email.flatten();

        sqlx::query_as::<_, User>(
            "UPDATE users SET \
                name = COALESCE(?, name), \
                email = CASE WHEN ? THEN ? ELSE email END \
             WHERE id = ? \
             RETURNING id, name, email",
        )
        .bind(patch.name)
        .bind(set_email)
        .bind(email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?
        .ok_or(StoreError::NotFound { id })
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Arc<SqliteUserStore> {
        SqliteUserStore::connect("sqlite::memory:").await.unwrap()
    }

    fn new_user(name: &str, email: Option<&str>) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_violated_field() {
        assert_eq!(
            violated_field("UNIQUE constraint failed: users.email"),
            "email"
        );
        assert_eq!(violated_field("UNIQUE constraint failed"), "email");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = store().await;
        let created = store.create(new_user("Ann", None)).await.unwrap();
        assert_eq!(created.name, "Ann");
        assert!(created.email.is_none());

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_unique_email_is_reported() {
        let store = store().await;
        store.create(new_user("Bo", Some("x@y.com"))).await.unwrap();

        let err = store
            .create(new_user("Bo", Some("x@y.com")))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                field: "email".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_reported() {
        let store = store().await;
        store.create(new_user("A", Some("a@x.io"))).await.unwrap();
        let b = store.create(new_user("B", Some("b@x.io"))).await.unwrap();

        let err = store
            .update(
                b.id,
                UserPatch {
                    name: Some("Bee".to_string()),
                    email: Some(Some("a@x.io".to_string())),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                field: "email".to_string()
            }
        );

        // the failed write leaves the row untouched
        let unchanged = store.get(b.id).await.unwrap().unwrap();
        assert_eq!(unchanged, b);
    }

    #[tokio::test]
    async fn test_null_emails_do_not_conflict() {
        let store = store().await;
        store.create(new_user("A", None)).await.unwrap();
        store.create(new_user("B", None)).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = store().await;
        let user = store.create(new_user("Ann", Some("a@b.c"))).await.unwrap();

        let renamed = store
            .update(
                user.id,
                UserPatch {
                    name: Some("Anna".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Anna");
        assert_eq!(renamed.email.as_deref(), Some("a@b.c"));

        let cleared = store
            .update(
                user.id,
                UserPatch {
                    name: None,
                    email: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.name, "Anna");
        assert!(cleared.email.is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = store().await;
        assert_eq!(
            store.update(42, UserPatch::default()).await.unwrap_err(),
            StoreError::NotFound { id: 42 }
        );
        assert_eq!(
            store.delete(42).await.unwrap_err(),
            StoreError::NotFound { id: 42 }
        );
    }

    #[tokio::test]
    async fn test_delete_then_ids_keep_growing() {
        let store = store().await;
        let a = store.create(new_user("A", None)).await.unwrap();
        store.delete(a.id).await.unwrap();
        assert!(store.get(a.id).await.unwrap().is_none());

        let b = store.create(new_user("B", None)).await.unwrap();
        assert!(b.id > a.id);
    }
}
