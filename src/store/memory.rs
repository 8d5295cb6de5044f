//! In-process user store.
//!
//! Mirrors the relational backend: ids come from a counter that is never
//! rewound, and non-null emails are unique by exact match.

use super::{StoreError, StoreResult, UserStore};
use crate::model::{NewUser, User, UserPatch};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.as_deref() == Some(email))
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn email_conflict() -> StoreError {
    StoreError::UniqueViolation {
        field: "email".to_string(),
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.lock()?;
        if let Some(email) = &user.email {
            if inner.email_taken(email, None) {
                return Err(email_conflict());
            }
        }

        inner.last_id += 1;
        let created = User {
            id: inner.last_id,
            name: user.name,
            email: user.email,
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        let mut inner = self.lock()?;
        if let Some(Some(email)) = &patch.email {
            if inner.email_taken(email, Some(id)) {
                return Err(email_conflict());
            }
        }

        let user = inner
            .users
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.lock()?
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }
}
