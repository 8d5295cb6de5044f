//! User model.

use serde::{Deserialize, Serialize};

/// Represents a user in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user identifier, assigned by the store
    pub id: i64,
    /// Display name, never empty after trimming
    pub name: String,
    /// Email address, unique when set
    pub email: Option<String>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
}

/// Partial update. Fields left as `None` are not touched.
///
/// `email` is doubly optional: `Some(None)` clears the stored address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
}

impl UserPatch {
    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Apply the patch to a user in place
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        User {
            id: 1,
            name: "Ann".to_string(),
            email: Some("ann@example.com".to_string()),
        }
    }

    #[test]
    fn test_user_json_shape() {
        let user = User {
            id: 7,
            name: "Bo".to_string(),
            email: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 7, "name": "Bo", "email": null})
        );
    }

    #[test]
    fn test_patch_name_only_keeps_email() {
        let mut user = ann();
        let patch = UserPatch {
            name: Some("Annie".to_string()),
            email: None,
        };
        patch.apply(&mut user);
        assert_eq!(user.name, "Annie");
        assert_eq!(user.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn test_patch_clears_email() {
        let mut user = ann();
        let patch = UserPatch {
            name: None,
            email: Some(None),
        };
        patch.apply(&mut user);
        assert_eq!(user.name, "Ann");
        assert!(user.email.is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(UserPatch::default().is_empty());
    }
}
