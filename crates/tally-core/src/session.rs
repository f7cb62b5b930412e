//! The signed-in user, passed explicitly to every workflow operation.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn member(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Member)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless a user is signed in.
    pub fn require_user(&self) -> Result<&str, WorkflowError> {
        if self.user_id.trim().is_empty() {
            return Err(WorkflowError::Unauthorized);
        }
        Ok(&self.user_id)
    }

    /// Fail unless the user is an admin. `action` names the operation in the error.
    pub fn require_admin(&self, action: &'static str) -> Result<&str, WorkflowError> {
        let user_id = self.require_user()?;
        if !self.is_admin() {
            return Err(WorkflowError::Forbidden(action));
        }
        Ok(user_id)
    }
}
