//! Identity of the caller, passed explicitly to everything that needs it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
    Member,
}

/// The token subject is the account email; a numeric id is only known when
/// the token carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub subject: String,
    pub id: Option<i64>,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            id: None,
            role,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// The signed-in user (if any) and the bearer token to forward upstream.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Option<CurrentUser>,
    token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: CurrentUser, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
