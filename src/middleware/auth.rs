use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    session::{CurrentUser, Role, SessionContext},
    state::AppState,
};

/// Claims of the bearer tokens issued by the park backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    pub role: String,
    pub exp: usize,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

pub fn parse_role(role: &str) -> Option<Role> {
    let role = role.trim();
    let role = role.strip_prefix("ROLE_").unwrap_or(role);
    match role.to_ascii_uppercase().as_str() {
        "USER" => Some(Role::User),
        "ADMIN" => Some(Role::Admin),
        "MEMBER" => Some(Role::Member),
        _ => None,
    }
}

pub fn session_from_token(token: &str, secret: &str) -> Result<SessionContext, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let claims = decoded.claims;
    let subject = claims.sub.trim();
    if subject.is_empty() {
        return Err(AppError::Unauthorized("Missing subject in token".into()));
    }
    let role = parse_role(&claims.role)
        .ok_or_else(|| AppError::Unauthorized("Unknown role in token".into()))?;

    let mut user = CurrentUser::new(subject, role);
    if let Some(id) = claims.user_id.or_else(|| subject.parse().ok()) {
        user = user.with_id(id);
    }
    Ok(SessionContext::authenticated(user, token))
}

/// No `Authorization` header yields an anonymous session; a bad one is rejected.
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(SessionContext::anonymous());
        };

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        };

        session_from_token(token.trim(), &state.jwt_secret)
    }
}

/// A session that is known to belong to a signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: CurrentUser,
    pub session: SessionContext,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = SessionContext::from_request_parts(parts, state).await?;
        let user = session
            .current_user()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        Ok(AuthUser { user, session })
    }
}
