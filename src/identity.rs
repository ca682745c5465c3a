//! Caller identity forwarded by the authenticating gateway, and the
//! ownership/role checks the lifecycle services apply to mutations.

use std::collections::BTreeSet;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::utils::error::AppError;

/// Stable subject of the authenticated caller.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Display username recorded in audit fields; falls back to the subject.
pub const USERNAME_HEADER: &str = "x-username";
/// Comma-separated role list.
pub const ROLES_HEADER: &str = "x-user-roles";

pub const ADMIN_ROLE: &str = "ADMIN";
pub const ORGANIZER_ROLE: &str = "ORGANIZER";
/// Roles allowed to create, update or delete organizers and events.
pub const MANAGING_ROLES: &[&str] = &[ADMIN_ROLE, ORGANIZER_ROLE];
const ROLE_PREFIX: &str = "ROLE_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: String,
    username: String,
    roles: BTreeSet<String>,
}

impl Caller {
    pub fn new<I, R>(user_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let user_id = user_id.into();
        Self {
            username: user_id.clone(),
            user_id,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Identity written to `created_by` / `updated_by`.
    pub fn identity(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Case-insensitive, with or without the `ROLE_` prefix.
    pub fn has_role(&self, wanted: &str) -> bool {
        self.roles
            .iter()
            .any(|role| strip_role_prefix(role).eq_ignore_ascii_case(wanted))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Endpoint-level role gate, checked before any lookup.
    pub fn require_any_role(&self, allowed: &[&str]) -> Result<(), AppError> {
        if allowed.iter().any(|role| self.has_role(role)) {
            Ok(())
        } else {
            tracing::warn!(
                caller = %self.user_id,
                required = ?allowed,
                "Role check failed"
            );
            Err(AppError::Forbidden(
                "Your roles do not allow this operation".to_string(),
            ))
        }
    }

    pub fn owns(&self, owner_id: &str) -> bool {
        !self.user_id.is_empty() && self.user_id == owner_id
    }

    /// Owner-or-admin gate used by every update and delete.
    pub fn authorize_owner(&self, owner_id: &str) -> Result<(), AppError> {
        if self.owns(owner_id) || self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(
                caller = %self.user_id,
                owner = %owner_id,
                "Ownership check failed"
            );
            Err(AppError::Forbidden(
                "You are not allowed to modify this resource".to_string(),
            ))
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = header_str(headers, USER_ID_HEADER).ok_or_else(|| {
            AppError::AuthenticationRequired("No authenticated caller on the request".to_string())
        })?;

        let roles: Vec<String> = header_str(headers, ROLES_HEADER)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let caller = Caller::new(user_id, roles);
        Ok(match header_str(headers, USERNAME_HEADER) {
            Some(username) => caller.with_username(username),
            None => caller,
        })
    }
}

fn strip_role_prefix(role: &str) -> &str {
    match role.get(..ROLE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ROLE_PREFIX) => &role[ROLE_PREFIX.len()..],
        _ => role,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_headers(&parts.headers)
    }
}
