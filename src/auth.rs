use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::{
    dto::UserDto,
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
};

const INVALID_HEADER: &str = "Invalid authorization header";
const INVALID_USER_ID: &str = "Invalid user ID in the token";
const UNKNOWN_USER: &str = "User not found";

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers take it as an argument to learn
/// who is acting; the role guard reads it from the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

impl From<AuthUser> for UserDto {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            posts: None,
        }
    }
}

/// parse_basic_user_id
///
/// Decodes `Basic <base64>` where the payload is a bare numeric user id (not `user:password`).
/// Missing prefix, bad base64, non-UTF-8 bytes and non-integer payloads are all `Unauthorized`.
pub fn parse_basic_user_id(value: &str) -> Result<i32, AppError> {
    let token = value
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::unauthorized(INVALID_HEADER))?;

    let decoded = BASE64
        .decode(token.trim())
        .map_err(|_| AppError::unauthorized(INVALID_USER_ID))?;

    let text = String::from_utf8(decoded).map_err(|_| AppError::unauthorized(INVALID_USER_ID))?;

    text.trim()
        .parse::<i32>()
        .map_err(|_| AppError::unauthorized(INVALID_USER_ID))
}

/// Builds the `Authorization` header value that identifies `user_id`.
pub fn basic_header_for(user_id: i32) -> String {
    format!("Basic {}", BASE64.encode(user_id.to_string()))
}

/// AuthUser Extractor Implementation
///
/// 1. Reuse: an identity already attached by `auth_middleware` is returned as-is.
/// 2. Header: read `Authorization` and decode the user id.
/// 3. Lookup: the id must resolve to an existing user, whose current role is loaded.
///
/// Rejection: `AppError::Unauthorized` (401) for any credential problem; a failing store
/// surfaces as `AppError::Database` (500).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(INVALID_HEADER))?;

        let user_id = parse_basic_user_id(header_value)?;

        let repo = RepositoryState::from_ref(state);
        let user = repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(UNKNOWN_USER))?;

        tracing::debug!(user_id = user.id, role = %user.role, "request authenticated");
        Ok(AuthUser::from(user))
    }
}

/// auth_middleware
///
/// Resolves the caller before any protected handler runs and attaches the identity to the
/// request, so the role guard and the handlers all see the same `AuthUser`.
/// Extraction failure short-circuits with 401.
pub async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}
