use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{auth::AuthUser, error::AppError, models::Role};

/// RequiredRoles
///
/// The role set a group of routes declares. An empty set means "authenticated is enough".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredRoles(pub &'static [Role]);

impl RequiredRoles {
    pub const ANY: Self = Self(&[]);
    pub const ADMIN: Self = Self(&[Role::Admin]);
    pub const ADMIN_OR_MEMBER: Self = Self(&[Role::Admin, Role::Member]);

    pub fn permits(&self, role: Role) -> bool {
        self.0.is_empty() || self.0.contains(&role)
    }
}

/// role_guard
///
/// Runs after `auth_middleware` (it is installed as an inner `route_layer`) and compares the
/// attached identity's role against the declared set.
pub async fn role_guard(
    State(required): State<RequiredRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header"))?;

    if !required.permits(user.role) {
        tracing::warn!(user_id = user.id, role = %user.role, "role check denied");
        return Err(AppError::forbidden("Forbidden resource"));
    }

    Ok(next.run(request).await)
}
