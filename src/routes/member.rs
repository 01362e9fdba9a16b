use crate::{AppState, handlers};
use axum::{Router, routing::delete};

/// Member Router Module
///
/// Routes that declare the Admin and Member roles. Wrapped in `role_guard` with
/// `RequiredRoles::ADMIN_OR_MEMBER`; the author-or-Admin rule is then applied by `PostService`.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        // DELETE /posts/{id}
        .route("/posts/{id}", delete(handlers::delete_post))
}
