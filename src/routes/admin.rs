use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, patch, post},
};

/// Admin Router Module
///
/// Routes exclusively accessible to users with the Admin role. The whole router is wrapped in
/// `role_guard` with `RequiredRoles::ADMIN`, which answers 403 for anyone else.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /users
        // Registers a user with an explicit role.
        .route("/users", post(handlers::create_user))
        .route(
            "/organisations/{id}",
            patch(handlers::update_organisation).delete(handlers::delete_organisation),
        )
        // POST /organisations/{id}/employees?userId=<id>
        .route(
            "/organisations/{id}/employees",
            post(handlers::add_employee),
        )
        .route(
            "/organisations/{id}/employees/{userId}",
            delete(handlers::delete_employee),
        )
}
