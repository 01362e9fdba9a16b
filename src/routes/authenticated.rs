use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes open to any caller that `auth_middleware` resolved to an existing user. Ownership
/// rules (only the user themself, only the post's author) are checked in the services.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Users ---
        .route("/users", get(handlers::get_users))
        // PATCH/DELETE only succeed on the caller's own record.
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // GET /profile
        // The identity the credential resolved to.
        .route("/profile", get(handlers::get_profile))
        // --- Posts ---
        .route("/posts", get(handlers::get_posts).post(handlers::add_post))
        // DELETE lives in the member tier.
        .route(
            "/posts/{id}",
            get(handlers::get_post).patch(handlers::update_post),
        )
        // --- Organisations ---
        // GET /organisations?name=<prefix>
        .route(
            "/organisations",
            get(handlers::get_organisations).post(handlers::create_organisation),
        )
        .route("/organisations/{id}", get(handlers::get_organisation))
        .route(
            "/organisations/{id}/employees",
            get(handlers::get_employees),
        )
        // POST /organisations/{id}/logo
        // Multipart upload, field `file`, JPEG only.
        .route("/organisations/{id}/logo", post(handlers::upload_logo))
}
