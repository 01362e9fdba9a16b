//! Business rules between the HTTP handlers and the repository.
//!
//! Every mutating operation looks the target up first (404 when absent), applies the
//! ownership rule of its resource, and then issues a single repository call.

pub mod organisations;
pub mod posts;
pub mod users;

pub use organisations::{LogoUpload, OrganisationService};
pub use posts::PostService;
pub use users::UserService;

use crate::{error::AppError, validation::ValidationErrors};

/// Ownership rule shared by users and posts: only the owner may act.
pub(crate) fn ensure_owner(owner_id: i32, actor_id: i32, action: &str) -> Result<(), AppError> {
    if owner_id == actor_id {
        Ok(())
    } else {
        Err(AppError::unauthorized(format!(
            "You are not authorized to {action}"
        )))
    }
}

/// Turns a unique-constraint violation on `users.email` into a 400 instead of a 500.
pub(crate) fn map_email_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let mut errors = ValidationErrors::new();
            errors.add("email", "email is already in use");
            AppError::Validation(errors)
        }
        _ => AppError::Database(err),
    }
}
