use crate::{
    dto::{CreateUserRequest, UpdateUserRequest, UserDto},
    error::AppError,
    repository::RepositoryState,
};

use super::{ensure_owner, map_email_conflict};

const USER_NOT_FOUND: &str = "User not found";

/// UserService
///
/// User listing, lookup and self-service. A user may only change or delete their own record.
#[derive(Clone)]
pub struct UserService {
    repo: RepositoryState,
}

impl UserService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn list_users(&self) -> Result<Vec<UserDto>, AppError> {
        let users = self.repo.get_users().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    /// Single user, with the posts they authored.
    pub async fn get_user(&self, id: i32) -> Result<UserDto, AppError> {
        let user = self
            .repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
        let posts = self.repo.get_posts_by_author(user.id).await?;
        Ok(UserDto::with_posts(user, posts))
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<UserDto, AppError> {
        let user = self
            .repo
            .create_user(req.into())
            .await
            .map_err(map_email_conflict)?;
        tracing::info!(user_id = user.id, role = %user.role, "user created");
        Ok(UserDto::from(user))
    }

    pub async fn update_user(
        &self,
        id: i32,
        req: UpdateUserRequest,
        actor_id: i32,
    ) -> Result<UserDto, AppError> {
        let existing = self
            .repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        ensure_owner(existing.id, actor_id, "update this user")?;

        let updated = self
            .repo
            .update_user(id, req.into())
            .await
            .map_err(map_email_conflict)?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        Ok(UserDto::from(updated))
    }

    pub async fn delete_user(&self, id: i32, actor_id: i32) -> Result<(), AppError> {
        let existing = self
            .repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        ensure_owner(existing.id, actor_id, "delete this user")?;

        if !self.repo.delete_user(id).await? {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }
}
