use crate::{
    auth::AuthUser,
    dto::{AddPostRequest, PostDto, UpdatePostRequest},
    error::AppError,
    models::PostChanges,
    repository::RepositoryState,
};

use super::ensure_owner;

const POST_NOT_FOUND: &str = "Post not found";

/// PostService
///
/// Posts can be read by anyone authenticated, changed only by their author, and deleted by
/// their author or an Admin.
#[derive(Clone)]
pub struct PostService {
    repo: RepositoryState,
}

impl PostService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// Single post, embedding the author's name.
    pub async fn get_post(&self, id: i32) -> Result<PostDto, AppError> {
        self.repo
            .get_post_with_author(id)
            .await?
            .map(PostDto::from)
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))
    }

    pub async fn list_posts(&self) -> Result<Vec<PostDto>, AppError> {
        let posts = self.repo.get_posts().await?;
        Ok(posts.into_iter().map(PostDto::from).collect())
    }

    /// The author is always the caller, never taken from the body.
    pub async fn add_post(&self, req: AddPostRequest, actor: &AuthUser) -> Result<PostDto, AppError> {
        let post = self.repo.create_post(req.into_new_post(actor.id)).await?;
        tracing::info!(post_id = post.id, author_id = actor.id, "post created");
        Ok(PostDto::from(post))
    }

    pub async fn update_post(
        &self,
        id: i32,
        req: UpdatePostRequest,
        actor_id: i32,
    ) -> Result<PostDto, AppError> {
        let existing = self
            .repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;

        ensure_owner(existing.author_id, actor_id, "update this post")?;

        let changes = PostChanges::from(req);
        if changes.is_empty() {
            return Ok(PostDto::from(existing));
        }

        self.repo
            .update_post(id, changes)
            .await?
            .map(PostDto::from)
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))
    }

    pub async fn delete_post(&self, id: i32, actor: &AuthUser) -> Result<(), AppError> {
        let existing = self
            .repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))?;

        // Admins may delete any post.
        if !actor.is_admin() {
            ensure_owner(existing.author_id, actor.id, "delete this post")?;
        }

        if !self.repo.delete_post(id).await? {
            return Err(AppError::not_found(POST_NOT_FOUND));
        }
        tracing::info!(post_id = id, actor_id = actor.id, "post deleted");
        Ok(())
    }
}
