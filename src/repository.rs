use crate::models::{
    NewOrganisation, NewPost, NewUser, Organisation, OrganisationChanges, OrganisationSummary,
    Post, PostChanges, PostWithAuthor, User, UserChanges,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Result of every persistence call. Absent rows are `Ok(None)` / `Ok(false)`;
/// `Err` is reserved for failures of the store itself.
pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so services can be
/// exercised against an in-memory implementation in tests and against Postgres in production.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_users(&self) -> RepoResult<Vec<User>>;
    async fn get_user(&self, id: i32) -> RepoResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    // Uses COALESCE: `None` fields keep their stored value.
    async fn update_user(&self, id: i32, changes: UserChanges) -> RepoResult<Option<User>>;
    async fn delete_user(&self, id: i32) -> RepoResult<bool>;

    // --- Posts ---
    async fn get_posts(&self) -> RepoResult<Vec<Post>>;
    async fn get_posts_by_author(&self, author_id: i32) -> RepoResult<Vec<Post>>;
    async fn get_post(&self, id: i32) -> RepoResult<Option<Post>>;
    async fn get_post_with_author(&self, id: i32) -> RepoResult<Option<PostWithAuthor>>;
    async fn create_post(&self, post: NewPost) -> RepoResult<Post>;
    async fn update_post(&self, id: i32, changes: PostChanges) -> RepoResult<Option<Post>>;
    async fn delete_post(&self, id: i32) -> RepoResult<bool>;

    // --- Organisations ---
    // Optional name prefix filter; every row carries its employee count.
    async fn get_organisations(&self, name_prefix: Option<String>)
    -> RepoResult<Vec<OrganisationSummary>>;
    async fn get_organisation(&self, id: i32) -> RepoResult<Option<Organisation>>;
    async fn create_organisation(&self, organisation: NewOrganisation) -> RepoResult<Organisation>;
    async fn update_organisation(
        &self,
        id: i32,
        changes: OrganisationChanges,
    ) -> RepoResult<Option<Organisation>>;
    async fn delete_organisation(&self, id: i32) -> RepoResult<bool>;
    async fn set_logo_id(&self, id: i32, logo_id: i32) -> RepoResult<Option<Organisation>>;
    async fn logo_id_in_use(&self, logo_id: i32) -> RepoResult<bool>;

    // --- Membership ---
    async fn get_employees(&self, organisation_id: i32) -> RepoResult<Vec<User>>;
    // Idempotent: re-adding a current employee still reports the user row as matched.
    async fn add_employee(&self, organisation_id: i32, user_id: i32) -> RepoResult<bool>;
    // Returns false when the user is not an employee of this organisation.
    async fn remove_employee(&self, organisation_id: i32, user_id: i32) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = "id, name, email, role, organisation_id";
const POST_COLUMNS: &str = "id, title, content, author_id";
const ORGANISATION_COLUMNS: &str = "id, name, logo_id";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are checked at runtime so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_users(&self) -> RepoResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
    }

    async fn get_user(&self, id: i32) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, role) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_user(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_posts(&self) -> RepoResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id"))
            .fetch_all(&self.pool)
            .await
    }

    async fn get_posts_by_author(&self, author_id: i32) -> RepoResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 ORDER BY id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_post(&self, id: i32) -> RepoResult<Option<Post>> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_post_with_author(&self, id: i32) -> RepoResult<Option<PostWithAuthor>> {
        sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.id, p.title, p.content, p.author_id, u.name AS author_name
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_post(&self, post: NewPost) -> RepoResult<Post> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (title, content, author_id) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.title)
        .bind(post.content)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_post(&self, id: i32, changes: PostChanges) -> RepoResult<Option<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_organisations(
        &self,
        name_prefix: Option<String>,
    ) -> RepoResult<Vec<OrganisationSummary>> {
        sqlx::query_as::<_, OrganisationSummary>(
            r#"
            SELECT o.id, o.name, o.logo_id, COUNT(u.id) AS employees_count
            FROM organisations o
            LEFT JOIN users u ON u.organisation_id = o.id
            WHERE ($1::TEXT IS NULL OR starts_with(o.name, $1))
            GROUP BY o.id
            ORDER BY o.id
            "#,
        )
        .bind(name_prefix)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_organisation(&self, id: i32) -> RepoResult<Option<Organisation>> {
        sqlx::query_as::<_, Organisation>(&format!(
            "SELECT {ORGANISATION_COLUMNS} FROM organisations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_organisation(&self, organisation: NewOrganisation) -> RepoResult<Organisation> {
        sqlx::query_as::<_, Organisation>(&format!(
            "INSERT INTO organisations (name, logo_id) VALUES ($1, $2) RETURNING {ORGANISATION_COLUMNS}"
        ))
        .bind(organisation.name)
        .bind(organisation.logo_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_organisation(
        &self,
        id: i32,
        changes: OrganisationChanges,
    ) -> RepoResult<Option<Organisation>> {
        sqlx::query_as::<_, Organisation>(&format!(
            r#"
            UPDATE organisations
            SET name = COALESCE($2, name),
                logo_id = COALESCE($3, logo_id)
            WHERE id = $1
            RETURNING {ORGANISATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.logo_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_organisation(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM organisations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_logo_id(&self, id: i32, logo_id: i32) -> RepoResult<Option<Organisation>> {
        sqlx::query_as::<_, Organisation>(&format!(
            "UPDATE organisations SET logo_id = $2 WHERE id = $1 RETURNING {ORGANISATION_COLUMNS}"
        ))
        .bind(id)
        .bind(logo_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn logo_id_in_use(&self, logo_id: i32) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM organisations WHERE logo_id = $1)",
        )
        .bind(logo_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_employees(&self, organisation_id: i32) -> RepoResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE organisation_id = $1 ORDER BY id"
        ))
        .bind(organisation_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_employee(&self, organisation_id: i32, user_id: i32) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE users SET organisation_id = $1 WHERE id = $2")
            .bind(organisation_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_employee(&self, organisation_id: i32, user_id: i32) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET organisation_id = NULL WHERE id = $2 AND organisation_id = $1",
        )
        .bind(organisation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
