#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use org_portal::{
    AppConfig, AppState, create_router,
    auth::basic_header_for,
    models::{
        NewOrganisation, NewPost, NewUser, Organisation, OrganisationChanges,
        OrganisationSummary, Post, PostChanges, PostWithAuthor, Role, User, UserChanges,
    },
    repository::{RepoResult, Repository, RepositoryState},
    storage::{MockStorageService, StorageState},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tower::ServiceExt;

pub const ADMIN_ID: i32 = 1;
pub const MEMBER_ID: i32 = 2;
pub const OTHER_MEMBER_ID: i32 = 3;

// --- IN-MEMORY REPOSITORY ---

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    organisations: Vec<Organisation>,
    next_user_id: i32,
    next_post_id: i32,
    next_organisation_id: i32,
}

/// Repository over plain vectors, mirroring the Postgres semantics the services rely on:
/// post cascade on user delete, employees cleared on organisation delete, COALESCE updates.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three users every fresh database starts with.
    pub fn seeded() -> Self {
        let repo = Self::new();
        {
            let mut tables = repo.tables.lock().unwrap();
            tables.users = vec![
                user(ADMIN_ID, "First User", "firstuser@email.com", Role::Admin),
                user(MEMBER_ID, "Second User", "seconduser@gmail.com", Role::Member),
                user(OTHER_MEMBER_ID, "Third user", "thirduser@gmail.com", Role::Member),
            ];
            tables.next_user_id = 3;
        }
        repo
    }

    /// Every subsequent call fails like an unreachable database.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn insert_post(&self, author_id: i32, title: &str, content: &str) -> Post {
        let mut tables = self.tables.lock().unwrap();
        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            title: title.to_string(),
            content: content.to_string(),
            author_id,
        };
        tables.posts.push(post.clone());
        post
    }

    pub fn insert_organisation(&self, name: &str, logo_id: Option<i32>) -> Organisation {
        let mut tables = self.tables.lock().unwrap();
        tables.next_organisation_id += 1;
        let organisation = Organisation {
            id: tables.next_organisation_id,
            name: name.to_string(),
            logo_id,
        };
        tables.organisations.push(organisation.clone());
        organisation
    }

    pub fn user_row(&self, id: i32) -> Option<User> {
        let tables = self.tables.lock().unwrap();
        tables.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

fn user(id: i32, name: &str, email: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
        organisation_id: None,
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_users(&self) -> RepoResult<Vec<User>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().users.clone())
    }

    async fn get_user(&self, id: i32) -> RepoResult<Option<User>> {
        self.check()?;
        Ok(self.user_row(id))
    }

    async fn create_user(&self, new: NewUser) -> RepoResult<User> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            name: new.name,
            email: new.email,
            role: new.role,
            organisation_id: None,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> RepoResult<Option<User>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|u| {
            if let Some(name) = changes.name {
                u.name = name;
            }
            if let Some(email) = changes.email {
                u.email = email;
            }
            u.clone()
        }))
    }

    async fn delete_user(&self, id: i32) -> RepoResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        tables.posts.retain(|p| p.author_id != id);
        Ok(tables.users.len() != before)
    }

    async fn get_posts(&self) -> RepoResult<Vec<Post>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().posts.clone())
    }

    async fn get_posts_by_author(&self, author_id: i32) -> RepoResult<Vec<Post>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: i32) -> RepoResult<Option<Post>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_post_with_author(&self, id: i32) -> RepoResult<Option<PostWithAuthor>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let Some(post) = tables.posts.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == post.author_id)
            .map(|author| PostWithAuthor {
                id: post.id,
                title: post.title.clone(),
                content: post.content.clone(),
                author_id: post.author_id,
                author_name: author.name.clone(),
            }))
    }

    async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
        self.check()?;
        Ok(self.insert_post(new.author_id, &new.title, &new.content))
    }

    async fn update_post(&self, id: i32, changes: PostChanges) -> RepoResult<Option<Post>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(title) = changes.title {
                p.title = title;
            }
            if let Some(content) = changes.content {
                p.content = content;
            }
            p.clone()
        }))
    }

    async fn delete_post(&self, id: i32) -> RepoResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        Ok(tables.posts.len() != before)
    }

    async fn get_organisations(
        &self,
        name_prefix: Option<String>,
    ) -> RepoResult<Vec<OrganisationSummary>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .organisations
            .iter()
            .filter(|o| {
                name_prefix
                    .as_deref()
                    .is_none_or(|prefix| o.name.starts_with(prefix))
            })
            .map(|o| OrganisationSummary {
                id: o.id,
                name: o.name.clone(),
                logo_id: o.logo_id,
                employees_count: tables
                    .users
                    .iter()
                    .filter(|u| u.organisation_id == Some(o.id))
                    .count() as i64,
            })
            .collect())
    }

    async fn get_organisation(&self, id: i32) -> RepoResult<Option<Organisation>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.organisations.iter().find(|o| o.id == id).cloned())
    }

    async fn create_organisation(&self, new: NewOrganisation) -> RepoResult<Organisation> {
        self.check()?;
        Ok(self.insert_organisation(&new.name, new.logo_id))
    }

    async fn update_organisation(
        &self,
        id: i32,
        changes: OrganisationChanges,
    ) -> RepoResult<Option<Organisation>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.organisations.iter_mut().find(|o| o.id == id).map(|o| {
            if let Some(name) = changes.name {
                o.name = name;
            }
            if let Some(logo_id) = changes.logo_id {
                o.logo_id = Some(logo_id);
            }
            o.clone()
        }))
    }

    async fn delete_organisation(&self, id: i32) -> RepoResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.organisations.len();
        tables.organisations.retain(|o| o.id != id);
        for user in tables.users.iter_mut() {
            if user.organisation_id == Some(id) {
                user.organisation_id = None;
            }
        }
        Ok(tables.organisations.len() != before)
    }

    async fn set_logo_id(&self, id: i32, logo_id: i32) -> RepoResult<Option<Organisation>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.organisations.iter_mut().find(|o| o.id == id).map(|o| {
            o.logo_id = Some(logo_id);
            o.clone()
        }))
    }

    async fn logo_id_in_use(&self, logo_id: i32) -> RepoResult<bool> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .organisations
            .iter()
            .any(|o| o.logo_id == Some(logo_id)))
    }

    async fn get_employees(&self, organisation_id: i32) -> RepoResult<Vec<User>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.organisation_id == Some(organisation_id))
            .cloned()
            .collect())
    }

    async fn add_employee(&self, organisation_id: i32, user_id: i32) -> RepoResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .map(|u| u.organisation_id = Some(organisation_id))
            .is_some())
    }

    async fn remove_employee(&self, organisation_id: i32, user_id: i32) -> RepoResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id && u.organisation_id == Some(organisation_id))
            .map(|u| u.organisation_id = None)
            .is_some())
    }
}

// --- TEST UTILITIES ---

pub fn create_test_state(repo: InMemoryRepository, storage: MockStorageService) -> AppState {
    AppState {
        repo: Arc::new(repo) as RepositoryState,
        storage: Arc::new(storage) as StorageState,
        config: AppConfig::default(),
    }
}

pub fn test_router(repo: InMemoryRepository, storage: MockStorageService) -> Router {
    create_router(create_test_state(repo, storage))
}

/// Sends one request through the router and returns the response.
pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub fn as_user(builder: axum::http::request::Builder, user_id: i32) -> axum::http::request::Builder {
    builder.header("authorization", basic_header_for(user_id))
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Smallest payload that passes the JPEG check.
pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00]
}

/// Hand-built `multipart/form-data` body with one file part.
pub fn multipart_body(field: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "org-portal-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"logo.jpeg\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
