use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::{
    models::{
        NewOrganisation, NewPost, NewUser, Organisation, OrganisationChanges, OrganisationSummary,
        Post, PostChanges, PostWithAuthor, Role, User, UserChanges,
    },
    validation::{Validate, ValidationErrors},
};

// --- Response Schemas (Output) ---

/// UserDto
///
/// Public projection of a user. `posts` is only present on the single-user lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<PostDto>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            posts: None,
        }
    }
}

impl UserDto {
    pub fn with_posts(user: User, posts: Vec<Post>) -> Self {
        Self {
            posts: Some(posts.into_iter().map(PostDto::from).collect()),
            ..Self::from(user)
        }
    }
}

/// PostDto
///
/// Public projection of a post. The stored `content` column is exposed as `description`,
/// and `userName` is only filled when the author was joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostDto {
    pub id: i32,
    pub user_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub title: String,
    pub description: String,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user_id: post.author_id,
            user_name: None,
            title: post.title,
            description: post.content,
        }
    }
}

impl From<PostWithAuthor> for PostDto {
    fn from(post: PostWithAuthor) -> Self {
        Self {
            id: post.id,
            user_id: post.author_id,
            user_name: Some(post.author_name),
            title: post.title,
            description: post.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrganisationDto {
    pub id: i32,
    pub name: String,
    pub logo_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<UserDto>>,
}

impl From<Organisation> for OrganisationDto {
    fn from(organisation: Organisation) -> Self {
        Self {
            id: organisation.id,
            name: organisation.name,
            logo_id: organisation.logo_id,
            employees: None,
        }
    }
}

impl OrganisationDto {
    pub fn with_employees(organisation: Organisation, employees: Vec<User>) -> Self {
        Self {
            employees: Some(employees.into_iter().map(UserDto::from).collect()),
            ..Self::from(organisation)
        }
    }
}

/// OrganisationListDto
///
/// Listing entry: no employee records, only their count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrganisationListDto {
    pub id: i32,
    pub name: String,
    pub logo_id: Option<i32>,
    pub employees_number: i64,
}

impl From<OrganisationSummary> for OrganisationListDto {
    fn from(summary: OrganisationSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            logo_id: summary.logo_id,
            employees_number: summary.employees_count,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// Defaults to `Member` when omitted.
    #[serde(default)]
    pub role: Role,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        errors.require_email("email", &self.email);
        errors.into_result()
    }
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            role: req.role,
        }
    }
}

/// UpdateUserRequest
///
/// Partial update: only the provided fields are touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.require_non_empty("name", name);
        }
        if let Some(email) = &self.email {
            errors.require_email("email", email);
        }
        errors.into_result()
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddPostRequest {
    pub title: String,
    pub description: String,
}

impl Validate for AddPostRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("title", &self.title);
        errors.require_non_empty("description", &self.description);
        errors.into_result()
    }
}

impl AddPostRequest {
    pub fn into_new_post(self, author_id: i32) -> NewPost {
        NewPost {
            title: self.title,
            content: self.description,
            author_id,
        }
    }
}

/// UpdatePostRequest
///
/// Partial update: a title-only request leaves the description unchanged and vice versa.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            errors.require_non_empty("title", title);
        }
        if let Some(description) = &self.description {
            errors.require_non_empty("description", description);
        }
        errors.into_result()
    }
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateOrganisationRequest {
    #[schema(example = "Test Organization")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_id: Option<i32>,
}

impl Validate for CreateOrganisationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        if let Some(logo_id) = self.logo_id {
            errors.require_logo_id("logoId", logo_id);
        }
        errors.into_result()
    }
}

impl From<CreateOrganisationRequest> for NewOrganisation {
    fn from(req: CreateOrganisationRequest) -> Self {
        Self {
            name: req.name,
            logo_id: req.logo_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateOrganisationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_id: Option<i32>,
}

impl Validate for UpdateOrganisationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.require_non_empty("name", name);
        }
        if let Some(logo_id) = self.logo_id {
            errors.require_logo_id("logoId", logo_id);
        }
        errors.into_result()
    }
}

impl From<UpdateOrganisationRequest> for OrganisationChanges {
    fn from(req: UpdateOrganisationRequest) -> Self {
        Self {
            name: req.name,
            logo_id: req.logo_id,
        }
    }
}

// --- Query Parameters ---

/// OrganisationFilter
///
/// Query parameters accepted by `GET /organisations`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrganisationFilter {
    /// Only organisations whose name starts with this prefix.
    pub name: Option<String>,
}

/// EmployeeQuery
///
/// `?userId=` of `POST /organisations/{id}/employees`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    pub user_id: i32,
}

/// Schema of the multipart body accepted by the logo upload (documentation only).
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct LogoUploadForm {
    /// A JPEG image.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
