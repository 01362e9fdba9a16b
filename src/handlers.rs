use crate::{
    auth::AuthUser,
    dto::{
        AddPostRequest, CreateOrganisationRequest, CreateUserRequest, EmployeeQuery,
        LogoUploadForm, OrganisationDto, OrganisationFilter, OrganisationListDto, PostDto,
        UpdateOrganisationRequest, UpdatePostRequest, UpdateUserRequest, UserDto,
    },
    error::{AppError, ErrorBody},
    extract::{IdPath, IdQuery, ValidatedJson},
    services::{LogoUpload, OrganisationService, PostService, UserService},
};
use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
    http::StatusCode,
};

// --- Users ---

/// get_users
///
/// Lists every user, without their posts.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("basic" = [])),
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 401, description = "Missing or invalid credential", body = ErrorBody)
    )
)]
pub async fn get_users(State(users): State<UserService>) -> Result<Json<Vec<UserDto>>, AppError> {
    Ok(Json(users.list_users().await?))
}

/// get_user
///
/// A single user together with the posts they authored.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserDto),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 406, description = "Non-numeric id", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(users): State<UserService>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<UserDto>, AppError> {
    Ok(Json(users.get_user(id).await?))
}

/// create_user
///
/// [Admin Route] Registers a user with the given role.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("basic" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserDto),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 403, description = "Not an Admin", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(users): State<UserService>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), AppError> {
    let user = users.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// update_user
///
/// Self-service partial update. Only the user themself may call it.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserDto),
        (status = 401, description = "Not this user", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_user(
    AuthUser { id: actor_id, .. }: AuthUser,
    State(users): State<UserService>,
    IdPath(id): IdPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, AppError> {
    Ok(Json(users.update_user(id, payload, actor_id).await?))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Not this user", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_user(
    AuthUser { id: actor_id, .. }: AuthUser,
    State(users): State<UserService>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, AppError> {
    users.delete_user(id, actor_id).await?;
    Ok(StatusCode::OK)
}

/// get_profile
///
/// The identity the request was authenticated as.
#[utoipa::path(
    get,
    path = "/profile",
    tag = "users",
    security(("basic" = [])),
    responses((status = 200, description = "Profile", body = UserDto))
)]
pub async fn get_profile(user: AuthUser) -> Json<UserDto> {
    Json(UserDto::from(user))
}

// --- Posts ---

#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    security(("basic" = [])),
    responses((status = 200, description = "All posts", body = [PostDto]))
)]
pub async fn get_posts(State(posts): State<PostService>) -> Result<Json<Vec<PostDto>>, AppError> {
    Ok(Json(posts.list_posts().await?))
}

/// get_post
///
/// A single post, including its author's name as `userName`.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDto),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_post(
    State(posts): State<PostService>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<PostDto>, AppError> {
    Ok(Json(posts.get_post(id).await?))
}

/// add_post
///
/// The caller becomes the author.
#[utoipa::path(
    post,
    path = "/posts",
    tag = "posts",
    security(("basic" = [])),
    request_body = AddPostRequest,
    responses(
        (status = 201, description = "Created", body = PostDto),
        (status = 400, description = "Invalid body", body = ErrorBody)
    )
)]
pub async fn add_post(
    user: AuthUser,
    State(posts): State<PostService>,
    ValidatedJson(payload): ValidatedJson<AddPostRequest>,
) -> Result<(StatusCode, Json<PostDto>), AppError> {
    let post = posts.add_post(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// Author-only partial update of title and/or description.
#[utoipa::path(
    patch,
    path = "/posts/{id}",
    tag = "posts",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = PostDto),
        (status = 401, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_post(
    AuthUser { id: actor_id, .. }: AuthUser,
    State(posts): State<PostService>,
    IdPath(id): IdPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostDto>, AppError> {
    Ok(Json(posts.update_post(id, payload, actor_id).await?))
}

/// delete_post
///
/// [Admin or Member] The author may delete their post; an Admin may delete any post.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "posts",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Neither author nor Admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(posts): State<PostService>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, AppError> {
    posts.delete_post(id, &user).await?;
    Ok(StatusCode::OK)
}

// --- Organisations ---

#[utoipa::path(
    post,
    path = "/organisations",
    tag = "organisations",
    security(("basic" = [])),
    request_body = CreateOrganisationRequest,
    responses(
        (status = 201, description = "Created", body = OrganisationDto),
        (status = 400, description = "Invalid body", body = ErrorBody)
    )
)]
pub async fn create_organisation(
    State(organisations): State<OrganisationService>,
    ValidatedJson(payload): ValidatedJson<CreateOrganisationRequest>,
) -> Result<(StatusCode, Json<OrganisationDto>), AppError> {
    let organisation = organisations.create(payload).await?;
    Ok((StatusCode::CREATED, Json(organisation)))
}

/// get_organisations
///
/// Lists organisations with their employee counts, optionally filtered by name prefix.
#[utoipa::path(
    get,
    path = "/organisations",
    tag = "organisations",
    security(("basic" = [])),
    params(OrganisationFilter),
    responses((status = 200, description = "Organisations", body = [OrganisationListDto]))
)]
pub async fn get_organisations(
    State(organisations): State<OrganisationService>,
    Query(filter): Query<OrganisationFilter>,
) -> Result<Json<Vec<OrganisationListDto>>, AppError> {
    Ok(Json(organisations.find_all(filter).await?))
}

#[utoipa::path(
    get,
    path = "/organisations/{id}",
    tag = "organisations",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Found, with employees", body = OrganisationDto),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_organisation(
    State(organisations): State<OrganisationService>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<OrganisationDto>, AppError> {
    Ok(Json(organisations.find_one(id).await?))
}

/// update_organisation
///
/// [Admin Route] Partial update of name and/or logo id.
#[utoipa::path(
    patch,
    path = "/organisations/{id}",
    tag = "organisations",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Organisation ID")),
    request_body = UpdateOrganisationRequest,
    responses(
        (status = 200, description = "Updated", body = OrganisationDto),
        (status = 403, description = "Not an Admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_organisation(
    State(organisations): State<OrganisationService>,
    IdPath(id): IdPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateOrganisationRequest>,
) -> Result<Json<OrganisationDto>, AppError> {
    Ok(Json(organisations.update(id, payload).await?))
}

/// delete_organisation
///
/// [Admin Route] Former employees are left without an organisation.
#[utoipa::path(
    delete,
    path = "/organisations/{id}",
    tag = "organisations",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not an Admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_organisation(
    State(organisations): State<OrganisationService>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, AppError> {
    organisations.remove(id).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/organisations/{id}/employees",
    tag = "organisations",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Employees", body = [UserDto]),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_employees(
    State(organisations): State<OrganisationService>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<Vec<UserDto>>, AppError> {
    Ok(Json(organisations.find_employees(id).await?))
}

/// add_employee
///
/// [Admin Route] Idempotent: adding a current employee again is a no-op.
#[utoipa::path(
    post,
    path = "/organisations/{id}/employees",
    tag = "organisations",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Organisation ID"), EmployeeQuery),
    responses(
        (status = 201, description = "Added"),
        (status = 404, description = "Organisation or user not found", body = ErrorBody)
    )
)]
pub async fn add_employee(
    State(organisations): State<OrganisationService>,
    IdPath(id): IdPath<i32>,
    IdQuery(EmployeeQuery { user_id }): IdQuery<EmployeeQuery>,
) -> Result<StatusCode, AppError> {
    organisations.add_employee(id, user_id).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    delete,
    path = "/organisations/{id}/employees/{userId}",
    tag = "organisations",
    security(("basic" = [])),
    params(
        ("id" = i32, Path, description = "Organisation ID"),
        ("userId" = i32, Path, description = "Employee's user ID")
    ),
    responses(
        (status = 200, description = "Removed"),
        (status = 404, description = "Organisation or employee not found", body = ErrorBody)
    )
)]
pub async fn delete_employee(
    State(organisations): State<OrganisationService>,
    IdPath((id, user_id)): IdPath<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    organisations.delete_employee(id, user_id).await?;
    Ok(StatusCode::OK)
}

/// upload_logo
///
/// Accepts a multipart body whose `file` field is a JPEG. The first upload assigns the
/// organisation's logo id; the file is stored as `logo<logoId>.jpeg`.
#[utoipa::path(
    post,
    path = "/organisations/{id}/logo",
    tag = "organisations",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Organisation ID")),
    request_body(content = LogoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Stored", body = OrganisationDto),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 422, description = "Missing file or not a JPEG", body = ErrorBody)
    )
)]
pub async fn upload_logo(
    State(organisations): State<OrganisationService>,
    IdPath(id): IdPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<OrganisationDto>), AppError> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::UnprocessableEntity(rejection.body_text()))?;
    let upload = read_file_field(&mut multipart).await?;

    let organisation = organisations.upload_logo(id, upload).await?;
    Ok((StatusCode::CREATED, Json(organisation)))
}

/// Pulls the `file` field out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<LogoUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::UnprocessableEntity(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::UnprocessableEntity(e.body_text()))?;

        return Ok(LogoUpload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::UnprocessableEntity("File is required".to_string()))
}
