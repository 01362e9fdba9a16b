use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;
pub mod validation;

// Access tiers: public, authenticated, member, admin.
pub mod routes;
use auth::auth_middleware;
use guard::{RequiredRoles, role_guard};
use routes::{admin, authenticated, member, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{PostgresRepository, RepositoryState};
pub use services::{OrganisationService, PostService, UserService};
pub use storage::{LocalLogoStorage, MockStorageService, StorageState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and the DTO schemas into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_users, handlers::get_user, handlers::create_user, handlers::update_user,
        handlers::delete_user, handlers::get_profile,
        handlers::get_posts, handlers::get_post, handlers::add_post, handlers::update_post,
        handlers::delete_post,
        handlers::create_organisation, handlers::get_organisations, handlers::get_organisation,
        handlers::update_organisation, handlers::delete_organisation, handlers::get_employees,
        handlers::add_employee, handlers::delete_employee, handlers::upload_logo
    ),
    components(
        schemas(
            models::Role, dto::UserDto, dto::PostDto, dto::OrganisationDto,
            dto::OrganisationListDto, dto::CreateUserRequest, dto::UpdateUserRequest,
            dto::AddPostRequest, dto::UpdatePostRequest, dto::CreateOrganisationRequest,
            dto::UpdateOrganisationRequest, dto::LogoUploadForm, error::ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Users and the caller's profile"),
        (name = "posts", description = "Posts authored by users"),
        (name = "organisations", description = "Organisations, employees and logos")
    )
)]
pub struct ApiDoc;

/// Registers the `basic` scheme referenced by every protected path.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// AppState
///
/// The single shared container of services and configuration. Cloned per request; every
/// member is an `Arc` or plain data.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, posts and organisations.
    pub repo: RepositoryState,
    /// Where uploaded logos are written.
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(app_state: &AppState) -> UserService {
        UserService::new(app_state.repo.clone())
    }
}

impl FromRef<AppState> for PostService {
    fn from_ref(app_state: &AppState) -> PostService {
        PostService::new(app_state.repo.clone())
    }
}

impl FromRef<AppState> for OrganisationService {
    fn from_ref(app_state: &AppState) -> OrganisationService {
        OrganisationService::new(app_state.repo.clone(), app_state.storage.clone())
    }
}

/// create_router
///
/// Assembles the routing tiers, their access layers and the observability stack.
///
/// Layer order inside the protected tree: `auth_middleware` runs first (401 on a bad or missing
/// credential), then the tier's `role_guard` (403 on a role outside the declared set).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let protected = authenticated::authenticated_routes()
        .merge(
            member::member_routes().route_layer(middleware::from_fn_with_state(
                RequiredRoles::ADMIN_OR_MEMBER,
                role_guard,
            )),
        )
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(RequiredRoles::ADMIN, role_guard)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(protected)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by `SetRequestIdLayer` so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
