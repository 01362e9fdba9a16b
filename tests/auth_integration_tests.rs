mod common;

use axum::{extract::FromRequestParts, http::Request};
use common::{ADMIN_ID, InMemoryRepository, MEMBER_ID, create_test_state};
use org_portal::{
    AppError,
    auth::{AuthUser, basic_header_for, parse_basic_user_id},
    guard::RequiredRoles,
    models::Role,
    storage::MockStorageService,
};

// --- HEADER PARSING ---

#[test]
fn test_basic_header_round_trip() {
    assert_eq!(basic_header_for(1), "Basic MQ==");
    assert_eq!(parse_basic_user_id("Basic MQ==").unwrap(), 1);
    assert_eq!(parse_basic_user_id(&basic_header_for(1234)).unwrap(), 1234);
}

#[test]
fn test_parse_rejects_other_schemes() {
    let err = parse_basic_user_id("Bearer MQ==").unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Invalid authorization header"));
}

#[test]
fn test_parse_rejects_bad_payloads() {
    // Not base64 at all.
    assert!(matches!(
        parse_basic_user_id("Basic %%%"),
        Err(AppError::Unauthorized(ref m)) if m == "Invalid user ID in the token"
    ));
    // base64("user:pass") is a real Basic credential but not a user id.
    assert!(matches!(
        parse_basic_user_id("Basic dXNlcjpwYXNz"),
        Err(AppError::Unauthorized(_))
    ));
    // base64 of invalid UTF-8 (0xFF 0xFE).
    assert!(matches!(
        parse_basic_user_id("Basic //4="),
        Err(AppError::Unauthorized(_))
    ));
}

// --- EXTRACTOR ---

async fn extract(header: Option<String>) -> Result<AuthUser, AppError> {
    let state = create_test_state(InMemoryRepository::seeded(), MockStorageService::new());
    let mut builder = Request::builder().uri("/profile");
    if let Some(value) = header {
        builder = builder.header("authorization", value);
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();
    AuthUser::from_request_parts(&mut parts, &state).await
}

#[tokio::test]
async fn test_extractor_loads_role_from_store() {
    let admin = extract(Some(basic_header_for(ADMIN_ID))).await.unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert!(admin.is_admin());

    let member = extract(Some(basic_header_for(MEMBER_ID))).await.unwrap();
    assert_eq!(member.role, Role::Member);
    assert_eq!(member.email, "seconduser@gmail.com");
}

#[tokio::test]
async fn test_extractor_rejects_missing_and_unknown() {
    assert!(matches!(extract(None).await, Err(AppError::Unauthorized(_))));
    assert!(matches!(
        extract(Some(basic_header_for(404))).await,
        Err(AppError::Unauthorized(ref m)) if m == "User not found"
    ));
}

#[tokio::test]
async fn test_extractor_reuses_attached_identity() {
    let state = create_test_state(InMemoryRepository::new(), MockStorageService::new());
    let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
    let attached = AuthUser {
        id: 7,
        name: "Attached".to_string(),
        email: "attached@example.com".to_string(),
        role: Role::Member,
    };
    parts.extensions.insert(attached.clone());

    // The empty repository would reject a lookup, so success proves no lookup happened.
    let resolved = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(resolved, attached);
}

// --- ROLE SETS ---

#[test]
fn test_required_roles() {
    assert!(RequiredRoles::ANY.permits(Role::Member));
    assert!(RequiredRoles::ADMIN.permits(Role::Admin));
    assert!(!RequiredRoles::ADMIN.permits(Role::Member));
    assert!(RequiredRoles::ADMIN_OR_MEMBER.permits(Role::Member));
    assert!(RequiredRoles::ADMIN_OR_MEMBER.permits(Role::Admin));
}
