mod common;

use common::{ADMIN_ID, InMemoryRepository, MEMBER_ID, create_test_state, jpeg_bytes};
use org_portal::{auth::basic_header_for, create_router, storage::MockStorageService};
use reqwest::{StatusCode, multipart};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub storage: MockStorageService,
}

/// Serves the full router on an ephemeral port, backed by the in-memory repository.
async fn spawn_app() -> TestApp {
    let storage = MockStorageService::new();
    let state = create_test_state(InMemoryRepository::seeded(), storage.clone());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, storage }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: Value = reqwest::get(format!("{}/api-docs/openapi.json", app.address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/organisations/{id}/logo"].is_object());
    assert!(doc["components"]["securitySchemes"]["basic"].is_object());
}

#[tokio::test]
async fn test_organisation_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Create
    let response = client
        .post(format!("{}/organisations", app.address))
        .header("authorization", basic_header_for(MEMBER_ID))
        .json(&json!({ "name": "Test Organization", "logoId": 1 }))
        .send()
        .await
        .expect("post fail");
    assert_eq!(response.status(), StatusCode::CREATED);
    let org: Value = response.json().await.unwrap();
    let org_uri = format!("{}/organisations/{}", app.address, org["id"]);

    // Employ the member
    let resp = client
        .post(format!("{org_uri}/employees?userId={MEMBER_ID}"))
        .header("authorization", basic_header_for(ADMIN_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Upload a logo: the existing id is kept
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(jpeg_bytes())
            .file_name("logo.jpeg")
            .mime_str("image/jpeg")
            .unwrap(),
    );
    let resp = client
        .post(format!("{org_uri}/logo"))
        .header("authorization", basic_header_for(MEMBER_ID))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(app.storage.saved()[0].0, "logo1.jpeg");

    // Detail carries the employee
    let detail: Value = client
        .get(&org_uri)
        .header("authorization", basic_header_for(MEMBER_ID))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["employees"][0]["id"], MEMBER_ID);

    // Members cannot delete, Admins can
    let denied = client
        .delete(&org_uri)
        .header("authorization", basic_header_for(MEMBER_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let deleted = client
        .delete(&org_uri)
        .header("authorization", basic_header_for(ADMIN_ID))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
}
