use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

use service_catalog::AppState;
use service_catalog::api::routes::create_app;
use service_catalog::repositories::InMemoryCatalogStore;

const PAGE_SIZE: i64 = 2;

struct TestApp {
    router: NormalizePath<Router>,
}

impl TestApp {
    fn new() -> Self {
        let state = AppState::new(Arc::new(InMemoryCatalogStore::new()), PAGE_SIZE);
        Self {
            router: create_app(state, Duration::from_secs(5)),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn create_service(&self, name: &str, description: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/v1/service",
            Some(json!({ "name": name, "description": description })),
        )
        .await
    }

    async fn create_version(&self, service: &str, name: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/v1/service/version",
            Some(json!({ "service_name": service, "name": name, "description": "" })),
        )
        .await
    }
}

fn names(body: &Value, key: &str) -> Vec<String> {
    body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

async fn seeded_app() -> TestApp {
    let app = TestApp::new();
    for (name, description) in [("b", "billing"), ("a", "auth gateway"), ("c", "catalog")] {
        let (status, _) = app.create_service(name, description).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

#[tokio::test]
async fn list_services_paginates_by_name() {
    let app = seeded_app().await;

    let (status, body) = app.get("/v1/services?page=1&sort=ASC").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body, "services"), vec!["a", "b"]);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["total_records"], 3);
    assert_eq!(body["current_page"], 1);

    let (status, body) = app.get("/v1/services?page=2&sort=ASC").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body, "services"), vec!["c"]);
    assert_eq!(body["current_page"], 2);

    let (status, body) = app.get("/v1/services?page=3&sort=ASC").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAGE");
}

#[tokio::test]
async fn list_services_sorts_descending_and_defaults_bad_params() {
    let app = seeded_app().await;

    let (_, body) = app.get("/v1/services?sort=desc").await;
    assert_eq!(names(&body, "services"), vec!["c", "b"]);

    let (status, body) = app.get("/v1/services?page=abc&sort=sideways").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_page"], 1);
    assert_eq!(names(&body, "services"), vec!["a", "b"]);
}

#[tokio::test]
async fn list_services_filters_by_name_and_description() {
    let app = seeded_app().await;

    let (_, body) = app.get("/v1/services?description=GATE").await;
    assert_eq!(names(&body, "services"), vec!["a"]);
    assert_eq!(body["total_records"], 1);

    let (_, body) = app.get("/v1/services?name=zzz").await;
    assert_eq!(body["total_records"], 0);
    assert_eq!(body["total_pages"], 0);
    assert!(body["services"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn trailing_slashes_reach_the_same_routes() {
    let app = seeded_app().await;

    let (status, body) = app.get("/v1/services/?sort=DESC").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body, "services"), vec!["c", "b"]);

    let (status, body) = app.get("/v1/services/a/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "a");
}

#[tokio::test]
async fn huge_page_numbers_are_handled_without_overflow() {
    let app = seeded_app().await;
    app.create_version("a", "v1").await;

    let (status, body) = app.get("/v1/services/a?page=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["versions"], json!([]));
    assert_eq!(body["total_version_records"], 1);

    let (status, body) = app.get("/v1/services?page=9223372036854775807").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAGE");

    let empty = TestApp::new();
    let (status, body) = empty.get("/v1/services?page=9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_page"], 1);
}

#[tokio::test]
async fn empty_catalog_lists_an_empty_first_page() {
    let app = TestApp::new();

    let (status, body) = app.get("/v1/services").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["total_records"], 0);
}

#[tokio::test]
async fn duplicate_service_name_is_a_store_failure() {
    let app = TestApp::new();
    let (status, body) = app.create_service("payments", "").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Service Created Successfully");

    let (status, body) = app.create_service("payments", "again").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORE_ERROR");
}

#[tokio::test]
async fn create_service_rejects_invalid_bodies() {
    let app = TestApp::new();

    let (status, body) = app.create_service("", "nameless").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .send(Method::POST, "/v1/service", Some(json!({ "description": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn versions_update_the_counter_and_show_in_detail() {
    let app = TestApp::new();
    app.create_service("payments", "Payment gateway").await;

    let (status, body) = app.get("/v1/services/payments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version_count"], 0);
    assert_eq!(body["versions"], json!([]));
    assert_eq!(body["total_version_records"], 0);

    for version in ["v1", "v2", "v3"] {
        let (status, body) = app.create_version("payments", version).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Version Created Successfully");
    }

    let (_, body) = app.get("/v1/services/payments?page=1").await;
    assert_eq!(body["version_count"], 3);
    assert_eq!(body["total_version_records"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(names(&body, "versions"), vec!["v1", "v2"]);

    let (_, body) = app.get("/v1/services/payments?page=2").await;
    assert_eq!(names(&body, "versions"), vec!["v3"]);

    let (status, body) = app
        .send(Method::DELETE, "/v1/service/payments/version/v2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service Version Deleted Successfully");

    let (_, body) = app.get("/v1/services/payments").await;
    assert_eq!(body["version_count"], 2);
    assert_eq!(names(&body, "versions"), vec!["v1", "v3"]);

    let (_, body) = app.get("/v1/services").await;
    assert_eq!(body["services"][0]["version_count"], 2);
}

#[tokio::test]
async fn create_version_classifies_failures() {
    let app = TestApp::new();
    app.create_service("payments", "").await;
    app.create_version("payments", "v1").await;

    let (status, body) = app.create_version("payments", "v1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_VERSION");

    let (status, body) = app.create_version("ghost", "v1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SERVICE_NOT_FOUND");

    let (_, body) = app.get("/v1/services/payments").await;
    assert_eq!(body["version_count"], 1);
}

#[tokio::test]
async fn update_service_applies_partial_changes() {
    let app = TestApp::new();
    app.create_service("payments", "old").await;
    let (_, body) = app.get("/v1/services/payments").await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            Method::PATCH,
            "/v1/service",
            Some(json!({ "id": id, "name": "", "description": "new" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Accepted");

    let (_, body) = app.get("/v1/services/payments").await;
    assert_eq!(body["description"], "new");

    let (status, body) = app
        .send(Method::PATCH, "/v1/service", Some(json!({ "id": 9999, "name": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SERVICE_NOT_FOUND");
}

#[tokio::test]
async fn delete_service_hides_it_and_its_versions() {
    let app = TestApp::new();
    app.create_service("payments", "").await;
    app.create_version("payments", "v1").await;

    let (status, body) = app.send(Method::DELETE, "/v1/service/payments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service Deleted Successfully");

    let (status, body) = app.get("/v1/services/payments").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SERVICE_NOT_FOUND");

    let (_, body) = app.get("/v1/services").await;
    assert_eq!(body["total_records"], 0);

    let (status, _) = app.send(Method::DELETE, "/v1/service/payments", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The name is free again once the old row is soft-deleted
    let (status, _) = app.create_service("payments", "second life").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn delete_version_reports_missing_targets() {
    let app = TestApp::new();
    app.create_service("payments", "").await;

    let (status, body) = app
        .send(Method::DELETE, "/v1/service/payments/version/v9", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "VERSION_NOT_FOUND");

    let (status, body) = app
        .send(Method::DELETE, "/v1/service/ghost/version/v1", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SERVICE_NOT_FOUND");
}

#[tokio::test]
async fn health_endpoints_report_the_store() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.get("/health/live").await;
    assert_eq!(status, StatusCode::OK);
}
