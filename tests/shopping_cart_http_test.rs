//! HTTP tests for the shopping cart and the `cart.txt` download

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use foodgram::db::Database;
use foodgram::http::{router, AppState};
use foodgram::models::IngredientCreate;
use foodgram::tools::catalog;

struct TestApp {
    _dir: tempfile::TempDir,
    database: Database,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(dir.path().join("http.db")).unwrap();
        let state = Arc::new(AppState {
            database: database.clone(),
            page_size: 6,
        });
        Self {
            _dir: dir,
            database,
            router: router(state),
        }
    }

    fn ingredient(&self, name: &str, unit: &str) -> i64 {
        catalog::create_ingredient(
            &self.database,
            IngredientCreate {
                name: name.into(),
                measurement_unit: unit.into(),
            },
        )
        .unwrap()
        .id
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    async fn register(&self, username: &str) -> String {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/api/users/",
                None,
                Some(json!({
                    "email": format!("{}@example.com", username),
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        body["auth_token"].as_str().unwrap().to_string()
    }

    async fn create_recipe(&self, token: &str, name: &str, ingredients: Value) -> i64 {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/api/recipes/",
                Some(token),
                Some(json!({
                    "name": name,
                    "text": "Mix and bake.",
                    "cooking_time": 30,
                    "image": null,
                    "ingredients": ingredients,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", String::from_utf8_lossy(&body));
        let body: Value = serde_json::from_slice(&body).unwrap();
        body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_download_aggregates_planned_recipes() {
    let app = TestApp::new();
    let token = app.register("baker").await;
    let flour = app.ingredient("flour", "g");
    let sugar = app.ingredient("sugar", "g");

    let bread = app
        .create_recipe(&token, "Bread", json!([{ "id": flour, "amount": 200 }]))
        .await;
    let cake = app
        .create_recipe(
            &token,
            "Cake",
            json!([{ "id": flour, "amount": 300 }, { "id": sugar, "amount": 50 }]),
        )
        .await;

    for recipe in [bread, cake] {
        let uri = format!("/api/recipes/{}/shopping_cart/", recipe);
        let (status, _, _) = app.send(Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, headers, body) = app
        .send(Method::GET, "/api/recipes/download_shopping_cart/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"cart.txt\""
    );
    assert_eq!(body, b"flour: 500, g\nsugar: 50, g\n");
}

#[tokio::test]
async fn test_empty_cart_downloads_empty_file() {
    let app = TestApp::new();
    let token = app.register("idle").await;

    let (status, _, body) = app
        .send(Method::GET, "/api/recipes/download_shopping_cart/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_anonymous_download_is_rejected() {
    let app = TestApp::new();

    let (status, _, _) = app
        .send(Method::GET, "/api/recipes/download_shopping_cart/", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = app
        .send(
            Method::GET,
            "/api/recipes/download_shopping_cart/",
            Some("not-a-token"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_membership_errors() {
    let app = TestApp::new();
    let token = app.register("planner").await;
    let salt = app.ingredient("salt", "pinch");
    let recipe = app
        .create_recipe(&token, "Brine", json!([{ "id": salt, "amount": 3 }]))
        .await;
    let uri = format!("/api/recipes/{}/shopping_cart/", recipe);

    let (status, _, _) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(Method::POST, "/api/recipes/9999/shopping_cart/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_filter_in_listing() {
    let app = TestApp::new();
    let token = app.register("lister").await;
    let egg = app.ingredient("egg", "pcs");
    let omelette = app
        .create_recipe(&token, "Omelette", json!([{ "id": egg, "amount": 2 }]))
        .await;
    app.create_recipe(&token, "Boiled egg", json!([{ "id": egg, "amount": 1 }]))
        .await;

    let uri = format!("/api/recipes/{}/shopping_cart/", omelette);
    app.send(Method::POST, &uri, Some(&token), None).await;

    let (status, _, body) = app
        .send(
            Method::GET,
            "/api/recipes/?is_in_shopping_cart=1",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["id"], omelette);
    assert_eq!(body["results"][0]["is_in_shopping_cart"], true);
}

#[tokio::test]
async fn test_out_of_range_page_is_bad_request() {
    let app = TestApp::new();

    let (status, _, _) = app
        .send(Method::GET, "/api/recipes/?page=9223372036854775807", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
