use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reelhub::config::Config;
use reelhub::db::seed::{SeedReport, seed_demo_catalog};
use reelhub::db::{NewUser, Store};
use reelhub::domain::Role;
use reelhub::state::SharedState;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Store,
    config: Config,
    seed: SeedReport,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

async fn spawn_app() -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("reelhub-api-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.tmdb.api_key = "test-key".to_string();

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open store");
    let seed = seed_demo_catalog(&store).await.expect("Failed to seed");

    let shared = SharedState::with_store(config.clone(), store.clone())
        .expect("Failed to build shared state");
    let state = reelhub::api::create_app_state(Arc::new(shared), None);
    let router = reelhub::api::router(state).await;

    TestApp {
        router,
        store,
        config,
        seed,
        db_path,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send_json(
                "POST",
                "/api/auth/register",
                None,
                &json!({"name": "Tester", "email": email, "password": "correct-horse"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let (status, body) = self
            .send_json(
                "POST",
                "/api/auth/login",
                None,
                &json!({"email": email, "password": "correct-horse"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        let admin = self
            .store
            .create_user(
                NewUser {
                    name: "Admin".to_string(),
                    email: "admin@reelhub.test".to_string(),
                    password: "admin-password".to_string(),
                    role: Role::Admin,
                    avatar: None,
                },
                &self.config.security,
            )
            .await
            .unwrap()
            .unwrap();
        admin.api_key
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());

    let (status, body) = app.get("/api/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["checks"]["database"], true);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/user/favorites", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = app.get("/api/user/watchlist", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("X-Api-Key", "nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = spawn_app().await;
    let token = app.register("viewer@reelhub.test").await;

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "viewer@reelhub.test");
    assert_eq!(body["role"], "user");
    assert!(body["avatar"].is_string());
    assert!(body.get("password").is_none());

    // Duplicate email
    let (status, _) = app
        .send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "Other", "email": "viewer@reelhub.test", "password": "another-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({"email": "viewer@reelhub.test", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_register_validation() {
    let app = spawn_app().await;

    let (status, _) = app
        .send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "Short", "email": "short@reelhub.test", "password": "abc"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({"name": "Bad", "email": "not-an-email", "password": "long-enough"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mistyped_json_bodies_use_error_envelope() {
    let app = spawn_app().await;
    let token = app.register("typed@reelhub.test").await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/user/ratings",
            Some(&token),
            &json!({"tmdbId": 27205, "mediaType": "movie", "rating": "9", "title": "Inception"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");

    let (status, body) = app
        .send_json(
            "POST",
            "/api/user/history",
            Some(&token),
            &json!({"tmdbId": 27205, "mediaType": "movie", "progress": "abc", "title": "Inception"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");

    // Syntax errors take the same path
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");

    let (_, body) = app.get("/api/user/ratings", Some(&token)).await;
    assert_eq!(body["ratings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_regenerated_token_replaces_old_one() {
    let app = spawn_app().await;
    let token = app.register("rotate@reelhub.test").await;

    let (status, body) = app
        .send_json("POST", "/api/auth/token/regenerate", Some(&token), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["token"].as_str().unwrap().to_string();
    assert_ne!(fresh, token);

    let (status, _) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/auth/me", Some(&fresh)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = spawn_app().await;
    let token = app.register("plain@reelhub.test").await;
    let movie_id = app.seed.movies[0];

    let (status, body) = app
        .send_json(
            "PUT",
            &format!("/api/admin/movies/{movie_id}/active"),
            Some(&token),
            &json!({"isActive": false}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin privileges required");

    let (status, _) = app
        .send_json(
            "PUT",
            &format!("/api/admin/movies/{movie_id}/active"),
            None,
            &json!({"isActive": false}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_can_deactivate_movie() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let movie_id = app.seed.movies[0];

    let (status, body) = app
        .send_json(
            "PUT",
            &format!("/api/admin/movies/{movie_id}/active"),
            Some(&admin),
            &json!({"isActive": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["isActive"], false);

    let (status, _) = app.get(&format!("/api/movies/{movie_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/movies", None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_unknown_content_kind_is_rejected() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/content/stream/anime/10", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/content/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_require_authentication() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/metrics", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
