use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reelhub::config::Config;
use reelhub::db::Store;
use reelhub::db::seed::{SeedReport, seed_demo_catalog};
use reelhub::state::SharedState;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Store,
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
        std::env::temp_dir().join(format!("reelhub-content-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open store");
    let seed = seed_demo_catalog(&store).await.expect("Failed to seed");

    let shared =
        SharedState::with_store(config, store.clone()).expect("Failed to build shared state");
    let state = reelhub::api::create_app_state(Arc::new(shared), None);
    let router = reelhub::api::router(state).await;

    TestApp {
        router,
        store,
        seed,
        db_path,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn user(&self, email: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({"name": "Viewer", "email": email, "password": "popcorn-time"}).to_string(),
            ))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let user = self
            .store
            .get_user_by_email(email)
            .await
            .unwrap()
            .unwrap();
        user.api_key
    }
}

#[tokio::test]
async fn test_rating_upsert_keeps_one_row() {
    let app = spawn_app().await;
    let token = app.user("rater@reelhub.test").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/user/ratings",
            &token,
            Some(json!({"tmdbId": 27205, "mediaType": "movie", "rating": 9, "title": "Inception"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["action"], "created");

    let (status, body) = app
        .call(
            "POST",
            "/api/user/ratings",
            &token,
            Some(json!({"tmdbId": 27205, "mediaType": "movie", "rating": 7, "title": "Inception"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "updated");

    let (status, body) = app
        .call(
            "GET",
            "/api/user/rating?tmdbId=27205&mediaType=movie",
            &token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasRating"], true);
    assert_eq!(body["rating"]["rating"], 7);

    let (_, body) = app.call("GET", "/api/user/ratings", &token, None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["stats"]["totalRatings"], 1);
    assert_eq!(body["stats"]["averageRating"], 7.0);
}

#[tokio::test]
async fn test_rating_out_of_range_is_not_persisted() {
    let app = spawn_app().await;
    let token = app.user("strict@reelhub.test").await;

    for rating in [json!(0), json!(11), json!(7.5)] {
        let (status, _) = app
            .call(
                "POST",
                "/api/user/ratings",
                &token,
                Some(json!({"tmdbId": 155, "mediaType": "movie", "rating": rating, "title": "The Dark Knight"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, body) = app
        .call("GET", "/api/user/rating?tmdbId=155&mediaType=movie", &token, None)
        .await;
    assert_eq!(body["hasRating"], false);
    assert!(body["rating"].is_null());
}

#[tokio::test]
async fn test_episode_ratings_are_distinct_targets() {
    let app = spawn_app().await;
    let token = app.user("episodes@reelhub.test").await;

    for (episode, rating) in [(1, 8), (2, 6)] {
        let (status, _) = app
            .call(
                "POST",
                "/api/user/ratings",
                &token,
                Some(json!({
                    "tmdbId": 66732,
                    "mediaType": "episode",
                    "seasonNumber": 1,
                    "episodeNumber": episode,
                    "rating": rating,
                    "title": "Stranger Things"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app
        .call("GET", "/api/user/ratings?mediaType=episode", &token, None)
        .await;
    assert_eq!(body["ratings"].as_array().unwrap().len(), 2);
    assert_eq!(body["stats"]["averageRating"], 7.0);
}

#[tokio::test]
async fn test_progress_percentage_and_continue_watching() {
    let app = spawn_app().await;
    let token = app.user("watcher@reelhub.test").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/user/history",
            &token,
            Some(json!({
                "tmdbId": 1396,
                "mediaType": "tv",
                "seasonNumber": 1,
                "episodeNumber": 1,
                "progress": 1200,
                "duration": 2400,
                "title": "Breaking Bad"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["watchHistory"]["progressPercentage"], 50);
    assert_eq!(body["watchHistory"]["remaining_time"], 1200);

    // Finished titles and unstarted rows are not resumable
    app.call(
        "POST",
        "/api/user/history",
        &token,
        Some(json!({"tmdbId": 27205, "mediaType": "movie", "progress": 8880, "duration": 8880, "completed": true, "title": "Inception"})),
    )
    .await;
    app.call(
        "POST",
        "/api/user/history",
        &token,
        Some(json!({"tmdbId": 155, "mediaType": "movie", "progress": 0, "duration": 9120, "title": "The Dark Knight"})),
    )
    .await;
    let (_, body) = app
        .call(
            "POST",
            "/api/user/history",
            &token,
            Some(json!({"tmdbId": 66732, "mediaType": "tv", "progress": 600, "duration": 2880, "title": "Stranger Things"})),
        )
        .await;
    assert_eq!(body["action"], "created");

    let (status, body) = app
        .call("GET", "/api/user/continue-watching", &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items[0]["title"], "Stranger Things");
    assert_eq!(items[1]["title"], "Breaking Bad");

    let (_, body) = app
        .call(
            "GET",
            "/api/user/progress?tmdbId=1396&mediaType=tv&seasonNumber=1&episodeNumber=1",
            &token,
            None,
        )
        .await;
    assert_eq!(body["hasProgress"], true);
    assert_eq!(body["progress"]["progress"], 1200);
}

#[tokio::test]
async fn test_history_update_and_clear() {
    let app = spawn_app().await;
    let token = app.user("clear@reelhub.test").await;

    let payload = json!({"tmdbId": 155, "mediaType": "movie", "progress": 100, "duration": 9120, "title": "The Dark Knight"});
    app.call("POST", "/api/user/history", &token, Some(payload))
        .await;
    let (status, body) = app
        .call(
            "POST",
            "/api/user/history",
            &token,
            Some(json!({"tmdbId": 155, "mediaType": "movie", "progress": 4560, "duration": 9120, "title": "The Dark Knight"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "updated");

    let (_, body) = app.call("GET", "/api/user/history", &token, None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["stats"]["inProgressCount"], 1);

    let (status, body) = app
        .call("POST", "/api/user/history/clear", &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (_, body) = app.call("GET", "/api/user/history", &token, None).await;
    assert_eq!(body["pagination"]["total"], 0);

    let (status, _) = app
        .call(
            "POST",
            "/api/user/history",
            &token,
            Some(json!({"tmdbId": 155, "mediaType": "movie", "progress": -5, "duration": 9120, "title": "The Dark Knight"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_rejects_non_positive_duration() {
    let app = spawn_app().await;
    let token = app.user("duration@reelhub.test").await;

    for duration in [0, -60] {
        let (status, body) = app
            .call(
                "POST",
                "/api/user/history",
                &token,
                Some(json!({"tmdbId": 155, "mediaType": "movie", "progress": 10, "duration": duration, "title": "The Dark Knight"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "duration={duration}");
        assert!(body["message"].is_string());
    }

    // Unknown duration is allowed
    let (status, body) = app
        .call(
            "POST",
            "/api/user/history",
            &token,
            Some(json!({"tmdbId": 155, "mediaType": "movie", "progress": 10, "title": "The Dark Knight"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["watchHistory"]["progressPercentage"], 0);

    let (_, body) = app.call("GET", "/api/user/history", &token, None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_history_clear_before_date() {
    let app = spawn_app().await;
    let token = app.user("before@reelhub.test").await;

    app.call(
        "POST",
        "/api/user/history",
        &token,
        Some(json!({"tmdbId": 27205, "mediaType": "movie", "progress": 600, "duration": 8880, "title": "Inception"})),
    )
    .await;
    app.call(
        "POST",
        "/api/user/history",
        &token,
        Some(json!({
            "tmdbId": 66732,
            "mediaType": "episode",
            "seasonNumber": 1,
            "episodeNumber": 1,
            "progress": 300,
            "duration": 2880,
            "title": "Stranger Things"
        })),
    )
    .await;

    let (status, body) = app
        .call(
            "POST",
            "/api/user/history/clear",
            &token,
            Some(json!({"beforeDate": "not-a-date"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("beforeDate"));

    // Everything was watched after 2000
    let (status, body) = app
        .call(
            "POST",
            "/api/user/history/clear",
            &token,
            Some(json!({"beforeDate": "2000-01-01"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 0);

    let (_, body) = app
        .call(
            "POST",
            "/api/user/history/clear",
            &token,
            Some(json!({"beforeDate": "2999-01-01T00:00:00+02:00", "mediaType": "movie"})),
        )
        .await;
    assert_eq!(body["deletedCount"], 1);

    let (_, body) = app
        .call(
            "POST",
            "/api/user/history/clear",
            &token,
            Some(json!({"beforeDate": "2999-12-31"})),
        )
        .await;
    assert_eq!(body["deletedCount"], 1);

    let (_, body) = app.call("GET", "/api/user/history", &token, None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_watchlist_conflict_and_poster_url() {
    let app = spawn_app().await;
    let token = app.user("list@reelhub.test").await;

    let item = json!({"tmdbId": 27205, "mediaType": "movie", "title": "Inception", "posterPath": "/inception.jpg"});
    let (status, body) = app
        .call("POST", "/api/user/watchlist", &token, Some(item.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(
        body["item"]["poster_url"],
        "https://image.tmdb.org/t/p/w500/inception.jpg"
    );
    let item_id = body["item"]["id"].as_i64().unwrap();

    let (status, body) = app
        .call("POST", "/api/user/watchlist", &token, Some(item))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["item"]["id"], item_id);

    let (_, body) = app
        .call(
            "GET",
            "/api/user/watchlist/check?tmdbId=27205&mediaType=movie",
            &token,
            None,
        )
        .await;
    assert_eq!(body["inWatchlist"], true);

    let (status, _) = app
        .call(
            "POST",
            "/api/user/watchlist",
            &token,
            Some(json!({"tmdbId": 1, "mediaType": "episode", "title": "Pilot"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.call("GET", "/api/user/watchlist", &token, None).await;
    assert_eq!(body["stats"]["totalMovies"], 1);
    assert_eq!(body["stats"]["totalTV"], 0);

    let (status, body) = app
        .call("DELETE", &format!("/api/user/watchlist/{item_id}"), &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removedItem"]["title"], "Inception");

    let (_, body) = app
        .call(
            "GET",
            "/api/user/watchlist/check?tmdbId=27205&mediaType=movie",
            &token,
            None,
        )
        .await;
    assert_eq!(body["inWatchlist"], false);
    assert!(body["item"].is_null());
}

#[tokio::test]
async fn test_favorites_are_scoped_to_owner() {
    let app = spawn_app().await;
    let owner = app.user("owner@reelhub.test").await;
    let intruder = app.user("intruder@reelhub.test").await;
    let movie_id = app.seed.movies[0];

    let (status, body) = app
        .call(
            "POST",
            "/api/user/favorites",
            &owner,
            Some(json!({"movieId": movie_id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let favorite_id = body["favorite"]["id"].as_i64().unwrap();
    assert_eq!(body["favorite"]["movie"]["title"], "Inception");

    let (status, _) = app
        .call(
            "POST",
            "/api/user/favorites",
            &owner,
            Some(json!({"movieId": movie_id})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            "DELETE",
            &format!("/api/user/favorites/{favorite_id}"),
            &intruder,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.call("GET", "/api/user/favorites", &owner, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .call(
            "POST",
            "/api/user/favorites",
            &owner,
            Some(json!({"movieId": movie_id, "seriesId": app.seed.series[0]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/user/favorites",
            &owner,
            Some(json!({"movieId": 9999})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            "DELETE",
            &format!("/api/user/favorites/{favorite_id}"),
            &owner,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_stats_for_new_user_are_zero() {
    let app = spawn_app().await;
    let token = app.user("fresh@reelhub.test").await;

    let (status, body) = app.call("GET", "/api/user/stats", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["general"]["watchlistItems"], 0);
    assert_eq!(body["general"]["favorites"], 0);
    assert_eq!(body["general"]["ratingsGiven"], 0);
    assert_eq!(body["general"]["averageRating"], 0.0);
    assert!(body["recentActivity"]["lastWatchlistAddition"].is_null());
    assert!(body["recentActivity"]["lastRating"].is_null());
}

#[tokio::test]
async fn test_stats_aggregate_activity() {
    let app = spawn_app().await;
    let token = app.user("busy@reelhub.test").await;

    app.call(
        "POST",
        "/api/user/ratings",
        &token,
        Some(json!({"tmdbId": 27205, "mediaType": "movie", "rating": 8, "title": "Inception"})),
    )
    .await;
    app.call(
        "POST",
        "/api/user/ratings",
        &token,
        Some(json!({"tmdbId": 1396, "mediaType": "tv", "rating": 9, "title": "Breaking Bad"})),
    )
    .await;
    app.call(
        "POST",
        "/api/user/history",
        &token,
        Some(json!({"tmdbId": 27205, "mediaType": "movie", "progress": 3600, "duration": 8880, "title": "Inception"})),
    )
    .await;
    app.call(
        "POST",
        "/api/user/watchlist",
        &token,
        Some(json!({"tmdbId": 155, "mediaType": "movie", "title": "The Dark Knight"})),
    )
    .await;
    app.call(
        "POST",
        "/api/user/favorites",
        &token,
        Some(json!({"seriesId": app.seed.series[0]})),
    )
    .await;

    let (_, body) = app.call("GET", "/api/user/stats", &token, None).await;
    assert_eq!(body["general"]["favorites"], 1);
    assert_eq!(body["general"]["ratingsGiven"], 2);
    assert_eq!(body["general"]["averageRating"], 8.5);
    assert_eq!(body["general"]["itemsWatched"], 1);
    assert_eq!(body["general"]["totalWatchTimeSeconds"], 3600);
    assert_eq!(body["general"]["watchlistItems"], 1);
    assert_eq!(body["watchlist"]["movie"], 1);
    assert_eq!(body["watchHistory"]["movie"]["count"], 1);
    assert_eq!(
        body["recentActivity"]["lastWatchlistAddition"]["title"],
        "The Dark Knight"
    );
}
