use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reelhub::config::Config;
use reelhub::db::seed::{SeedReport, seed_demo_catalog};
use reelhub::db::{NewMedia, NewMovie, NewUser, Store};
use reelhub::domain::{AssetType, MediaParentKind, Role};
use reelhub::state::SharedState;
use serde_json::Value;
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
        std::env::temp_dir().join(format!("reelhub-catalog-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

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
    async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }
}

fn titles(rows: &Value) -> Vec<String> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_movie_listing_pagination() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/movies?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], false);

    let (_, body) = app.get("/api/movies?limit=1&page=2").await;
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn test_genre_filter_counts_distinct_movies() {
    let app = spawn_app().await;
    let adventure = app.seed.genres[0];
    let fantasy = app.seed.genres[3];

    let (_, body) = app
        .get(&format!("/api/movies?genreId={adventure}&limit=10"))
        .await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .get(&format!("/api/movies?genreId={fantasy}&limit=10"))
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(titles(&body["rows"]), vec!["Inception"]);
    let genres = body["rows"][0]["genres"].as_array().unwrap();
    assert_eq!(genres.len(), 2);
}

#[tokio::test]
async fn test_search_and_category_filters() {
    let app = spawn_app().await;

    let (_, body) = app.get("/api/movies?search=joker").await;
    assert_eq!(titles(&body["rows"]), vec!["The Dark Knight"]);

    let scifi = app.seed.categories[2];
    let (_, body) = app.get(&format!("/api/series?categoryId={scifi}")).await;
    assert_eq!(titles(&body["rows"]), vec!["Stranger Things"]);
    assert_eq!(body["rows"][0]["category"]["name"], "Science-Fiction");
}

#[tokio::test]
async fn test_search_folds_accents_and_matches_wildcards_literally() {
    let app = spawn_app().await;
    app.store
        .create_movie(NewMovie {
            title: "Élan Vital".to_string(),
            description: Some("Un documentaire sur 100% de la forêt".to_string()),
            category_id: app.seed.categories[1],
            ..NewMovie::default()
        })
        .await
        .unwrap();

    for term in ["%C3%A9lan", "%C3%89LAN", "FOR%C3%8AT"] {
        let (status, body) = app.get(&format!("/api/movies?search={term}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body["rows"]), vec!["Élan Vital"], "search={term}");
    }

    // `%` and `_` are plain characters, not wildcards
    let (_, body) = app.get("/api/movies?search=%25").await;
    assert_eq!(titles(&body["rows"]), vec!["Élan Vital"]);
    let (_, body) = app.get("/api/movies?search=_").await;
    assert_eq!(body["pagination"]["total"], 0);

    let (_, body) = app.get("/api/series?search=BREAKING").await;
    assert_eq!(titles(&body["rows"]), vec!["Breaking Bad"]);
}

#[tokio::test]
async fn test_detail_exposes_credits_and_trailers() {
    let app = spawn_app().await;
    let dark_knight = app.seed.movies[1];

    let (status, body) = app.get(&format!("/api/movies/{dark_knight}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["director"], "Christopher Nolan");
    assert!(body["cast"].as_str().unwrap().contains("Heath Ledger"));
    assert_eq!(body["maturityRating"], "PG-13");
    assert_eq!(body["trailerUrl"], "https://www.youtube.com/watch?v=EXeTwQWrcwY");
    assert_eq!(body["categoryId"], app.seed.categories[0]);
    // No poster asset, so the stored column is served
    assert_eq!(
        body["posterUrl"],
        "https://image.tmdb.org/t/p/w500/qJ2tW6WMUDux911r6m7haRef0WH.jpg"
    );

    let series_id = app.seed.series[1];
    let (_, body) = app.get(&format!("/api/series/{series_id}")).await;
    assert_eq!(body["creator"], "Vince Gilligan");
    assert_eq!(body["maturityRating"], "16+");
    assert_eq!(body["seasons"][0]["releaseDate"], "2008-01-20");
    assert_eq!(body["seasons"][0]["episodeCount"], 1);

    let season_id = app.seed.seasons[1];
    let episode_id = app.seed.episodes[2];
    let (_, body) = app
        .get(&format!(
            "/api/series/{series_id}/seasons/{season_id}/episodes/{episode_id}"
        ))
        .await;
    assert_eq!(body["releaseDate"], "2008-01-20");
    assert!(body["thumbnailUrl"].is_null());
}

#[tokio::test]
async fn test_sorting_and_unknown_field_fallback() {
    let app = spawn_app().await;

    let (_, body) = app.get("/api/movies?sortBy=title&order=ASC").await;
    assert_eq!(titles(&body["rows"]), vec!["Inception", "The Dark Knight"]);

    let (_, body) = app.get("/api/movies?sortBy=duration&order=DESC").await;
    assert_eq!(titles(&body["rows"]), vec!["The Dark Knight", "Inception"]);

    // Unknown fields fall back to createdAt DESC and ignore the order
    let (status, fallback) = app.get("/api/movies?sortBy=password&order=ASC").await;
    assert_eq!(status, StatusCode::OK);
    let (_, newest_first) = app.get("/api/movies?sortBy=createdAt&order=DESC").await;
    assert_eq!(titles(&fallback["rows"]), titles(&newest_first["rows"]));
}

#[tokio::test]
async fn test_each_read_counts_one_view() {
    let app = spawn_app().await;
    let movie_id = app.seed.movies[0];

    let mut last = Value::Null;
    for _ in 0..3 {
        let (status, body) = app.get(&format!("/api/movies/{movie_id}")).await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["viewCount"], 3);
    assert!(
        last["posterUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://m.media-amazon.com/")
    );
    assert_eq!(last["backdropUrl"], "https://i.imgur.com/rF44aiZ.jpg");

    let (_, body) = app.get("/api/movies/popular?limit=1").await;
    assert_eq!(body[0]["id"], movie_id);
}

#[tokio::test]
async fn test_missing_and_invalid_ids() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/movies/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, _) = app.get("/api/movies/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/series/9999/related").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_related_movies_exclude_source() {
    let app = spawn_app().await;
    let movie_id = app.seed.movies[0];

    let (status, body) = app.get(&format!("/api/movies/{movie_id}/related")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["The Dark Knight"]);
}

#[tokio::test]
async fn test_series_detail_tree() {
    let app = spawn_app().await;
    let series_id = app.seed.series[0];
    let season_id = app.seed.seasons[0];
    let episode_id = app.seed.episodes[0];

    let (status, body) = app.get(&format!("/api/series/{series_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Stranger Things");
    assert_eq!(body["status"], "ongoing");
    let seasons = body["seasons"].as_array().unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0]["episodeCount"], 2);

    let (status, body) = app
        .get(&format!("/api/series/{series_id}/seasons/{season_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seasonNumber"], 1);

    let (status, body) = app
        .get(&format!(
            "/api/series/{series_id}/seasons/{season_id}/episodes/{episode_id}"
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["episodeNumber"], 1);

    // Season belongs to another series
    let other_season = app.seed.seasons[1];
    let (status, _) = app
        .get(&format!("/api/series/{series_id}/seasons/{other_season}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_categories_ordered_for_display() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Action", "Drame", "Science-Fiction"]);

    let (_, body) = app.get("/api/genres").await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_single_default_media_per_parent_and_type() {
    let app = spawn_app().await;
    let movie_id = app.seed.movies[0];

    let alternate = app
        .store
        .add_media(NewMedia {
            url: "https://img.example/alt-poster.jpg".to_string(),
            media_type: AssetType::Poster,
            title: None,
            description: None,
            parent_kind: MediaParentKind::Movie,
            parent_id: movie_id,
            is_default: false,
        })
        .await
        .unwrap();

    let admin = app
        .store
        .create_user(
            NewUser {
                name: "Admin".to_string(),
                email: "admin@reelhub.test".to_string(),
                password: "admin-password".to_string(),
                role: Role::Admin,
                avatar: None,
            },
            &app.config.security,
        )
        .await
        .unwrap()
        .unwrap();

    let (status, body) = app
        .request(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/admin/media/{}/default", alternate.id))
                .header("Authorization", format!("Bearer {}", admin.api_key))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["media"]["isDefault"], true);
    assert_eq!(body["media"]["parentKind"], "movie");

    let defaults = app
        .store
        .default_media_for(MediaParentKind::Movie, movie_id, AssetType::Poster)
        .await
        .unwrap();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, alternate.id);

    // Backdrop default is untouched
    let backdrops = app
        .store
        .default_media_for(MediaParentKind::Movie, movie_id, AssetType::Backdrop)
        .await
        .unwrap();
    assert_eq!(backdrops.len(), 1);

    let (_, body) = app.get(&format!("/api/movies/{movie_id}")).await;
    assert_eq!(body["posterUrl"], "https://img.example/alt-poster.jpg");
}
