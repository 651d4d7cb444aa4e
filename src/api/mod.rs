use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod categories;
mod content;
mod error;
mod extract;
mod favorites;
mod history;
mod movies;
mod observability;
mod ratings;
mod series;
mod stats;
mod system;
mod types;
mod validation;
mod watchlist;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{AuthService, CatalogService, MetadataService, UserContentService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn metadata_service(&self) -> &Arc<dyn MetadataService> {
        &self.shared.metadata_service
    }

    #[must_use]
    pub fn catalog_service(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn user_content_service(&self) -> &Arc<dyn UserContentService> {
        &self.shared.user_content_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(create_public_router())
        .merge(create_protected_router(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(system::health))
        .route("/health/ready", get(system::ready))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/content/search", get(content::search))
        .route("/content/popular", get(content::popular))
        .route("/content/trending", get(content::trending))
        .route("/content/top-rated", get(content::top_rated))
        .route("/content/upcoming", get(content::upcoming))
        .route("/content/movie/{id}", get(content::movie_details))
        .route("/content/tv/{id}", get(content::tv_details))
        .route(
            "/content/tv/{tv_id}/season/{season_number}",
            get(content::season_details),
        )
        .route(
            "/content/tv/{tv_id}/season/{season_number}/episode/{episode_number}",
            get(content::episode_details),
        )
        .route("/content/genres", get(content::genres))
        .route(
            "/content/genres/{genre_id}/discover",
            get(content::discover_by_genre),
        )
        .route("/content/stream/{kind}/{id}", get(content::stream))
        .route("/movies", get(movies::list_movies))
        .route("/movies/featured", get(movies::featured_movies))
        .route("/movies/popular", get(movies::popular_movies))
        .route("/movies/{id}", get(movies::get_movie))
        .route("/movies/{id}/related", get(movies::related_movies))
        .route("/series", get(series::list_series))
        .route("/series/featured", get(series::featured_series))
        .route("/series/popular", get(series::popular_series))
        .route("/series/{id}", get(series::get_series))
        .route("/series/{id}/related", get(series::related_series))
        .route(
            "/series/{series_id}/seasons/{season_id}",
            get(series::get_season),
        )
        .route(
            "/series/{series_id}/seasons/{season_id}/episodes/{episode_id}",
            get(series::get_episode),
        )
        .route("/categories", get(categories::list_categories))
        .route("/genres", get(categories::list_genres))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin_routes = Router::new()
        .route("/admin/movies/{id}/active", put(admin::set_movie_active))
        .route("/admin/series/{id}/active", put(admin::set_series_active))
        .route("/admin/media/{id}/default", put(admin::set_default_media))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/token/regenerate", post(auth::regenerate_token))
        .route("/user/favorites", get(favorites::list_favorites))
        .route("/user/favorites", post(favorites::add_favorite))
        .route("/user/favorites/{id}", delete(favorites::remove_favorite))
        .route("/user/watchlist", get(watchlist::list_watchlist))
        .route("/user/watchlist", post(watchlist::add_to_watchlist))
        .route("/user/watchlist/check", get(watchlist::check_watchlist))
        .route(
            "/user/watchlist/{id}",
            delete(watchlist::remove_from_watchlist),
        )
        .route("/user/ratings", get(ratings::list_ratings))
        .route("/user/ratings", post(ratings::upsert_rating))
        .route("/user/ratings/{id}", delete(ratings::delete_rating))
        .route("/user/rating", get(ratings::get_rating))
        .route("/user/history", get(history::list_history))
        .route("/user/history", post(history::record_progress))
        .route("/user/history/clear", post(history::clear_history))
        .route("/user/progress", get(history::get_progress))
        .route(
            "/user/continue-watching",
            get(history::continue_watching),
        )
        .route("/user/stats", get(stats::get_stats))
        .route("/metrics", get(observability::get_metrics))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
