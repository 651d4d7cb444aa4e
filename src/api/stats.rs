use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::CurrentUser;
use crate::services::user_content_service::UserStats;

/// GET /user/stats
/// Computed from live storage on every call
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserStats>, ApiError> {
    Ok(Json(state.user_content_service().stats(user.id).await?))
}
