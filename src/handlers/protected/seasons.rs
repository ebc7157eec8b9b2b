use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::auth::AuthContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{NewSeason, Season};
use crate::state::AppState;

/// POST /seasons - create a season (admin)
pub async fn season_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<NewSeason>, JsonRejection>,
) -> ApiResult<Season> {
    let Json(input) = body?;
    let season = state.seasons.create(&ctx, input).await?;
    Ok(ApiResponse::created(season))
}

/// GET /seasons/:season_id
pub async fn season_get(
    State(state): State<AppState>,
    season_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Season> {
    let Path(season_id) = season_id?;
    Ok(ApiResponse::success(state.seasons.get(season_id).await?))
}
