use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::lifecycle::MatchStatus;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Match;
use crate::services::{AssignOfficials, LineupReview, ScheduleMatch};
use crate::state::AppState;

use crate::handlers::parse_status;

#[derive(Debug, Deserialize)]
pub struct ChangeStatusBody {
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBody {
    pub home_score: i32,
    pub away_score: i32,
}

/// GET /seasons/:season_id/matches
pub async fn matches_list(
    State(state): State<AppState>,
    season_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Match>> {
    let Path(season_id) = season_id?;
    Ok(ApiResponse::success(state.matches.list(season_id).await?))
}

/// POST /seasons/:season_id/matches - schedule a fixture (admin)
pub async fn match_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    season_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ScheduleMatch>, JsonRejection>,
) -> ApiResult<Match> {
    let Path(season_id) = season_id?;
    let Json(input) = body?;
    let created = state.matches.schedule(&ctx, season_id, input).await?;
    Ok(ApiResponse::created(created))
}

/// GET /matches/:match_id/details
pub async fn match_details(
    State(state): State<AppState>,
    match_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Match> {
    let Path(match_id) = match_id?;
    Ok(ApiResponse::success(state.matches.get(match_id).await?))
}

/// POST /matches/:match_id/change-status
pub async fn match_change_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    match_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ChangeStatusBody>, JsonRejection>,
) -> ApiResult<Match> {
    let Path(match_id) = match_id?;
    let Json(body) = body?;
    let target: MatchStatus = parse_status(body.status.as_deref())?;
    let updated = state
        .matches
        .change_status(&ctx, match_id, target, body.note)
        .await?;
    Ok(ApiResponse::success(updated))
}

/// POST /matches/:match_id/assign-officials
pub async fn match_assign_officials(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    match_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AssignOfficials>, JsonRejection>,
) -> ApiResult<Match> {
    let Path(match_id) = match_id?;
    let Json(input) = body?;
    Ok(ApiResponse::success(
        state.matches.assign_officials(&ctx, match_id, input).await?,
    ))
}

/// POST /matches/:match_id/lineup-status
pub async fn match_lineup_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    match_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<LineupReview>, JsonRejection>,
) -> ApiResult<Match> {
    let Path(match_id) = match_id?;
    let Json(review) = body?;
    Ok(ApiResponse::success(
        state.matches.set_lineup_status(&ctx, match_id, review).await?,
    ))
}

/// POST /matches/:match_id/score
pub async fn match_score(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    match_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ScoreBody>, JsonRejection>,
) -> ApiResult<Match> {
    let Path(match_id) = match_id?;
    let Json(score) = body?;
    let updated = state
        .matches
        .record_score(&ctx, match_id, score.home_score, score.away_score)
        .await?;
    Ok(ApiResponse::success(updated))
}
