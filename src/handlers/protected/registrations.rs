use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::lifecycle::RegistrationStatus;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{RegistrationStatistics, SeasonTeamRegistration};
use crate::services::{InvitationBatch, RegistrationChange, RegistrationOutcome};
use crate::state::AppState;

use crate::handlers::{optional_json, parse_status};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteBody {
    pub team_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationStatusBody {
    pub status: Option<String>,
    #[serde(flatten)]
    pub change: RegistrationChange,
}

/// GET /seasons/:season_id/registrations
pub async fn registrations_list(
    State(state): State<AppState>,
    season_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<SeasonTeamRegistration>> {
    let Path(season_id) = season_id?;
    Ok(ApiResponse::success(state.registrations.list(season_id).await?))
}

/// POST /seasons/:season_id/registrations - draft an invitation (admin)
pub async fn registration_invite(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    season_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<InviteBody>, JsonRejection>,
) -> ApiResult<SeasonTeamRegistration> {
    let Path(season_id) = season_id?;
    let Json(body) = body?;
    let created = state
        .registrations
        .invite(&ctx, season_id, body.team_id)
        .await?;
    Ok(ApiResponse::created(created))
}

/// POST /seasons/:season_id/registrations/send-invitations
pub async fn registrations_send_invitations(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    season_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<InvitationBatch> {
    let Path(season_id) = season_id?;
    Ok(ApiResponse::success(
        state.registrations.send_invitations(&ctx, season_id).await?,
    ))
}

/// GET /seasons/:season_id/registrations/statistics
pub async fn registrations_statistics(
    State(state): State<AppState>,
    season_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<RegistrationStatistics> {
    let Path(season_id) = season_id?;
    Ok(ApiResponse::success(state.registrations.statistics(season_id).await?))
}

/// GET /registrations/:id
pub async fn registration_get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<SeasonTeamRegistration> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.registrations.get(id).await?))
}

/// POST /registrations/:id/change-status
pub async fn registration_change_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let body: RegistrationStatusBody = optional_json(&body)?;
    let target: RegistrationStatus = parse_status(body.status.as_deref())?;
    let outcome = state
        .registrations
        .change_status(&ctx, id, target, body.change)
        .await?;
    Ok(ApiResponse::success(outcome))
}

/// POST /registrations/:id/accept
pub async fn registration_accept(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let change = optional_json(&body)?;
    Ok(ApiResponse::success(state.registrations.accept(&ctx, id, change).await?))
}

/// POST /registrations/:id/decline
pub async fn registration_decline(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let change = optional_json(&body)?;
    Ok(ApiResponse::success(state.registrations.decline(&ctx, id, change).await?))
}

/// POST /registrations/:id/submit
pub async fn registration_submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let change = optional_json(&body)?;
    Ok(ApiResponse::success(state.registrations.submit(&ctx, id, change).await?))
}

/// POST /registrations/:id/approve
pub async fn registration_approve(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let change = optional_json(&body)?;
    Ok(ApiResponse::success(state.registrations.approve(&ctx, id, change).await?))
}

/// POST /registrations/:id/reject
pub async fn registration_reject(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let change = optional_json(&body)?;
    Ok(ApiResponse::success(state.registrations.reject(&ctx, id, change).await?))
}

/// POST /registrations/:id/request-change
pub async fn registration_request_change(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<RegistrationOutcome> {
    let Path(id) = id?;
    let change = optional_json(&body)?;
    Ok(ApiResponse::success(
        state.registrations.request_change(&ctx, id, change).await?,
    ))
}
