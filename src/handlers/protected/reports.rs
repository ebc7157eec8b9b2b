use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::database::ReportFilter;
use crate::lifecycle::ReviewStatus;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{ReportInput, SupervisorReport};
use crate::services::ReportReview;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub match_id: Option<i64>,
    pub review_status: Option<String>,
}

/// POST /matches/:match_id/supervisor-reports
pub async fn report_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    match_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ReportInput>, JsonRejection>,
) -> ApiResult<SupervisorReport> {
    let Path(match_id) = match_id?;
    let Json(input) = body?;
    let report = state.reports.submit(&ctx, match_id, input).await?;
    Ok(ApiResponse::created(report))
}

/// GET /matches/:match_id/supervisor-reports
pub async fn match_reports_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    match_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<SupervisorReport>> {
    let Path(match_id) = match_id?;
    Ok(ApiResponse::success(
        state.reports.list_for_match(&ctx, match_id).await?,
    ))
}

/// GET /supervisor-reports?matchId=&reviewStatus= (admin)
pub async fn reports_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Vec<SupervisorReport>> {
    let Query(query) = query?;
    let review_status = query
        .review_status
        .as_deref()
        .map(str::parse::<ReviewStatus>)
        .transpose()?;
    let filter = ReportFilter {
        match_id: query.match_id,
        review_status,
    };
    Ok(ApiResponse::success(state.reports.list(&ctx, filter).await?))
}

/// PUT /supervisor-reports/:report_id - resubmit after a change request
pub async fn report_put(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    report_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ReportInput>, JsonRejection>,
) -> ApiResult<SupervisorReport> {
    let Path(report_id) = report_id?;
    let Json(input) = body?;
    Ok(ApiResponse::success(
        state.reports.resubmit(&ctx, report_id, input).await?,
    ))
}

/// POST /supervisor-reports/:report_id/review (admin)
pub async fn report_review(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    report_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ReportReview>, JsonRejection>,
) -> ApiResult<SupervisorReport> {
    let Path(report_id) = report_id?;
    let Json(review) = body?;
    Ok(ApiResponse::success(
        state.reports.review(&ctx, report_id, review).await?,
    ))
}
