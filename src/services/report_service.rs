use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::auth::{AuthContext, Role};
use crate::database::{DatabaseError, LeagueStore, ReportFilter};
use crate::lifecycle::{guard, ReviewStatus};
use crate::models::{Match, NewSupervisorReport, ReportInput, SupervisorReport};

use super::audit::AuditLog;
use super::error::{LifecycleError, LifecycleResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReview {
    #[serde(alias = "status")]
    pub review_status: ReviewStatus,
    #[serde(alias = "note")]
    pub review_note: Option<String>,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn LeagueStore>,
    audit: AuditLog,
}

impl ReportService {
    pub fn new(store: Arc<dyn LeagueStore>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Files the supervisor's report for a played match
    pub async fn submit(
        &self,
        ctx: &AuthContext,
        match_id: i64,
        input: ReportInput,
    ) -> LifecycleResult<SupervisorReport> {
        check_ratings(&input)?;

        let row = self.find_match(match_id).await?;
        if !(ctx.has_role(Role::Supervisor) && row.is_supervisor(ctx.user_id)) {
            return Err(LifecycleError::Forbidden(
                "Only the assigned supervisor can submit a report for this match".to_string(),
            ));
        }
        if !row.status.is_played() {
            return Err(LifecycleError::Transition(format!(
                "Cannot submit a report before the match is finished (current: {})",
                row.status
            )));
        }

        let new = NewSupervisorReport {
            match_id,
            supervisor_id: ctx.user_id,
            input,
        };
        match self.store.insert_report(&new).await {
            Ok(report) => {
                tracing::info!(report_id = report.id, match_id, "Supervisor report submitted");
                Ok(report)
            }
            Err(DatabaseError::Duplicate(_)) => Err(LifecycleError::Conflict(
                "Supervisor report already submitted for this match".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: i64) -> LifecycleResult<SupervisorReport> {
        self.store
            .find_report(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Report", id))
    }

    /// Admin decision on a pending report
    pub async fn review(
        &self,
        ctx: &AuthContext,
        id: i64,
        review: ReportReview,
    ) -> LifecycleResult<SupervisorReport> {
        let mut report = self.get(id).await?;
        let from = report.review_status;
        guard(from, review.review_status, &acting_roles(ctx, &report))?;

        report.review_status = review.review_status;
        report.review_note = review.review_note;
        report.reviewed_by = Some(ctx.user_id);
        report.reviewed_at = Some(Utc::now());

        let written = self.write(&report).await?;
        self.audit.transition("report", id, from, written.review_status, ctx.user_id);
        Ok(written)
    }

    /// Supervisor answers a change request with a corrected report
    pub async fn resubmit(
        &self,
        ctx: &AuthContext,
        id: i64,
        input: ReportInput,
    ) -> LifecycleResult<SupervisorReport> {
        check_ratings(&input)?;

        let mut report = self.get(id).await?;
        let from = report.review_status;
        guard(from, ReviewStatus::Pending, &acting_roles(ctx, &report))?;

        report.apply_input(&input);
        report.review_status = ReviewStatus::Pending;

        let written = self.write(&report).await?;
        self.audit.transition("report", id, from, written.review_status, ctx.user_id);
        Ok(written)
    }

    pub async fn list(&self, ctx: &AuthContext, filter: ReportFilter) -> LifecycleResult<Vec<SupervisorReport>> {
        if !ctx.is_admin() {
            return Err(LifecycleError::Forbidden("Only admins can list reports".to_string()));
        }
        Ok(self.store.list_reports(&filter).await?)
    }

    pub async fn list_for_match(&self, ctx: &AuthContext, match_id: i64) -> LifecycleResult<Vec<SupervisorReport>> {
        let row = self.find_match(match_id).await?;
        if !(ctx.is_admin() || row.is_supervisor(ctx.user_id)) {
            return Err(LifecycleError::Forbidden(
                "Not permitted to view reports for this match".to_string(),
            ));
        }
        let filter = ReportFilter {
            match_id: Some(match_id),
            review_status: None,
        };
        Ok(self.store.list_reports(&filter).await?)
    }

    async fn find_match(&self, match_id: i64) -> LifecycleResult<Match> {
        self.store
            .find_match(match_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Match", match_id))
    }

    async fn write(&self, report: &SupervisorReport) -> LifecycleResult<SupervisorReport> {
        self.store
            .update_report(report)
            .await?
            .ok_or_else(|| LifecycleError::modified_concurrently("Report", report.id))
    }
}

fn check_ratings(input: &ReportInput) -> LifecycleResult<()> {
    match input.invalid_rating() {
        Some(field) => Err(LifecycleError::Validation(format!(
            "{} must be between 1 and 10",
            field
        ))),
        None => Ok(()),
    }
}

/// Admin from the token; supervisor only for the report's own author
pub fn acting_roles(ctx: &AuthContext, report: &SupervisorReport) -> Vec<Role> {
    let mut roles = Vec::new();
    if ctx.is_admin() {
        roles.push(Role::Admin);
    }
    if ctx.has_role(Role::Supervisor) && report.supervisor_id == ctx.user_id {
        roles.push(Role::Supervisor);
    }
    roles
}
