use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::{AuthContext, Role};
use crate::database::{DatabaseError, LeagueStore};
use crate::lifecycle::{guard, RegistrationStatus};
use crate::models::registration::missing_submission_key;
use crate::models::{NewRegistration, RegistrationStatistics, SeasonTeamRegistration};

use super::audit::AuditLog;
use super::error::{LifecycleError, LifecycleResult};

/// Body of the generic change-status call and of its shortcuts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationChange {
    pub note: Option<String>,
    pub submission_data: Option<Value>,
}

/// Updated registration plus whatever the transition computed on the way
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    #[serde(flatten)]
    pub registration: SeasonTeamRegistration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_accepted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_declined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling_ready: Option<bool>,
}

impl RegistrationOutcome {
    fn plain(registration: SeasonTeamRegistration) -> Self {
        Self {
            registration,
            already_accepted: None,
            already_declined: None,
            approved_count: None,
            required_count: None,
            scheduling_ready: None,
        }
    }

    /// Flags the accept/decline responses so retried calls are recognisable
    fn with_repeat_flag(mut self, target: RegistrationStatus, repeated: bool) -> Self {
        match target {
            RegistrationStatus::Accepted => self.already_accepted = Some(repeated),
            RegistrationStatus::Declined => self.already_declined = Some(repeated),
            _ => {}
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationBatch {
    pub invited_count: usize,
    pub registrations: Vec<SeasonTeamRegistration>,
    /// Drafts another writer changed while the batch ran; left as they are
    pub skipped_ids: Vec<i64>,
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn LeagueStore>,
    audit: AuditLog,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn LeagueStore>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Creates a `DRAFT_INVITE` for a team; invitations go out in a batch later.
    pub async fn invite(
        &self,
        ctx: &AuthContext,
        season_id: i64,
        team_id: i64,
    ) -> LifecycleResult<SeasonTeamRegistration> {
        require_admin(ctx, "Only admins can invite teams")?;
        self.season_required_count(season_id).await?;

        match self
            .store
            .insert_registration(&NewRegistration { season_id, team_id })
            .await
        {
            Ok(row) => Ok(row),
            Err(DatabaseError::Duplicate(_)) => Err(LifecycleError::Conflict(format!(
                "Team {} is already registered for season {}",
                team_id, season_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves every `DRAFT_INVITE` of the season to `INVITED`.
    ///
    /// Drafts that lose a concurrent write are skipped and reported in
    /// `skipped_ids`; the rest of the batch still goes out.
    pub async fn send_invitations(&self, ctx: &AuthContext, season_id: i64) -> LifecycleResult<InvitationBatch> {
        require_admin(ctx, "Only admins can send invitations")?;
        self.season_required_count(season_id).await?;

        let drafts: Vec<SeasonTeamRegistration> = self
            .store
            .list_registrations(season_id)
            .await?
            .into_iter()
            .filter(|r| r.status == RegistrationStatus::DraftInvite)
            .collect();

        let mut registrations = Vec::with_capacity(drafts.len());
        let mut skipped_ids = Vec::new();
        for draft in drafts {
            let id = draft.id;
            match self
                .apply(ctx, draft, RegistrationStatus::Invited, RegistrationChange::default())
                .await
            {
                Ok(outcome) => registrations.push(outcome.registration),
                Err(LifecycleError::Conflict(reason)) => {
                    tracing::warn!(season_id, registration_id = id, "Skipped invitation: {}", reason);
                    skipped_ids.push(id);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            season_id,
            invited = registrations.len(),
            skipped = skipped_ids.len(),
            "Sent registration invitations"
        );
        Ok(InvitationBatch {
            invited_count: registrations.len(),
            registrations,
            skipped_ids,
        })
    }

    pub async fn get(&self, id: i64) -> LifecycleResult<SeasonTeamRegistration> {
        self.store
            .find_registration(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Registration", id))
    }

    pub async fn list(&self, season_id: i64) -> LifecycleResult<Vec<SeasonTeamRegistration>> {
        self.season_required_count(season_id).await?;
        Ok(self.store.list_registrations(season_id).await?)
    }

    pub async fn change_status(
        &self,
        ctx: &AuthContext,
        id: i64,
        target: RegistrationStatus,
        change: RegistrationChange,
    ) -> LifecycleResult<RegistrationOutcome> {
        let row = self.get(id).await?;

        // Repeated accept/decline is a no-op success for client retries
        let repeat = matches!(
            target,
            RegistrationStatus::Accepted | RegistrationStatus::Declined
        ) && row.status == target;
        if repeat {
            if acting_roles(ctx, &row).is_empty() {
                return Err(LifecycleError::Forbidden(format!(
                    "Not permitted to act on registration {}",
                    id
                )));
            }
            return Ok(RegistrationOutcome::plain(row).with_repeat_flag(target, true));
        }

        self.apply(ctx, row, target, change).await
    }

    pub async fn accept(&self, ctx: &AuthContext, id: i64, change: RegistrationChange) -> LifecycleResult<RegistrationOutcome> {
        self.change_status(ctx, id, RegistrationStatus::Accepted, change).await
    }

    pub async fn decline(&self, ctx: &AuthContext, id: i64, change: RegistrationChange) -> LifecycleResult<RegistrationOutcome> {
        self.change_status(ctx, id, RegistrationStatus::Declined, change).await
    }

    pub async fn submit(&self, ctx: &AuthContext, id: i64, change: RegistrationChange) -> LifecycleResult<RegistrationOutcome> {
        self.change_status(ctx, id, RegistrationStatus::Submitted, change).await
    }

    pub async fn approve(&self, ctx: &AuthContext, id: i64, change: RegistrationChange) -> LifecycleResult<RegistrationOutcome> {
        self.change_status(ctx, id, RegistrationStatus::Approved, change).await
    }

    pub async fn reject(&self, ctx: &AuthContext, id: i64, change: RegistrationChange) -> LifecycleResult<RegistrationOutcome> {
        self.change_status(ctx, id, RegistrationStatus::Rejected, change).await
    }

    pub async fn request_change(&self, ctx: &AuthContext, id: i64, change: RegistrationChange) -> LifecycleResult<RegistrationOutcome> {
        self.change_status(ctx, id, RegistrationStatus::RequestChange, change).await
    }

    /// Read-your-writes aggregate; never cached
    pub async fn statistics(&self, season_id: i64) -> LifecycleResult<RegistrationStatistics> {
        let required = self.season_required_count(season_id).await?;
        let counts = self.store.count_registrations(season_id).await?;
        Ok(RegistrationStatistics::from_counts(&counts, required))
    }

    async fn apply(
        &self,
        ctx: &AuthContext,
        mut row: SeasonTeamRegistration,
        target: RegistrationStatus,
        change: RegistrationChange,
    ) -> LifecycleResult<RegistrationOutcome> {
        let from = row.status;
        guard(from, target, &acting_roles(ctx, &row))?;

        let now = Utc::now();
        if target == RegistrationStatus::Submitted {
            let data = change.submission_data.or_else(|| row.submission_data.take());
            if let Some(key) = missing_submission_key(data.as_ref()) {
                return Err(LifecycleError::Transition(format!(
                    "Cannot move to SUBMITTED: submission is missing '{}'",
                    key
                )));
            }
            row.submission_data = data;
            row.submitted_at = Some(now);
        }
        if target.is_review_outcome() {
            row.reviewed_by = Some(ctx.user_id);
            row.reviewed_at = Some(now);
            row.reviewer_note = change.note;
        }
        row.status = target;

        let written = self
            .store
            .update_registration(&row)
            .await?
            .ok_or_else(|| LifecycleError::modified_concurrently("Registration", row.id))?;
        self.audit.transition("registration", written.id, from, target, ctx.user_id);

        let mut outcome = RegistrationOutcome::plain(written).with_repeat_flag(target, false);
        if target == RegistrationStatus::Approved {
            let stats = self.statistics(outcome.registration.season_id).await?;
            outcome.approved_count = Some(stats.approved_count);
            outcome.required_count = Some(stats.required_count);
            outcome.scheduling_ready = Some(stats.scheduling_ready);
        }
        Ok(outcome)
    }

    async fn season_required_count(&self, season_id: i64) -> LifecycleResult<i64> {
        let season = self
            .store
            .find_season(season_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Season", season_id))?;
        Ok(i64::from(season.required_team_count))
    }
}

fn require_admin(ctx: &AuthContext, message: &str) -> LifecycleResult<()> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(LifecycleError::Forbidden(message.to_string()))
    }
}

/// Admin from the token; team admin only for teams listed in the token
pub fn acting_roles(ctx: &AuthContext, row: &SeasonTeamRegistration) -> Vec<Role> {
    let mut roles = Vec::new();
    if ctx.is_admin() {
        roles.push(Role::Admin);
    }
    if ctx.manages_team(row.team_id) {
        roles.push(Role::TeamAdmin);
    }
    roles
}
