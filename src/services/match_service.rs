use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::{AuthContext, Role};
use crate::database::LeagueStore;
use crate::lifecycle::{guard, LineupStatus, MatchStatus};
use crate::models::{Match, NewMatch, Officials, TeamSide};

use super::audit::AuditLog;
use super::error::{LifecycleError, LifecycleResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMatch {
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub kickoff_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOfficials {
    pub main_referee_id: Option<i64>,
    pub assistant_referee1_id: Option<i64>,
    pub assistant_referee2_id: Option<i64>,
    pub fourth_official_id: Option<i64>,
    pub supervisor_id: Option<i64>,
}

impl AssignOfficials {
    fn validate(&self) -> LifecycleResult<Officials> {
        let main_referee_id = self
            .main_referee_id
            .ok_or_else(|| LifecycleError::Validation("mainRefereeId is required".to_string()))?;

        let officials = Officials {
            main_referee_id,
            assistant_referee1_id: self.assistant_referee1_id,
            assistant_referee2_id: self.assistant_referee2_id,
            fourth_official_id: self.fourth_official_id,
            supervisor_id: self.supervisor_id,
        };

        if let Some(dup) = officials.duplicate() {
            return Err(LifecycleError::Validation(format!(
                "User {} cannot hold more than one official role in the same match",
                dup
            )));
        }

        Ok(officials)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupReview {
    pub team_type: TeamSide,
    pub status: LineupStatus,
    pub rejection_reason: Option<String>,
}

/// Match lifecycle: load, guard, write with version check, return the row
#[derive(Clone)]
pub struct MatchService {
    store: Arc<dyn LeagueStore>,
    audit: AuditLog,
}

impl MatchService {
    pub fn new(store: Arc<dyn LeagueStore>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    pub async fn schedule(
        &self,
        ctx: &AuthContext,
        season_id: i64,
        input: ScheduleMatch,
    ) -> LifecycleResult<Match> {
        if !ctx.is_admin() {
            return Err(LifecycleError::Forbidden("Only admins can schedule matches".to_string()));
        }
        if input.home_team_id == input.away_team_id {
            return Err(LifecycleError::Validation(
                "homeTeamId and awayTeamId must differ".to_string(),
            ));
        }
        if self.store.find_season(season_id).await?.is_none() {
            return Err(LifecycleError::not_found("Season", season_id));
        }

        let created = self
            .store
            .insert_match(&NewMatch {
                season_id,
                home_team_id: input.home_team_id,
                away_team_id: input.away_team_id,
                kickoff_at: input.kickoff_at,
            })
            .await?;

        tracing::info!(match_id = created.id, season_id, "Scheduled match");
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> LifecycleResult<Match> {
        self.store
            .find_match(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Match", id))
    }

    pub async fn list(&self, season_id: i64) -> LifecycleResult<Vec<Match>> {
        if self.store.find_season(season_id).await?.is_none() {
            return Err(LifecycleError::not_found("Season", season_id));
        }
        Ok(self.store.list_matches(season_id).await?)
    }

    pub async fn change_status(
        &self,
        ctx: &AuthContext,
        id: i64,
        target: MatchStatus,
        note: Option<String>,
    ) -> LifecycleResult<Match> {
        let mut row = self.get(id).await?;
        let from = row.status;

        guard(from, target, &acting_roles(ctx, &row))?;

        if target == MatchStatus::Preparing && !row.officials_assigned() {
            return Err(LifecycleError::Transition(
                "Cannot move to PREPARING: officials must be assigned first".to_string(),
            ));
        }

        stamp_status(&mut row, target, note, ctx.user_id);
        let written = self.write(&row).await?;
        self.audit.transition("match", id, from, target, ctx.user_id);
        Ok(written)
    }

    /// Assigns officials; from `SCHEDULED` this is also the move to `PREPARING`.
    pub async fn assign_officials(
        &self,
        ctx: &AuthContext,
        id: i64,
        input: AssignOfficials,
    ) -> LifecycleResult<Match> {
        let officials = input.validate()?;
        if !ctx.is_admin() {
            return Err(LifecycleError::Forbidden("Only admins can assign officials".to_string()));
        }

        let mut row = self.get(id).await?;
        let from = row.status;
        if !from.accepts_official_assignment() {
            return Err(LifecycleError::Transition(format!(
                "Can only assign officials to SCHEDULED or PREPARING matches (current: {})",
                from
            )));
        }

        row.apply_officials(&officials);
        if from == MatchStatus::Scheduled {
            guard(from, MatchStatus::Preparing, &acting_roles(ctx, &row))?;
            stamp_status(
                &mut row,
                MatchStatus::Preparing,
                Some("Officials assigned".to_string()),
                ctx.user_id,
            );
        }

        let written = self.write(&row).await?;
        if from != written.status {
            self.audit.transition("match", id, from, written.status, ctx.user_id);
        }
        tracing::info!(match_id = id, main_referee_id = officials.main_referee_id, "Assigned officials");
        Ok(written)
    }

    pub async fn set_lineup_status(
        &self,
        ctx: &AuthContext,
        id: i64,
        review: LineupReview,
    ) -> LifecycleResult<Match> {
        let reason = review
            .rejection_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if review.status == LineupStatus::Rejected && reason.is_none() {
            return Err(LifecycleError::Validation(
                "rejectionReason is required when rejecting a lineup".to_string(),
            ));
        }

        let mut row = self.get(id).await?;
        let roles = acting_roles(ctx, &row);
        if !roles.contains(&Role::Admin) && !roles.contains(&Role::Supervisor) {
            return Err(LifecycleError::Forbidden(
                "Only admins or the assigned supervisor can review lineups".to_string(),
            ));
        }
        if !row.status.accepts_lineup_review() {
            return Err(LifecycleError::Transition(format!(
                "Can only review lineups for PREPARING or READY matches (current: {})",
                row.status
            )));
        }

        row.set_lineup(review.team_type, review.status, reason);
        self.write(&row).await
    }

    pub async fn record_score(
        &self,
        ctx: &AuthContext,
        id: i64,
        home_score: i32,
        away_score: i32,
    ) -> LifecycleResult<Match> {
        if home_score < 0 || away_score < 0 {
            return Err(LifecycleError::Validation("Scores must not be negative".to_string()));
        }

        let mut row = self.get(id).await?;
        let roles = acting_roles(ctx, &row);
        if !roles.contains(&Role::Admin) && !roles.contains(&Role::Referee) {
            return Err(LifecycleError::Forbidden(
                "Only admins or the main referee can record the score".to_string(),
            ));
        }
        if !row.status.accepts_score() {
            return Err(LifecycleError::Transition(format!(
                "Can only record the score of IN_PROGRESS or FINISHED matches (current: {})",
                row.status
            )));
        }

        row.home_score = Some(home_score);
        row.away_score = Some(away_score);
        self.write(&row).await
    }

    async fn write(&self, row: &Match) -> LifecycleResult<Match> {
        self.store
            .update_match(row)
            .await?
            .ok_or_else(|| LifecycleError::modified_concurrently("Match", row.id))
    }
}

/// Roles the caller holds on this particular match
pub fn acting_roles(ctx: &AuthContext, row: &Match) -> Vec<Role> {
    let mut roles = Vec::new();
    if ctx.is_admin() {
        roles.push(Role::Admin);
    }
    if ctx.has_role(Role::Referee) && row.is_main_referee(ctx.user_id) {
        roles.push(Role::Referee);
    }
    if ctx.has_role(Role::Supervisor) && row.is_supervisor(ctx.user_id) {
        roles.push(Role::Supervisor);
    }
    roles
}

fn stamp_status(row: &mut Match, status: MatchStatus, note: Option<String>, actor: i64) {
    row.status = status;
    row.status_note = note;
    row.status_changed_by = Some(actor);
    row.status_changed_at = Some(Utc::now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::racing::RacingStore;
    use crate::database::MemoryStore;
    use chrono::TimeZone;

    fn admin() -> AuthContext {
        AuthContext {
            user_id: 1,
            roles: vec![Role::Admin],
            permissions: vec![],
            team_ids: vec![],
        }
    }

    fn referee(user_id: i64) -> AuthContext {
        AuthContext {
            user_id,
            roles: vec![Role::Referee],
            permissions: vec![],
            team_ids: vec![],
        }
    }

    async fn setup() -> (MatchService, Match) {
        setup_on(Arc::new(MemoryStore::new())).await
    }

    async fn setup_on(store: Arc<dyn LeagueStore>) -> (MatchService, Match) {
        let season = store.insert_season("Spring", 4).await.unwrap();
        let service = MatchService::new(store, AuditLog::new(false));
        let created = service
            .schedule(
                &admin(),
                season.id,
                ScheduleMatch {
                    home_team_id: 10,
                    away_team_id: 11,
                    kickoff_at: Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap(),
                },
            )
            .await
            .unwrap();
        (service, created)
    }

    fn main_referee(id: i64) -> AssignOfficials {
        AssignOfficials {
            main_referee_id: Some(id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn assignment_moves_scheduled_to_preparing() {
        let (service, m) = setup().await;
        let updated = service.assign_officials(&admin(), m.id, main_referee(7)).await.unwrap();
        assert_eq!(updated.status, MatchStatus::Preparing);
        assert_eq!(updated.main_referee_id, Some(7));
        assert_eq!(updated.status_changed_by, Some(1));
    }

    #[tokio::test]
    async fn missing_main_referee_leaves_row_untouched() {
        let (service, m) = setup().await;
        let err = service
            .assign_officials(&admin(), m.id, AssignOfficials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(service.get(m.id).await.unwrap(), m);
    }

    #[tokio::test]
    async fn preparing_requires_officials() {
        let (service, m) = setup().await;
        let err = service
            .change_status(&admin(), m.id, MatchStatus::Preparing, None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Cannot move to PREPARING"));
    }

    #[tokio::test]
    async fn assigned_referee_runs_the_match() {
        let (service, m) = setup().await;
        service.assign_officials(&admin(), m.id, main_referee(7)).await.unwrap();
        service.change_status(&admin(), m.id, MatchStatus::Ready, None).await.unwrap();

        let err = service
            .change_status(&referee(8), m.id, MatchStatus::InProgress, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden(_)));

        let live = service
            .change_status(&referee(7), m.id, MatchStatus::InProgress, Some("kickoff".into()))
            .await
            .unwrap();
        assert_eq!(live.status, MatchStatus::InProgress);
        assert_eq!(live.status_note.as_deref(), Some("kickoff"));

        let scored = service.record_score(&referee(7), m.id, 2, 1).await.unwrap();
        assert_eq!((scored.home_score, scored.away_score), (Some(2), Some(1)));
    }

    #[tokio::test]
    async fn cannot_reassign_once_ready() {
        let (service, m) = setup().await;
        service.assign_officials(&admin(), m.id, main_referee(7)).await.unwrap();
        service.change_status(&admin(), m.id, MatchStatus::Ready, None).await.unwrap();
        let err = service
            .assign_officials(&admin(), m.id, main_referee(9))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Can only assign"));
    }

    #[tokio::test]
    async fn lineup_rejection_needs_reason() {
        let (service, m) = setup().await;
        service.assign_officials(&admin(), m.id, main_referee(7)).await.unwrap();

        let err = service
            .set_lineup_status(
                &admin(),
                m.id,
                LineupReview {
                    team_type: TeamSide::Away,
                    status: LineupStatus::Rejected,
                    rejection_reason: Some("   ".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        let updated = service
            .set_lineup_status(
                &admin(),
                m.id,
                LineupReview {
                    team_type: TeamSide::Away,
                    status: LineupStatus::Rejected,
                    rejection_reason: Some("Missing goalkeeper".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.away_lineup_status, LineupStatus::Rejected);
        assert_eq!(updated.home_lineup_status, LineupStatus::Pending);
    }

    #[tokio::test]
    async fn stale_write_is_a_conflict_and_leaves_the_match() {
        let store = Arc::new(RacingStore::new());
        let (service, m) = setup_on(store.clone()).await;

        store.contest(m.id);
        let err = service.assign_officials(&admin(), m.id, main_referee(7)).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Conflict(_)));

        let stored = service.get(m.id).await.unwrap();
        assert_eq!(stored.status, MatchStatus::Scheduled);
        assert_eq!(stored.main_referee_id, None);
        assert_eq!(stored.version, m.version + 1);
    }
}
