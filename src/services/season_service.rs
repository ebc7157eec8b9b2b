use std::sync::Arc;

use crate::auth::AuthContext;
use crate::database::LeagueStore;
use crate::models::{NewSeason, Season};

use super::error::{LifecycleError, LifecycleResult};

#[derive(Clone)]
pub struct SeasonService {
    store: Arc<dyn LeagueStore>,
    default_required_team_count: i32,
}

impl SeasonService {
    pub fn new(store: Arc<dyn LeagueStore>, default_required_team_count: i32) -> Self {
        Self {
            store,
            default_required_team_count,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: NewSeason) -> LifecycleResult<Season> {
        if !ctx.is_admin() {
            return Err(LifecycleError::Forbidden("Only admins can create seasons".to_string()));
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(LifecycleError::Validation("name is required".to_string()));
        }

        let required = input
            .required_team_count
            .unwrap_or(self.default_required_team_count);
        if required < 0 {
            return Err(LifecycleError::Validation(
                "requiredTeamCount must not be negative".to_string(),
            ));
        }

        let season = self.store.insert_season(name, required).await?;
        tracing::info!(season_id = season.id, required, "Created season {}", season.name);
        Ok(season)
    }

    pub async fn get(&self, id: i64) -> LifecycleResult<Season> {
        self.store
            .find_season(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Season", id))
    }
}
