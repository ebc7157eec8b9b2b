use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{LineupStatus, MatchStatus};

/// A scheduled fixture and its lifecycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i64,
    pub season_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub kickoff_at: DateTime<Utc>,
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub main_referee_id: Option<i64>,
    pub assistant_referee1_id: Option<i64>,
    pub assistant_referee2_id: Option<i64>,
    pub fourth_official_id: Option<i64>,
    pub supervisor_id: Option<i64>,
    pub home_lineup_status: LineupStatus,
    pub away_lineup_status: LineupStatus,
    pub home_lineup_rejection_reason: Option<String>,
    pub away_lineup_rejection_reason: Option<String>,
    pub status_note: Option<String>,
    pub status_changed_by: Option<i64>,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn officials_assigned(&self) -> bool {
        self.main_referee_id.is_some()
    }

    pub fn is_main_referee(&self, user_id: i64) -> bool {
        self.main_referee_id == Some(user_id)
    }

    pub fn is_supervisor(&self, user_id: i64) -> bool {
        self.supervisor_id == Some(user_id)
    }

    pub fn apply_officials(&mut self, officials: &Officials) {
        self.main_referee_id = Some(officials.main_referee_id);
        self.assistant_referee1_id = officials.assistant_referee1_id;
        self.assistant_referee2_id = officials.assistant_referee2_id;
        self.fourth_official_id = officials.fourth_official_id;
        self.supervisor_id = officials.supervisor_id;
    }

    pub fn set_lineup(&mut self, side: TeamSide, status: LineupStatus, reason: Option<String>) {
        let reason = if status == LineupStatus::Rejected { reason } else { None };
        match side {
            TeamSide::Home => {
                self.home_lineup_status = status;
                self.home_lineup_rejection_reason = reason;
            }
            TeamSide::Away => {
                self.away_lineup_status = status;
                self.away_lineup_rejection_reason = reason;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub season_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub kickoff_at: DateTime<Utc>,
}

/// Officials assignment; the main referee is mandatory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officials {
    pub main_referee_id: i64,
    pub assistant_referee1_id: Option<i64>,
    pub assistant_referee2_id: Option<i64>,
    pub fourth_official_id: Option<i64>,
    pub supervisor_id: Option<i64>,
}

impl Officials {
    /// First user id that occupies more than one slot
    pub fn duplicate(&self) -> Option<i64> {
        let ids: Vec<i64> = [
            Some(self.main_referee_id),
            self.assistant_referee1_id,
            self.assistant_referee2_id,
            self.fourth_official_id,
            self.supervisor_id,
        ]
        .into_iter()
        .flatten()
        .collect();

        ids.iter()
            .enumerate()
            .find(|(i, id)| ids[i + 1..].contains(id))
            .map(|(_, id)| *id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officials(assistant: Option<i64>, supervisor: Option<i64>) -> Officials {
        Officials {
            main_referee_id: 7,
            assistant_referee1_id: assistant,
            assistant_referee2_id: None,
            fourth_official_id: None,
            supervisor_id: supervisor,
        }
    }

    #[test]
    fn detects_official_in_two_slots() {
        assert_eq!(officials(Some(8), Some(9)).duplicate(), None);
        assert_eq!(officials(Some(7), None).duplicate(), Some(7));
        assert_eq!(officials(Some(8), Some(8)).duplicate(), Some(8));
    }
}
