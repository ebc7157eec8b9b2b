use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::ReviewStatus;

pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

/// Post-match report filed by the assigned supervisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorReport {
    pub id: i64,
    pub match_id: i64,
    pub supervisor_id: i64,
    pub referee_rating: i32,
    pub assistant_referee_rating: i32,
    pub organization_rating: i32,
    pub incidents: String,
    pub disciplinary_flag: bool,
    pub review_status: ReviewStatus,
    pub review_note: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupervisorReport {
    pub fn apply_input(&mut self, input: &ReportInput) {
        self.referee_rating = input.referee_rating;
        self.assistant_referee_rating = input.assistant_referee_rating;
        self.organization_rating = input.organization_rating;
        self.incidents = input.incidents.clone();
        self.disciplinary_flag = input.disciplinary_flag;
    }
}

/// Report body as sent by the supervisor portal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub referee_rating: i32,
    pub assistant_referee_rating: i32,
    pub organization_rating: i32,
    #[serde(default)]
    pub incidents: String,
    #[serde(default)]
    pub disciplinary_flag: bool,
}

impl ReportInput {
    /// Name of the first rating outside 1..=10
    pub fn invalid_rating(&self) -> Option<&'static str> {
        [
            ("refereeRating", self.referee_rating),
            ("assistantRefereeRating", self.assistant_referee_rating),
            ("organizationRating", self.organization_rating),
        ]
        .into_iter()
        .find(|(_, value)| !RATING_RANGE.contains(value))
        .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone)]
pub struct NewSupervisorReport {
    pub match_id: i64,
    pub supervisor_id: i64,
    pub input: ReportInput,
}
