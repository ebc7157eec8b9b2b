use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lifecycle::RegistrationStatus;

/// A team's registration for one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTeamRegistration {
    pub id: i64,
    pub season_id: i64,
    pub team_id: i64,
    pub status: RegistrationStatus,
    /// Free-form document data (stadium, kits, contacts, ...)
    pub submission_data: Option<Value>,
    pub reviewer_note: Option<String>,
    pub reviewed_by: Option<i64>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub season_id: i64,
    pub team_id: i64,
}

/// Keys a submission must fill before it can be reviewed
pub const REQUIRED_SUBMISSION_KEYS: &[&str] = &["stadium", "kits"];

/// Returns the first required key that is missing or blank
pub fn missing_submission_key(data: Option<&Value>) -> Option<&'static str> {
    let Some(Value::Object(map)) = data else {
        return REQUIRED_SUBMISSION_KEYS.first().copied();
    };

    REQUIRED_SUBMISSION_KEYS.iter().copied().find(|key| {
        match map.get(*key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Object(o)) => o.is_empty(),
            Some(Value::Array(a)) => a.is_empty(),
            Some(_) => false,
        }
    })
}

/// Season-level registration aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatistics {
    pub status_counts: BTreeMap<String, i64>,
    pub scheduling_ready: bool,
    pub approved_count: i64,
    pub required_count: i64,
}

impl RegistrationStatistics {
    pub fn from_counts(counts: &[(RegistrationStatus, i64)], required_count: i64) -> Self {
        let mut status_counts: BTreeMap<String, i64> = RegistrationStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();

        for (status, count) in counts {
            *status_counts.entry(status.as_str().to_string()).or_insert(0) += count;
        }

        let approved_count = status_counts
            .get(RegistrationStatus::Approved.as_str())
            .copied()
            .unwrap_or(0);

        Self {
            status_counts,
            scheduling_ready: approved_count >= required_count,
            approved_count,
            required_count,
        }
    }
}
