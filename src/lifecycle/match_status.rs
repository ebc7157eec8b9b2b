use super::machine::{Edge, Lifecycle};
use crate::auth::Role;

status_vocabulary! {
    /// Match lifecycle. Forward-only: every fixture ends at `COMPLETED`.
    MatchStatus ("match") {
        Scheduled => "SCHEDULED",
        Preparing => "PREPARING",
        Ready => "READY",
        InProgress => "IN_PROGRESS",
        Finished => "FINISHED",
        Reported => "REPORTED",
        Completed => "COMPLETED",
    }
}

status_vocabulary! {
    /// Review state of a team's submitted lineup
    LineupStatus ("lineup") {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

const ADMIN: &[Role] = &[Role::Admin];
const ADMIN_OR_REFEREE: &[Role] = &[Role::Admin, Role::Referee];

static MATCH_EDGES: &[Edge<MatchStatus>] = &[
    // Also requires a main referee; checked by the match service.
    Edge { from: MatchStatus::Scheduled, to: MatchStatus::Preparing, roles: ADMIN },
    Edge { from: MatchStatus::Preparing, to: MatchStatus::Ready, roles: ADMIN },
    Edge { from: MatchStatus::Ready, to: MatchStatus::InProgress, roles: ADMIN_OR_REFEREE },
    Edge { from: MatchStatus::InProgress, to: MatchStatus::Finished, roles: ADMIN_OR_REFEREE },
    Edge { from: MatchStatus::Finished, to: MatchStatus::Reported, roles: ADMIN_OR_REFEREE },
    Edge { from: MatchStatus::Reported, to: MatchStatus::Completed, roles: ADMIN },
];

impl Lifecycle for MatchStatus {
    const ENTITY: &'static str = "match";

    fn edges() -> &'static [Edge<Self>] {
        MATCH_EDGES
    }
}

impl MatchStatus {
    /// Officials may be (re)assigned until the match is ready
    pub fn accepts_official_assignment(&self) -> bool {
        matches!(self, MatchStatus::Scheduled | MatchStatus::Preparing)
    }

    /// Lineups are reviewed between assignment and kickoff
    pub fn accepts_lineup_review(&self) -> bool {
        matches!(self, MatchStatus::Preparing | MatchStatus::Ready)
    }

    pub fn accepts_score(&self) -> bool {
        matches!(self, MatchStatus::InProgress | MatchStatus::Finished)
    }

    /// Play is over; supervisor reports may be filed
    pub fn is_played(&self) -> bool {
        matches!(
            self,
            MatchStatus::Finished | MatchStatus::Reported | MatchStatus::Completed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::guard;

    #[test]
    fn table_is_a_single_forward_chain() {
        for pair in MatchStatus::ALL.windows(2) {
            assert!(guard(pair[0], pair[1], &[Role::Admin]).is_ok(), "{} -> {}", pair[0], pair[1]);
        }
        assert_eq!(MATCH_EDGES.len(), MatchStatus::ALL.len() - 1);
    }

    #[test]
    fn no_back_edges() {
        for (i, from) in MatchStatus::ALL.iter().enumerate() {
            for to in &MatchStatus::ALL[..=i] {
                assert!(guard(*from, *to, &[Role::Admin]).is_err());
            }
        }
    }

    #[test]
    fn only_completed_is_terminal() {
        let terminal: Vec<_> = MatchStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&MatchStatus::Completed]);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("IN_PROGRESS".parse::<MatchStatus>().unwrap(), MatchStatus::InProgress);
        assert!("in_progress".parse::<MatchStatus>().is_err());
        assert_eq!(
            serde_json::to_value(MatchStatus::InProgress).unwrap(),
            serde_json::json!("IN_PROGRESS")
        );
    }
}
