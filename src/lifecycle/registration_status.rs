use super::machine::{Edge, Lifecycle};
use crate::auth::Role;

status_vocabulary! {
    /// Season-team registration lifecycle. `REQUEST_CHANGE -> SUBMITTED`
    /// is the only cycle.
    RegistrationStatus ("registration") {
        DraftInvite => "DRAFT_INVITE",
        Invited => "INVITED",
        Accepted => "ACCEPTED",
        Declined => "DECLINED",
        Submitted => "SUBMITTED",
        RequestChange => "REQUEST_CHANGE",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

const ADMIN: &[Role] = &[Role::Admin];
const TEAM: &[Role] = &[Role::TeamAdmin, Role::Admin];

static REGISTRATION_EDGES: &[Edge<RegistrationStatus>] = &[
    Edge { from: RegistrationStatus::DraftInvite, to: RegistrationStatus::Invited, roles: ADMIN },
    Edge { from: RegistrationStatus::Invited, to: RegistrationStatus::Accepted, roles: TEAM },
    Edge { from: RegistrationStatus::Invited, to: RegistrationStatus::Declined, roles: TEAM },
    Edge { from: RegistrationStatus::Accepted, to: RegistrationStatus::Submitted, roles: TEAM },
    Edge { from: RegistrationStatus::Submitted, to: RegistrationStatus::Approved, roles: ADMIN },
    Edge { from: RegistrationStatus::Submitted, to: RegistrationStatus::Rejected, roles: ADMIN },
    Edge { from: RegistrationStatus::Submitted, to: RegistrationStatus::RequestChange, roles: ADMIN },
    Edge { from: RegistrationStatus::RequestChange, to: RegistrationStatus::Submitted, roles: TEAM },
];

impl Lifecycle for RegistrationStatus {
    const ENTITY: &'static str = "registration";

    fn edges() -> &'static [Edge<Self>] {
        REGISTRATION_EDGES
    }
}

impl RegistrationStatus {
    /// Transitions that stamp `reviewed_by` / `reviewed_at`
    pub fn is_review_outcome(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Accepted
                | RegistrationStatus::Declined
                | RegistrationStatus::Approved
                | RegistrationStatus::Rejected
                | RegistrationStatus::RequestChange
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::guard;

    #[test]
    fn approved_rejected_and_declined_are_terminal() {
        let terminal: Vec<_> = RegistrationStatus::ALL
            .iter()
            .copied()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                RegistrationStatus::Declined,
                RegistrationStatus::Approved,
                RegistrationStatus::Rejected
            ]
        );
    }

    #[test]
    fn resubmission_loop() {
        let roles = [Role::TeamAdmin];
        assert!(guard(RegistrationStatus::RequestChange, RegistrationStatus::Submitted, &roles).is_ok());
        assert!(guard(RegistrationStatus::Submitted, RegistrationStatus::RequestChange, &[Role::Admin]).is_ok());
    }

    #[test]
    fn team_cannot_approve_itself() {
        let err = guard(
            RegistrationStatus::Submitted,
            RegistrationStatus::Approved,
            &[Role::TeamAdmin],
        )
        .unwrap_err();
        assert!(err.is_authorization());
    }

    #[test]
    fn cannot_skip_acceptance() {
        assert!(guard(RegistrationStatus::Invited, RegistrationStatus::Submitted, &[Role::Admin]).is_err());
    }
}
