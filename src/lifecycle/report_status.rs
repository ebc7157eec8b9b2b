use super::machine::{Edge, Lifecycle};
use crate::auth::Role;

status_vocabulary! {
    /// Admin review of a supervisor report
    ReviewStatus ("report") {
        Pending => "pending",
        Approved => "approve" | "approved",
        Rejected => "rejected" | "reject",
        RequestChanges => "request_changes" | "request_change",
    }
}

static REVIEW_EDGES: &[Edge<ReviewStatus>] = &[
    Edge { from: ReviewStatus::Pending, to: ReviewStatus::Approved, roles: &[Role::Admin] },
    Edge { from: ReviewStatus::Pending, to: ReviewStatus::Rejected, roles: &[Role::Admin] },
    Edge { from: ReviewStatus::Pending, to: ReviewStatus::RequestChanges, roles: &[Role::Admin] },
    Edge { from: ReviewStatus::RequestChanges, to: ReviewStatus::Pending, roles: &[Role::Supervisor] },
];

impl Lifecycle for ReviewStatus {
    const ENTITY: &'static str = "report";

    fn edges() -> &'static [Edge<Self>] {
        REVIEW_EDGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::guard;

    #[test]
    fn approve_is_canonical_and_approved_is_accepted() {
        assert_eq!(ReviewStatus::Approved.to_string(), "approve");
        assert_eq!(serde_json::to_value(ReviewStatus::Approved).unwrap(), serde_json::json!("approve"));

        assert_eq!("approved".parse::<ReviewStatus>().unwrap(), ReviewStatus::Approved);
        let parsed: ReviewStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(parsed, ReviewStatus::Approved);
    }

    #[test]
    fn review_happens_once() {
        assert!(guard(ReviewStatus::Approved, ReviewStatus::Rejected, &[Role::Admin]).is_err());
        assert!(guard(ReviewStatus::Pending, ReviewStatus::Approved, &[Role::Supervisor]).is_err());
    }
}
