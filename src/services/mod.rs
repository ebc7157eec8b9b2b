pub mod audit;
pub mod error;
pub mod match_service;
pub mod registration_service;
pub mod report_service;
pub mod season_service;

pub use audit::AuditLog;
pub use error::{LifecycleError, LifecycleResult};
pub use match_service::{AssignOfficials, LineupReview, MatchService, ScheduleMatch};
pub use registration_service::{
    InvitationBatch, RegistrationChange, RegistrationOutcome, RegistrationService,
};
pub use report_service::{ReportReview, ReportService};
pub use season_service::SeasonService;
