pub mod matches;
pub mod registration;
pub mod report;
pub mod season;

pub use matches::{Match, NewMatch, Officials, TeamSide};
pub use registration::{NewRegistration, RegistrationStatistics, SeasonTeamRegistration};
pub use report::{NewSupervisorReport, ReportInput, SupervisorReport};
pub use season::{NewSeason, Season};
