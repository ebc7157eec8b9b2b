pub mod manager;
pub mod memory;
pub mod postgres;
pub mod store;

#[cfg(test)]
pub(crate) mod racing;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{LeagueStore, ReportFilter};
