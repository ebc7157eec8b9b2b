pub mod migrate;
pub mod ping;
pub mod token;
pub mod transitions;
