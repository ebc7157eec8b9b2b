// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here extracts `Extension<AuthContext>` inserted by
// `jwt_auth_middleware` and passes it to the service it calls.

pub mod auth;
pub mod matches;
pub mod registrations;
pub mod reports;
pub mod seasons;
