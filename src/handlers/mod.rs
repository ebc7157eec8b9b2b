// handlers/mod.rs - HTTP handlers grouped by access tier
//
// Public handlers need no token. Protected handlers run behind
// `jwt_auth_middleware` and receive the caller's `AuthContext` as an
// extension, which they hand to the services unchanged.

pub mod protected;
pub mod public;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Parses an optional JSON body; an empty body yields `T::default()`
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(format!("Invalid JSON body: {}", e)))
}

/// Parses a status string from a request, rejecting unknown values with 400
pub(crate) fn parse_status<S>(value: Option<&str>) -> Result<S, ApiError>
where
    S: std::str::FromStr<Err = crate::lifecycle::UnknownStatus>,
{
    let value = value.ok_or_else(|| ApiError::validation_error("status is required"))?;
    Ok(value.parse::<S>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::MatchStatus;
    use crate::services::RegistrationChange;

    #[test]
    fn empty_body_is_default() {
        let change: RegistrationChange = optional_json(&Bytes::from_static(b"  ")).unwrap();
        assert!(change.note.is_none());

        let change: RegistrationChange =
            optional_json(&Bytes::from_static(br#"{"note":"ok"}"#)).unwrap();
        assert_eq!(change.note.as_deref(), Some("ok"));

        assert!(optional_json::<RegistrationChange>(&Bytes::from_static(b"{")).is_err());
    }

    #[test]
    fn unknown_status_is_validation_error() {
        let err = parse_status::<MatchStatus>(Some("WARMING_UP")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = parse_status::<MatchStatus>(None).unwrap_err();
        assert_eq!(err.message(), "status is required");

        assert_eq!(parse_status::<MatchStatus>(Some("READY")).unwrap(), MatchStatus::Ready);
    }
}
