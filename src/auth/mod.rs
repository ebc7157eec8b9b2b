use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims issued by the league identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub team_ids: Vec<i64>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        user_id: i64,
        roles: Vec<String>,
        permissions: Vec<String>,
        team_ids: Vec<i64>,
        expiry_hours: u64,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: user_id.to_string(),
            roles,
            permissions,
            team_ids,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
    #[error("Token subject '{0}' is not a user id")]
    InvalidSubject(String),
    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// League roles carried in the `roles` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Referee,
    Supervisor,
    TeamAdmin,
    Player,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "referee" => Some(Role::Referee),
            "supervisor" => Some(Role::Supervisor),
            "team_admin" | "team-admin" => Some(Role::TeamAdmin),
            "player" => Some(Role::Player),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Referee => "referee",
            Role::Supervisor => "supervisor",
            Role::TeamAdmin => "team_admin",
            Role::Player => "player",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified caller identity, passed explicitly into every service call.
///
/// Token roles say what a user *may* be; whether they act as referee,
/// supervisor or team admin on a particular row is decided by the services
/// against that row's assignments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: i64,
    pub roles: Vec<Role>,
    pub permissions: Vec<String>,
    pub team_ids: Vec<i64>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn manages_team(&self, team_id: i64) -> bool {
        self.has_role(Role::TeamAdmin) && self.team_ids.contains(&team_id)
    }
}

impl TryFrom<Claims> for AuthContext {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidSubject(claims.sub.clone()))?;

        let mut roles: Vec<Role> = Vec::new();
        for role in claims.roles.iter().filter_map(|r| Role::parse(r)) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Ok(Self {
            user_id,
            roles,
            permissions: claims.permissions,
            team_ids: claims.team_ids,
        })
    }
}
