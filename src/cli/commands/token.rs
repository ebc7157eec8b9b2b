use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, Role};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "Numeric user id placed in the `sub` claim")]
    pub sub: i64,

    #[arg(long = "role", help = "Role to grant (repeatable): admin, referee, supervisor, team_admin, player")]
    pub roles: Vec<String>,

    #[arg(long = "permission", help = "Permission string to include (repeatable)")]
    pub permissions: Vec<String>,

    #[arg(long = "team", help = "Team id the user administers (repeatable)")]
    pub teams: Vec<i64>,

    #[arg(long, help = "Hours until expiry (defaults to the configured value)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if let Some(unknown) = args.roles.iter().find(|r| Role::parse(r).is_none()) {
        anyhow::bail!("unknown role '{}'", unknown);
    }

    let security = &config::config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(args.sub, args.roles, args.permissions, args.teams, hours)?;
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Token generated",
            Some(json!({ "token": token, "claims": claims })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
