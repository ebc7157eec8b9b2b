use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use crate::auth::Role;
use crate::cli::OutputFormat;
use crate::lifecycle::{allowed_targets, Lifecycle, MatchStatus, RegistrationStatus, ReviewStatus};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Entity {
    Match,
    Registration,
    Report,
}

#[derive(Debug, Args)]
pub struct TransitionsArgs {
    #[arg(value_enum)]
    pub entity: Entity,

    #[arg(long, help = "Only show edges this role may take")]
    pub role: Option<String>,
}

pub fn handle(args: TransitionsArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let role = args
        .role
        .as_deref()
        .map(|r| Role::parse(r).ok_or_else(|| anyhow::anyhow!("unknown role '{}'", r)))
        .transpose()?;

    let rows = match args.entity {
        Entity::Match => table(MatchStatus::ALL, role),
        Entity::Registration => table(RegistrationStatus::ALL, role),
        Entity::Report => table(ReviewStatus::ALL, role),
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&Value::Array(rows))?),
        OutputFormat::Text => {
            for row in &rows {
                println!(
                    "{:<16} -> {:<16} [{}]",
                    row["from"].as_str().unwrap_or_default(),
                    row["to"].as_str().unwrap_or_default(),
                    row["roles"]
                        .as_array()
                        .map(|roles| {
                            roles
                                .iter()
                                .filter_map(Value::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

/// One row per edge, optionally restricted to what `role` may take
fn table<S: Lifecycle>(states: &[S], role: Option<Role>) -> Vec<Value> {
    let mut rows = Vec::new();
    for &from in states {
        let targets = match role {
            Some(role) => allowed_targets(from, &[role]),
            None => S::edges().iter().filter(|e| e.from == from).map(|e| e.to).collect(),
        };
        for to in targets {
            let roles: Vec<&str> = S::edges()
                .iter()
                .filter(|e| e.from == from && e.to == to)
                .flat_map(|e| e.roles.iter().map(Role::as_str))
                .collect();
            rows.push(json!({ "from": from.to_string(), "to": to.to_string(), "roles": roles }));
        }
    }
    rows
}
