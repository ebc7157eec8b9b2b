pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "league")]
#[command(about = "League CLI - schema, development tokens and lifecycle tables for the League API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply sql/schema.sql to DATABASE_URL")]
    Migrate,

    #[command(about = "Mint a JWT signed with the configured secret")]
    Token(commands::token::TokenArgs),

    #[command(about = "Print the transition table of a lifecycle")]
    Transitions(commands::transitions::TransitionsArgs),

    #[command(about = "Check server health via the /health endpoint")]
    Ping {
        #[arg(long, help = "Server base URL (defaults to http://localhost:<configured port>)")]
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Transitions(args) => commands::transitions::handle(args, output_format),
        Commands::Ping { url } => commands::ping::handle(url, output_format).await,
    }
}
