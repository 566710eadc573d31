pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "learnhub")]
#[command(about = "LearnHub CLI - Operational tooling for the e-learning backend")]
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
    #[command(about = "Apply the database schema to the configured database")]
    Init,

    #[command(about = "Insert baseline seed data (idempotent)")]
    Seed,

    #[command(about = "Probe a running server's health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Seed => commands::seed::handle(output_format).await,
        Commands::Health { url } => commands::health::handle(&url, output_format).await,
    }
}
