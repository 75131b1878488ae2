pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "grid")]
#[command(about = "Grid CLI - inspect and preview stat-grid content offline")]
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
    #[command(about = "Normalize stored content (file or stdin) into the canonical grid")]
    Normalize(commands::normalize::NormalizeArgs),

    #[command(about = "Derive a display value from card text")]
    Derive(commands::derive::DeriveArgs),

    #[command(about = "Compact a number into a short k/m display string")]
    Compact {
        #[arg(help = "Non-negative number, e.g. 1250000")]
        number: String,
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
        Commands::Normalize(args) => commands::normalize::handle(args, output_format).await,
        Commands::Derive(args) => commands::derive::handle(args, output_format).await,
        Commands::Compact { number } => commands::derive::handle_compact(&number, output_format),
    }
}
