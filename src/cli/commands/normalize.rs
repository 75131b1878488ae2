use clap::Args;
use std::path::PathBuf;

use crate::cli::utils::{output_grid, read_json_input};
use crate::cli::OutputFormat;
use crate::content::{Normalizer, SeedCatalog};

#[derive(Args)]
pub struct NormalizeArgs {
    #[arg(help = "JSON file holding the stored content (reads stdin when omitted)")]
    pub file: Option<PathBuf>,

    #[arg(long, help = "Content key used to pick the seed default")]
    pub key: Option<String>,

    #[arg(long, help = "YAML/JSON seed catalog overriding the built-in defaults")]
    pub seeds: Option<PathBuf>,
}

pub async fn handle(args: NormalizeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = read_json_input(args.file.as_deref())?;

    let catalog = match &args.seeds {
        Some(path) => SeedCatalog::from_file(path)?,
        None => SeedCatalog::builtin(),
    };
    let normalizer = Normalizer::new(catalog);

    let key = args.key.as_deref().unwrap_or(crate::content::seed::FALLBACK_KEY);
    let normalized = normalizer.normalize(key, &raw);

    output_grid(&output_format, &normalized.grid, normalized.seeded)
}
