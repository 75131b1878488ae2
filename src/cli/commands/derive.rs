use clap::Args;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::cli::utils::{display_value, output_json};
use crate::cli::OutputFormat;
use crate::content::{compact, derive_and_compact, DerivedValue, ExplicitValue};

#[derive(Args)]
pub struct DeriveArgs {
    #[arg(long, help = "Headline text, e.g. \"45 days\"")]
    pub title: Option<String>,

    #[arg(long, help = "Label text, e.g. \"AVG Sale to Install\"")]
    pub subtitle: Option<String>,

    #[arg(long, help = "Explicit value (skips derivation)")]
    pub value: Option<String>,

    #[arg(long, help = "Explicit prefix")]
    pub prefix: Option<String>,

    #[arg(long, help = "Explicit suffix")]
    pub suffix: Option<String>,
}

pub async fn handle(args: DeriveArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let explicit = ExplicitValue {
        value: args.value,
        prefix: args.prefix,
        suffix: args.suffix,
    };
    let derived = derive_and_compact(args.title.as_deref(), args.subtitle.as_deref(), &explicit);

    match output_format {
        OutputFormat::Json => output_json(&derived),
        OutputFormat::Text => {
            println!("{}", display_value(&derived));
            Ok(())
        }
    }
}

pub fn handle_compact(number: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let amount = Decimal::from_str(number.trim())
        .map_err(|e| anyhow::anyhow!("'{}' is not a number: {}", number, e))?;
    let compacted = compact(amount);

    match output_format {
        OutputFormat::Json => output_json(&compacted),
        OutputFormat::Text => {
            let shown = DerivedValue {
                value: compacted.value.clone(),
                prefix: None,
                suffix: compacted.suffix_str().map(str::to_string),
            };
            println!("{}", display_value(&shown));
            Ok(())
        }
    }
}
