use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::content::{CanonicalGrid, DerivedValue};

/// Read a JSON document from a file, or from stdin when no path is given
pub fn read_json_input(path: Option<&Path>) -> anyhow::Result<serde_json::Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("Input is not valid JSON: {}", e))
}

/// Print any serializable value as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display string for a derived value, e.g. `$1.25m`
pub fn display_value(value: &DerivedValue) -> String {
    format!(
        "{}{}{}",
        value.prefix.as_deref().unwrap_or(""),
        value.value,
        value.suffix.as_deref().unwrap_or("")
    )
}

/// Output a grid in the appropriate format
pub fn output_grid(
    output_format: &OutputFormat,
    grid: &CanonicalGrid,
    seeded: bool,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(&serde_json::json!({
            "seeded": seeded,
            "grid": grid,
        })),
        OutputFormat::Text => {
            if seeded {
                println!("(no usable cards; showing seed default)");
            }
            for card in &grid.cards {
                let shown = DerivedValue {
                    value: card.value.clone(),
                    prefix: card.prefix.clone(),
                    suffix: card.suffix.clone(),
                };
                println!(
                    "{:>4}  {:<10} {:>10}  {}",
                    card.position,
                    card.id,
                    display_value(&shown),
                    card.title
                );
            }
            Ok(())
        }
    }
}
