use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::model::{CanonicalCard, CanonicalGrid};

/// Catalog key whose grid replaces the generic fallback
pub const FALLBACK_KEY: &str = "default";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Default grids per content key, handed out when a key has no usable record.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    defaults: HashMap<String, CanonicalGrid>,
    fallback: CanonicalGrid,
}

impl Default for SeedCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SeedCatalog {
    pub fn new(defaults: HashMap<String, CanonicalGrid>, fallback: CanonicalGrid) -> Self {
        let mut catalog = Self {
            defaults: HashMap::new(),
            fallback: sorted(fallback),
        };
        for (key, grid) in defaults {
            catalog.insert(key, grid);
        }
        catalog
    }

    pub fn builtin() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert(
            "home".to_string(),
            CanonicalGrid::new(vec![
                card("1", "Homes Powered", "12,500+", "12.5", None, Some("k"), 1),
                card("2", "Customer Satisfaction", "98%", "98", None, Some("%"), 2),
                card("3", "AVG Sale to Install", "45 days", "45", None, Some("days"), 3),
                card("4", "Customer Savings", "$1,250,000", "1.25", Some("$"), Some("m"), 4),
            ]),
        );
        defaults.insert(
            "careers".to_string(),
            CanonicalGrid::new(vec![
                card("1", "Reps Nationwide", "350", "350", None, None, 1),
                card("2", "Paid Out to Reps", "$4,800,000", "4.8", Some("$"), Some("m"), 2),
                card("3", "First Commission", "14 days", "14", None, Some("days"), 3),
            ]),
        );
        defaults.insert(
            "rep-portal".to_string(),
            CanonicalGrid::new(vec![
                card("1", "Deals Closed", "0", "0", None, None, 1),
                card("2", "Close Rate", "0%", "0", None, Some("%"), 2),
                card("3", "Pipeline", "$0", "0", Some("$"), None, 3),
            ]),
        );

        Self::new(defaults, Self::fallback_grid())
    }

    /// Generic grid used for keys without their own default.
    pub fn fallback_grid() -> CanonicalGrid {
        CanonicalGrid::new(vec![
            card("1", "Projects Completed", "1,000+", "1", None, Some("k"), 1),
            card("2", "Satisfaction", "98%", "98", None, Some("%"), 2),
            card("3", "AVG Sale to Install", "45 days", "45", None, Some("days"), 3),
        ])
    }

    /// Built-in catalog with the grids from a YAML (or JSON) file laid over it.
    /// The file maps content keys to `{cards: [...]}`; the `default` key
    /// replaces the fallback grid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let text = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: shown.clone(),
            source,
        })?;
        let overrides: HashMap<String, CanonicalGrid> =
            serde_yaml::from_str(&text).map_err(|source| SeedError::Parse {
                path: shown.clone(),
                source,
            })?;

        tracing::info!("Loaded {} seed grids from {}", overrides.len(), shown);

        let mut catalog = Self::builtin();
        for (key, grid) in overrides {
            catalog.insert(key, grid);
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, key: impl Into<String>, grid: CanonicalGrid) {
        let key = key.into();
        if key == FALLBACK_KEY {
            self.fallback = sorted(grid);
        } else {
            self.defaults.insert(key, sorted(grid));
        }
    }

    pub fn default_for(&self, key: &str) -> &CanonicalGrid {
        self.defaults.get(key).unwrap_or(&self.fallback)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
    }
}

fn sorted(mut grid: CanonicalGrid) -> CanonicalGrid {
    grid.sort_by_position();
    grid
}

fn card(
    id: &str,
    title: &str,
    subtitle: &str,
    value: &str,
    prefix: Option<&str>,
    suffix: Option<&str>,
    position: i64,
) -> CanonicalCard {
    CanonicalCard {
        id: id.to_string(),
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        value: value.to_string(),
        prefix: prefix.map(str::to_string),
        suffix: suffix.map(str::to_string),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn unknown_key_gets_fallback() {
        let catalog = SeedCatalog::builtin();
        assert!(!catalog.has_key("nope"));
        assert_eq!(catalog.default_for("nope"), &SeedCatalog::fallback_grid());
    }

    #[test]
    fn builtin_grids_are_sorted() {
        let catalog = SeedCatalog::builtin();
        for key in ["home", "careers", "rep-portal"] {
            let grid = catalog.default_for(key);
            assert!(!grid.is_empty());
            assert!(grid.cards.windows(2).all(|w| w[0].position <= w[1].position), "{}", key);
        }
    }

    #[test]
    fn file_overrides_and_sorts() {
        let path = std::env::temp_dir().join(format!("seed-test-{}.yaml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "home:\n  cards:\n    - {{ id: b, value: '2', position: 2 }}\n    - {{ id: a, value: '1', position: 1 }}\ndefault:\n  cards:\n    - {{ id: x, value: '9' }}"
        )
        .unwrap();
        drop(file);

        let catalog = SeedCatalog::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let home = catalog.default_for("home");
        assert_eq!(home.cards[0].id, "a");
        assert_eq!(home.cards[1].id, "b");
        assert_eq!(catalog.default_for("unknown").cards[0].id, "x");
        assert!(catalog.has_key("careers"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SeedCatalog::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
