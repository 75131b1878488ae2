use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored content document, keyed by the page/section it belongs to.
/// Owned by the content store; the core only ever reads `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub key: String,
    pub content: Value,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// The single shape every stored document normalizes to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGrid {
    #[serde(default)]
    pub cards: Vec<CanonicalCard>,
}

impl CanonicalGrid {
    pub fn new(cards: Vec<CanonicalCard>) -> Self {
        Self { cards }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Wrap the grid in the stored document form, `{"grid": {"cards": [...]}}`.
    pub fn to_content(&self) -> Value {
        serde_json::json!({ "grid": self })
    }

    /// Stable sort by position; cards sharing a position keep their current order.
    pub(crate) fn sort_by_position(&mut self) {
        self.cards.sort_by_key(|card| card.position);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCard {
    #[serde(default)]
    pub id: String,
    /// Display label
    #[serde(default)]
    pub title: String,
    /// Headline text the value was read from, kept for editors
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default)]
    pub position: i64,
}

/// Display value derived for a card. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl DerivedValue {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            prefix: None,
            suffix: None,
        }
    }
}
