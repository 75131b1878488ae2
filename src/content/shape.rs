use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

static CARD_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^card\s*([0-9]+)").expect("valid card key regex"));

/// Fixed slot names used by the oldest grid editor, in display order.
/// Compared after lowercasing and dropping separators (`Stat-1` == `stat1`).
pub const NAMED_SLOTS: &[&str] = &["header", "decor", "stat1", "stat2", "stat3", "stat4"];

/// Every shape a stored grid document has been written in.
///
/// Variants are listed in detection priority; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentShape<'a> {
    /// `{"grid": {"cards": [...]}}`
    Canonical(&'a [Value]),
    /// `card N` keys and/or named slot keys on one object
    Keyed(&'a Map<String, Value>),
    /// `{"cards": [...]}`
    CardsArray(&'a [Value]),
    /// `{"stats": [...]}`
    StatsArray(&'a [Value]),
    Unrecognized,
}

impl<'a> ContentShape<'a> {
    pub fn detect(raw: &'a Value) -> Self {
        let Some(root) = raw.as_object() else {
            return ContentShape::Unrecognized;
        };

        let grid = root.get("grid").and_then(Value::as_object);

        if let Some(cards) = grid.and_then(|g| g.get("cards")).and_then(Value::as_array) {
            return ContentShape::Canonical(cards);
        }

        // Keyed cards normally sit under `grid`, but some rows have them at the top level.
        // Only object-valued keys count; `"header": "Our numbers"` is plain page text.
        for keyed in grid.into_iter().chain(std::iter::once(root)) {
            let has_card = keyed.iter().any(|(k, v)| {
                v.is_object() && (card_number(k).is_some() || named_slot(k).is_some())
            });
            if has_card {
                return ContentShape::Keyed(keyed);
            }
        }

        if let Some(cards) = root.get("cards").and_then(Value::as_array) {
            return ContentShape::CardsArray(cards);
        }
        if let Some(stats) = root.get("stats").and_then(Value::as_array) {
            return ContentShape::StatsArray(stats);
        }

        ContentShape::Unrecognized
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentShape::Canonical(_) => "canonical",
            ContentShape::Keyed(_) => "keyed",
            ContentShape::CardsArray(_) => "cards_array",
            ContentShape::StatsArray(_) => "stats_array",
            ContentShape::Unrecognized => "unrecognized",
        }
    }
}

/// Number from a `card N` key (`"card 3"`, `"Card3"`, `"card 12 (old)"`).
pub fn card_number(key: &str) -> Option<&str> {
    CARD_KEY_RE
        .captures(key)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Index into [`NAMED_SLOTS`] for a named slot key.
pub fn named_slot(key: &str) -> Option<usize> {
    let folded: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    NAMED_SLOTS.iter().position(|slot| *slot == folded)
}

/// Older rows stored the document as a JSON string; decode it so it can be
/// detected like any other value. Undecodable text is left as-is.
pub fn decode_text(raw: &Value) -> Cow<'_, Value> {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(decoded) => Cow::Owned(decoded),
            Err(_) => Cow::Borrowed(raw),
        },
        other => Cow::Borrowed(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_canonical_grid() {
        let raw = json!({ "grid": { "cards": [{ "id": "1" }] } });
        assert!(matches!(ContentShape::detect(&raw), ContentShape::Canonical(c) if c.len() == 1));
    }

    #[test]
    fn canonical_wins_over_keyed_cards() {
        let raw = json!({ "grid": { "cards": [], "card 1": { "title": "5" } } });
        assert_eq!(ContentShape::detect(&raw).kind(), "canonical");
    }

    #[test]
    fn detects_keyed_cards_under_grid_and_top_level() {
        let nested = json!({ "grid": { "card 3": { "title": "45 days" } } });
        assert_eq!(ContentShape::detect(&nested).kind(), "keyed");

        let flat = json!({ "Card2": { "title": "12" } });
        assert_eq!(ContentShape::detect(&flat).kind(), "keyed");
    }

    #[test]
    fn detects_named_slots() {
        let raw = json!({ "grid": { "stat-1": { "title": "98%" } } });
        assert_eq!(ContentShape::detect(&raw).kind(), "keyed");
    }

    #[test]
    fn keyed_wins_over_cards_array() {
        let raw = json!({ "cards": [{}], "stat2": { "title": "1" } });
        assert_eq!(ContentShape::detect(&raw).kind(), "keyed");
    }

    #[test]
    fn detects_flat_arrays_in_priority_order() {
        let both = json!({ "stats": [{}], "cards": [{}] });
        assert_eq!(ContentShape::detect(&both).kind(), "cards_array");

        let stats = json!({ "stats": [{}] });
        assert_eq!(ContentShape::detect(&stats).kind(), "stats_array");
    }

    #[test]
    fn everything_else_is_unrecognized() {
        for raw in [json!(null), json!({}), json!([1, 2]), json!("text"), json!({ "grid": 4 })] {
            assert_eq!(ContentShape::detect(&raw).kind(), "unrecognized", "{}", raw);
        }
    }

    #[test]
    fn text_valued_slot_keys_fall_through_to_arrays() {
        let stats = json!({ "header": "Our numbers", "stats": [{ "title": "98%" }] });
        assert_eq!(ContentShape::detect(&stats).kind(), "stats_array");

        let cards = json!({
            "grid": { "header": "Title", "decor": "url.png" },
            "cards": [{ "title": "45 days" }]
        });
        assert_eq!(ContentShape::detect(&cards).kind(), "cards_array");
    }

    #[test]
    fn one_object_valued_key_is_enough_for_keyed() {
        let raw = json!({ "grid": { "header": "Title", "card 1": { "title": "5" } } });
        assert_eq!(ContentShape::detect(&raw).kind(), "keyed");
    }

    #[test]
    fn card_key_pattern() {
        assert_eq!(card_number("card 3"), Some("3"));
        assert_eq!(card_number("CARD12"), Some("12"));
        assert_eq!(card_number("cards"), None);
        assert_eq!(card_number("my card 1"), None);
    }

    #[test]
    fn named_slot_folding() {
        assert_eq!(named_slot("Header"), Some(0));
        assert_eq!(named_slot("stat_4"), Some(5));
        assert_eq!(named_slot("Stat 2"), Some(3));
        assert_eq!(named_slot("stat5"), None);
    }

    #[test]
    fn decodes_json_text() {
        let raw = Value::String(r#"{"stats":[]}"#.to_string());
        assert_eq!(decode_text(&raw).into_owned(), json!({ "stats": [] }));

        let plain = json!("not json");
        assert_eq!(decode_text(&plain).into_owned(), plain);
    }
}
