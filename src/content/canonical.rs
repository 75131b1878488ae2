use serde_json::{Map, Value};
use thiserror::Error;

use super::derive::{derive_and_compact, scalar_text, ExplicitValue};
use super::model::{CanonicalCard, CanonicalGrid};
use super::seed::SeedCatalog;
use super::shape::{card_number, decode_text, named_slot, ContentShape, NAMED_SLOTS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no usable cards found in {0} content")]
    EmptyResult(&'static str),
}

/// A candidate card that was not a JSON object
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("candidate '{origin}' is not an object")]
pub struct MalformedShape {
    pub origin: String,
}

/// Grid produced for one content key, and whether it came from the seed catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub grid: CanonicalGrid,
    pub seeded: bool,
}

/// Normalizes stored content, falling back to per-key defaults.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    seeds: SeedCatalog,
}

impl Normalizer {
    pub fn new(seeds: SeedCatalog) -> Self {
        Self { seeds }
    }

    pub fn seeds(&self) -> &SeedCatalog {
        &self.seeds
    }

    pub fn normalize(&self, key: &str, raw: &Value) -> Normalized {
        match canonicalize(raw) {
            Ok(grid) => Normalized { grid, seeded: false },
            Err(e) => {
                tracing::debug!("Content '{}' falls back to seed default: {}", key, e);
                Normalized {
                    grid: self.seeds.default_for(key).clone(),
                    seeded: true,
                }
            }
        }
    }
}

/// Normalize content that is not tied to a content key; unusable input yields
/// the catalog's generic default grid.
pub fn normalize(raw: &Value) -> CanonicalGrid {
    canonicalize(raw).unwrap_or_else(|_| SeedCatalog::fallback_grid())
}

/// Convert any recognized content shape into a [`CanonicalGrid`] sorted by position.
pub fn canonicalize(raw: &Value) -> Result<CanonicalGrid, NormalizeError> {
    let decoded = decode_text(raw);
    let shape = ContentShape::detect(&decoded);

    tracing::debug!("Detected content shape: {}", shape.kind());

    let grid = match shape {
        ContentShape::Canonical(cards) => pass_through(cards),
        ContentShape::Keyed(map) => from_candidates(keyed_candidates(map)),
        ContentShape::CardsArray(items) | ContentShape::StatsArray(items) => {
            from_candidates(array_candidates(items))
        }
        ContentShape::Unrecognized => CanonicalGrid::default(),
    };

    if grid.is_empty() {
        Err(NormalizeError::EmptyResult(shape.kind()))
    } else {
        Ok(grid)
    }
}

/// Raw card object plus what its location in the document says about it
#[derive(Debug)]
struct Candidate<'a> {
    fields: &'a Map<String, Value>,
    /// Id implied by the key the card was stored under
    implied_id: Option<String>,
    discovery: usize,
}

impl<'a> Candidate<'a> {
    fn parse(
        origin: impl Into<String>,
        value: &'a Value,
        implied_id: Option<String>,
        discovery: usize,
    ) -> Result<Self, MalformedShape> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                implied_id,
                discovery,
            }),
            _ => Err(MalformedShape {
                origin: origin.into(),
            }),
        }
    }

    fn id(&self) -> Option<String> {
        self.fields
            .get("id")
            .and_then(scalar_text)
            .filter(|id| !id.is_empty())
            .or_else(|| self.implied_id.clone())
    }

    /// Explicit position, else numeric id, else discovery index.
    fn sort_key(&self) -> i64 {
        self.fields
            .get("position")
            .and_then(integer)
            .or_else(|| self.id().and_then(|id| id.trim().parse().ok()))
            .unwrap_or(self.discovery as i64)
    }

    fn into_card(self, position: i64) -> CanonicalCard {
        let title = self.fields.get("title").and_then(scalar_text);
        let subtitle = self.fields.get("subtitle").and_then(scalar_text);
        let explicit = ExplicitValue::from_object(self.fields);
        let derived = derive_and_compact(title.as_deref(), subtitle.as_deref(), &explicit);

        CanonicalCard {
            id: self.id().unwrap_or_else(|| (self.discovery + 1).to_string()),
            title: subtitle.unwrap_or_default(),
            subtitle: title.unwrap_or_default(),
            value: derived.value,
            prefix: derived.prefix,
            suffix: derived.suffix,
            position,
        }
    }
}

fn pass_through(cards: &[Value]) -> CanonicalGrid {
    let mut grid = CanonicalGrid::new(
        cards
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match value {
                Value::Object(fields) => Some(canonical_card(fields, index)),
                _ => {
                    tracing::debug!("Dropping non-object canonical card at index {}", index);
                    None
                }
            })
            .collect(),
    );
    grid.sort_by_position();
    grid
}

fn canonical_card(fields: &Map<String, Value>, index: usize) -> CanonicalCard {
    let field = |name: &str| fields.get(name).and_then(scalar_text).unwrap_or_default();
    let optional = |name: &str| fields.get(name).and_then(scalar_text);

    CanonicalCard {
        id: field("id"),
        title: field("title"),
        subtitle: field("subtitle"),
        value: field("value"),
        prefix: optional("prefix"),
        suffix: optional("suffix"),
        position: fields
            .get("position")
            .and_then(integer)
            .unwrap_or(index as i64),
    }
}

/// `card N` keys first, then named slots in slot order. Both styles can live in
/// the same record while editors migrate one card at a time.
fn keyed_candidates(map: &Map<String, Value>) -> Vec<Result<Candidate<'_>, MalformedShape>> {
    let card_keys = map
        .iter()
        .filter_map(|(key, value)| card_number(key).map(|n| (key, value, n.to_string())));

    let named_keys = NAMED_SLOTS.iter().enumerate().filter_map(|(slot_index, slot)| {
        map.iter()
            .find(|(key, _)| named_slot(key) == Some(slot_index))
            .map(|(key, value)| (key, value, slot.to_string()))
    });

    card_keys
        .chain(named_keys)
        .enumerate()
        .map(|(discovery, (key, value, implied_id))| {
            Candidate::parse(key.as_str(), value, Some(implied_id), discovery)
        })
        .collect()
}

fn array_candidates(items: &[Value]) -> Vec<Result<Candidate<'_>, MalformedShape>> {
    items
        .iter()
        .enumerate()
        .map(|(index, value)| Candidate::parse(format!("[{}]", index), value, None, index))
        .collect()
}

fn from_candidates(candidates: Vec<Result<Candidate<'_>, MalformedShape>>) -> CanonicalGrid {
    let mut keyed: Vec<(i64, usize, Candidate<'_>)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            candidate
                .map_err(|e| tracing::debug!("Dropping malformed candidate: {}", e))
                .ok()
        })
        .map(|candidate| (candidate.sort_key(), candidate.discovery, candidate))
        .collect();

    keyed.sort_by_key(|(key, discovery, _)| (*key, *discovery));

    CanonicalGrid::new(
        keyed
            .into_iter()
            .map(|(position, _, candidate)| candidate.into_card(position))
            .collect(),
    )
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn positions(grid: &CanonicalGrid) -> Vec<i64> {
        grid.cards.iter().map(|c| c.position).collect()
    }

    #[test]
    fn keyed_cards_sort_by_card_number() {
        let raw = json!({ "grid": {
            "card 10": { "title": "10" },
            "card 2": { "title": "2" },
            "card 1": { "title": "1" },
        }});
        let grid = canonicalize(&raw).unwrap();
        let ids: Vec<&str> = grid.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "10"]);
        assert_eq!(positions(&grid), [1, 2, 10]);
    }

    #[test]
    fn explicit_position_beats_card_number() {
        let raw = json!({ "grid": {
            "card 1": { "title": "1", "position": 5 },
            "card 2": { "title": "2" },
        }});
        let grid = canonicalize(&raw).unwrap();
        assert_eq!(grid.cards[0].id, "2");
        assert_eq!(grid.cards[1].id, "1");
    }

    #[test]
    fn non_object_candidates_are_dropped() {
        let raw = json!({ "cards": [ "junk", { "title": "7 days", "subtitle": "Permit" }, 4 ] });
        let grid = canonicalize(&raw).unwrap();
        assert_eq!(grid.cards.len(), 1);
        assert_eq!(grid.cards[0].title, "Permit");
        assert_eq!(grid.cards[0].id, "2");
    }

    #[test]
    fn all_malformed_without_arrays_is_empty_result() {
        let raw = json!({ "grid": { "card 1": "oops", "card 2": null } });
        assert_eq!(canonicalize(&raw), Err(NormalizeError::EmptyResult("unrecognized")));
    }

    #[test]
    fn malformed_card_dropped_next_to_usable_one() {
        let raw = json!({ "grid": { "card 1": "oops", "card 2": { "title": "12" } } });
        let grid = canonicalize(&raw).unwrap();
        assert_eq!(grid.cards.len(), 1);
        assert_eq!(grid.cards[0].id, "2");
    }

    #[test]
    fn text_header_does_not_hide_stats_array() {
        let raw = json!({ "header": "Our numbers", "stats": [{ "title": "98%", "subtitle": "Happy" }] });
        let grid = normalize(&raw);
        assert_ne!(grid, SeedCatalog::fallback_grid());
        assert_eq!(grid.cards.len(), 1);
        assert_eq!(grid.cards[0].title, "Happy");
        assert_eq!(grid.cards[0].value, "98");
        assert_eq!(grid.cards[0].suffix.as_deref(), Some("%"));
    }

    #[test]
    fn text_grid_fields_do_not_hide_cards_array() {
        let raw = json!({
            "grid": { "header": "Title", "decor": "url.png" },
            "cards": [{ "title": "45 days", "subtitle": "AVG Sale to Install" }]
        });
        let grid = normalize(&raw);
        assert_eq!(grid.cards.len(), 1);
        assert_eq!(grid.cards[0].title, "AVG Sale to Install");
        assert_eq!(grid.cards[0].value, "45");
        assert_eq!(grid.cards[0].suffix.as_deref(), Some("days"));
    }

    #[test]
    fn named_slots_follow_slot_order() {
        let raw = json!({
            "stat-2": { "title": "2" },
            "header": { "title": "0" },
            "stat1": { "title": "1" },
        });
        let grid = canonicalize(&raw).unwrap();
        let ids: Vec<&str> = grid.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["header", "stat1", "stat2"]);
        assert_eq!(positions(&grid), [0, 1, 2]);
    }

    #[test]
    fn canonical_cards_pass_through_sorted() {
        let raw = json!({ "grid": { "cards": [
            { "id": "b", "title": "B", "value": "2", "position": 2 },
            { "id": "a", "title": "A", "value": "", "position": 1 },
        ]}});
        let grid = canonicalize(&raw).unwrap();
        assert_eq!(grid.cards[0].id, "a");
        // no derivation on canonical content
        assert_eq!(grid.cards[0].value, "");
        assert_eq!(grid.cards[1].value, "2");
    }

    #[test]
    fn normalizer_uses_key_default_when_empty() {
        let normalizer = Normalizer::default();
        let out = normalizer.normalize("home", &json!({}));
        assert!(out.seeded);
        assert_eq!(&out.grid, normalizer.seeds().default_for("home"));
    }

    #[test]
    fn json_text_content_is_decoded() {
        let raw = Value::String(r#"{"stats":[{"title":"$5000","subtitle":"Saved"}]}"#.to_string());
        let grid = canonicalize(&raw).unwrap();
        assert_eq!(grid.cards[0].value, "5");
        assert_eq!(grid.cards[0].prefix.as_deref(), Some("$"));
        assert_eq!(grid.cards[0].suffix.as_deref(), Some("k"));
    }
}
