use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::compact::compact;
use super::model::DerivedValue;

static DAYS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bdays?\b").expect("valid days regex"));
static TRAILING_K_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[0-9]\s*k\b").expect("valid trailing k regex"));

const CURRENCY_PREFIX: &str = "$";
const PERCENT_SUFFIX: &str = "%";
const DAYS_SUFFIX: &str = "days";

/// Display fields already present on a candidate. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

impl ExplicitValue {
    /// Read `value`/`prefix`/`suffix` off a raw card object. Numbers are
    /// accepted for `value` and rendered the way JSON prints them.
    pub fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            value: map.get("value").and_then(scalar_text),
            prefix: map.get("prefix").and_then(scalar_text),
            suffix: map.get("suffix").and_then(scalar_text),
        }
    }

    pub fn value(&self) -> Option<&str> {
        non_empty(self.value.as_deref())
    }

    pub fn prefix(&self) -> Option<&str> {
        non_empty(self.prefix.as_deref())
    }

    pub fn suffix(&self) -> Option<&str> {
        non_empty(self.suffix.as_deref())
    }
}

/// Markers found in a card's headline and label text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Markers {
    currency: bool,
    percent: bool,
    days: bool,
}

impl Markers {
    fn scan(text: &str) -> Self {
        Self {
            currency: text.contains(CURRENCY_PREFIX),
            percent: text.contains(PERCENT_SUFFIX),
            days: DAYS_RE.is_match(text),
        }
    }
}

/// Produce the display value for a card.
///
/// A non-empty explicit `value` is used as-is together with the explicit
/// prefix/suffix and nothing is derived. Otherwise the value is read from the
/// free text and any explicit prefix/suffix still override the derived ones.
pub fn derive_and_compact(
    title: Option<&str>,
    subtitle: Option<&str>,
    explicit: &ExplicitValue,
) -> DerivedValue {
    if let Some(value) = explicit.value() {
        return DerivedValue {
            value: value.to_string(),
            prefix: explicit.prefix().map(str::to_string),
            suffix: explicit.suffix().map(str::to_string),
        };
    }

    let mut derived = derive_from_text(title.unwrap_or(""), subtitle.unwrap_or(""));
    if let Some(prefix) = explicit.prefix() {
        derived.prefix = Some(prefix.to_string());
    }
    if let Some(suffix) = explicit.suffix() {
        derived.suffix = Some(suffix.to_string());
    }
    derived
}

fn derive_from_text(title: &str, subtitle: &str) -> DerivedValue {
    let markers = Markers::scan(&format!("{} {}", title, subtitle));
    let digits = extract_digits(title);
    let prefix = markers.currency.then(|| CURRENCY_PREFIX.to_string());

    tracing::debug!(
        "Deriving value from title={:?}: digits={}, markers={:?}",
        title,
        digits,
        markers
    );

    if markers.percent || markers.days {
        let suffix = if markers.percent { PERCENT_SUFFIX } else { DAYS_SUFFIX };
        return DerivedValue {
            value: digits,
            prefix,
            suffix: Some(suffix.to_string()),
        };
    }

    let (value, suffix) = match Decimal::from_str(&digits) {
        Ok(amount) => {
            let compacted = compact(amount);
            let suffix = compacted.suffix_str().map(str::to_string);
            (compacted.value, suffix)
        }
        // Too many digits for a Decimal; show them untouched
        Err(_) => (digits, None),
    };

    let suffix = suffix.or_else(|| TRAILING_K_RE.is_match(title).then(|| "k".to_string()));

    DerivedValue { value, prefix, suffix }
}

/// Every ASCII digit in the text, concatenated, so `1,250,000` reads as `1250000`.
fn extract_digits(text: &str) -> String {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Text of a string or number field; anything else is absent.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn derive(title: &str, subtitle: &str) -> DerivedValue {
        derive_and_compact(Some(title), Some(subtitle), &ExplicitValue::default())
    }

    #[test]
    fn days_marker_keeps_number_unmodified() {
        let d = derive("45 days", "AVG Sale to Install");
        assert_eq!(d.value, "45");
        assert_eq!(d.suffix.as_deref(), Some("days"));
        assert_eq!(d.prefix, None);
    }

    #[test]
    fn singular_day_counts_as_days_marker() {
        let d = derive("1 Day", "Turnaround");
        assert_eq!(d.value, "1");
        assert_eq!(d.suffix.as_deref(), Some("days"));
    }

    #[test]
    fn days_must_be_a_whole_word() {
        let d = derive("1500", "Holidays booked");
        assert_eq!(d.value, "1.5");
        assert_eq!(d.suffix.as_deref(), Some("k"));
    }

    #[test]
    fn percent_wins_over_days() {
        let d = derive("98%", "30 days");
        assert_eq!(d.value, "98");
        assert_eq!(d.suffix.as_deref(), Some("%"));
    }

    #[test]
    fn currency_adds_prefix_and_compacts() {
        let d = derive("$1,250,000", "Revenue");
        assert_eq!(d.value, "1.25");
        assert_eq!(d.prefix.as_deref(), Some("$"));
        assert_eq!(d.suffix.as_deref(), Some("m"));
    }

    #[test]
    fn currency_with_percent_keeps_raw_number() {
        let d = derive("$ 12%", "Savings");
        assert_eq!(d.value, "12");
        assert_eq!(d.prefix.as_deref(), Some("$"));
        assert_eq!(d.suffix.as_deref(), Some("%"));
    }

    #[test]
    fn literal_trailing_k_is_kept_when_compaction_adds_none() {
        let d = derive("500K+", "Panels installed");
        assert_eq!(d.value, "500");
        assert_eq!(d.suffix.as_deref(), Some("k"));
    }

    #[test]
    fn no_digits_defaults_to_zero() {
        let d = derive("Lots", "Happy customers");
        assert_eq!(d.value, "0");
        assert_eq!(d.suffix, None);
        assert_eq!(d.prefix, None);
    }

    #[test]
    fn explicit_value_skips_derivation() {
        let explicit = ExplicitValue {
            value: Some("99".to_string()),
            ..Default::default()
        };
        let d = derive_and_compact(Some("45 days"), None, &explicit);
        assert_eq!(d, DerivedValue::plain("99"));
    }

    #[test]
    fn empty_explicit_value_counts_as_absent() {
        let explicit = ExplicitValue {
            value: Some(String::new()),
            suffix: Some("+".to_string()),
            prefix: Some("".to_string()),
        };
        let d = derive_and_compact(Some("$2500"), Some("Rebate"), &explicit);
        assert_eq!(d.value, "2.5");
        assert_eq!(d.prefix.as_deref(), Some("$"));
        assert_eq!(d.suffix.as_deref(), Some("+"));
    }

    #[test]
    fn scalar_text_accepts_strings_and_numbers_only() {
        assert_eq!(scalar_text(&json!("45 days")).as_deref(), Some("45 days"));
        assert_eq!(scalar_text(&json!(1500)).as_deref(), Some("1500"));
        assert_eq!(scalar_text(&json!(true)), None);
        assert_eq!(scalar_text(&json!({ "a": 1 })), None);
    }

    #[test]
    fn explicit_fields_read_from_numbers_and_strings() {
        let raw = json!({ "value": 42, "prefix": "~", "suffix": null });
        let explicit = ExplicitValue::from_object(raw.as_object().unwrap());
        assert_eq!(explicit.value(), Some("42"));
        assert_eq!(explicit.prefix(), Some("~"));
        assert_eq!(explicit.suffix(), None);
    }
}
