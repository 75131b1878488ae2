use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Magnitude suffix appended after a compacted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "k")]
    Thousand,
    #[serde(rename = "m")]
    Million,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Thousand => "k",
            Unit::Million => "m",
        }
    }

    fn divisor(&self) -> Decimal {
        match self {
            Unit::Thousand => Decimal::from(1_000u32),
            Unit::Million => Decimal::from(1_000_000u32),
        }
    }
}

/// Ladder of units from smallest to largest; `None` is the bare integer.
const UNITS: [Option<Unit>; 3] = [None, Some(Unit::Thousand), Some(Unit::Million)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compacted {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<Unit>,
}

impl Compacted {
    pub fn suffix_str(&self) -> Option<&'static str> {
        self.suffix.as_ref().map(Unit::as_str)
    }
}

/// Reduce a magnitude to at most three significant digits plus a `k`/`m` suffix.
///
/// Rounding may carry a value into the next unit, so `999_500` compacts to
/// `1m` rather than `1000k`. Negative input is treated as zero.
pub fn compact(amount: impl Into<Decimal>) -> Compacted {
    let amount = amount.into().max(Decimal::ZERO);

    let mut index = if amount >= Decimal::from(1_000_000u32) {
        2
    } else if amount >= Decimal::from(1_000u32) {
        1
    } else {
        0
    };

    let mut scaled = scale(amount, UNITS[index]);
    while scaled >= Decimal::from(1_000u32) && index + 1 < UNITS.len() {
        index += 1;
        scaled = scale(amount, UNITS[index]);
    }

    Compacted {
        value: scaled.normalize().to_string(),
        suffix: UNITS[index],
    }
}

fn scale(amount: Decimal, unit: Option<Unit>) -> Decimal {
    match unit {
        None => amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        Some(unit) => round_significant(amount / unit.divisor()),
    }
}

fn round_significant(value: Decimal) -> Decimal {
    let dp = if value >= Decimal::from(100u32) {
        0
    } else if value >= Decimal::from(10u32) {
        1
    } else {
        2
    };
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn pair(n: u64) -> (String, Option<&'static str>) {
        let c = compact(n);
        let suffix = c.suffix_str();
        (c.value, suffix)
    }

    #[test]
    fn below_thousand_is_plain_integer() {
        assert_eq!(pair(0), ("0".to_string(), None));
        assert_eq!(pair(7), ("7".to_string(), None));
        assert_eq!(pair(999), ("999".to_string(), None));
    }

    #[test]
    fn thousands_use_k_suffix() {
        assert_eq!(pair(1_000), ("1".to_string(), Some("k")));
        assert_eq!(pair(45_000), ("45".to_string(), Some("k")));
        assert_eq!(pair(12_340), ("12.3".to_string(), Some("k")));
        assert_eq!(pair(1_500), ("1.5".to_string(), Some("k")));
        assert_eq!(pair(250_000), ("250".to_string(), Some("k")));
    }

    #[test]
    fn millions_use_m_suffix() {
        assert_eq!(pair(1_250_000), ("1.25".to_string(), Some("m")));
        assert_eq!(pair(1_234_567), ("1.23".to_string(), Some("m")));
        assert_eq!(pair(10_000_000), ("10".to_string(), Some("m")));
    }

    #[test]
    fn rounding_carries_across_unit_boundary() {
        assert_eq!(pair(999_500), ("1".to_string(), Some("m")));
        assert_eq!(pair(999_499), ("999".to_string(), Some("k")));
    }

    #[test]
    fn fractional_input_below_thousand_rounds_to_integer() {
        let c = compact(Decimal::from_str("12.6").unwrap());
        assert_eq!(c.value, "13");
        assert_eq!(c.suffix, None);
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        let c = compact(-40);
        assert_eq!(c.value, "0");
        assert_eq!(c.suffix, None);
    }
}
