use chrono::DateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder for a missing value.
pub const MISSING: &str = "-";

/// Rounds half away from zero, then pads to exactly `dp` decimals.
fn round_to(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}

pub fn fixed(value: Option<Decimal>, dp: u32) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| round_to(v, dp))
}

/// A signed percentage with two decimals, e.g. `+5.00%`.
pub fn percent(value: Option<Decimal>) -> String {
    match value {
        Some(v) if v > Decimal::ZERO => format!("+{}%", round_to(v, 2)),
        Some(v) => format!("{}%", round_to(v, 2)),
        None => MISSING.to_string(),
    }
}

/// Rounds to a whole number and groups thousands with commas.
pub fn grouped(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return MISSING.to_string();
    };
    let rounded = round_to(value, 0);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", rounded.as_str()),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{sign}{out}")
}

/// `YYYY-MM-DD HH:MM` for RFC 3339 input; anything else is shown as is.
pub fn timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => MISSING.to_string(),
    }
}

/// A horizontal bar whose length is proportional to `|value| / max_abs`.
/// Negative values use a lighter glyph.
pub fn bar(value: Decimal, max_abs: Decimal, width: usize) -> String {
    if max_abs.is_zero() {
        return String::new();
    }
    let len = (value.abs() / max_abs * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    let glyph = if value.is_sign_negative() { '░' } else { '█' };
    std::iter::repeat_n(glyph, len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands() {
        assert_eq!(grouped(Some(dec!(19687512.4))), "19,687,512");
        assert_eq!(grouped(Some(dec!(999))), "999");
        assert_eq!(grouped(Some(dec!(1000))), "1,000");
        assert_eq!(grouped(Some(dec!(-1234567))), "-1,234,567");
        assert_eq!(grouped(None), MISSING);
    }

    #[test]
    fn fixed_pads_and_rounds() {
        assert_eq!(fixed(Some(dec!(64012.5)), 2), "64012.50");
        assert_eq!(fixed(Some(dec!(0.004567)), 2), "0.00");
        assert_eq!(fixed(Some(dec!(1265432101234.7)), 0), "1265432101235");
    }

    #[test]
    fn percent_carries_a_sign() {
        assert_eq!(percent(Some(dec!(5))), "+5.00%");
        assert_eq!(percent(Some(dec!(-3.456))), "-3.46%");
        assert_eq!(percent(Some(dec!(0))), "0.00%");
    }

    #[test]
    fn timestamps_fall_back_to_raw_text() {
        assert_eq!(
            timestamp(Some("2025-04-27T14:03:09.123Z")),
            "2025-04-27 14:03"
        );
        assert_eq!(timestamp(Some("yesterday")), "yesterday");
        assert_eq!(timestamp(None), MISSING);
    }

    #[test]
    fn bars_scale_to_the_largest_magnitude() {
        assert_eq!(bar(dec!(10), dec!(10), 4).chars().count(), 4);
        assert_eq!(bar(dec!(-5), dec!(10), 4), "░░");
        assert_eq!(bar(dec!(0), dec!(10), 4), "");
        assert_eq!(bar(dec!(3), dec!(0), 4), "");
    }
}
