use rust_decimal::{Decimal, RoundingStrategy};

fn two_places(val: Decimal) -> String {
    format!("{:.2}", val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let rounded = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let cents = two_places(rounded.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let with_commas = group_thousands(int_part);

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Whole dollars, rounded down: $5,950
pub fn whole_dollars(val: Decimal) -> String {
    let floored = val.floor();
    let digits = floored.abs().trunc().to_string();
    let sign = if floored.is_sign_negative() && !floored.is_zero() { "-" } else { "" };
    format!("{sign}${}", group_thousands(&digits))
}

pub fn bps(val: Decimal) -> String {
    format!("{} bps", two_places(val))
}

/// Fractional rate as a percentage: 0.0431 -> 4.31%
pub fn percent(rate: Decimal) -> String {
    format!("{}%", two_places(rate.saturating_mul(Decimal::ONE_HUNDRED)))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec("1234.56")), "$1,234.56");
        assert_eq!(money(dec("-500")), "-$500.00");
        assert_eq!(money(Decimal::ZERO), "$0.00");
        assert_eq!(money(dec("1000000.99")), "$1,000,000.99");
        assert_eq!(money(dec("42.1")), "$42.10");
    }

    #[test]
    fn test_whole_dollars_floors() {
        assert_eq!(whole_dollars(dec("5950")), "$5,950");
        assert_eq!(whole_dollars(dec("1234567.89")), "$1,234,567");
        assert_eq!(whole_dollars(dec("-600.5")), "-$601");
    }

    #[test]
    fn test_extreme_values_format_without_panic() {
        assert_eq!(percent(Decimal::MAX), "79228162514264337593543950335.00%");
        assert!(money(Decimal::MAX).starts_with("$79,228,162,514,"));
        assert!(whole_dollars(Decimal::MIN).starts_with("-$79,228,"));
    }

    #[test]
    fn test_bps_and_percent() {
        assert_eq!(bps(dec("3.3333333")), "3.33 bps");
        assert_eq!(bps(Decimal::ZERO), "0.00 bps");
        assert_eq!(percent(dec("0.0431")), "4.31%");
        assert_eq!(percent(dec("0.035")), "3.50%");
    }
}
