//! Compound duration grammar
//!
//! A duration is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit, such as `"300ms"`, `"1.5h"` or
//! `"2h45m30s"`. Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`
//! and `h`. The single value `"0"` needs no unit. A leading `+` is accepted;
//! negative durations are rejected since `std::time::Duration` is unsigned.
//!
//! Whole components are parsed by `humantime`. It has no fractions, so the
//! fractional part of a component such as `1.5h` is added here.

use std::time::Duration;

use super::error::ParseFailure;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest number of fraction digits that still affect the result
const MAX_FRACTION_DIGITS: usize = 24;

/// `humantime` spelling and length in nanoseconds of an accepted unit
fn unit_of(unit: &str) -> Option<(&'static str, u128)> {
    let unit = match unit {
        "ns" => ("ns", 1),
        "us" | "µs" | "μs" => ("us", 1_000),
        "ms" => ("ms", 1_000_000),
        "s" => ("s", NANOS_PER_SEC),
        "m" => ("m", 60 * NANOS_PER_SEC),
        "h" => ("h", 3_600 * NANOS_PER_SEC),
        _ => return None,
    };
    Some(unit)
}

/// Parse a duration string.
pub fn parse(input: &str) -> Result<Duration, ParseFailure> {
    let invalid = || ParseFailure::new(format!("invalid duration {input:?}"));

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let (whole, after_whole) = split_digits(rest);
        let (fraction, after_fraction) = match after_whole.strip_prefix('.') {
            Some(tail) => {
                let (digits, tail) = split_digits(tail);
                (Some(digits), tail)
            }
            None => (None, after_whole),
        };

        if whole.is_empty() && fraction.is_none_or(str::is_empty) {
            return Err(invalid());
        }

        let unit_len = after_fraction
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_fraction.len());
        if unit_len == 0 {
            return Err(ParseFailure::new(format!(
                "missing unit in duration {input:?}"
            )));
        }
        let (unit, tail) = after_fraction.split_at(unit_len);
        let (spelling, unit_nanos) = unit_of(unit).ok_or_else(|| {
            ParseFailure::new(format!("unknown unit {unit:?} in duration {input:?}"))
        })?;

        let whole = if whole.is_empty() { "0" } else { whole };
        let mut component = humantime::parse_duration(&format!("{whole}{spelling}"))
            .map_err(|err| match err {
                humantime::DurationError::NumberOverflow => overflow(input),
                other => ParseFailure::new(format!("invalid duration {input:?}: {other}")),
            })?;
        if let Some(fraction) = fraction {
            component = component
                .checked_add(fraction_of(fraction, unit_nanos))
                .ok_or_else(|| overflow(input))?;
        }

        total = total.checked_add(component).ok_or_else(|| overflow(input))?;
        rest = tail;
    }

    if negative && !total.is_zero() {
        return Err(ParseFailure::new(format!(
            "negative duration {input:?} is not supported"
        )));
    }

    Ok(total)
}

fn overflow(input: &str) -> ParseFailure {
    ParseFailure::new(format!("duration {input:?} is out of range"))
}

/// Split off the leading run of ASCII digits.
fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Share of one unit expressed by the fraction digits of a component.
fn fraction_of(digits: &str, unit_nanos: u128) -> Duration {
    let mut value: u128 = 0;
    let mut scale: u128 = 1;
    for digit in digits.bytes().take(MAX_FRACTION_DIGITS) {
        value = value * 10 + u128::from(digit - b'0');
        scale *= 10;
    }
    let nanos = value * unit_nanos / scale;
    Duration::new(
        (nanos / NANOS_PER_SEC) as u64,
        (nanos % NANOS_PER_SEC) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Duration::ZERO)]
    #[case("-0", Duration::ZERO)]
    #[case("10s", Duration::from_secs(10))]
    #[case("+5m", Duration::from_secs(300))]
    #[case("300ms", Duration::from_millis(300))]
    #[case("1.5h", Duration::from_secs(5_400))]
    #[case("2h45m30.5s", Duration::from_millis(9_930_500))]
    #[case("1us", Duration::from_micros(1))]
    #[case("1µs", Duration::from_micros(1))]
    #[case("1μs", Duration::from_micros(1))]
    #[case("42ns", Duration::from_nanos(42))]
    #[case(".5s", Duration::from_millis(500))]
    #[case("1.s", Duration::from_secs(1))]
    #[case("0.000000001s", Duration::from_nanos(1))]
    #[case("1h0m0s", Duration::from_secs(3_600))]
    #[case("1.25m", Duration::from_secs(75))]
    #[case("0.5us", Duration::from_nanos(500))]
    fn parses_valid_durations(#[case] input: &str, #[case] expected: Duration) {
        assert_eq!(parse(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("10")]
    #[case("s")]
    #[case(".s")]
    #[case("1x")]
    #[case("1d")]
    #[case("10 s")]
    #[case("-1s")]
    #[case("1s-")]
    #[case("1min")]
    #[case("1m 30s")]
    fn rejects_invalid_durations(#[case] input: &str) {
        assert!(parse(input).is_err(), "{input:?} should not parse");
    }

    #[test]
    fn rejects_overflowing_durations() {
        let err = parse("999999999999999999999999999999h").unwrap_err();
        assert!(err.reason.contains("out of range"));
    }
}
