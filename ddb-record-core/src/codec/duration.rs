/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Codecs for [`time::Duration`].
//!
//! Durations are limited to a signed 64-bit count of nanoseconds (roughly 292 years either way).
//! The textual form is a sequence of decimal numbers, each with an optional fraction and a unit
//! suffix, such as `300ms`, `-1.5h` or `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`,
//! `m` and `h`.

use std::fmt;
use std::fmt::Write as _;

use aws_sdk_dynamodb::types::AttributeValue;
use time::Duration;

use super::scalar::{format_float, parse_integer};
use super::{expect_n, expect_s, Codec};
use crate::error::CodecError;

const TARGET: &str = "duration";

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;

/// Returns the whole number of nanoseconds in `d`, or an overflow error if it does not fit `i64`.
pub(crate) fn whole_nanoseconds(d: &Duration) -> Result<i64, CodecError> {
    i64::try_from(d.whole_nanoseconds()).map_err(|_| CodecError::overflow(format!("{d:?}"), TARGET))
}

/// Displays a duration in its canonical textual form, e.g. `8h0m0.25s`, `1.5µs` or `0s`.
///
/// The duration must fit in 64-bit nanoseconds; see [`whole_nanoseconds`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayDuration(i64);

impl DisplayDuration {
    /// Wraps `d` for display, failing if it is out of range.
    pub fn new(d: &Duration) -> Result<Self, CodecError> {
        whole_nanoseconds(d).map(DisplayDuration)
    }
}

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.unsigned_abs() as u128;
        if self.0 < 0 {
            f.write_char('-')?;
        }
        if total == 0 {
            return f.write_str("0s");
        }
        if total < SECOND {
            return if total < MICROSECOND {
                write!(f, "{total}ns")
            } else if total < MILLISECOND {
                write_fraction(f, total, 3)?;
                f.write_str("µs")
            } else {
                write_fraction(f, total, 6)?;
                f.write_str("ms")
            };
        }
        let hours = total / HOUR;
        let minutes = (total % HOUR) / MINUTE;
        let seconds = total % MINUTE;
        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write_fraction(f, seconds, 9)?;
        f.write_char('s')
    }
}

// Writes `value / 10^precision` with trailing zeros of the fraction removed.
fn write_fraction(f: &mut fmt::Formatter<'_>, value: u128, precision: u32) -> fmt::Result {
    let scale = 10_u128.pow(precision);
    let (whole, fraction) = (value / scale, value % scale);
    write!(f, "{whole}")?;
    if fraction == 0 {
        return Ok(());
    }
    let digits = format!("{fraction:0width$}", width = precision as usize);
    write!(f, ".{}", digits.trim_end_matches('0'))
}

/// Parses the textual form of a duration.
///
/// A lone `0` is accepted without a unit. Text that is well formed but exceeds the supported
/// range is reported as overflow.
pub fn parse_duration(text: &str) -> Result<Duration, CodecError> {
    let parse_error = || CodecError::parse(text, TARGET);

    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(parse_error());
    }

    let mut total: u128 = 0;
    let mut overflowed = false;
    while !rest.is_empty() {
        let (whole, after_whole) = split_digits(rest);
        let (fraction, after_fraction) = match after_whole.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", after_whole),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(parse_error());
        }
        let unit_len = after_fraction
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_fraction.len());
        let (unit, remainder) = after_fraction.split_at(unit_len);
        let unit = unit_scale(unit).ok_or_else(parse_error)?;
        rest = remainder;

        match component_nanos(whole, fraction, unit) {
            Some(nanos) => match total.checked_add(nanos) {
                Some(sum) => total = sum,
                None => overflowed = true,
            },
            None => overflowed = true,
        }
    }

    let limit = if negative {
        i64::MIN.unsigned_abs() as u128
    } else {
        i64::MAX as u128
    };
    if overflowed || total > limit {
        return Err(CodecError::overflow(text, TARGET));
    }
    let signed = if negative {
        -(total as i128)
    } else {
        total as i128
    };
    // `total` is bounded by `limit`, so this always fits.
    Ok(Duration::nanoseconds(signed as i64))
}

fn split_digits(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(end)
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

// Nanoseconds in `whole.fraction` units. Fraction digits beyond nanosecond precision are dropped.
fn component_nanos(whole: &str, fraction: &str, unit: u128) -> Option<u128> {
    let mut nanos: u128 = 0;
    for digit in whole.bytes() {
        nanos = nanos.checked_mul(10)?.checked_add(u128::from(digit - b'0'))?;
        if nanos > i64::MAX as u128 + 1 {
            return None;
        }
    }
    nanos = nanos.checked_mul(unit)?;

    let mut numerator: u128 = 0;
    let mut scale: u128 = 1;
    for digit in fraction.bytes().take(20) {
        numerator = numerator * 10 + u128::from(digit - b'0');
        scale *= 10;
    }
    nanos.checked_add(numerator * unit / scale)
}

/// The canonical textual form, stored as `S`. Round-trips exactly.
pub fn string_codec() -> Codec<Duration> {
    Codec::new(
        "duration-string",
        |d: &Duration| Ok(AttributeValue::S(DisplayDuration::new(d)?.to_string())),
        |av| parse_duration(expect_s(av)?),
    )
}

/// A signed 64-bit count of nanoseconds, stored as `N`. Round-trips exactly.
pub fn nanoseconds_codec() -> Codec<Duration> {
    Codec::new(
        "duration-nanoseconds",
        |d: &Duration| {
            let nanos = whole_nanoseconds(d)?;
            Ok(AttributeValue::N(itoa::Buffer::new().format(nanos).to_owned()))
        },
        |av| parse_integer::<i64>(expect_n(av)?, TARGET).map(Duration::nanoseconds),
    )
}

/// Floating-point seconds, stored as `N`.
///
/// Lossy: decoding truncates toward zero to whole seconds, so sub-second precision does not
/// survive a round trip.
pub fn seconds_codec() -> Codec<Duration> {
    Codec::new(
        "duration-seconds",
        |d: &Duration| {
            whole_nanoseconds(d)?;
            let seconds = d.as_seconds_f64();
            format_float(seconds, seconds.is_finite()).map(AttributeValue::N)
        },
        |av| {
            let text = expect_n(av)?;
            if text.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
                return Err(CodecError::parse(text, TARGET));
            }
            let seconds: f64 = text.parse().map_err(|_| CodecError::parse(text, TARGET))?;
            let whole = seconds.trunc();
            if !(-MAX_WHOLE_SECONDS..=MAX_WHOLE_SECONDS).contains(&whole) {
                return Err(CodecError::overflow(text, TARGET));
            }
            Ok(Duration::seconds(whole as i64))
        },
    )
}

// The largest whole number of seconds that fits in 64-bit nanoseconds.
const MAX_WHOLE_SECONDS: f64 = 9_223_372_036.0;
