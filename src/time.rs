//! Timestamp and duration codecs for the service's wire formats.
//!
//! Timestamps arrive either as naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` strings
//! (always UTC) or as RFC 3339 strings with an offset, and are always written
//! back in the naive layout. Durations arrive either as duration expressions
//! such as `"1.5ms"` or as a bare number of seconds, and are always written
//! as expressions.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Layout without zone information; `%.f` also accepts a missing fraction.
const NAIVE_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const NANOS_PER_SEC: u128 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC instant with the service's JSON representation.
///
/// The wire layout carries microseconds, so [`Time::parse`], [`Time::now`]
/// and `From<DateTime<Utc>>` truncate to microseconds. A value built through
/// the public field keeps its nanoseconds, but [`Time::format`] drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub DateTime<Utc>);

impl Time {
    /// Parse with each accepted layout in turn; the first match wins.
    pub fn parse(s: &str) -> Result<Self> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, NAIVE_LAYOUT) {
            return Ok(Time::from(naive.and_utc()));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Time::from(dt.with_timezone(&Utc)))
            .map_err(|_| Error::InvalidFormat(format!("unrecognised timestamp {s:?}")))
    }

    /// Canonical layout: microsecond precision, trailing zeros trimmed.
    pub fn format(&self) -> String {
        let base = self.0.format("%Y-%m-%dT%H:%M:%S").to_string();
        let micros = self.0.timestamp_subsec_micros();
        if micros == 0 {
            return base;
        }
        let frac = format!("{micros:06}");
        format!("{base}.{}", frac.trim_end_matches('0'))
    }

    pub fn now() -> Self {
        Time::from(Utc::now())
    }
}

impl Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Time(dt.trunc_subsecs(6))
    }
}

impl FromStr for Time {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Time::parse(s)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Time::parse(&raw).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// A non-negative span with the service's JSON representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub std::time::Duration);

impl Duration {
    /// Parse a duration expression such as `"30s"`, `"1h2m"` or `"12.5ms"`.
    pub fn parse(s: &str) -> Result<Self> {
        parse_expression(s).map(Duration)
    }

    /// Interpret a number of seconds. The value is rendered with six decimals
    /// and parsed as an expression, so precision stops at microseconds.
    pub fn from_seconds(secs: f64) -> Result<Self> {
        if !secs.is_finite() {
            return Err(Error::InvalidFormat(format!("invalid duration {secs}")));
        }
        Duration::parse(&format!("{secs:.6}s"))
    }

    /// Accept either JSON representation.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Duration::parse(s),
            Value::Number(n) => match n.as_f64() {
                Some(secs) => Duration::from_seconds(secs),
                None => Err(Error::InvalidFormat(format!("invalid duration {n}"))),
            },
            other => Err(Error::InvalidFormat(format!("invalid duration {other}"))),
        }
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Duration(d)
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Duration::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_expression(self.0))
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }
}

struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string or a number of seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Duration, E> {
        Duration::parse(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Duration, E> {
        Duration::from_seconds(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Duration, E> {
        Ok(Duration(std::time::Duration::from_secs(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Duration, E> {
        u64::try_from(v)
            .map(|secs| Duration(std::time::Duration::from_secs(secs)))
            .map_err(|_| E::custom(Error::InvalidFormat(format!("negative duration {v}"))))
    }
}

/// Grammar: an optional `+`, then one or more `<number><unit>` terms where the
/// number may carry a fraction. A lone `0` is accepted without a unit.
fn parse_expression(input: &str) -> Result<std::time::Duration> {
    let invalid = || Error::InvalidFormat(format!("invalid duration {input:?}"));

    let mut s = input;
    if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    } else if s.starts_with('-') {
        return Err(Error::InvalidFormat(format!("negative duration {input:?}")));
    }
    if s == "0" {
        return Ok(std::time::Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (int_part, rest) = s.split_at(int_len);
        let (frac_part, rest) = match rest.strip_prefix('.') {
            Some(after) => {
                let n = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
                after.split_at(n)
            }
            None => ("", rest),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, rest) = rest.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            _ => return Err(invalid()),
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut frac: u128 = 0;
        let mut divisor: u128 = 1;
        // Digits past nanosecond resolution of an hour cannot matter.
        for digit in frac_part.bytes().take(18) {
            frac = frac * 10 + u128::from(digit - b'0');
            divisor *= 10;
        }

        let term = whole
            .checked_mul(scale)
            .and_then(|w| w.checked_add(frac * scale / divisor))
            .ok_or_else(invalid)?;
        total = total.checked_add(term).ok_or_else(invalid)?;
        s = rest;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(std::time::Duration::new(secs, nanos))
}

fn format_expression(d: std::time::Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_SEC {
        let (scale, unit) = if nanos < 1_000 {
            (1, "ns")
        } else if nanos < 1_000_000 {
            (1_000, "µs")
        } else {
            (1_000_000, "ms")
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let whole_secs = nanos / NANOS_PER_SEC;
    let hours = whole_secs / 3_600;
    let minutes = (whole_secs / 60) % 60;
    let seconds = decimal(nanos % (60 * NANOS_PER_SEC), NANOS_PER_SEC);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let rem = value % scale;
    if rem == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
