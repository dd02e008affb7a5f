//! Parsers for human-readable duration and rate limit strings.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{Error, Result};

static DURATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<value>[\d.]+)?\s*(?P<unit>[a-z]+)[\s,]*").unwrap()
});

static RATE_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?P<count>\d+)\s*(?P<unit>[a-z]+)?\s*/\s*(?P<period>.+?)\s*$").unwrap()
});

/// Parse a duration string to seconds.
///
/// The string is a comma-separated sequence of duration values. Each value is an
/// optional number (defaults to 1) followed by a case-insensitive unit, optionally
/// separated by whitespace:
///
/// - `months` (or `month`)
/// - `weeks` (or `w`, `week`)
/// - `days` (or `d`, `day`)
/// - `hours` (or `h`, `hour`)
/// - `minutes` (or `m`, `min`, `minute`)
/// - `seconds` (or `s`, `sec`, `second`)
///
/// A bare integer is taken as seconds. The sum is rounded to the nearest second.
///
/// ```
/// use subscrforge_collector::config::parse_duration;
///
/// assert_eq!(parse_duration("1 day").unwrap(), 86400);
/// assert_eq!(parse_duration("1h, 30m").unwrap(), 5400);
/// assert_eq!(parse_duration("3.14m").unwrap(), 188);
/// ```
pub fn parse_duration(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Ok(seconds);
    }

    let invalid = || Error::Config(format!("Invalid format of the duration string: '{}'", input));

    let mut total = 0f64;
    let mut consumed = 0;
    for captures in DURATION_TOKEN.captures_iter(trimmed) {
        let whole = captures.get(0).ok_or_else(invalid)?;
        if !trimmed[consumed..whole.start()].trim().is_empty() {
            return Err(invalid());
        }
        consumed = whole.end();

        let base = match captures.name("value") {
            Some(value) => value.as_str().parse::<f64>().map_err(|_| {
                Error::Config(format!(
                    "The value '{}' cannot be parsed as a number.",
                    value.as_str()
                ))
            })?,
            None => 1.0,
        };
        let unit = &captures["unit"];
        let multiplier = unit_seconds(unit)
            .ok_or_else(|| Error::Config(format!("Unrecognized unit '{}'.", unit)))?;

        total += base * multiplier as f64;
    }

    if consumed == 0 || consumed != trimmed.len() {
        return Err(invalid());
    }

    Ok(total.round_ties_even() as u64)
}

/// Seconds per duration unit.
fn unit_seconds(unit: &str) -> Option<u64> {
    let seconds = match unit.to_ascii_lowercase().as_str() {
        "month" | "months" => 2_628_000,
        "w" | "week" | "weeks" => 604_800,
        "d" | "day" | "days" => 86_400,
        "h" | "hour" | "hours" => 3_600,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        _ => return None,
    };
    Some(seconds)
}

/// A request quota: at most `max_requests` per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: NonZeroU32,
    pub period: Duration,
}

impl RateLimit {
    /// Interval between two permits when the quota is spread evenly.
    pub fn replenish_interval(&self) -> Duration {
        self.period / self.max_requests.get()
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            period: Duration::from_secs(1),
        }
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} req/{}s", self.max_requests, self.period.as_secs())
    }
}

impl FromStr for RateLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_rate_limit(s)
    }
}

/// Parse a rate limit string of the form `"<count> <unit>/<period>"`.
///
/// The period accepts the same grammar as [`parse_duration`], so `"10 req/s"`,
/// `"30 req/min"` and `"100 requests/2h"` are all valid.
pub fn parse_rate_limit(input: &str) -> Result<RateLimit> {
    let invalid = |message: &str| Error::ConfigValidation {
        field: "rate_limit".to_string(),
        message: format!("{} (got '{}')", message, input),
    };

    let captures = RATE_LIMIT
        .captures(input)
        .ok_or_else(|| invalid("Expected a value like '10 req/s'"))?;

    let count: u32 = captures["count"]
        .parse()
        .map_err(|_| invalid("Request count is out of range"))?;
    let max_requests =
        NonZeroU32::new(count).ok_or_else(|| invalid("Request count must be positive"))?;

    let period = parse_duration(&captures["period"])?;
    if period == 0 {
        return Err(invalid("Period must be at least one second"));
    }

    Ok(RateLimit {
        max_requests,
        period: Duration::from_secs(period),
    })
}
