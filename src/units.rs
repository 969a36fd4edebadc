//! Simulator time decoding.
//!
//! Flow-monitor traces serialise every timestamp as an integer count of
//! nanoseconds followed by the unit, e.g. `"1500000000ns"` or the ns-3
//! `Time` form `"+1500000000.0ns"`.

use crate::error::{Result, TraceError};

pub const NANOS_PER_SECOND: f64 = 1e9;

/// Parse a `<integer>ns` timestamp into nanoseconds.
///
/// Accepts an optional sign and an all-zero fractional part (`+12.0ns`).
/// Any other unit, a missing unit, or a non-integral value is a
/// [`TraceError::MalformedTimestamp`].
///
/// # Examples
/// ```
/// use flowstat::units::parse_time_ns;
///
/// assert_eq!(parse_time_ns("1000000000ns").unwrap(), 1_000_000_000);
/// assert_eq!(parse_time_ns("+250.0ns").unwrap(), 250);
/// assert!(parse_time_ns("123us").is_err());
/// ```
pub fn parse_time_ns(value: &str) -> Result<i128> {
    let malformed = || TraceError::MalformedTimestamp {
        value: value.to_string(),
    };

    let number = value.trim().strip_suffix("ns").ok_or_else(malformed)?;

    let (negative, unsigned) = match number.as_bytes().first() {
        Some(b'+') => (false, &number[1..]),
        Some(b'-') => (true, &number[1..]),
        _ => (false, number),
    };

    let (integral, fraction) = match unsigned.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (unsigned, None),
    };

    if integral.is_empty() || !integral.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b == b'0') {
            return Err(malformed());
        }
    }

    let magnitude: i128 = integral.parse().map_err(|_| malformed())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Convert nanoseconds to seconds
pub fn ns_to_seconds(nanos: i128) -> f64 {
    nanos as f64 / NANOS_PER_SECOND
}
