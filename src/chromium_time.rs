//! Chromium timestamps: microseconds since 1601-01-01 00:00:00 UTC.

use time::{Duration, OffsetDateTime};

use crate::error::{ImportError, Result};

/// Offset between the Chromium epoch (1601) and the Unix epoch, in microseconds.
pub const CHROMIUM_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Convert a raw Chromium timestamp to an absolute UTC time.
pub fn to_datetime(raw: i64) -> Result<OffsetDateTime> {
    let unix_micros = raw
        .checked_sub(CHROMIUM_EPOCH_OFFSET_MICROS)
        .ok_or(ImportError::InvalidTimestamp(raw))?;
    OffsetDateTime::UNIX_EPOCH
        .checked_add(Duration::microseconds(unix_micros))
        .ok_or(ImportError::InvalidTimestamp(raw))
}

/// Convert an absolute time back to a raw Chromium timestamp.
///
/// Sub-microsecond parts round toward the past. `None` if the result does not
/// fit in an `i64`.
pub fn from_datetime(value: OffsetDateTime) -> Option<i64> {
    let unix_micros = i64::try_from(value.unix_timestamp_nanos().div_euclid(1_000)).ok()?;
    unix_micros.checked_add(CHROMIUM_EPOCH_OFFSET_MICROS)
}
