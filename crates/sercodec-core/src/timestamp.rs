use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{Result, SerError};

/// Size in bytes of one trailer timestamp.
pub const TIMESTAMP_SIZE: usize = 8;

/// Decode the optional timestamp trailer.
///
/// Presence is inferred from the remaining byte count: the trailer exists
/// only when at least `frame_count` u64 values fit, and any bytes beyond
/// them are discarded. A shorter remainder means the file has no
/// timestamps, which is a legitimate variant rather than a truncation.
pub fn decode_timestamps(trailer: &[u8], frame_count: u32) -> Option<Vec<u64>> {
    let count = frame_count as usize;
    let needed = count.checked_mul(TIMESTAMP_SIZE)?;
    if trailer.len() < needed {
        return None;
    }

    let mut timestamps = Vec::with_capacity(count);
    for chunk in trailer[..needed].chunks_exact(TIMESTAMP_SIZE) {
        let mut bytes = [0u8; TIMESTAMP_SIZE];
        bytes.copy_from_slice(chunk);
        timestamps.push(u64::from_le_bytes(bytes));
    }
    Some(timestamps)
}

/// Append a timestamp trailer, one little-endian u64 per frame.
pub fn encode_timestamps(out: &mut Vec<u8>, timestamps: &[u64], frame_count: u32) -> Result<()> {
    if timestamps.len() != frame_count as usize {
        return Err(SerError::Validation(format!(
            "timestamp count {} does not match frame count {frame_count}",
            timestamps.len()
        )));
    }
    for &ts in timestamps {
        out.extend_from_slice(&ts.to_le_bytes());
    }
    Ok(())
}

/// Render a SER tick count (100-nanosecond intervals since midnight,
/// Jan 1, year 1) as an ISO 8601 date-time string.
///
/// Fractional seconds are printed at microsecond precision and only when
/// nonzero. This is the only place the codec interprets tick values.
pub fn ticks_to_datetime(ticks: u64) -> String {
    let micros = (ticks / 10) as i64;
    let instant = ser_epoch() + Duration::microseconds(micros);
    if micros % 1_000_000 == 0 {
        instant.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        instant.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Midnight, Jan 1, year 1: the epoch of all SER tick fields.
fn ser_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("year 1 is a valid proleptic Gregorian date")
}
