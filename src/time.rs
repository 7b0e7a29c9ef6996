use time::{OffsetDateTime, UtcOffset, Weekday};

use crate::error::AppError;

fn local_time(unix_secs: i64, utc_offset_secs: i32) -> Result<OffsetDateTime, AppError> {
    let offset = UtcOffset::from_whole_seconds(utc_offset_secs).map_err(|e| {
        log::error!("Invalid UTC offset {}: {:?}", utc_offset_secs, e);
        AppError::InvalidTimestamp
    })?;
    let utc = OffsetDateTime::from_unix_timestamp(unix_secs).map_err(|e| {
        log::error!("Invalid timestamp {}: {:?}", unix_secs, e);
        AppError::InvalidTimestamp
    })?;
    Ok(utc.to_offset(offset))
}

/// Local hour of day (0..=23), ready for the brightness table.
pub fn local_hour(unix_secs: i64, utc_offset_secs: i32) -> Result<i32, AppError> {
    Ok(local_time(unix_secs, utc_offset_secs)?.hour().into())
}

/// Index into the short day-of-week table: Sunday = 1 .. Saturday = 7.
pub fn weekday_index(unix_secs: i64, utc_offset_secs: i32) -> Result<u8, AppError> {
    let weekday = local_time(unix_secs, utc_offset_secs)?.weekday();
    Ok(match weekday {
        Weekday::Sunday => 1,
        Weekday::Monday => 2,
        Weekday::Tuesday => 3,
        Weekday::Wednesday => 4,
        Weekday::Thursday => 5,
        Weekday::Friday => 6,
        Weekday::Saturday => 7,
    })
}
