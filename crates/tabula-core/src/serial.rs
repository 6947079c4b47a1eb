//! Serial-day numbers (1900 date system)
//!
//! A date is the number of days since 1899-12-31, so 1900-01-01 is serial 1.
//! The 1900 system treats 1900 as a leap year: serial 60 is the phantom
//! 1900-02-29 and every later serial is one day ahead of a plain count. The
//! fractional part is the time of day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Largest serial the 1900 system can show (9999-12-31)
pub const MAX_SERIAL: f64 = 2_958_465.0;

const PHANTOM_LEAP_DAY: i64 = 60;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Serial number of a calendar date, or `None` before 1900-01-01 or after
/// 9999-12-31.
pub fn from_date(date: NaiveDate) -> Option<f64> {
    if date.year() < 1900 || date.year() > 9999 {
        return None;
    }
    let mut days = (date - epoch()).num_days();
    if days >= PHANTOM_LEAP_DAY {
        days += 1;
    }
    Some(days as f64)
}

/// Serial number of a date and time of day
pub fn from_datetime(datetime: NaiveDateTime) -> Option<f64> {
    let day = from_date(datetime.date())?;
    let time = datetime.time();
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    Some(day + seconds / 86_400.0)
}

/// Year, month and day of a serial number.
///
/// Serial 0 is the placeholder date 1900-01-00 and serial 60 is 1900-02-29,
/// neither of which exists in the real calendar. Negative and too-large
/// serials have no date.
pub fn to_ymd(serial: f64) -> Option<(i32, u32, u32)> {
    if !(0.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as i64;
    match days {
        0 => Some((1900, 1, 0)),
        PHANTOM_LEAP_DAY => Some((1900, 2, 29)),
        _ => {
            let offset = if days > PHANTOM_LEAP_DAY { days - 1 } else { days };
            let date = epoch().checked_add_signed(Duration::days(offset))?;
            Some((date.year(), date.month(), date.day()))
        }
    }
}

/// Calendar date and time of a serial number, for serials that name a real
/// day (so not 0 or 60).
pub fn to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let (year, month, day) = to_ymd(serial)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let millis = (serial.fract() * 86_400_000.0).round() as i64;
    Some(date.and_hms_opt(0, 0, 0)? + Duration::milliseconds(millis))
}
