//! Date and time utilities for the OOXML serial date format.
//!
//! This module converts between `chrono` date/time representations and
//! Excel's date serial number format.
//!
//! # Excel Date System
//!
//! Excel stores dates as floating-point numbers counting days since a base
//! date; the fractional part is the time of day (0.0 = midnight, 0.5 =
//! noon). The anchor used here is December 30, 1899, so that serial 1.0 is
//! January 1, 1900.
//!
//! # Excel 1900 Leap Year Bug
//!
//! Excel incorrectly treats 1900 as a leap year for compatibility with
//! Lotus 1-2-3: serial 60 is the nonexistent February 29, 1900, and every
//! real date before March 1, 1900 is shifted by one day. This
//! implementation reproduces Excel's behavior exactly. Serial 60 itself
//! has no `chrono` representation; it converts to the nearest real date
//! (February 28, 1900), the single point where the round trip is lossy.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::common::error::{Error, Result};

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// First serial of the post-leap-bug region (March 1, 1900)
pub const FIRST_VALID_SERIAL_AFTER_BUG: f64 = 61.0;

/// The serial anchor date: December 30, 1899.
///
/// Two days before January 1, 1900 so that serial 1.0 is January 1, 1900
/// and serial 60 is the fictitious February 29, 1900.
pub fn epoch_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("static date")
}

/// Lowest date convertible to a serial (January 1, 1900, midnight).
pub fn min_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .expect("static date")
        .and_time(NaiveTime::MIN)
}

/// Highest date convertible to a serial (December 31, 9999, 23:59:59).
pub fn max_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .expect("static date")
        .and_hms_opt(23, 59, 59)
        .expect("static time")
}

/// First date after the leap-bug region (March 1, 1900).
fn leap_bug_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 3, 1).expect("static date")
}

/// Convert a date/time to an OOXML day serial.
///
/// The input must lie in `[1900-01-01T00:00:00, 9999-12-31T23:59:59]`;
/// anything outside fails with a format error. Dates strictly before
/// March 1, 1900 are shifted back one calendar day to compensate for
/// Excel's fictitious February 29, 1900.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use longan::sheet::dates::to_serial_date;
///
/// let d = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(to_serial_date(&d).unwrap(), 61.0);
/// ```
pub fn to_serial_date(date: &NaiveDateTime) -> Result<f64> {
    if *date < min_date() || *date > max_date() {
        return Err(Error::Format(format!(
            "date {date} is outside the serial range 1900-01-01..9999-12-31"
        )));
    }
    Ok(to_serial_date_unchecked(date))
}

/// Range-unchecked variant of [`to_serial_date`] for internal callers that
/// have already validated the input.
pub fn to_serial_date_unchecked(date: &NaiveDateTime) -> f64 {
    let adjusted = if date.date() < leap_bug_cutoff() {
        *date - Duration::days(1)
    } else {
        *date
    };
    let seconds_of_day = f64::from(adjusted.time().num_seconds_from_midnight());
    let whole_days = (adjusted.date() - epoch_anchor()).num_days() as f64;
    seconds_of_day / SECONDS_PER_DAY + whole_days
}

/// Convert an OOXML day serial back to a date/time.
///
/// Serials below 60 gain one day to undo the leap-bug compensation, so
/// serial 1 is January 1, 1900 and serial 61 is March 1, 1900. The
/// fractional part is rounded to the nearest whole second.
pub fn from_serial_date(serial: f64) -> NaiveDateTime {
    let compensated = if serial < 60.0 { serial + 1.0 } else { serial };
    let total_seconds = (compensated * SECONDS_PER_DAY).round() as i64;
    epoch_anchor().and_time(NaiveTime::MIN) + Duration::seconds(total_seconds)
}

/// Convert a duration to an OOXML time serial: the whole-days component
/// plus the seconds within the final day as a day fraction. No range
/// validation applies since the value is relative.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use longan::sheet::dates::to_serial_time;
///
/// assert_eq!(to_serial_time(&Duration::hours(6)), 0.25);
/// assert_eq!(to_serial_time(&Duration::hours(30)), 1.25);
/// ```
pub fn to_serial_time(duration: &Duration) -> f64 {
    let total_seconds = duration.num_seconds();
    let whole_days = total_seconds.div_euclid(86400);
    let seconds_in_day = total_seconds.rem_euclid(86400);
    whole_days as f64 + seconds_in_day as f64 / SECONDS_PER_DAY
}

/// Convert an OOXML time serial back to a duration.
pub fn from_serial_time(serial: f64) -> Duration {
    Duration::seconds((serial * SECONDS_PER_DAY).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, ss)
            .unwrap()
    }

    #[test]
    fn test_serial_anchors() {
        assert_eq!(to_serial_date(&dt(1900, 1, 1, 0, 0, 0)).unwrap(), 1.0);
        assert_eq!(to_serial_date(&dt(1900, 2, 28, 0, 0, 0)).unwrap(), 59.0);
        assert_eq!(to_serial_date(&dt(1900, 3, 1, 0, 0, 0)).unwrap(), 61.0);
        assert_eq!(to_serial_date(&dt(2000, 1, 1, 12, 0, 0)).unwrap(), 36526.5);
    }

    #[test]
    fn test_leap_bug_region_roundtrip() {
        for day in 1..=28 {
            let original = dt(1900, 1, day, 6, 30, 15);
            let serial = to_serial_date(&original).unwrap();
            assert_eq!(from_serial_date(serial), original);
        }
        // serial 61 is the first real post-bug date
        assert_eq!(from_serial_date(61.0), dt(1900, 3, 1, 0, 0, 0));
        assert_eq!(from_serial_date(1.0), dt(1900, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_fictitious_feb_29_maps_to_feb_28() {
        assert_eq!(from_serial_date(60.0), dt(1900, 2, 28, 0, 0, 0));
    }

    #[test]
    fn test_roundtrip_post_bug() {
        for original in [
            dt(1900, 3, 1, 0, 0, 0),
            dt(1970, 1, 1, 0, 0, 0),
            dt(2024, 6, 15, 23, 59, 59),
            dt(9999, 12, 31, 23, 59, 59),
        ] {
            let serial = to_serial_date(&original).unwrap();
            assert_eq!(from_serial_date(serial), original);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(to_serial_date(&dt(1899, 12, 31, 23, 59, 59)).is_err());
        assert!(to_serial_date(&dt(10000, 1, 1, 0, 0, 0)).is_err());
    }

    #[test]
    fn test_serial_time() {
        assert_eq!(to_serial_time(&Duration::seconds(0)), 0.0);
        assert_eq!(to_serial_time(&Duration::hours(12)), 0.5);
        assert_eq!(
            to_serial_time(&(Duration::days(2) + Duration::hours(6))),
            2.25
        );
        assert_eq!(from_serial_time(1.5), Duration::hours(36));
    }
}
