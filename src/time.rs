use chrono::{DateTime, Utc};

/// Days between the Julian epoch and the Unix epoch (1970-01-01 00:00 UTC).
const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Julian date of "day zero" of a Gregorian year, i.e. 00:00 UTC on
/// December 31 of the preceding year. TLE epochs count day-of-year from 1,
/// so `julian_day_of_year(y) + doy` lands on the right date.
pub fn julian_day_of_year(year: i32) -> f64 {
    let y = year as f64;
    367.0 * y - ((7.0 * y) / 4.0).floor() + 30.0 + 1_721_013.5
}

/// A Julian date kept as a whole part (ending in .5) plus a day fraction,
/// preserving TLE epoch precision through long propagations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianDate {
    pub whole: f64,
    pub fraction: f64,
}

impl JulianDate {
    /// Build from a TLE epoch: a full four-digit year and a fractional
    /// day-of-year (1.0 = January 1, 00:00 UTC).
    pub fn from_year_and_days(year: i32, day_of_year: f64) -> Self {
        let whole_days = day_of_year.floor();
        // TLE epochs carry eight fractional digits; snap to that grid so
        // repeated conversions do not drift.
        let fraction = ((day_of_year - whole_days) * 1.0e8).round() / 1.0e8;
        JulianDate {
            whole: julian_day_of_year(year) + whole_days,
            fraction,
        }
    }

    pub fn value(&self) -> f64 {
        self.whole + self.fraction
    }

    /// The Julian date `minutes` after this one.
    pub fn offset_minutes(&self, minutes: f64) -> f64 {
        self.value() + minutes / 1440.0
    }

    /// Days elapsed since the SGP4 reference epoch (1950 January 0.0 UT).
    pub fn days_since_1950(&self) -> f64 {
        (self.whole - 2_433_281.5) + self.fraction
    }

    /// Civil timestamp for display at the boundary; millisecond precision.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let unix_ms = (self.value() - JD_UNIX_EPOCH) * 86_400_000.0;
        DateTime::from_timestamp_millis(unix_ms.round() as i64)
    }
}

/// Two-digit TLE epoch years pivot at 57 (Sputnik).
pub fn expand_tle_year(two_digit: u32) -> i32 {
    if two_digit < 57 {
        2000 + two_digit as i32
    } else {
        1900 + two_digit as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn j2000_reference() {
        // 2000-01-01 12:00 UTC is JD 2451545.0
        let jd = JulianDate::from_year_and_days(2000, 1.5);
        assert!((jd.value() - 2_451_545.0).abs() < 1.0e-9);
    }

    #[test]
    fn iss_epoch_lands_on_expected_date() {
        let jd = JulianDate::from_year_and_days(2008, 264.51782528);
        let dt = jd.to_datetime().unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2008, 9, 20));
    }

    #[test]
    fn year_pivot() {
        assert_eq!(expand_tle_year(8), 2008);
        assert_eq!(expand_tle_year(56), 2056);
        assert_eq!(expand_tle_year(57), 1957);
        assert_eq!(expand_tle_year(99), 1999);
    }

    #[test]
    fn offset_moves_forward() {
        let jd = JulianDate::from_year_and_days(2008, 264.0);
        assert!((jd.offset_minutes(1440.0) - (jd.value() + 1.0)).abs() < 1.0e-12);
    }
}
