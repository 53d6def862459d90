//! Timetable time handling.
//!
//! The timetable stores departure and arrival times as "HH:MM" strings at
//! minute precision. This module provides a validated wall-clock time type
//! and helpers for anchoring it to a travel date.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Rejected wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day at minute precision, e.g. "08:15".
///
/// Timetable times carry no date of their own; a journey happens on some
/// travel date, and [`TimeOfDay::on`] anchors the time to that date when an
/// absolute instant is needed.
///
/// # Examples
///
/// ```
/// use booking_server::domain::TimeOfDay;
///
/// let depart = TimeOfDay::parse_hhmm("08:15").unwrap();
/// assert_eq!(depart.to_string(), "08:15");
///
/// let later = TimeOfDay::parse_hhmm("17:40").unwrap();
/// assert!(depart < later);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Create a time of day from hour and minute components.
    ///
    /// Returns an error if the hour exceeds 23 or the minute exceeds 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let time =
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self(time))
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use booking_server::domain::TimeOfDay;
    ///
    /// // Valid times
    /// assert!(TimeOfDay::parse_hhmm("00:00").is_ok());
    /// assert!(TimeOfDay::parse_hhmm("23:59").is_ok());
    /// assert!(TimeOfDay::parse_hhmm("14:30").is_ok());
    ///
    /// // Invalid formats
    /// assert!(TimeOfDay::parse_hhmm("1430").is_err());
    /// assert!(TimeOfDay::parse_hhmm("14:3").is_err());
    /// assert!(TimeOfDay::parse_hhmm("25:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // HH:MM and nothing else, 5 bytes
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::new(hour, minute)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Anchor this time of day to a travel date, producing an instant.
    ///
    /// # Examples
    ///
    /// ```
    /// use booking_server::domain::TimeOfDay;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let instant = TimeOfDay::parse_hhmm("14:30").unwrap().on(date);
    /// assert_eq!(instant.to_string(), "2024-03-15 14:30:00");
    /// ```
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }

    /// Duration from this time until `later` on the same service.
    ///
    /// When `later` reads earlier on the clock the service runs over
    /// midnight, so a day is added.
    ///
    /// # Examples
    ///
    /// ```
    /// use booking_server::domain::TimeOfDay;
    /// use chrono::Duration;
    ///
    /// let depart = TimeOfDay::parse_hhmm("22:30").unwrap();
    /// let arrive = TimeOfDay::parse_hhmm("06:15").unwrap();
    /// assert_eq!(depart.until(arrive), Duration::minutes(7 * 60 + 45));
    /// ```
    pub fn until(&self, later: TimeOfDay) -> Duration {
        let diff = later.0.signed_duration_since(self.0);
        if diff < Duration::zero() {
            diff + Duration::days(1)
        } else {
            diff
        }
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse exactly two ASCII digits into a number.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }

    let tens = (bytes[0] as char).to_digit(10)?;
    let units = (bytes[1] as char).to_digit(10)?;

    Some(tens * 10 + units)
}

/// Format a duration as a compact "3h 25m" string.
///
/// Durations under an hour render as "45m"; exact hours as "2h 0m" is
/// avoided in favour of "2h".
///
/// # Examples
///
/// ```
/// use booking_server::domain::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(Duration::minutes(205)), "3h 25m");
/// assert_eq!(format_duration(Duration::minutes(45)), "45m");
/// assert_eq!(format_duration(Duration::minutes(120)), "2h");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        assert!(TimeOfDay::parse_hhmm("00:00").is_ok());
        assert!(TimeOfDay::parse_hhmm("09:05").is_ok());
        assert!(TimeOfDay::parse_hhmm("12:30").is_ok());
        assert!(TimeOfDay::parse_hhmm("23:59").is_ok());
    }

    #[test]
    fn reject_bad_format() {
        assert!(TimeOfDay::parse_hhmm("").is_err());
        assert!(TimeOfDay::parse_hhmm("1430").is_err());
        assert!(TimeOfDay::parse_hhmm("14.30").is_err());
        assert!(TimeOfDay::parse_hhmm("14:3").is_err());
        assert!(TimeOfDay::parse_hhmm("4:30").is_err());
        assert!(TimeOfDay::parse_hhmm("14:30:00").is_err());
        assert!(TimeOfDay::parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(TimeOfDay::parse_hhmm("24:00").is_err());
        assert!(TimeOfDay::parse_hhmm("25:00").is_err());
        assert!(TimeOfDay::parse_hhmm("14:60").is_err());
        assert!(TimeOfDay::parse_hhmm("99:99").is_err());
    }

    #[test]
    fn new_validates_components() {
        assert!(TimeOfDay::new(14, 30).is_ok());
        assert!(TimeOfDay::new(24, 0).is_err());
        assert!(TimeOfDay::new(0, 60).is_err());
    }

    #[test]
    fn ordering_follows_the_clock() {
        let early = TimeOfDay::parse_hhmm("06:00").unwrap();
        let noonish = TimeOfDay::parse_hhmm("12:15").unwrap();
        let late = TimeOfDay::parse_hhmm("23:45").unwrap();

        assert!(early < noonish);
        assert!(noonish < late);
        assert_eq!(early, TimeOfDay::new(6, 0).unwrap());
    }

    #[test]
    fn anchoring_produces_the_expected_instant() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let time = TimeOfDay::parse_hhmm("14:30").unwrap();
        let instant = time.on(date);

        assert_eq!(instant.date(), date);
        assert_eq!(instant.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn until_same_day() {
        let depart = TimeOfDay::parse_hhmm("08:00").unwrap();
        let arrive = TimeOfDay::parse_hhmm("11:25").unwrap();
        assert_eq!(depart.until(arrive), Duration::minutes(3 * 60 + 25));
    }

    #[test]
    fn until_wraps_past_midnight() {
        let depart = TimeOfDay::parse_hhmm("23:30").unwrap();
        let arrive = TimeOfDay::parse_hhmm("01:10").unwrap();
        assert_eq!(depart.until(arrive), Duration::minutes(100));
    }

    #[test]
    fn until_zero_for_equal_times() {
        let t = TimeOfDay::parse_hhmm("10:00").unwrap();
        assert_eq!(t.until(t), Duration::zero());
    }

    #[test]
    fn display_pads_with_zeros() {
        assert_eq!(TimeOfDay::new(9, 5).unwrap().to_string(), "09:05");
        assert_eq!(TimeOfDay::new(0, 0).unwrap().to_string(), "00:00");
        assert_eq!(TimeOfDay::new(23, 59).unwrap().to_string(), "23:59");
    }

    #[test]
    fn format_duration_variants() {
        assert_eq!(format_duration(Duration::minutes(0)), "0m");
        assert_eq!(format_duration(Duration::minutes(59)), "59m");
        assert_eq!(format_duration(Duration::minutes(60)), "1h");
        assert_eq!(format_duration(Duration::minutes(61)), "1h 1m");
        assert_eq!(format_duration(Duration::minutes(16 * 60 + 10)), "16h 10m");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_time()(hour in 0u32..24, minute in 0u32..60) -> TimeOfDay {
            TimeOfDay::new(hour, minute).unwrap()
        }
    }

    proptest! {
        #[test]
        fn display_roundtrips_through_parse(time in arb_time()) {
            let rendered = time.to_string();
            let parsed = TimeOfDay::parse_hhmm(&rendered).unwrap();
            prop_assert_eq!(time, parsed);
        }

        #[test]
        fn ordering_matches_anchored_instants(a in arb_time(), b in arb_time()) {
            let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
            prop_assert_eq!(a.cmp(&b), a.on(date).cmp(&b.on(date)));
        }

        #[test]
        fn until_is_non_negative_and_bounded(a in arb_time(), b in arb_time()) {
            let gap = a.until(b);
            prop_assert!(gap >= Duration::zero());
            prop_assert!(gap < Duration::days(1));
        }
    }
}
