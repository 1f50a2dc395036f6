//! Usage record model.
//!
//! A record is one set-top-box viewing event. Once built it is never
//! modified; a newer event for the same key replaces the whole value.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::validate::{
    parse_date, parse_revenue, parse_view_time, validate_revenue, validate_text, FormatError,
    LINE_FIELD_COUNT,
};

/// A single parsed usage event.
///
/// Two constructors exist: [`Record::new`] from discrete values and
/// [`Record::parse_line`] from a `STB|TITLE|PROVIDER|DATE|REV|VIEW_TIME`
/// line. Both apply the same validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    stb: String,
    title: String,
    provider: String,
    viewed_at: NaiveDateTime,
    revenue: f64,
}

impl Record {
    /// Build a record from its six discrete fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if any field fails validation.
    pub fn new(
        stb: &str,
        title: &str,
        provider: &str,
        date: &str,
        revenue: f64,
        view_time: &str,
    ) -> Result<Self, FormatError> {
        validate_text("stb", stb)?;
        validate_text("title", title)?;
        validate_text("provider", provider)?;
        let date = parse_date(date)?;
        let time = parse_view_time(view_time)?;
        let revenue = validate_revenue(revenue)?;

        Ok(Self::from_parts(stb, title, provider, date, time, revenue))
    }

    /// Parse a pipe-delimited input line.
    ///
    /// Expected format: `STB|TITLE|PROVIDER|DATE|REV|VIEW_TIME`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the field count is not exactly six or any
    /// field fails validation.
    pub fn parse_line(line: &str) -> Result<Self, FormatError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != LINE_FIELD_COUNT {
            return Err(FormatError::FieldCount {
                expected: LINE_FIELD_COUNT,
                found: fields.len(),
            });
        }

        let [stb, title, provider, date, revenue, view_time] = [
            fields[0], fields[1], fields[2], fields[3], fields[4], fields[5],
        ];

        validate_text("stb", stb)?;
        validate_text("title", title)?;
        validate_text("provider", provider)?;
        let date = parse_date(date)?;
        let revenue = parse_revenue(revenue)?;
        let time = parse_view_time(view_time)?;

        Ok(Self::from_parts(stb, title, provider, date, time, revenue))
    }

    fn from_parts(
        stb: &str,
        title: &str,
        provider: &str,
        date: NaiveDate,
        time: NaiveTime,
        revenue: f64,
    ) -> Self {
        Self {
            stb: stb.to_string(),
            title: title.to_string(),
            provider: provider.to_string(),
            viewed_at: date.and_time(time),
            revenue,
        }
    }

    /// De-duplication key: stb, title and date concatenated without separators.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{}{}", self.stb, self.title, self.date())
    }

    #[must_use]
    pub fn stb(&self) -> &str {
        &self.stb
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    #[must_use]
    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    /// Viewing date as ISO `YYYY-MM-DD` text.
    #[must_use]
    pub fn date(&self) -> String {
        self.viewed_at.format("%Y-%m-%d").to_string()
    }

    /// View time as `H:MM` text (hour not zero-padded).
    #[must_use]
    pub fn view_time(&self) -> String {
        format!("{}:{:02}", self.hour(), self.minute())
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.viewed_at.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.viewed_at.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.viewed_at.day()
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.viewed_at.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.viewed_at.minute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> Record {
        Record::new("abc123", "title1", "provider1", "2017-05-06", 1.5, "0:20").unwrap()
    }

    #[test]
    fn test_accessors() {
        let record = make_record();

        assert_eq!(record.stb(), "abc123");
        assert_eq!(record.title(), "title1");
        assert_eq!(record.provider(), "provider1");
        assert!((record.revenue() - 1.5).abs() < f64::EPSILON);
        assert_eq!(record.date(), "2017-05-06");
        assert_eq!(record.view_time(), "0:20");
        assert_eq!((record.year(), record.month(), record.day()), (2017, 5, 6));
        assert_eq!((record.hour(), record.minute()), (0, 20));
    }

    #[test]
    fn test_key_concatenates_without_separators() {
        let record = make_record();
        assert_eq!(record.key(), "abc123title12017-05-06");
    }

    #[test]
    fn test_parse_line() {
        let record = Record::parse_line("stb1|the matrix|warner bros|2014-04-01|4.00|1:30").unwrap();

        assert_eq!(record.stb(), "stb1");
        assert_eq!(record.title(), "the matrix");
        assert_eq!(record.provider(), "warner bros");
        assert_eq!(record.date(), "2014-04-01");
        assert!((record.revenue() - 4.0).abs() < f64::EPSILON);
        assert_eq!(record.view_time(), "1:30");
    }

    #[test]
    fn test_parse_line_strips_carriage_return() {
        let record = Record::parse_line("stb1|the matrix|warner bros|2014-04-01|4.00|1:30\r").unwrap();
        assert_eq!(record.view_time(), "1:30");
    }

    #[test]
    fn test_parse_line_field_count() {
        let err = Record::parse_line("stb1|the matrix|warner bros|2014-04-01|4.00").unwrap_err();
        assert_eq!(err, FormatError::FieldCount { expected: 6, found: 5 });

        let err = Record::parse_line("a|b|c|2014-04-01|4.00|1:30|extra").unwrap_err();
        assert_eq!(err, FormatError::FieldCount { expected: 6, found: 7 });
    }

    #[test]
    fn test_parse_line_bad_year() {
        let result = Record::parse_line("stb1|the matrix|warner bros|224-04-01|4.00|1:30");
        assert!(matches!(result, Err(FormatError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_line_bad_hour() {
        let result = Record::parse_line("stb1|the matrix|warner bros|2014-04-01|4.00|128:30");
        assert!(matches!(result, Err(FormatError::InvalidViewTime(_))));
    }

    #[test]
    fn test_parse_line_bad_revenue() {
        let result = Record::parse_line("stb1|the matrix|warner bros|2014-04-01|free|1:30");
        assert!(matches!(result, Err(FormatError::InvalidRevenue(_))));
    }

    #[test]
    fn test_both_constructors_share_length_policy() {
        let long = "t".repeat(65);
        let line = format!("stb1|{long}|warner bros|2014-04-01|4.00|1:30");

        assert!(Record::parse_line(&line).is_err());
        assert!(Record::new("stb1", &long, "warner bros", "2014-04-01", 4.0, "1:30").is_err());
        assert!(Record::parse_line("|the matrix|warner bros|2014-04-01|4.00|1:30").is_err());
    }
}
