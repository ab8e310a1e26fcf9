//! Statement date-range resolution.
//!
//! Transaction lines carry month abbreviations without years; the year has
//! to come from the statement header, or failing that from a date embedded
//! in the input filename. Lookup never fails: months missing from the
//! mapping fall back to the earliest mapped year, then to the current
//! year.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Calendar month abbreviations as they appear in statement text.
pub const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// 1-based month number for a 3-letter abbreviation, if valid.
pub fn month_number(code: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(code))
        .map(|i| i as u32 + 1)
}

/// Month-abbreviation to year mapping for one statement period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    years: HashMap<String, i32>,
}

impl DateRange {
    /// Record the year of a month abbreviation.
    pub fn insert(&mut self, month: &str, year: i32) {
        self.years.insert(month.to_ascii_uppercase(), year);
    }

    /// The mapped year of a month abbreviation, if known.
    pub fn get(&self, month: &str) -> Option<i32> {
        self.years.get(&month.to_ascii_uppercase()).copied()
    }

    /// Whether no months have been mapped.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// The earliest year in the mapping, if any.
    pub fn earliest_year(&self) -> Option<i32> {
        self.years.values().min().copied()
    }

    /// Resolve the year for a month with the full fallback chain:
    /// the mapping itself, then the earliest mapped year, then the current
    /// year. Never fails.
    pub fn year_for(&self, month: &str, today: NaiveDate) -> i32 {
        self.get(month)
            .or_else(|| self.earliest_year())
            .unwrap_or_else(|| today.year())
    }

    /// Extract the range from stitched statement lines.
    ///
    /// Looks for `STATEMENT FROM <MON> <DD>[, <YYYY>] TO <MON> <DD>, <YYYY>`;
    /// the end month gets the end year, the start month the explicit start
    /// year when printed, otherwise the end year.
    pub fn from_lines(lines: &[String]) -> Option<Self> {
        let re = Regex::new(
            r"STATEMENT FROM ([A-Z]{3}) \d{2},? ?(\d{4})? TO ([A-Z]{3}) \d{2}, (\d{4})",
        )
        .unwrap();

        for line in lines {
            if let Some(caps) = re.captures(line) {
                let start_month = caps.get(1).map(|m| m.as_str())?;
                let end_month = caps.get(3).map(|m| m.as_str())?;
                let end_year: i32 = caps.get(4)?.as_str().parse().ok()?;
                let start_year: i32 = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(end_year);

                let mut range = DateRange::default();
                range.insert(start_month, start_year);
                range.insert(end_month, end_year);
                return Some(range);
            }
        }

        None
    }

    /// Infer a full-year mapping from a `YYYY-MM-DD` token in the input
    /// filename, taken as the statement's end date.
    ///
    /// Months at or before the end month get the end year, later months
    /// the previous year — a statement never extends past its end date,
    /// so later abbreviations must refer to the year before.
    pub fn from_filename(name: &str) -> Option<Self> {
        let re = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
        let caps = re.captures(name)?;
        let end_year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let end_month: u32 = caps.get(2)?.as_str().parse().ok()?;
        if !(1..=12).contains(&end_month) {
            return None;
        }

        let mut range = DateRange::default();
        for (idx, month) in MONTHS.iter().enumerate() {
            let number = idx as u32 + 1;
            let year = if number <= end_month {
                end_year
            } else {
                end_year - 1
            };
            range.insert(month, year);
        }
        Some(range)
    }

    /// Resolve the range for one document: header text first, filename
    /// hint second. An empty range is returned when neither source is
    /// available, leaving lookup to its terminal fallbacks.
    pub fn resolve(lines: &[String], filename: Option<&str>) -> Self {
        if let Some(range) = Self::from_lines(lines) {
            return range;
        }
        if let Some(range) = filename.and_then(Self::from_filename) {
            log::debug!("statement header absent, using filename date range");
            return range;
        }
        log::warn!("no statement date range found; dates will fall back to the current year");
        DateRange::default()
    }
}
