//! Transaction parsing for narrative-layout statements.
//!
//! A qualifying line starts with two date tokens (transaction date and
//! posting date) and carries a monetary token somewhere after them. Lines
//! without a monetary token are not transactions and are dropped without
//! comment; a trailing dash on the description marks a negative amount.

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::model::NarrativeTransaction;
use crate::parser::date_range::{month_number, DateRange, MONTHS};
use crate::parser::{ParseOptions, SignPolicy};

/// Parses stitched statement lines into transactions.
pub struct NarrativeParser {
    date_range: DateRange,
    sign_policy: SignPolicy,
    today: NaiveDate,
    re_prefix: Regex,
    re_amount: Regex,
    re_exchange_rate: Regex,
    re_foreign_currency: Regex,
}

impl NarrativeParser {
    /// Create a parser resolving years against the given range.
    pub fn new(date_range: DateRange, options: &ParseOptions) -> Self {
        Self::at_date(date_range, options, Local::now().date_naive())
    }

    /// Create a parser with an explicit "today" for the terminal year
    /// fallback.
    pub fn at_date(date_range: DateRange, options: &ParseOptions, today: NaiveDate) -> Self {
        let months = MONTHS.join("|");
        Self {
            date_range,
            sign_policy: options.sign_policy,
            today,
            re_prefix: Regex::new(&format!(
                r"^(?P<m1>{months})\s?(?P<d1>\d{{2}})(?P<m2>{months})\s?(?P<d2>\d{{2}})"
            ))
            .unwrap(),
            re_amount: Regex::new(r"-?\$?\d{1,3}(?:,\d{3})*\.\d{2}").unwrap(),
            re_exchange_rate: Regex::new(r"Exchange rate-([0-9]+\.[0-9]+)").unwrap(),
            re_foreign_currency: Regex::new(r"Foreign Currency-([A-Z]+) ([0-9]+\.[0-9]+)").unwrap(),
        }
    }

    /// Whether a line carries the two-date transaction prefix.
    pub fn is_transaction_line(&self, line: &str) -> bool {
        let s = line.trim();
        s.chars().count() >= 10 && self.re_prefix.is_match(s)
    }

    /// Parse every qualifying line into a transaction, preserving input
    /// order.
    pub fn parse_lines(&self, lines: &[String]) -> Vec<NarrativeTransaction> {
        lines
            .iter()
            .flat_map(|line| line.split('\n'))
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    /// Parse one line. Returns `None` for anything that is not a
    /// transaction row.
    pub fn parse_line(&self, line: &str) -> Option<NarrativeTransaction> {
        let s = line.trim();
        if s.chars().count() < 10 {
            return None;
        }

        let caps = self.re_prefix.captures(s)?;
        let transaction_date = self.resolve_date(&caps["m1"], &caps["d1"])?;
        let posting_date = self.resolve_date(&caps["m2"], &caps["d2"])?;

        let rest = &s[caps.get(0)?.end()..];
        let amount_match = self.re_amount.find(rest)?;

        let mut description = rest[..amount_match.start()].to_string();
        let token = amount_match.as_str();
        let mut negative = token.starts_with('-');

        // A dash closing the description is the statement's negative-amount
        // marker.
        if description.ends_with('-') {
            description.pop();
            negative = true;
        }

        let description = description
            .split('\n')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let amount: String = token
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let value: f64 = amount.parse().ok()?;
        let positive = !negative && value > 0.0;

        let (credit, debit) = match (self.sign_policy, positive) {
            (SignPolicy::PositiveIsDebit, true) | (SignPolicy::PositiveIsCredit, false) => {
                (String::new(), amount)
            }
            _ => (amount, String::new()),
        };

        let exchange_rate = self
            .re_exchange_rate
            .captures(s)
            .map(|c| c[1].to_string());
        let (foreign_currency, amount_foreign) = match self.re_foreign_currency.captures(s) {
            Some(c) => (Some(c[1].to_string()), Some(c[2].to_string())),
            None => (None, None),
        };

        Some(NarrativeTransaction {
            transaction_date,
            posting_date,
            description,
            credit,
            debit,
            raw: s.to_string(),
            exchange_rate,
            foreign_currency,
            amount_foreign,
        })
    }

    fn resolve_date(&self, month: &str, day: &str) -> Option<NaiveDate> {
        let year = self.date_range.year_for(month, self.today);
        let month_no = month_number(month)?;
        let day: u32 = day.parse().ok()?;
        match NaiveDate::from_ymd_opt(year, month_no, day) {
            Some(date) => Some(date),
            None => {
                log::warn!("discarding line with impossible date {month} {day} {year}");
                None
            }
        }
    }
}
