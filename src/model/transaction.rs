//! Typed transaction records extracted from statement layouts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A transaction extracted from a narrative-layout statement.
///
/// Monetary fields hold normalized decimal strings with no currency symbol
/// or thousands separators; exactly one of `credit`/`debit` is non-empty
/// and carries the absolute amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeTransaction {
    /// Date the transaction occurred.
    pub transaction_date: NaiveDate,
    /// Date the transaction posted to the account.
    pub posting_date: NaiveDate,
    /// Merchant or transaction description.
    pub description: String,
    /// Absolute amount when the transaction is a credit, otherwise empty.
    pub credit: String,
    /// Absolute amount when the transaction is a debit, otherwise empty.
    pub debit: String,
    /// The full source line the record was parsed from.
    pub raw: String,
    /// Exchange rate annotation, when present on the line.
    pub exchange_rate: Option<String>,
    /// Foreign currency code annotation, when present.
    pub foreign_currency: Option<String>,
    /// Amount in the foreign currency, when present.
    pub amount_foreign: Option<String>,
}

impl NarrativeTransaction {
    /// The amount string, whichever side it was classified to.
    pub fn amount(&self) -> &str {
        if self.debit.is_empty() {
            &self.credit
        } else {
            &self.debit
        }
    }
}

/// A row extracted from a tabular-layout statement.
///
/// Cells are kept as the statement printed them; empty strings mark
/// columns with no content on that row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularRow {
    /// Resolved date cell, formatted `YYYY-MM-DD` where parseable.
    pub date: String,
    /// Description cell.
    pub description: String,
    /// Withdrawals cell.
    pub withdrawals: String,
    /// Deposits cell.
    pub deposits: String,
    /// Running balance cell.
    pub balance: String,
}

impl TabularRow {
    /// Build a row from the five logical column cells in statement order.
    pub fn from_cells(cells: [String; 5]) -> Self {
        let [date, description, withdrawals, deposits, balance] = cells;
        Self {
            date,
            description,
            withdrawals,
            deposits,
            balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_side() {
        let txn = NarrativeTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            posting_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            description: "Coffee Shop".to_string(),
            credit: String::new(),
            debit: "4.50".to_string(),
            raw: "JAN01JAN02Coffee Shop$4.50".to_string(),
            exchange_rate: None,
            foreign_currency: None,
            amount_foreign: None,
        };
        assert_eq!(txn.amount(), "4.50");
    }

    #[test]
    fn test_row_from_cells() {
        let row = TabularRow::from_cells([
            "2022-12-28".to_string(),
            "Opening Balance".to_string(),
            String::new(),
            String::new(),
            "1,234.56".to_string(),
        ]);
        assert_eq!(row.date, "2022-12-28");
        assert_eq!(row.balance, "1,234.56");
        assert!(row.withdrawals.is_empty());
    }
}
