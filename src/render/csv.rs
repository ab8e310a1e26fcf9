//! CSV projection of extracted transactions.
//!
//! The library produces CSV content as a string; writing it to disk (and
//! retrying when the target is locked by another program) belongs to the
//! caller. Empty extractions produce no CSV at all, so callers can report
//! a "no transactions" outcome instead of writing a header-only file.

use crate::error::Result;
use crate::model::{NarrativeTransaction, TabularRow};

/// Column header of the narrative projection.
pub const NARRATIVE_COLUMNS: [&str; 9] = [
    "Transaction Date",
    "Posting Date",
    "Description",
    "Credit",
    "Debit",
    "Amount Foreign Currency",
    "Foreign Currency",
    "Exchange Rate",
    "Raw",
];

/// Column header of the tabular projection, spelled the way the source
/// statements print it.
pub const TABULAR_COLUMNS: [&str; 5] = ["Date", "Description", "Withdrawls", "Deposits", "Balance"];

/// Sort transactions by transaction date, keeping the input order of
/// same-day entries.
pub fn sort_by_transaction_date(transactions: &mut [NarrativeTransaction]) {
    transactions.sort_by_key(|t| t.transaction_date);
}

/// Serialize narrative transactions to CSV.
///
/// Returns `None` when there is nothing to write. Callers are expected to
/// have sorted the batch first; this function preserves the given order.
pub fn to_narrative_csv(transactions: &[NarrativeTransaction]) -> Result<Option<String>> {
    if transactions.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(NARRATIVE_COLUMNS)?;
    for txn in transactions {
        writer.write_record([
            txn.transaction_date.format("%Y-%m-%d").to_string(),
            txn.posting_date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.credit.clone(),
            txn.debit.clone(),
            txn.amount_foreign.clone().unwrap_or_default(),
            txn.foreign_currency.clone().unwrap_or_default(),
            txn.exchange_rate.clone().unwrap_or_default(),
            txn.raw.clone(),
        ])?;
    }

    finish(writer).map(Some)
}

/// Serialize tabular rows to CSV.
///
/// Returns `None` when there is nothing to write.
pub fn to_tabular_csv(rows: &[TabularRow]) -> Result<Option<String>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TABULAR_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.date.as_str(),
            row.description.as_str(),
            row.withdrawals.as_str(),
            row.deposits.as_str(),
            row.balance.as_str(),
        ])?;
    }

    finish(writer).map(Some)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::Error::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::error::Error::Csv(e.to_string()))
}
