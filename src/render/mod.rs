//! Output projection for extracted transactions.

pub mod csv;

pub use csv::{
    sort_by_transaction_date, to_narrative_csv, to_tabular_csv, NARRATIVE_COLUMNS, TABULAR_COLUMNS,
};
