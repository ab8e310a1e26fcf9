//! Data model for statement layout reconstruction.
//!
//! The input side is the positioned-fragment tree handed over by a layout
//! adapter; the output side is the typed transaction records.

mod fragment;
mod transaction;

pub use fragment::{Fragment, LayoutTree, Page, PageItem};
pub use transaction::{NarrativeTransaction, TabularRow};
