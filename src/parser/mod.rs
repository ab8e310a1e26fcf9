//! Layout reconstruction and transaction parsing.

mod blocks;
mod columns;
pub mod date_range;
mod lines;
mod narrative;
mod options;
mod tabular;
pub mod xml;

pub use blocks::{Block, BlockBuilder};
pub use columns::{ColumnMap, COLUMN_COUNT};
pub use date_range::DateRange;
pub use lines::{Line, LineClusterer};
pub use narrative::NarrativeParser;
pub use options::{ParseOptions, SignPolicy};
pub use tabular::TabularAssembler;
pub use xml::tree_from_xml;
