//! Statement layout classification.
//!
//! Two sources of truth: the input filename (statement exports encode the
//! account kind in their names) and a structural probe of the fragment
//! tree for callers that only have the tree.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::LayoutTree;
use crate::parser::{DateRange, LineClusterer, NarrativeParser, ParseOptions};

/// Fonts that open the table container of a tabular statement.
const PROBE_FONTS: [&str; 2] = ["MetaBoldLF-Roman", "Utopia-Bold"];

/// How many leading container items the structural probe inspects.
const PROBE_WINDOW: usize = 10;

/// The two supported statement layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementLayout {
    /// Free-running text lines keyed by a leading two-date prefix
    /// (credit-card statements).
    Narrative,
    /// A five-column grid of Date, Description, Withdrawals, Deposits and
    /// Balance (chequing and savings statements).
    Tabular,
}

impl std::fmt::Display for StatementLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementLayout::Narrative => write!(f, "narrative"),
            StatementLayout::Tabular => write!(f, "tabular"),
        }
    }
}

/// Classify a statement by its filename.
///
/// `visa` names are narrative; `chequing` and `savings` names share the
/// tabular layout. Returns `None` when the name gives nothing away.
pub fn layout_from_filename<P: AsRef<Path>>(path: P) -> Option<StatementLayout> {
    let name = path
        .as_ref()
        .file_name()?
        .to_str()?
        .to_ascii_lowercase();

    if name.contains("visa") {
        Some(StatementLayout::Narrative)
    } else if name.contains("chequing") || name.contains("savings") {
        Some(StatementLayout::Tabular)
    } else {
        None
    }
}

/// Classify a statement by probing its fragment tree.
///
/// A tree whose first table container opens with transaction-font text is
/// tabular; otherwise, a tree whose stitched lines carry a statement
/// header or a two-date transaction prefix is narrative. Anything else is
/// a classification failure the caller may override with a forced layout.
pub fn detect_layout(tree: &LayoutTree) -> Result<StatementLayout> {
    if probe_table_fonts(tree) {
        log::debug!("transaction font found in table container; tabular layout");
        return Ok(StatementLayout::Tabular);
    }

    let options = ParseOptions::default();
    let lines = LineClusterer::new(options.clone()).document_lines(tree);
    if DateRange::from_lines(&lines).is_some() {
        log::debug!("statement header line found; narrative layout");
        return Ok(StatementLayout::Narrative);
    }
    let parser = NarrativeParser::new(DateRange::default(), &options);
    if lines.iter().any(|line| parser.is_transaction_line(line)) {
        log::debug!("two-date transaction prefix found; narrative layout");
        return Ok(StatementLayout::Narrative);
    }

    Err(Error::UnrecognizedLayout)
}

fn probe_table_fonts(tree: &LayoutTree) -> bool {
    let Some(page) = tree.pages.first() else {
        return false;
    };
    page.table_items
        .iter()
        .take(PROBE_WINDOW)
        .filter_map(|item| item.fragment())
        .any(|fragment| {
            fragment
                .font
                .as_deref()
                .map(|font| PROBE_FONTS.iter().any(|p| font.ends_with(p)))
                .unwrap_or(false)
        })
}
