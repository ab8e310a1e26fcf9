//! Row assembly for tabular-layout statements.
//!
//! Each page carries a five-column header (Date, Description, Withdrawals,
//! Deposits, Balance) whose x-ranges drive cell assignment. A column
//! cursor cycles through the five logical slots per row: a block is
//! consumed only when its midpoint falls in the slot's header range,
//! otherwise the slot is emitted empty and the cursor moves on. The date
//! column carries forward when a row omits a repeated date, and years are
//! anchored to the opening-balance date.
//!
//! The year-rollover bump is applied at most once per cell; statements
//! spanning more than one calendar rollover are outside the supported
//! range.

use chrono::{Datelike, Local, NaiveDate};

use crate::model::{LayoutTree, TabularRow};
use crate::parser::columns::{ColumnMap, COLUMN_COUNT};
use crate::parser::{Block, BlockBuilder, ParseOptions};

/// Column label that opens a page's header run.
const HEADER_LABEL: &str = "Date";

/// Prefix of the block carrying the statement's anchor date.
const OPENING_BALANCE_PREFIX: &str = "Your opening balance";

/// Description cell of the synthetic opening-balance row.
const OPENING_BALANCE_ROW: &str = "Opening Balance";

/// Assembles table cells into transaction rows.
pub struct TabularAssembler {
    options: ParseOptions,
    today: NaiveDate,
}

impl TabularAssembler {
    /// Create an assembler with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self::at_date(options, Local::now().date_naive())
    }

    /// Create an assembler with an explicit "today" for the degraded
    /// no-anchor fallback.
    pub fn at_date(options: ParseOptions, today: NaiveDate) -> Self {
        Self { options, today }
    }

    /// Assemble every page of the tree into rows.
    ///
    /// Pages without a usable header are skipped; an absent opening
    /// balance degrades year resolution to the current year instead of
    /// failing.
    pub fn assemble(&self, tree: &LayoutTree) -> Vec<TabularRow> {
        let builder = BlockBuilder::new(self.options.clone());
        let page_blocks: Vec<Vec<Block>> =
            tree.pages.iter().map(|p| builder.page_blocks(p)).collect();

        let opening_date = page_blocks
            .iter()
            .flatten()
            .find(|b| b.text.starts_with(OPENING_BALANCE_PREFIX))
            .and_then(|b| parse_opening_balance(&b.text));

        let opening_date = match opening_date {
            Some(date) => date,
            None => {
                log::warn!(
                    "no opening balance block found; dates degrade to the current year"
                );
                NaiveDate::from_ymd_opt(self.today.year(), 1, 1).unwrap_or(self.today)
            }
        };
        let start_year = opening_date.year();

        let mut rows = Vec::new();
        for blocks in &page_blocks {
            self.assemble_page(blocks, opening_date, start_year, &mut rows);
        }
        rows
    }

    fn assemble_page(
        &self,
        blocks: &[Block],
        opening_date: NaiveDate,
        start_year: i32,
        rows: &mut Vec<TabularRow>,
    ) {
        let Some(header_at) = blocks.iter().position(|b| b.text == HEADER_LABEL) else {
            if !blocks.is_empty() {
                log::warn!(
                    "page {} has no '{HEADER_LABEL}' header; skipping",
                    blocks[0].page
                );
            }
            return;
        };
        if header_at + COLUMN_COUNT > blocks.len() {
            log::warn!(
                "page {} header is missing column labels; skipping",
                blocks[header_at].page
            );
            return;
        }

        let columns = ColumnMap::from_header_blocks(&blocks[header_at..header_at + COLUMN_COUNT]);
        let content = &blocks[header_at + COLUMN_COUNT..];

        let mut row: [String; COLUMN_COUNT] = Default::default();
        let mut slot = 0usize;
        let mut pos = 0usize;
        let mut last_date: Option<String> = None;

        while pos < content.len() {
            let block = &content[pos];
            let target = columns.column_of(block.midpoint()).unwrap_or(0);
            let mut consumed = false;

            row[slot] = if slot == target {
                consumed = true;
                if slot == 0 {
                    self.resolve_date_cell(&block.text, start_year, opening_date, &mut last_date)
                } else {
                    block.text.clone()
                }
            } else if slot == 0 && block.text == OPENING_BALANCE_ROW {
                opening_date.format("%Y-%m-%d").to_string()
            } else if slot == 0 && last_date.is_some() {
                last_date.clone().unwrap_or_default()
            } else {
                String::new()
            };

            if slot == COLUMN_COUNT - 1 {
                rows.push(normalize_row(TabularRow::from_cells(std::mem::take(
                    &mut row,
                ))));
            }
            if consumed {
                pos += 1;
            }
            slot = (slot + 1) % COLUMN_COUNT;
        }

        if slot != 0 {
            log::debug!("dropping incomplete trailing row of {slot} cells");
        }
    }

    fn resolve_date_cell(
        &self,
        text: &str,
        start_year: i32,
        opening_date: NaiveDate,
        last_date: &mut Option<String>,
    ) -> String {
        match parse_cell_date(text, start_year) {
            Some(date) => {
                // A date before the opening balance belongs to the next
                // calendar year.
                let date = if date < opening_date {
                    parse_cell_date(text, start_year + 1).unwrap_or(date)
                } else {
                    date
                };
                let cell = date.format("%Y-%m-%d").to_string();
                *last_date = Some(cell.clone());
                cell
            }
            None => {
                log::warn!("unparseable date cell '{text}'; keeping it verbatim");
                text.to_string()
            }
        }
    }
}

/// The opening-balance rows arrive with their cells shifted by the
/// leading label; pin the description and clear the movement columns.
fn normalize_row(mut row: TabularRow) -> TabularRow {
    let mentions_opening = row.description == OPENING_BALANCE_ROW
        || row.withdrawals == OPENING_BALANCE_ROW
        || row.deposits == OPENING_BALANCE_ROW
        || row.balance == OPENING_BALANCE_ROW;
    if mentions_opening {
        row.description = OPENING_BALANCE_ROW.to_string();
        row.withdrawals.clear();
        row.deposits.clear();
    }
    row
}

/// Parse a date cell against a candidate year.
///
/// Accepts `Oct 28` / `28 Oct` forms (full month names included); a bare
/// day number defaults to January, the lowest unit, so that the rollover
/// bump can resolve it.
fn parse_cell_date(text: &str, year: i32) -> Option<NaiveDate> {
    let cleaned = text.replace(',', " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    if tokens.len() == 1 && tokens[0].chars().all(|c| c.is_ascii_digit()) {
        let day: u32 = tokens[0].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, day);
    }

    let joined = format!("{} {}", tokens.join(" "), year);
    // %B accepts both full and abbreviated month names when parsing.
    for format in ["%B %d %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&joined, format) {
            return Some(date);
        }
    }
    None
}

/// Parse the trailing three tokens of the opening-balance block as the
/// anchor date.
fn parse_opening_balance(text: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let tail = tokens[tokens.len() - 3..].join(" ");
    let cleaned = tail.replace(',', " ");
    let normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    for format in ["%B %d %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fragment, Page, PageItem};

    fn text_item(x: f32, x2: f32, text: &str) -> PageItem {
        PageItem::Text(Fragment {
            page: 0,
            x,
            x2,
            y: 500.0,
            font: Some("MetaBoldLF-Roman".to_string()),
            size: 8.0,
            text: text.to_string(),
        })
    }

    fn header_items() -> Vec<PageItem> {
        vec![
            text_item(20.0, 50.0, "Date"),
            text_item(80.0, 180.0, "Description"),
            text_item(200.0, 260.0, "Withdrawals"),
            text_item(280.0, 340.0, "Deposits"),
            text_item(360.0, 420.0, "Balance"),
        ]
    }

    fn statement_page() -> Page {
        let mut items = vec![
            text_item(20.0, 300.0, "Your opening balance on December 28, 2022"),
            PageItem::Boundary,
        ];
        items.extend(header_items());

        // Opening balance row: description + balance only.
        items.push(PageItem::Boundary);
        items.push(text_item(80.0, 180.0, "Opening Balance"));
        items.push(text_item(360.0, 420.0, "500.00"));

        // Regular row within the opening year.
        items.push(PageItem::Boundary);
        items.push(text_item(20.0, 50.0, "Dec 29"));
        items.push(text_item(80.0, 180.0, "Cheque"));
        items.push(text_item(200.0, 260.0, "100.00"));
        items.push(text_item(360.0, 420.0, "400.00"));

        // Bare-day row after the year boundary.
        items.push(PageItem::Boundary);
        items.push(text_item(20.0, 50.0, "03"));
        items.push(text_item(80.0, 180.0, "Deposit"));
        items.push(text_item(280.0, 340.0, "250.00"));
        items.push(text_item(360.0, 420.0, "650.00"));

        // Date omitted: carried forward from the previous row.
        items.push(PageItem::Boundary);
        items.push(text_item(80.0, 180.0, "Fee"));
        items.push(text_item(200.0, 260.0, "5.00"));
        items.push(text_item(360.0, 420.0, "645.00"));

        Page {
            number: 0,
            fragments: vec![],
            table_items: items,
        }
    }

    fn assembler() -> TabularAssembler {
        TabularAssembler::at_date(
            ParseOptions::default(),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        )
    }

    #[test]
    fn test_full_page_assembly() {
        let tree = LayoutTree {
            pages: vec![statement_page()],
        };
        let rows = assembler().assemble(&tree);
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].date, "2022-12-28");
        assert_eq!(rows[0].description, "Opening Balance");
        assert_eq!(rows[0].withdrawals, "");
        assert_eq!(rows[0].deposits, "");
        assert_eq!(rows[0].balance, "500.00");

        assert_eq!(rows[1].date, "2022-12-29");
        assert_eq!(rows[1].description, "Cheque");
        assert_eq!(rows[1].withdrawals, "100.00");
        assert_eq!(rows[1].deposits, "");
        assert_eq!(rows[1].balance, "400.00");

        // Bare "03" resolves past the year boundary.
        assert_eq!(rows[2].date, "2023-01-03");
        assert_eq!(rows[2].deposits, "250.00");

        // Carried-forward date.
        assert_eq!(rows[3].date, "2023-01-03");
        assert_eq!(rows[3].description, "Fee");
        assert_eq!(rows[3].withdrawals, "5.00");
    }

    #[test]
    fn test_every_row_has_five_cells() {
        let tree = LayoutTree {
            pages: vec![statement_page()],
        };
        let rows = assembler().assemble(&tree);
        for row in &rows {
            // All five logical fields exist on the record; emptiness is the
            // only variation.
            let cells = [
                &row.date,
                &row.description,
                &row.withdrawals,
                &row.deposits,
                &row.balance,
            ];
            assert_eq!(cells.len(), COLUMN_COUNT);
        }
    }

    #[test]
    fn test_page_without_header_skipped() {
        let page = Page {
            number: 0,
            fragments: vec![],
            table_items: vec![
                text_item(20.0, 300.0, "Your opening balance on December 28, 2022"),
                PageItem::Boundary,
                text_item(80.0, 180.0, "orphan cell"),
            ],
        };
        let rows = assembler().assemble(&LayoutTree { pages: vec![page] });
        assert!(rows.is_empty());
    }

    #[test]
    fn test_truncated_header_skipped() {
        let page = Page {
            number: 0,
            fragments: vec![],
            table_items: vec![
                text_item(20.0, 50.0, "Date"),
                text_item(80.0, 180.0, "Description"),
            ],
        };
        let rows = assembler().assemble(&LayoutTree { pages: vec![page] });
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_cell_date_forms() {
        assert_eq!(
            parse_cell_date("Oct 28", 2022),
            NaiveDate::from_ymd_opt(2022, 10, 28)
        );
        assert_eq!(
            parse_cell_date("28 Oct", 2022),
            NaiveDate::from_ymd_opt(2022, 10, 28)
        );
        assert_eq!(
            parse_cell_date("October 28,", 2022),
            NaiveDate::from_ymd_opt(2022, 10, 28)
        );
        assert_eq!(
            parse_cell_date("03", 2022),
            NaiveDate::from_ymd_opt(2022, 1, 3)
        );
        assert_eq!(parse_cell_date("", 2022), None);
        assert_eq!(parse_cell_date("not a date", 2022), None);
    }

    #[test]
    fn test_parse_opening_balance() {
        assert_eq!(
            parse_opening_balance("Your opening balance on December 28, 2022"),
            NaiveDate::from_ymd_opt(2022, 12, 28)
        );
        assert_eq!(parse_opening_balance("too short"), None);
    }

    #[test]
    fn test_unparseable_date_cell_kept_verbatim() {
        let mut items = vec![
            text_item(20.0, 300.0, "Your opening balance on December 28, 2022"),
            PageItem::Boundary,
        ];
        items.extend(header_items());
        items.push(PageItem::Boundary);
        items.push(text_item(20.0, 50.0, "n/a"));
        items.push(text_item(80.0, 180.0, "Adjustment"));
        items.push(text_item(360.0, 420.0, "650.00"));

        let page = Page {
            number: 0,
            fragments: vec![],
            table_items: items,
        };
        let rows = assembler().assemble(&LayoutTree { pages: vec![page] });
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "n/a");
        assert_eq!(rows[0].description, "Adjustment");
    }
}
