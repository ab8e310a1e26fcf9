//! Block building for tabular-layout statements.
//!
//! Tabular statements draw each table cell as a run of small text
//! fragments inside the page's table container. The builder walks that
//! container once as a two-state machine: while accumulating, a horizontal
//! gap wider than the break threshold ends the cell, a moderate gap
//! becomes a space, and a non-text structural element flushes whatever has
//! accumulated.

use crate::model::{Fragment, LayoutTree, Page, PageItem};
use crate::parser::ParseOptions;

/// A merged, font-filtered run of fragments representing one table cell
/// or text unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Zero-based page index.
    pub page: usize,
    /// x of the first member fragment.
    pub x: f32,
    /// x2 of the last member fragment.
    pub x2: f32,
    /// y of the last member fragment.
    pub y: f32,
    /// Accumulated text, trimmed.
    pub text: String,
}

impl Block {
    /// Horizontal midpoint, used for column assignment.
    pub fn midpoint(&self) -> f32 {
        (self.x2 - self.x) / 2.0 + self.x
    }
}

enum BuilderState {
    BetweenBlocks,
    Accumulating {
        text: String,
        first_x: f32,
        last_x2: f32,
        last_y: f32,
    },
}

impl BuilderState {
    fn flush(&mut self, page: usize, out: &mut Vec<Block>) {
        if let BuilderState::Accumulating {
            text,
            first_x,
            last_x2,
            last_y,
        } = std::mem::replace(self, BuilderState::BetweenBlocks)
        {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(Block {
                    page,
                    x: first_x,
                    x2: last_x2,
                    y: last_y,
                    text: trimmed.to_string(),
                });
            }
        }
    }
}

/// Groups a page's table-container fragments into cells.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    options: ParseOptions,
}

impl BlockBuilder {
    /// Create a builder with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    fn accepts(&self, fragment: &Fragment) -> bool {
        !fragment.text.is_empty() && fragment.font_matches(&self.options.transaction_fonts)
    }

    /// Build the blocks of one page's table container, in document order.
    pub fn page_blocks(&self, page: &Page) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut state = BuilderState::BetweenBlocks;

        for item in &page.table_items {
            match item {
                PageItem::Text(fragment) => {
                    if !self.accepts(fragment) {
                        continue;
                    }
                    state = match state {
                        BuilderState::BetweenBlocks => BuilderState::Accumulating {
                            text: fragment.text.clone(),
                            first_x: fragment.x,
                            last_x2: fragment.x2,
                            last_y: fragment.y,
                        },
                        BuilderState::Accumulating {
                            mut text,
                            first_x,
                            last_x2,
                            last_y,
                        } => {
                            let gap = fragment.x - last_x2;
                            if gap > self.options.block_break_gap {
                                // Hard break: the accumulated buffer is a
                                // finished cell, this fragment starts the next.
                                let mut done = BuilderState::Accumulating {
                                    text,
                                    first_x,
                                    last_x2,
                                    last_y,
                                };
                                done.flush(page.number, &mut blocks);
                                BuilderState::Accumulating {
                                    text: fragment.text.clone(),
                                    first_x: fragment.x,
                                    last_x2: fragment.x2,
                                    last_y: fragment.y,
                                }
                            } else {
                                if gap > self.options.space_gap {
                                    text.push(' ');
                                }
                                text.push_str(&fragment.text);
                                BuilderState::Accumulating {
                                    text,
                                    first_x,
                                    last_x2: fragment.x2,
                                    last_y: fragment.y,
                                }
                            }
                        }
                    };
                }
                PageItem::Boundary => {
                    state.flush(page.number, &mut blocks);
                }
            }
        }

        state.flush(page.number, &mut blocks);

        log::debug!("built {} blocks on page {}", blocks.len(), page.number);

        blocks
    }

    /// Build blocks for every page of the tree.
    pub fn document_blocks(&self, tree: &LayoutTree) -> Vec<Block> {
        tree.pages
            .iter()
            .flat_map(|page| self.page_blocks(page))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn page_with(items: Vec<PageItem>) -> Page {
        Page {
            number: 0,
            fragments: vec![],
            table_items: items,
        }
    }

    #[test]
    fn test_hard_break_splits_cells() {
        let page = page_with(vec![
            text_item(10.0, 14.0, "Oct"),
            text_item(15.0, 18.0, "28"),
            text_item(60.0, 80.0, "Deposit"),
        ]);
        let builder = BlockBuilder::new(ParseOptions::default());
        let blocks = builder.page_blocks(&page);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Oct 28");
        assert_eq!(blocks[0].x, 10.0);
        assert_eq!(blocks[0].x2, 18.0);
        assert_eq!(blocks[1].text, "Deposit");
        assert_eq!(blocks[1].x, 60.0);
    }

    #[test]
    fn test_soft_gap_becomes_space() {
        let page = page_with(vec![
            text_item(10.0, 20.0, "Your"),
            text_item(21.0, 30.0, "opening"),
            text_item(30.2, 40.0, "s"),
        ]);
        let builder = BlockBuilder::new(ParseOptions::default());
        let blocks = builder.page_blocks(&page);

        assert_eq!(blocks.len(), 1);
        // 1.0 gap becomes a space, 0.2 gap does not.
        assert_eq!(blocks[0].text, "Your openings");
    }

    #[test]
    fn test_boundary_flushes_block() {
        let page = page_with(vec![
            text_item(10.0, 20.0, "cell"),
            PageItem::Boundary,
            text_item(12.0, 22.0, "next"),
        ]);
        let builder = BlockBuilder::new(ParseOptions::default());
        let blocks = builder.page_blocks(&page);

        // Without the boundary the 10.0 -> 12.0 step would merge; the
        // marker forces two cells.
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "cell");
        assert_eq!(blocks[1].text, "next");
    }

    #[test]
    fn test_font_filter_rejects_chrome() {
        let mut items = vec![text_item(10.0, 20.0, "kept")];
        if let PageItem::Text(f) = &mut items[0] {
            f.font = Some("ABCDEF+MetaBookLF-Roman".to_string());
        }
        items.push(PageItem::Text(Fragment {
            page: 0,
            x: 21.0,
            x2: 30.0,
            y: 500.0,
            font: Some("Helvetica".to_string()),
            size: 8.0,
            text: "chrome".to_string(),
        }));

        let builder = BlockBuilder::new(ParseOptions::default());
        let blocks = builder.page_blocks(&page_with(items));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "kept");
    }

    #[test]
    fn test_trailing_block_flushed_at_end() {
        let page = page_with(vec![text_item(10.0, 20.0, "tail")]);
        let builder = BlockBuilder::new(ParseOptions::default());
        let blocks = builder.page_blocks(&page);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "tail");
        assert_eq!(blocks[0].y, 500.0);
    }

    #[test]
    fn test_boundary_with_empty_buffer_is_noop() {
        let page = page_with(vec![
            PageItem::Boundary,
            PageItem::Boundary,
            text_item(10.0, 20.0, "only"),
        ]);
        let builder = BlockBuilder::new(ParseOptions::default());
        let blocks = builder.page_blocks(&page);
        assert_eq!(blocks.len(), 1);
    }
}
