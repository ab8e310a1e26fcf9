//! Line clustering for narrative-layout statements.
//!
//! Narrative statements print transactions as free-running text, one visual
//! line per record. The clusterer rebuilds those lines from unordered
//! fragments: bucket by vertical position, then stitch left to right,
//! inserting spaces across noticeable horizontal gaps.

use std::cmp::Ordering;

use crate::model::{Fragment, LayoutTree, Page};
use crate::parser::ParseOptions;

/// A cluster of fragments sharing an inferred vertical position.
///
/// Ephemeral: built once per page and consumed immediately into a stitched
/// text string.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// Anchor y of the bucket (y of the first fragment assigned to it).
    pub y: f32,
    /// Member fragments, sorted left to right.
    pub fragments: Vec<&'a Fragment>,
}

impl<'a> Line<'a> {
    fn from_fragments(mut fragments: Vec<&'a Fragment>) -> Self {
        let y = fragments.first().map(|f| f.y).unwrap_or(0.0);
        fragments.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        Self { y, fragments }
    }

    /// Stitch the member fragments into one string.
    ///
    /// A single space is inserted when the gap between one fragment's right
    /// edge and the next fragment's left edge exceeds the space threshold,
    /// but only once the accumulated text is long enough that the line has
    /// left its dense numeric prefix.
    pub fn text(&self, options: &ParseOptions) -> String {
        let mut text = String::new();
        let mut prev_x2: Option<f32> = None;

        for fragment in &self.fragments {
            if let Some(x2) = prev_x2 {
                if fragment.x - x2 > options.space_gap
                    && text.chars().count() > options.min_spaced_line_len
                {
                    text.push(' ');
                }
            }
            text.push_str(&fragment.text);
            prev_x2 = Some(fragment.x2);
        }

        text
    }
}

/// Groups page fragments into visually distinct lines.
#[derive(Debug, Clone)]
pub struct LineClusterer {
    options: ParseOptions,
}

impl LineClusterer {
    /// Create a clusterer with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    fn admits(&self, fragment: &Fragment) -> bool {
        fragment.size >= self.options.min_fragment_size
            && fragment.size <= self.options.max_fragment_size
            && !fragment.text.is_empty()
    }

    /// Cluster one page's fragments into lines, top to bottom.
    ///
    /// Fragments outside the size band are rejected as layout noise (page
    /// numbers, watermarks).
    pub fn cluster_page<'a>(&self, page: &'a Page) -> Vec<Line<'a>> {
        let mut fragments: Vec<&Fragment> =
            page.fragments.iter().filter(|f| self.admits(f)).collect();

        if fragments.is_empty() {
            return vec![];
        }

        // Top to bottom, then left to right.
        fragments.sort_by(|a, b| {
            let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal);
            if y_cmp == Ordering::Equal {
                a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal)
            } else {
                y_cmp
            }
        });

        let mut lines: Vec<Line<'a>> = Vec::new();
        let mut current: Vec<&'a Fragment> = Vec::new();
        let mut current_y: Option<f32> = None;

        for fragment in fragments {
            match current_y {
                Some(y) if (fragment.y - y).abs() <= self.options.line_y_tolerance => {
                    current.push(fragment);
                }
                _ => {
                    if !current.is_empty() {
                        lines.push(Line::from_fragments(std::mem::take(&mut current)));
                    }
                    current_y = Some(fragment.y);
                    current.push(fragment);
                }
            }
        }

        if !current.is_empty() {
            lines.push(Line::from_fragments(current));
        }

        log::debug!(
            "clustered page {} into {} lines",
            page.number,
            lines.len()
        );

        lines
    }

    /// Stitched line strings for one page.
    pub fn page_lines(&self, page: &Page) -> Vec<String> {
        self.cluster_page(page)
            .iter()
            .map(|line| line.text(&self.options))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Stitched line strings for the whole document, pages concatenated in
    /// order.
    pub fn document_lines(&self, tree: &LayoutTree) -> Vec<String> {
        tree.pages
            .iter()
            .flat_map(|page| self.page_lines(page))
            .collect()
    }
}
