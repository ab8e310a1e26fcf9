//! Positioned text fragments and the page tree produced by a layout adapter.
//!
//! A [`Fragment`] is a single run of text with bounding-box and font
//! metadata, exactly as emitted by the upstream document-layout step. The
//! engine never mutates fragments; each processing pass reads the tree once.

use serde::{Deserialize, Serialize};

/// A positioned run of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Zero-based page index.
    pub page: usize,
    /// Left edge.
    pub x: f32,
    /// Right edge.
    pub x2: f32,
    /// Baseline position (larger y is higher on the page).
    pub y: f32,
    /// Font name, reduced to its meaningful suffix where the source
    /// namespaces it (e.g. `ABCDEF+MetaBoldLF-Roman`).
    pub font: Option<String>,
    /// Font size in points.
    pub size: f32,
    /// Text content. Never empty for fragments produced by the adapters.
    pub text: String,
}

impl Fragment {
    /// Horizontal extent of the fragment.
    pub fn width(&self) -> f32 {
        self.x2 - self.x
    }

    /// Horizontal midpoint, used for column assignment.
    pub fn midpoint(&self) -> f32 {
        (self.x2 - self.x) / 2.0 + self.x
    }

    /// Whether this fragment's font ends with any of the given suffixes.
    ///
    /// Fragments without a font never match.
    pub fn font_matches(&self, suffixes: &[String]) -> bool {
        match &self.font {
            Some(font) => suffixes.iter().any(|s| font.ends_with(s.as_str())),
            None => false,
        }
    }
}

/// One item in a page's table container, in document order.
///
/// Non-text structural elements (rules, images, nested figures) act as
/// boundary markers between runs of text and terminate block accumulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageItem {
    /// A text run.
    Text(Fragment),
    /// A non-text structural element.
    Boundary,
}

impl PageItem {
    /// The fragment, if this item is a text run.
    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            PageItem::Text(f) => Some(f),
            PageItem::Boundary => None,
        }
    }
}

/// A single page of positioned text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index.
    pub number: usize,
    /// Every text fragment on the page, in document order. Input to the
    /// line clusterer.
    pub fragments: Vec<Fragment>,
    /// Items of the designated table container (the sub-element holding
    /// the transaction grid), in document order. Input to the block
    /// builder. Empty for pages without such a container.
    pub table_items: Vec<PageItem>,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            fragments: Vec::new(),
            table_items: Vec::new(),
        }
    }
}

/// The full fragment tree for one input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    /// Pages in document order.
    pub pages: Vec<Page>,
}

impl LayoutTree {
    /// Number of pages in the tree.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the tree contains any text at all.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.fragments.is_empty())
    }
}
