//! Header column geometry for tabular-layout pages.

use crate::parser::Block;

/// Number of logical columns in a statement table.
pub const COLUMN_COUNT: usize = 5;

/// The x-ranges of a page's header columns, used to assign cell blocks to
/// logical columns by midpoint containment.
///
/// Intervals are kept sorted by left edge; lookup returns the logical
/// column index (position in the header row), and when ranges overlap the
/// earliest header column wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    /// `(left, right, logical index)`, sorted by `left`.
    spans: Vec<(f32, f32, usize)>,
}

impl ColumnMap {
    /// Build a map from the header blocks in statement order.
    pub fn from_header_blocks(headers: &[Block]) -> Self {
        let mut spans: Vec<(f32, f32, usize)> = headers
            .iter()
            .enumerate()
            .map(|(i, block)| (block.x, block.x2, i))
            .collect();
        spans.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { spans }
    }

    /// Number of columns in the map.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the map has no columns.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The logical column whose x-range strictly contains `midpoint`.
    ///
    /// When more than one range contains it, the earliest header column is
    /// returned.
    pub fn column_of(&self, midpoint: f32) -> Option<usize> {
        self.spans
            .iter()
            .filter(|(left, right, _)| midpoint > *left && midpoint < *right)
            .map(|(_, _, index)| *index)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(x: f32, x2: f32) -> Block {
        Block {
            page: 0,
            x,
            x2,
            y: 600.0,
            text: String::new(),
        }
    }

    fn five_columns() -> ColumnMap {
        ColumnMap::from_header_blocks(&[
            header(20.0, 50.0),
            header(80.0, 180.0),
            header(200.0, 260.0),
            header(280.0, 340.0),
            header(360.0, 420.0),
        ])
    }

    #[test]
    fn test_midpoint_assignment() {
        let map = five_columns();
        assert_eq!(map.len(), 5);
        assert_eq!(map.column_of(30.0), Some(0));
        assert_eq!(map.column_of(120.0), Some(1));
        assert_eq!(map.column_of(390.0), Some(4));
    }

    #[test]
    fn test_outside_all_ranges() {
        let map = five_columns();
        assert_eq!(map.column_of(60.0), None);
        assert_eq!(map.column_of(500.0), None);
    }

    #[test]
    fn test_containment_is_strict() {
        let map = five_columns();
        assert_eq!(map.column_of(20.0), None);
        assert_eq!(map.column_of(50.0), None);
        assert_eq!(map.column_of(20.1), Some(0));
    }

    #[test]
    fn test_overlap_tie_break_earliest_wins() {
        // Second column overlaps the first; a midpoint inside both must
        // resolve to the first.
        let map = ColumnMap::from_header_blocks(&[header(20.0, 100.0), header(60.0, 160.0)]);
        assert_eq!(map.column_of(80.0), Some(0));
        assert_eq!(map.column_of(120.0), Some(1));
    }

    #[test]
    fn test_logical_index_survives_sorting() {
        // Header blocks supplied out of x order keep their statement-order
        // indices.
        let map = ColumnMap::from_header_blocks(&[header(200.0, 260.0), header(20.0, 50.0)]);
        assert_eq!(map.column_of(220.0), Some(0));
        assert_eq!(map.column_of(30.0), Some(1));
    }
}
