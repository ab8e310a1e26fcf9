//! Parsing options and configuration.

/// Which side of the ledger a positive parsed amount lands on.
///
/// Card networks disagree on the sign convention of statement amounts, so
/// this is a policy choice rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignPolicy {
    /// A positive amount is a debit, a negative amount a credit.
    #[default]
    PositiveIsDebit,
    /// A positive amount is a credit, a negative amount a debit.
    PositiveIsCredit,
}

/// Options for layout reconstruction and transaction parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Smallest fragment size admitted to line clustering.
    pub min_fragment_size: f32,

    /// Largest fragment size admitted to line clustering.
    pub max_fragment_size: f32,

    /// Vertical tolerance for grouping fragments into one line.
    pub line_y_tolerance: f32,

    /// Horizontal gap above which a space is stitched between fragments.
    pub space_gap: f32,

    /// Minimum accumulated line length before gap-driven spaces are
    /// inserted (suppresses spurious spaces inside dense numeric prefixes).
    pub min_spaced_line_len: usize,

    /// Horizontal gap above which the block builder forces a cell break.
    pub block_break_gap: f32,

    /// Font suffixes accepted by the block builder's filter. Everything
    /// else on the page is header/footer chrome.
    pub transaction_fonts: Vec<String>,

    /// Ledger side assignment for parsed amounts.
    pub sign_policy: SignPolicy,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment size band admitted to line clustering.
    pub fn with_size_band(mut self, min: f32, max: f32) -> Self {
        self.min_fragment_size = min;
        self.max_fragment_size = max;
        self
    }

    /// Set the vertical line-clustering tolerance.
    pub fn with_line_y_tolerance(mut self, tolerance: f32) -> Self {
        self.line_y_tolerance = tolerance;
        self
    }

    /// Set the gap thresholds for space stitching and cell breaks.
    pub fn with_gap_thresholds(mut self, space_gap: f32, block_break_gap: f32) -> Self {
        self.space_gap = space_gap;
        self.block_break_gap = block_break_gap;
        self
    }

    /// Replace the accepted transaction font suffixes.
    pub fn with_transaction_fonts<I, S>(mut self, fonts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transaction_fonts = fonts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the credit/debit sign policy.
    pub fn with_sign_policy(mut self, policy: SignPolicy) -> Self {
        self.sign_policy = policy;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            min_fragment_size: 5.0,
            max_fragment_size: 12.0,
            line_y_tolerance: 0.9,
            space_gap: 0.7,
            min_spaced_line_len: 10,
            block_break_gap: 5.0,
            transaction_fonts: vec![
                "MetaBookLF-Roman".to_string(),
                "MetaBoldLF-Roman".to_string(),
            ],
            sign_policy: SignPolicy::PositiveIsDebit,
        }
    }
}
