//! Layout extraction options.

/// Options controlling how spans are grouped into lines and blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Spans whose baselines differ by at most `font_size × ratio` share a line
    pub line_tolerance_ratio: f32,

    /// Horizontal gap, as a fraction of the average character width, that
    /// separates two spans with a space
    pub space_gap_ratio: f32,

    /// Line spacing above `average × ratio` starts a new block
    pub block_gap_ratio: f32,

    /// `TJ` adjustment (thousandths of an em) treated as a word break
    pub tj_space_threshold: f32,

    /// Normalize extracted text to Unicode NFC
    pub normalize_unicode: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the baseline tolerance for line grouping.
    pub fn with_line_tolerance(mut self, ratio: f32) -> Self {
        self.line_tolerance_ratio = ratio;
        self
    }

    /// Set the gap ratio that inserts a space between spans.
    pub fn with_space_gap(mut self, ratio: f32) -> Self {
        self.space_gap_ratio = ratio;
        self
    }

    /// Set the spacing ratio that breaks blocks.
    pub fn with_block_gap(mut self, ratio: f32) -> Self {
        self.block_gap_ratio = ratio;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            line_tolerance_ratio: 0.3,
            space_gap_ratio: 0.2,
            block_gap_ratio: 1.5,
            tj_space_threshold: 200.0,
            normalize_unicode: true,
        }
    }
}
