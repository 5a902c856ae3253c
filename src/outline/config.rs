//! Tunable thresholds for title and heading inference.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Thresholds and weights used by the outline heuristics.
///
/// All size ratios are relative to the document's average span font size.
/// Missing fields fall back to their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Baseline font size when the document has no visible spans
    pub default_font_size: f32,

    /// Bold lines above `avg × ratio` are headings
    pub bold_size_ratio: f32,
    /// Any line above `avg × ratio` is a heading
    pub large_size_ratio: f32,

    /// Pattern-matched, non-numeric headings above `avg × ratio` (or bold) are H1
    pub pattern_h1_ratio: f32,
    /// Pattern-matched, non-numeric headings above `avg × ratio` are H2
    pub pattern_h2_ratio: f32,

    /// Size-detected headings above `avg × ratio` are H1
    pub emphasis_h1_ratio: f32,
    /// Size-detected headings above `avg × ratio` are H2
    pub emphasis_h2_ratio: f32,

    /// Shortest line (characters) considered for headings
    pub min_heading_chars: usize,
    /// Longest line (characters) considered for headings
    pub max_heading_chars: usize,

    /// Embedded titles must be longer than this many characters
    pub min_metadata_title_chars: usize,
    /// Shortest span (characters) considered as a title
    pub min_title_chars: usize,
    /// Longest span (characters) considered as a title
    pub max_title_chars: usize,

    /// Vertical origin for the title position score (`origin − top_y`)
    pub title_position_origin: f32,
    /// Title score per point of font size
    pub title_size_weight: f32,
    /// Title score bonus for bold spans
    pub title_bold_bonus: f32,
    /// Lowercase fragments that disqualify a title candidate
    pub title_skip_terms: Vec<String>,

    /// Title used when no candidate survives
    pub untitled_title: String,
}

impl HeuristicConfig {
    /// Create a config with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a (possibly partial) config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Set the detection ratios for bold and size-only headings.
    pub fn with_detection_ratios(mut self, bold: f32, large: f32) -> Self {
        self.bold_size_ratio = bold;
        self.large_size_ratio = large;
        self
    }

    /// Set the level ratios for pattern-matched headings.
    pub fn with_pattern_ratios(mut self, h1: f32, h2: f32) -> Self {
        self.pattern_h1_ratio = h1;
        self.pattern_h2_ratio = h2;
        self
    }

    /// Set the level ratios for size-detected headings.
    pub fn with_emphasis_ratios(mut self, h1: f32, h2: f32) -> Self {
        self.emphasis_h1_ratio = h1;
        self.emphasis_h2_ratio = h2;
        self
    }

    /// Set the title scoring weights.
    pub fn with_title_weights(mut self, origin: f32, size_weight: f32, bold_bonus: f32) -> Self {
        self.title_position_origin = origin;
        self.title_size_weight = size_weight;
        self.title_bold_bonus = bold_bonus;
        self
    }

    /// Add a title skip term.
    pub fn with_title_skip_term(mut self, term: impl Into<String>) -> Self {
        self.title_skip_terms.push(term.into().to_lowercase());
        self
    }

    /// Set the baseline font size for documents without text.
    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    /// Check that the thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("bold_size_ratio", self.bold_size_ratio),
            ("large_size_ratio", self.large_size_ratio),
            ("pattern_h1_ratio", self.pattern_h1_ratio),
            ("pattern_h2_ratio", self.pattern_h2_ratio),
            ("emphasis_h1_ratio", self.emphasis_h1_ratio),
            ("emphasis_h2_ratio", self.emphasis_h2_ratio),
            ("default_font_size", self.default_font_size),
        ];
        for (name, value) in ratios {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }

        if self.pattern_h1_ratio < self.pattern_h2_ratio {
            return Err(Error::Config(
                "pattern_h1_ratio must not be below pattern_h2_ratio".to_string(),
            ));
        }
        if self.emphasis_h1_ratio < self.emphasis_h2_ratio {
            return Err(Error::Config(
                "emphasis_h1_ratio must not be below emphasis_h2_ratio".to_string(),
            ));
        }
        if self.min_heading_chars > self.max_heading_chars {
            return Err(Error::Config(format!(
                "heading length window is empty: [{}, {}]",
                self.min_heading_chars, self.max_heading_chars
            )));
        }
        if self.min_title_chars > self.max_title_chars {
            return Err(Error::Config(format!(
                "title length window is empty: [{}, {}]",
                self.min_title_chars, self.max_title_chars
            )));
        }

        Ok(())
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            default_font_size: 12.0,
            bold_size_ratio: 1.1,
            large_size_ratio: 1.3,
            pattern_h1_ratio: 1.3,
            pattern_h2_ratio: 1.1,
            emphasis_h1_ratio: 1.5,
            emphasis_h2_ratio: 1.2,
            min_heading_chars: 3,
            max_heading_chars: 200,
            min_metadata_title_chars: 5,
            min_title_chars: 5,
            max_title_chars: 200,
            title_position_origin: 1000.0,
            title_size_weight: 10.0,
            title_bold_bonus: 50.0,
            title_skip_terms: ["page", "doi:", "http", "www.", "@", "copyright"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            untitled_title: "Untitled Document".to_string(),
        }
    }
}
