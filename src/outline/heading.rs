//! Heading detection and level classification.
//!
//! Each line is represented by its dominant span. A line becomes a heading if
//! it matches the pattern table or stands out by size or weight against the
//! document average; its level then comes from numbering depth or from
//! relative size.

use crate::model::{Heading, HeadingLevel, PageLayout, TextLine};

use super::config::HeuristicConfig;
use super::patterns::{PatternMatch, PatternTable};
use super::stats::FontStatistics;

/// Classification inputs for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeatures {
    /// Trimmed line text
    pub text: String,
    /// Font size of the dominant span
    pub font_size: f32,
    /// Weight of the dominant span
    pub is_bold: bool,
    /// Top edge of the dominant span
    pub top_y: f32,
    /// `top_y` as a fraction of the page height. Computed but not used by
    /// any decision.
    pub relative_position: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

impl LineFeatures {
    /// Features for a line; `None` for lines without visible text.
    pub fn from_line(line: &TextLine, page: &PageLayout) -> Option<Self> {
        let text = line.text().trim().to_string();
        if text.is_empty() {
            return None;
        }
        let dominant = line.dominant_span()?;
        let relative_position = if page.height > 0.0 {
            dominant.top_y / page.height
        } else {
            0.0
        };

        Some(Self {
            text,
            font_size: dominant.font_size,
            is_bold: dominant.is_bold,
            top_y: dominant.top_y,
            relative_position,
            page: page.number(),
        })
    }
}

/// Why a line was accepted as a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionBasis {
    /// A pattern table rule matched
    Pattern(PatternMatch),
    /// Size or weight alone set the line apart
    Emphasis,
}

/// Assigns H1/H2/H3 to accepted headings.
pub struct LevelClassifier<'a> {
    config: &'a HeuristicConfig,
    stats: FontStatistics,
}

impl<'a> LevelClassifier<'a> {
    /// Create a classifier for one document.
    pub fn new(config: &'a HeuristicConfig, stats: FontStatistics) -> Self {
        Self { config, stats }
    }

    /// Level for an accepted heading.
    pub fn classify(&self, basis: &DetectionBasis, font_size: f32, is_bold: bool) -> HeadingLevel {
        match basis {
            DetectionBasis::Pattern(m) => match m.numbering_depth() {
                Some(depth) => HeadingLevel::from_depth(depth),
                None => self.pattern_level(font_size, is_bold),
            },
            DetectionBasis::Emphasis => self.emphasis_level(font_size),
        }
    }

    fn pattern_level(&self, font_size: f32, is_bold: bool) -> HeadingLevel {
        if font_size > self.stats.scaled(self.config.pattern_h1_ratio) || is_bold {
            HeadingLevel::H1
        } else if font_size > self.stats.scaled(self.config.pattern_h2_ratio) {
            HeadingLevel::H2
        } else {
            HeadingLevel::H3
        }
    }

    fn emphasis_level(&self, font_size: f32) -> HeadingLevel {
        if font_size > self.stats.scaled(self.config.emphasis_h1_ratio) {
            HeadingLevel::H1
        } else if font_size > self.stats.scaled(self.config.emphasis_h2_ratio) {
            HeadingLevel::H2
        } else {
            HeadingLevel::H3
        }
    }
}

/// Decides which lines are headings.
pub struct HeadingDetector<'a> {
    config: &'a HeuristicConfig,
    stats: FontStatistics,
    patterns: &'static PatternTable,
    classifier: LevelClassifier<'a>,
}

impl<'a> HeadingDetector<'a> {
    /// Create a detector for one document's statistics.
    pub fn new(config: &'a HeuristicConfig, stats: FontStatistics) -> Self {
        Self {
            config,
            stats,
            patterns: PatternTable::global(),
            classifier: LevelClassifier::new(config, stats),
        }
    }

    /// Whether the line is a heading, and on what basis.
    pub fn detect(&self, features: &LineFeatures) -> Option<DetectionBasis> {
        let len = features.text.chars().count();
        if len < self.config.min_heading_chars || len > self.config.max_heading_chars {
            return None;
        }

        if self.patterns.is_numbered_form_label(&features.text) {
            return None;
        }

        if let Some(m) = self.patterns.match_line(&features.text) {
            return Some(DetectionBasis::Pattern(m));
        }

        if features.is_bold && features.font_size > self.stats.scaled(self.config.bold_size_ratio)
        {
            return Some(DetectionBasis::Emphasis);
        }

        if features.font_size > self.stats.scaled(self.config.large_size_ratio) {
            return Some(DetectionBasis::Emphasis);
        }

        None
    }

    /// Detect and classify one line.
    pub fn evaluate(&self, features: &LineFeatures) -> Option<Heading> {
        let basis = self.detect(features)?;
        let level = self
            .classifier
            .classify(&basis, features.font_size, features.is_bold);

        log::trace!(
            "page {} heading {} ({}) at {:.2} of page: {:?}",
            features.page,
            level,
            match &basis {
                DetectionBasis::Pattern(m) => m.kind().name(),
                DetectionBasis::Emphasis => "emphasis",
            },
            features.relative_position,
            features.text
        );

        Some(Heading::new(level, features.text.clone(), features.page))
    }

    /// All headings on a page, in extraction order.
    pub fn detect_page(&self, page: &PageLayout) -> Vec<Heading> {
        page.lines()
            .filter_map(|line| LineFeatures::from_line(line, page))
            .filter_map(|features| self.evaluate(&features))
            .collect()
    }
}
