//! Outline types: the externally visible result of outline extraction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title reported when per-document processing fails.
pub const ERROR_TITLE: &str = "Error Processing Document";

/// Coarse heading hierarchy tier, H1 outermost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level for a numbering depth; anything deeper than 3 is H3.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A detected heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Hierarchy tier
    pub level: HeadingLevel,
    /// Trimmed line text (never empty)
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

impl Heading {
    /// Create a new heading.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Title plus ordered headings for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineResult {
    /// Document title
    pub title: String,
    /// Headings ordered by page, then extraction order
    pub outline: Vec<Heading>,
}

impl OutlineResult {
    /// Create a new result.
    pub fn new(title: impl Into<String>, outline: Vec<Heading>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// The record emitted when a document cannot be processed.
    pub fn degraded() -> Self {
        Self::new(ERROR_TITLE, Vec::new())
    }

    /// Whether this is the degraded record.
    pub fn is_degraded(&self) -> bool {
        self.title == ERROR_TITLE && self.outline.is_empty()
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Check if no headings were found.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }
}
