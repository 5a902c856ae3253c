//! Layout tree produced by text extraction: pages, blocks, lines and spans.

use serde::{Deserialize, Serialize};

use super::Metadata;
use crate::error::{Error, Result};

/// A run of text sharing one font and style, with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Whether the span is rendered in a bold face
    pub is_bold: bool,
    /// Distance from the top edge of the page to the top of the glyphs
    pub top_y: f32,
    /// Left edge of the span
    pub x: f32,
    /// Page the span was extracted from (0-indexed)
    pub page_index: u32,
}

impl TextSpan {
    /// Create a new span with no horizontal offset.
    pub fn new(text: impl Into<String>, font_size: f32, is_bold: bool, top_y: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold,
            top_y,
            x: 0.0,
            page_index: 0,
        }
    }

    /// Set the left edge.
    pub fn at_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Set the page index.
    pub fn on_page(mut self, page_index: u32) -> Self {
        self.page_index = page_index;
        self
    }

    /// Whether the span has visible text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Number of characters contributed by the span.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Spans sharing one visual line, ordered left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// The spans in this line
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    /// Create a line from spans already in reading order.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Concatenated text of all spans.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// The span contributing the most characters.
    ///
    /// The first such span wins when several contribute equally.
    pub fn dominant_span(&self) -> Option<&TextSpan> {
        let mut best: Option<&TextSpan> = None;
        for span in &self.spans {
            match best {
                Some(current) if span.char_count() <= current.char_count() => {}
                _ => best = Some(span),
            }
        }
        best
    }

    /// Check if the line has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// Consecutive lines grouped into one block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// The lines in this block, top to bottom
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Create a new text block.
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Create a block holding a single line.
    pub fn single(line: TextLine) -> Self {
        Self { lines: vec![line] }
    }
}

/// The extracted layout of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page index (0-indexed)
    pub index: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Blocks in reading order
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    /// Create an empty page.
    pub fn new(index: u32, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter(index: u32) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Append a block.
    pub fn add_block(&mut self, block: TextBlock) {
        self.blocks.push(block);
    }

    /// 1-indexed page number.
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    /// Iterate lines top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Iterate spans top to bottom, left to right.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.lines().flat_map(|l| l.spans.iter())
    }
}

/// Access to the layout of a document, page by page.
///
/// This is the seam between text extraction and outline inference. The PDF
/// parser implements it lazily; [`LayoutDocument`] implements it in memory.
pub trait LayoutSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extract the layout of one page (0-indexed).
    fn page(&self, index: usize) -> Result<PageLayout>;

    /// Read the document information dictionary.
    fn metadata(&self) -> Result<Metadata>;
}

/// A fully materialized document layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Document metadata
    pub metadata: Metadata,
    /// Pages in order
    pub pages: Vec<PageLayout>,
}

impl LayoutDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with an embedded title.
    pub fn with_title(title: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.metadata.title = Some(title.into());
        doc
    }

    /// Append a page.
    pub fn add_page(&mut self, page: PageLayout) {
        self.pages.push(page);
        self.metadata.page_count = self.pages.len() as u32;
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl LayoutSource for LayoutDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageLayout> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index as u32, self.pages.len() as u32))
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }
}
