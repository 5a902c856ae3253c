//! Layout analysis for PDF pages.
//!
//! Walks a page's content stream, tracking the text and graphics matrices, to
//! produce positioned, styled text spans. Spans are then grouped into lines by
//! baseline and lines into blocks by spacing, giving the page → block → line →
//! span tree consumed by outline inference.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{PageLayout, TextBlock, TextLine, TextSpan};

use super::backend::{BackendFontInfo, ContentOp, PageBox, PageId, PdfBackend, PdfValue};
use super::options::ParseOptions;

/// Approximate ascender height as a fraction of the font size.
const ASCENT_RATIO: f32 = 0.8;

/// Glyph advance, as a fraction of the font size, for fonts without metrics.
const AVG_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Sizes closer than this belong to the same style run.
const FONT_SIZE_EPSILON: f32 = 0.01;

/// A span in PDF user space, before conversion to page coordinates.
#[derive(Debug, Clone)]
struct RawSpan {
    text: String,
    /// Left edge
    x: f32,
    /// Baseline, measured upward
    y: f32,
    /// Advance width
    width: f32,
    font_size: f32,
    is_bold: bool,
    /// Font resource name
    font: Vec<u8>,
}

impl RawSpan {
    /// Top of the glyphs, measured upward.
    fn top(&self) -> f32 {
        self.y + self.font_size * ASCENT_RATIO
    }

    fn same_style(&self, other: &RawSpan) -> bool {
        self.font == other.font
            && self.is_bold == other.is_bold
            && (self.font_size - other.font_size).abs() < FONT_SIZE_EPSILON
    }

    /// Extend this span with the next run of the same style.
    fn absorb(&mut self, next: RawSpan) {
        let right = (self.x + self.width).max(next.x + next.width);
        self.width = right - self.x;
        self.text.push_str(&next.text);
    }

    fn avg_char_width(&self) -> f32 {
        let chars = self.text.chars().count();
        if chars > 0 && self.width > 0.0 {
            self.width / chars as f32
        } else {
            self.font_size * AVG_CHAR_WIDTH_RATIO
        }
    }
}

/// Spans on one baseline, left to right.
#[derive(Debug, Clone)]
struct RawLine {
    spans: Vec<RawSpan>,
    y: f32,
    x: f32,
    font_size: f32,
}

impl RawLine {
    fn from_spans(mut spans: Vec<RawSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant font size weighted by character count
        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(0.0)
        };

        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        let x = spans.first().map(|s| s.x).unwrap_or(0.0);
        Self {
            spans,
            y,
            x,
            font_size,
        }
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(op: &ContentOp) -> Option<Self> {
        Some(Self {
            a: op.number(0)?,
            b: op.number(1)?,
            c: op.number(2)?,
            d: op.number(3)?,
            e: op.number(4)?,
            f: op.number(5)?,
        })
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Pre-multiply by a translation in this matrix's space.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text object state while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_name: Vec<u8>,
    font_size: f32,
    leading: f32,
    /// `Tc`
    char_spacing: f32,
    /// `Tw`
    word_spacing: f32,
    /// `Tz`, as a fraction
    horizontal_scaling: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_name: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

/// Text painted by one show operator.
#[derive(Debug, Default)]
struct ShownText {
    text: String,
    /// Horizontal advance in text space
    advance: f32,
}

impl TextState {
    fn begin_text(&mut self) {
        self.text_matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix.translate(tx, ty);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    /// Advance of a shown string: `(w × Tfs + Tc + Tw) × Th` summed over glyphs.
    fn string_advance(&self, bytes: &[u8], text: &str, font: Option<&BackendFontInfo>) -> f32 {
        let (glyphs, count, spaces) = match font.and_then(|f| f.string_width(bytes)) {
            Some(width) => (
                width / 1000.0 * self.font_size,
                bytes.len(),
                bytes.iter().filter(|&&b| b == b' ').count(),
            ),
            None => {
                let chars = text.chars().count();
                (
                    chars as f32 * self.font_size * AVG_CHAR_WIDTH_RATIO,
                    chars,
                    text.chars().filter(|&c| c == ' ').count(),
                )
            }
        };
        (glyphs + count as f32 * self.char_spacing + spaces as f32 * self.word_spacing)
            * self.horizontal_scaling
    }
}

/// Layout analyzer for extracting the text layout of PDF pages.
pub struct LayoutAnalyzer<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    options: &'a ParseOptions,
}

impl<'a, B: PdfBackend + ?Sized> LayoutAnalyzer<'a, B> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a B, options: &'a ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Extract the layout of a page (1-indexed page number).
    pub fn analyze_page(&self, page_num: u32) -> Result<PageLayout> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;
        self.analyze(page_num, page_id)
    }

    /// Extract the layout of a page already resolved to its object id.
    pub fn analyze(&self, page_num: u32, page_id: PageId) -> Result<PageLayout> {
        let page_box = self.backend.page_box(page_id);
        let fonts: HashMap<Vec<u8>, BackendFontInfo> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();

        let content = self.backend.page_content(page_id)?;
        let ops = self
            .backend
            .decode_content(&content)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_num, e)))?;

        let spans = self.extract_spans(page_id, &ops, &fonts);
        log::trace!("Page {}: {} spans", page_num, spans.len());

        let lines = self.group_spans_into_lines(spans);
        let blocks = self.group_lines_into_blocks(lines);

        let index = page_num.saturating_sub(1);
        let mut page = PageLayout::new(index, page_box.width(), page_box.height());
        for block in blocks {
            page.add_block(to_model_block(block, &page_box, index));
        }
        Ok(page)
    }

    /// Walk content operations and collect text spans in user space.
    fn extract_spans(
        &self,
        page_id: PageId,
        ops: &[ContentOp],
        fonts: &HashMap<Vec<u8>, BackendFontInfo>,
    ) -> Vec<RawSpan> {
        let mut spans = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut state = TextState::default();
        let mut in_text_block = false;

        for op in ops {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(saved) = ctm_stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    state.begin_text();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        state.font_name = name.clone();
                    }
                    state.font_size = op.number(1).unwrap_or(12.0);
                }
                "TL" => state.leading = op.number(0).unwrap_or(0.0),
                "Tc" => state.char_spacing = op.number(0).unwrap_or(0.0),
                "Tw" => state.word_spacing = op.number(0).unwrap_or(0.0),
                "Tz" => state.horizontal_scaling = op.number(0).unwrap_or(100.0) / 100.0,
                "Td" => state.move_line(op.number(0).unwrap_or(0.0), op.number(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = op.number(1).unwrap_or(0.0);
                    state.leading = -ty;
                    state.move_line(op.number(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(op) {
                        state.text_matrix = m;
                        state.line_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "TJ" | "'" | "\"" if in_text_block => {
                    if op.operator == "\"" {
                        state.word_spacing = op.number(0).unwrap_or(state.word_spacing);
                        state.char_spacing = op.number(1).unwrap_or(state.char_spacing);
                    }
                    if op.operator == "'" || op.operator == "\"" {
                        state.next_line();
                    }
                    let operand = if op.operator == "\"" {
                        op.operands.get(2)
                    } else {
                        op.operands.first()
                    };
                    let font = fonts.get(&state.font_name);
                    let shown = match operand {
                        Some(value) => self.decode_operand(page_id, &state, font, value),
                        None => continue,
                    };
                    if let Some(span) = self.show_text(shown, &mut state, &ctm, font) {
                        spans.push(span);
                    }
                }
                _ => {}
            }
        }

        spans
    }

    /// Decode a `Tj` string or `TJ` array and measure its advance, turning
    /// wide kerning gaps into spaces.
    fn decode_operand(
        &self,
        page_id: PageId,
        state: &TextState,
        font: Option<&BackendFontInfo>,
        value: &PdfValue,
    ) -> ShownText {
        let mut shown = ShownText::default();
        let items = match value {
            PdfValue::Str(_) => std::slice::from_ref(value),
            PdfValue::Array(items) => items.as_slice(),
            _ => return shown,
        };

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let text = self.backend.decode_text(page_id, &state.font_name, bytes);
                    shown.advance += state.string_advance(bytes, &text, font);
                    shown.text.push_str(&text);
                }
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    // Negative adjustments move the next glyph right.
                    let adjustment =
                        -super::backend::get_number_from_value(item).unwrap_or(0.0);
                    shown.advance +=
                        adjustment / 1000.0 * state.font_size * state.horizontal_scaling;

                    let combined = &shown.text;
                    if adjustment > self.options.tj_space_threshold
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        shown.text.push(' ');
                    }
                }
                _ => {}
            }
        }
        shown
    }

    /// Emit a span for shown text and advance the text matrix past it.
    fn show_text(
        &self,
        shown: ShownText,
        state: &mut TextState,
        ctm: &Matrix,
        font: Option<&BackendFontInfo>,
    ) -> Option<RawSpan> {
        let render = state.text_matrix.multiply(ctm);
        state.text_matrix.translate(shown.advance, 0.0);

        if shown.text.trim().is_empty() {
            return None;
        }

        let text = if self.options.normalize_unicode {
            shown.text.nfc().collect::<String>()
        } else {
            shown.text
        };

        Some(RawSpan {
            text,
            x: render.e,
            y: render.f,
            width: shown.advance * render.horizontal_scale(),
            font_size: state.font_size * render.vertical_scale(),
            is_bold: font.is_some_and(BackendFontInfo::is_bold),
            font: state.font_name.clone(),
        })
    }

    /// Group spans into lines by baseline, top to bottom.
    fn group_spans_into_lines(&self, mut spans: Vec<RawSpan>) -> Vec<RawLine> {
        if spans.is_empty() {
            return vec![];
        }

        // PDF y grows upward: sort by y descending, then x.
        spans.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let mut lines: Vec<RawLine> = Vec::new();
        let mut current: Vec<RawSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in spans {
            let tolerance = span.font_size * self.options.line_tolerance_ratio;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        lines.push(self.finish_line(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }

        if !current.is_empty() {
            lines.push(self.finish_line(current));
        }

        lines
    }

    /// Order a line's spans, insert word spaces across horizontal gaps and
    /// merge neighbouring runs of the same style.
    fn finish_line(&self, spans: Vec<RawSpan>) -> RawLine {
        let mut line = RawLine::from_spans(spans);

        for i in 1..line.spans.len() {
            let (head, tail) = line.spans.split_at_mut(i);
            let prev = &head[i - 1];
            let span = &mut tail[0];

            let gap = span.x - (prev.x + prev.width);
            if gap <= span.avg_char_width() * self.options.space_gap_ratio {
                continue;
            }
            let prev_last = prev.text.chars().last();
            let curr_first = span.text.chars().next();
            let both_spaceless = prev_last.is_some_and(is_spaceless_script_char)
                && curr_first.is_some_and(is_spaceless_script_char);
            let has_space = prev_last.is_some_and(|c| c == ' ' || c == '\u{00A0}')
                || curr_first.is_some_and(|c| c == ' ' || c == '\u{00A0}');

            if !both_spaceless && !has_space {
                span.text.insert(0, ' ');
            }
        }

        let mut runs: Vec<RawSpan> = Vec::with_capacity(line.spans.len());
        for span in line.spans.drain(..) {
            match runs.last_mut() {
                Some(prev) if prev.same_style(&span) => prev.absorb(span),
                _ => runs.push(span),
            }
        }
        line.spans = runs;

        line
    }

    /// Group lines into blocks based on spacing, size and indentation.
    fn group_lines_into_blocks(&self, lines: Vec<RawLine>) -> Vec<Vec<RawLine>> {
        if lines.is_empty() {
            return vec![];
        }

        let avg_spacing = calculate_avg_line_spacing(&lines);
        let mut blocks: Vec<Vec<RawLine>> = Vec::new();
        let mut current: Vec<RawLine> = Vec::new();

        for line in lines {
            if let Some(prev) = current.last() {
                if self.should_break_block(prev, &line, avg_spacing) {
                    blocks.push(std::mem::take(&mut current));
                }
            }
            current.push(line);
        }

        if !current.is_empty() {
            blocks.push(current);
        }

        blocks
    }

    fn should_break_block(&self, prev: &RawLine, curr: &RawLine, avg_spacing: f32) -> bool {
        let spacing = (prev.y - curr.y).abs();
        spacing > avg_spacing * self.options.block_gap_ratio
            || (prev.font_size - curr.font_size).abs() > 1.0
            || (prev.x - curr.x).abs() > 20.0
    }
}

/// Average distance between consecutive baselines.
fn calculate_avg_line_spacing(lines: &[RawLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Convert a block to page coordinates measured down from the top edge.
fn to_model_block(lines: Vec<RawLine>, page_box: &PageBox, page_index: u32) -> TextBlock {
    TextBlock::new(
        lines
            .into_iter()
            .map(|line| {
                TextLine::from_spans(
                    line.spans
                        .into_iter()
                        .map(|s| TextSpan {
                            top_y: page_box.top - s.top(),
                            x: s.x - page_box.left,
                            font_size: s.font_size,
                            is_bold: s.is_bold,
                            page_index,
                            text: s.text,
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}
