//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the PDF operations layout extraction
//! needs, isolating the concrete PDF library (lopdf) from the layout analysis.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};

use super::metrics::StandardMetrics;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// FontDescriptor flag bit marking glyphs that should be painted bold.
const FORCE_BOLD_FLAG: u32 = 1 << 18;

/// Font information returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// FontDescriptor `Flags`, 0 when absent.
    pub flags: u32,
    /// FontDescriptor `FontWeight`, when present.
    pub weight: Option<f32>,
    /// Code of the first entry in `widths`.
    pub first_char: u32,
    /// Glyph advances from the font's `Widths` array, in thousandths of an em.
    pub widths: Vec<f32>,
    /// FontDescriptor `MissingWidth`, used for codes outside `widths`.
    pub missing_width: f32,
    /// Type0 font addressed by multi-byte codes.
    pub composite: bool,
}

impl BackendFontInfo {
    /// Create font info from a resource name and base font.
    pub fn new(name: impl Into<Vec<u8>>, base_font: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_font: base_font.into(),
            ..Default::default()
        }
    }

    /// Whether text in this font renders bold.
    pub fn is_bold(&self) -> bool {
        let base = self.base_font.to_lowercase();
        base.contains("bold")
            || base.contains("black")
            || base.contains("heavy")
            || base.contains("semibold")
            || self.flags & FORCE_BOLD_FLAG != 0
            || self.weight.is_some_and(|w| w >= 700.0)
    }

    /// Total advance of a shown string, in thousandths of an em.
    ///
    /// Uses the font's `Widths`, or the standard 14 metrics when the font
    /// omits them. `None` when the font cannot be measured.
    pub fn string_width(&self, bytes: &[u8]) -> Option<f32> {
        if self.composite {
            return None;
        }
        if !self.widths.is_empty() {
            return Some(bytes.iter().map(|&code| self.glyph_width(code)).sum());
        }
        let standard = StandardMetrics::for_base_font(&self.base_font)?;
        Some(bytes.iter().map(|&code| standard.width(code)).sum())
    }

    fn glyph_width(&self, code: u8) -> f32 {
        (code as u32)
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }
}

/// The visible area of a page in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl PageBox {
    /// US Letter, used when a page declares no box.
    pub const LETTER: PageBox = PageBox {
        left: 0.0,
        bottom: 0.0,
        right: 612.0,
        top: 792.0,
    };

    pub fn width(&self) -> f32 {
        (self.right - self.left).abs()
    }

    pub fn height(&self) -> f32 {
        (self.top - self.bottom).abs()
    }
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(get_number_from_value)
    }
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId), page numbers 1-indexed.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the page's media box, inherited from ancestors when needed.
    fn page_box(&self, page: PageId) -> PageBox;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Read a string entry from the document information dictionary.
    fn info_string(&self, key: &[u8]) -> Result<Option<String>>;

    /// PDF version string.
    fn version(&self) -> String;

    /// Whether the document is encrypted.
    fn is_encrypted(&self) -> bool;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Resolve an object that may be a reference to a dictionary.
    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Read style hints and glyph widths from a font dictionary.
    fn font_info(&self, name: &[u8], font: &Dictionary) -> BackendFontInfo {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let composite = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Type0");

        let mut info = BackendFontInfo {
            composite,
            ..BackendFontInfo::new(name.to_vec(), base_font)
        };

        if let Some(d) = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve_dict(o))
        {
            info.flags = d
                .get(b"Flags")
                .ok()
                .and_then(|f| f.as_i64().ok())
                .map(|f| f as u32)
                .unwrap_or(0);
            info.weight = d.get(b"FontWeight").ok().and_then(number_from_object);
            info.missing_width = d
                .get(b"MissingWidth")
                .ok()
                .and_then(number_from_object)
                .unwrap_or(0.0);
        }

        let widths = font.get(b"Widths").ok().and_then(|o| match o {
            Object::Reference(r) => self.doc.get_object(*r).ok(),
            other => Some(other),
        });
        if let Some(Object::Array(widths)) = widths {
            info.first_char = font
                .get(b"FirstChar")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(0)
                .max(0) as u32;
            info.widths = widths
                .iter()
                .map(|w| number_from_object(w).unwrap_or(info.missing_width))
                .collect();
        }

        info
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_box(&self, page: PageId) -> PageBox {
        let mut current = self.doc.get_dictionary(page).ok();
        // Bounded walk up the page tree for an inherited MediaBox.
        for _ in 0..32 {
            let Some(dict) = current else {
                break;
            };
            if let Some(bbox) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| o.as_array().ok())
                .and_then(|a| parse_box(a))
            {
                return bbox;
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|r| self.doc.get_dictionary(r).ok());
        }
        PageBox::LETTER
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(lopdf_fonts
            .iter()
            .map(|(name, font_dict)| self.font_info(name, font_dict))
            .collect())
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content streams is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => s
                    .decompressed_content()
                    .or_else(|_| Ok(s.content.clone())),
                Ok(Object::Array(arr)) => self.concat_streams(arr),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => self.concat_streams(arr),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn info_string(&self, key: &[u8]) -> Result<Option<String>> {
        let info = self
            .doc
            .trailer
            .get(b"Info")
            .map_err(|_| Error::MissingObject("Info".to_string()))?;
        let dict = self
            .resolve_dict(info)
            .ok_or_else(|| Error::MissingObject("Info dictionary".to_string()))?;

        Ok(dict.get(key).ok().and_then(|obj| match obj {
            Object::String(bytes, _) => Some(decode_text_simple(bytes)),
            Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
            _ => None,
        }))
    }

    fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }
}

impl LopdfBackend {
    fn concat_streams(&self, arr: &[Object]) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for obj in arr {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    // Unfiltered streams have no decompressed form.
                    let data = s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
        Ok(content)
    }
}

fn parse_box(values: &[Object]) -> Option<PageBox> {
    if values.len() < 4 {
        return None;
    }
    let n = |i: usize| values[i].as_float().ok();
    let (x0, y0, x1, y1) = (n(0)?, n(1)?, n(2)?, n(3)?);
    Some(PageBox {
        left: x0.min(x1),
        bottom: y0.min(y1),
        right: x0.max(x1),
        top: y0.max(y1),
    })
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn number_from_object(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_font_bold_hints() {
        assert!(BackendFontInfo::new(b"F1".to_vec(), "Helvetica-Bold").is_bold());
        assert!(BackendFontInfo::new(b"F1".to_vec(), "ABCDEF+Inter-SemiBold").is_bold());
        assert!(!BackendFontInfo::new(b"F1".to_vec(), "Times-Roman").is_bold());

        let forced = BackendFontInfo {
            flags: FORCE_BOLD_FLAG,
            ..BackendFontInfo::new(b"F2".to_vec(), "Custom")
        };
        assert!(forced.is_bold());

        let heavy = BackendFontInfo {
            weight: Some(700.0),
            ..BackendFontInfo::new(b"F3".to_vec(), "Custom")
        };
        assert!(heavy.is_bold());
    }

    #[test]
    fn test_string_width_from_widths_array() {
        let font = BackendFontInfo {
            first_char: 65,
            widths: vec![600.0, 550.0],
            missing_width: 250.0,
            ..BackendFontInfo::new(b"F1".to_vec(), "ABCDEF+CMR10")
        };
        // ' ' is outside the array and falls back to MissingWidth.
        assert_eq!(font.string_width(b"AB A"), Some(600.0 + 550.0 + 250.0 + 600.0));
    }

    #[test]
    fn test_string_width_standard_font() {
        let font = BackendFontInfo::new(b"F1".to_vec(), "Helvetica");
        assert_eq!(font.string_width(b"Study"), Some(2557.0));

        let unknown = BackendFontInfo::new(b"F2".to_vec(), "CMR10");
        assert_eq!(unknown.string_width(b"Study"), None);

        let composite = BackendFontInfo {
            composite: true,
            ..BackendFontInfo::new(b"F3".to_vec(), "Helvetica")
        };
        assert_eq!(composite.string_width(&[0x00, 0x41]), None);
    }

    #[test]
    fn test_page_fonts_read_widths() {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "Flags" => 32,
            "FontWeight" => 700,
            "MissingWidth" => 333,
        });
        let font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+SourceSerif",
            "FirstChar" => 32,
            "LastChar" => 34,
            "Widths" => vec![250.into(), 300.into(), Object::Real(412.5)],
            "FontDescriptor" => descriptor,
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let backend = LopdfBackend { doc };
        let fonts = backend.page_fonts(page_id).unwrap();
        assert_eq!(fonts.len(), 1);

        let info = &fonts[0];
        assert!(info.is_bold());
        assert!(!info.composite);
        assert_eq!(info.first_char, 32);
        assert_eq!(info.widths, vec![250.0, 300.0, 412.5]);
        assert_eq!(info.string_width(b" !\"z"), Some(250.0 + 300.0 + 412.5 + 333.0));
        assert_eq!(backend.page_box(page_id), PageBox::LETTER);
    }

    #[test]
    fn test_parse_box() {
        let values = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.0),
            Object::Real(842.0),
        ];
        let bbox = parse_box(&values).unwrap();
        assert_eq!(bbox.width(), 595.0);
        assert_eq!(bbox.height(), 842.0);
        assert!(parse_box(&values[..2]).is_none());
    }

    #[test]
    fn test_content_op_number() {
        let op = ContentOp::new("Td", vec![PdfValue::Integer(42), PdfValue::Real(3.5)]);
        assert_eq!(op.number(0), Some(42.0));
        assert_eq!(op.number(1), Some(3.5));
        assert_eq!(op.number(2), None);
    }

    #[test]
    fn test_load_bytes_rejects_garbage() {
        assert!(LopdfBackend::load_bytes(b"not a pdf at all").is_err());
    }
}
