//! PDF document parser using lopdf.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{LayoutDocument, LayoutSource, Metadata, PageLayout};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::layout::LayoutAnalyzer;
use super::options::ParseOptions;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// PDF document parser.
///
/// Pages are analyzed lazily through [`LayoutSource::page`]; nothing beyond
/// the object table and page tree is touched when the parser is opened.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
    /// 1-indexed page number to page object
    pages: BTreeMap<u32, PageId>,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        let mut header = Vec::with_capacity(16);
        File::open(path)?.take(16).read_to_end(&mut header)?;
        let version = check_header(&header)?;
        log::debug!("Opening {} (PDF {})", path.display(), version);

        let backend = LopdfBackend::load_file(path)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        check_header(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions) -> Self {
        let pages = backend.pages();
        Self {
            backend,
            options,
            pages,
        }
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Analyze every page into an in-memory layout document.
    pub fn parse(&self) -> Result<LayoutDocument> {
        let mut document = LayoutDocument::new();
        document.metadata = self.metadata()?;
        for index in 0..self.page_count() {
            document.add_page(self.page(index)?);
        }
        Ok(document)
    }

    /// The options used for layout extraction.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    /// Get the PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

impl LayoutSource for PdfParser {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageLayout> {
        let page_num = index as u32 + 1;
        let page_id = *self
            .pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, self.pages.len() as u32))?;
        LayoutAnalyzer::new(&self.backend, &self.options).analyze(page_num, page_id)
    }

    fn metadata(&self) -> Result<Metadata> {
        let mut metadata = Metadata::with_version(self.backend.version());
        // A missing Info dictionary just means no metadata.
        metadata.title = self.backend.info_string(b"Title").unwrap_or_default();
        metadata.author = self.backend.info_string(b"Author").unwrap_or_default();
        metadata.subject = self.backend.info_string(b"Subject").unwrap_or_default();
        metadata.page_count = self.page_count() as u32;
        metadata.encrypted = self.backend.is_encrypted();
        Ok(metadata)
    }
}

/// Validate the `%PDF-x.y` header and return the declared version.
pub fn check_header(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

fn is_valid_version(version: &[u8]) -> bool {
    matches!(version, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}
