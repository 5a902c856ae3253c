//! PDF parsing module.

mod backend;
mod layout;
mod metrics;
mod options;
mod pdf_parser;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageBox, PageId, PdfBackend,
    PdfValue,
};
pub use layout::LayoutAnalyzer;
pub use metrics::StandardMetrics;
pub use options::ParseOptions;
pub use pdf_parser::{check_header, PdfParser};
