//! Document model types.
//!
//! The layout types are the intermediate representation between PDF text
//! extraction and outline inference. The outline types are the result handed
//! to rendering.

mod document;
mod layout;
mod outline;

pub use document::Metadata;
pub use layout::{LayoutDocument, LayoutSource, PageLayout, TextBlock, TextLine, TextSpan};
pub use outline::{Heading, HeadingLevel, OutlineResult, ERROR_TITLE};
