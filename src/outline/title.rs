//! Title location: embedded metadata first, then layout scoring on page one.

use crate::error::{Error, Result};
use crate::model::{LayoutSource, PageLayout, TextSpan};

use super::config::HeuristicConfig;

/// A scored title candidate from the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCandidate {
    /// Trimmed span text
    pub text: String,
    /// Layout score; higher is more title-like
    pub score: f32,
}

/// Where a located title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// The document information dictionary
    Metadata,
    /// The highest-scoring span on page one
    Layout,
    /// Nothing usable was found
    Fallback,
}

/// Picks a document title.
pub struct TitleLocator<'a> {
    config: &'a HeuristicConfig,
    skip_terms: Vec<String>,
}

impl<'a> TitleLocator<'a> {
    /// Create a locator using the given thresholds.
    pub fn new(config: &'a HeuristicConfig) -> Self {
        let skip_terms = config
            .title_skip_terms
            .iter()
            .map(|t| t.to_lowercase())
            .collect();
        Self { config, skip_terms }
    }

    /// Locate the title, never failing.
    pub fn locate<S: LayoutSource + ?Sized>(&self, source: &S) -> String {
        self.locate_with_source(source).0
    }

    /// Locate the title and report which stage produced it.
    pub fn locate_with_source<S: LayoutSource + ?Sized>(&self, source: &S) -> (String, TitleSource) {
        if let Some(title) = self.from_metadata(source) {
            return (title, TitleSource::Metadata);
        }

        match self.from_layout(source) {
            Ok(Some(title)) => (title, TitleSource::Layout),
            Ok(None) => (self.config.untitled_title.clone(), TitleSource::Fallback),
            Err(e) => {
                log::warn!("Failed to score title candidates: {}", e);
                (self.config.untitled_title.clone(), TitleSource::Fallback)
            }
        }
    }

    /// Like [`locate_with_source`](Self::locate_with_source), scoring a first
    /// page that has already been extracted instead of asking the source.
    pub fn locate_with_first_page<S: LayoutSource + ?Sized>(
        &self,
        source: &S,
        first_page: Option<&PageLayout>,
    ) -> (String, TitleSource) {
        if let Some(title) = self.from_metadata(source) {
            return (title, TitleSource::Metadata);
        }

        match first_page.and_then(|page| self.best_candidate(page)) {
            Some(candidate) => (candidate.text, TitleSource::Layout),
            None => (self.config.untitled_title.clone(), TitleSource::Fallback),
        }
    }

    /// Stage 1: the embedded title, if acceptable. Read errors are ignored.
    pub fn from_metadata<S: LayoutSource + ?Sized>(&self, source: &S) -> Option<String> {
        match source.metadata() {
            Ok(metadata) => metadata
                .trimmed_title()
                .and_then(|t| self.accept_metadata_title(t)),
            Err(e) => {
                log::debug!("Ignoring unreadable metadata: {}", e);
                None
            }
        }
    }

    /// Whether an embedded title is usable; returns it trimmed.
    ///
    /// Titles must be longer than the configured minimum and must not look
    /// like a file name ending in `.pdf`.
    pub fn accept_metadata_title(&self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.chars().count() <= self.config.min_metadata_title_chars {
            return None;
        }
        if title.to_lowercase().ends_with(".pdf") {
            return None;
        }
        Some(title.to_string())
    }

    /// Stage 2: the best layout candidate on page one.
    pub fn from_layout<S: LayoutSource + ?Sized>(&self, source: &S) -> Result<Option<String>> {
        if source.page_count() == 0 {
            return Err(Error::PageOutOfRange(0, 0));
        }
        let first_page = source.page(0)?;
        Ok(self.best_candidate(&first_page).map(|c| c.text))
    }

    /// Highest-scoring candidate; the earliest one wins ties.
    pub fn best_candidate(&self, page: &PageLayout) -> Option<TitleCandidate> {
        let mut best: Option<TitleCandidate> = None;
        for candidate in self.candidates(page) {
            match best {
                Some(ref current) if candidate.score <= current.score => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Scored candidates in span order, artifacts removed.
    pub fn candidates(&self, page: &PageLayout) -> Vec<TitleCandidate> {
        page.spans()
            .filter_map(|span| {
                let text = span.text.trim();
                let len = text.chars().count();
                if len < self.config.min_title_chars || len > self.config.max_title_chars {
                    return None;
                }
                if self.is_artifact(text) {
                    return None;
                }
                Some(TitleCandidate {
                    text: text.to_string(),
                    score: self.score(span),
                })
            })
            .collect()
    }

    /// Position, size and weight score for a span.
    pub fn score(&self, span: &TextSpan) -> f32 {
        let position = self.config.title_position_origin - span.top_y;
        let size = span.font_size * self.config.title_size_weight;
        let weight = if span.is_bold {
            self.config.title_bold_bonus
        } else {
            0.0
        };
        position + size + weight
    }

    /// Page numbers, links, addresses and copyright lines.
    fn is_artifact(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.skip_terms.iter().any(|term| lower.contains(term.as_str()))
            || text.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayoutDocument, Metadata, TextBlock, TextLine};

    fn first_page(spans: Vec<TextSpan>) -> PageLayout {
        let mut page = PageLayout::letter(0);
        for span in spans {
            page.add_block(TextBlock::single(TextLine::from_spans(vec![span])));
        }
        page
    }

    struct NoMetadata(LayoutDocument);

    impl LayoutSource for NoMetadata {
        fn page_count(&self) -> usize {
            self.0.page_count()
        }
        fn page(&self, index: usize) -> Result<PageLayout> {
            self.0.page(index)
        }
        fn metadata(&self) -> Result<Metadata> {
            Err(Error::MissingObject("Info".to_string()))
        }
    }

    #[test]
    fn test_accept_metadata_title() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);

        assert_eq!(
            locator.accept_metadata_title("  Annual Report 2024 "),
            Some("Annual Report 2024".to_string())
        );
        assert_eq!(locator.accept_metadata_title("Short"), None);
        assert_eq!(locator.accept_metadata_title("Report"), Some("Report".to_string()));
        assert_eq!(locator.accept_metadata_title("Microsoft Word - draft.PDF"), None);
        assert_eq!(locator.accept_metadata_title(""), None);
    }

    #[test]
    fn test_score() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let span = TextSpan::new("A Study of Things", 20.0, true, 100.0);
        assert!((locator.score(&span) - (900.0 + 200.0 + 50.0)).abs() < 1e-3);
    }

    #[test]
    fn test_best_candidate_prefers_large_top_text() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let page = first_page(vec![
            TextSpan::new("Running header text", 9.0, false, 20.0),
            TextSpan::new("Designing Robust Pipelines", 24.0, true, 90.0),
            TextSpan::new("Body paragraph goes on", 11.0, false, 200.0),
        ]);
        let best = locator.best_candidate(&page).unwrap();
        assert_eq!(best.text, "Designing Robust Pipelines");
    }

    #[test]
    fn test_artifacts_filtered() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let page = first_page(vec![
            TextSpan::new("Page 1 of 12", 30.0, true, 10.0),
            TextSpan::new("https://example.org", 30.0, true, 10.0),
            TextSpan::new("contact@example.org", 30.0, true, 10.0),
            TextSpan::new("Copyright 2023 Acme", 30.0, true, 10.0),
            TextSpan::new("doi:10.1000/182", 30.0, true, 10.0),
            TextSpan::new("20240101", 30.0, true, 10.0),
            TextSpan::new("Tiny", 30.0, true, 10.0),
            TextSpan::new("Actual Title Here", 12.0, false, 300.0),
        ]);
        let candidates = locator.candidates(&page);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Actual Title Here");
    }

    #[test]
    fn test_ties_keep_first() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let page = first_page(vec![
            TextSpan::new("First Equal Span", 14.0, false, 100.0),
            TextSpan::new("Second Equal Span", 14.0, false, 100.0),
        ]);
        assert_eq!(locator.best_candidate(&page).unwrap().text, "First Equal Span");
    }

    #[test]
    fn test_metadata_preferred() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let mut doc = LayoutDocument::with_title("Annual Report 2024");
        doc.add_page(first_page(vec![TextSpan::new("Cover Banner", 40.0, true, 10.0)]));

        let (title, source) = locator.locate_with_source(&doc);
        assert_eq!(title, "Annual Report 2024");
        assert_eq!(source, TitleSource::Metadata);
    }

    #[test]
    fn test_locate_with_first_page() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let page = first_page(vec![TextSpan::new("Harbour Survey Notes", 30.0, true, 40.0)]);

        let untitled = LayoutDocument::new();
        assert_eq!(
            locator.locate_with_first_page(&untitled, Some(&page)),
            ("Harbour Survey Notes".to_string(), TitleSource::Layout)
        );
        assert_eq!(
            locator.locate_with_first_page(&untitled, None).1,
            TitleSource::Fallback
        );

        let titled = LayoutDocument::with_title("  Harbour Survey 2023  ");
        assert_eq!(
            locator.locate_with_first_page(&titled, Some(&page)),
            ("Harbour Survey 2023".to_string(), TitleSource::Metadata)
        );
    }

    #[test]
    fn test_metadata_error_falls_through() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);
        let mut doc = LayoutDocument::new();
        doc.add_page(first_page(vec![TextSpan::new("Cover Banner", 40.0, true, 10.0)]));

        let (title, source) = locator.locate_with_source(&NoMetadata(doc));
        assert_eq!(title, "Cover Banner");
        assert_eq!(source, TitleSource::Layout);
    }

    #[test]
    fn test_untitled_fallback() {
        let config = HeuristicConfig::default();
        let locator = TitleLocator::new(&config);

        let empty = LayoutDocument::with_title("x.pdf");
        assert_eq!(
            locator.locate_with_source(&empty),
            ("Untitled Document".to_string(), TitleSource::Fallback)
        );

        let mut artifacts_only = LayoutDocument::new();
        artifacts_only.add_page(first_page(vec![TextSpan::new("Page 3", 20.0, true, 5.0)]));
        assert_eq!(locator.locate(&artifacts_only), "Untitled Document");
    }
}
