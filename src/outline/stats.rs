//! Document-wide font statistics.

use crate::model::{PageLayout, TextSpan};

/// Baseline font statistics for one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStatistics {
    /// Mean font size over all spans with visible text
    pub avg_font_size: f32,
    /// Number of spans that contributed to the mean
    pub span_count: usize,
}

impl FontStatistics {
    /// Compute statistics over every span of every page.
    ///
    /// Uses `default_size` when no span has visible text.
    pub fn from_pages(pages: &[PageLayout], default_size: f32) -> Self {
        Self::from_spans(pages.iter().flat_map(|p| p.spans()), default_size)
    }

    /// Compute statistics over a sequence of spans.
    pub fn from_spans<'a, I>(spans: I, default_size: f32) -> Self
    where
        I: IntoIterator<Item = &'a TextSpan>,
    {
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for span in spans.into_iter().filter(|s| s.has_text()) {
            sum += f64::from(span.font_size);
            count += 1;
        }

        let avg_font_size = if count > 0 {
            (sum / count as f64) as f32
        } else {
            default_size
        };

        Self {
            avg_font_size,
            span_count: count,
        }
    }

    /// `avg_font_size × ratio`.
    pub fn scaled(&self, ratio: f32) -> f32 {
        self.avg_font_size * ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TextBlock, TextLine};

    fn page(index: u32, spans: Vec<TextSpan>) -> PageLayout {
        let mut page = PageLayout::letter(index);
        page.add_block(TextBlock::single(TextLine::from_spans(spans)));
        page
    }

    #[test]
    fn test_mean_over_pages() {
        let pages = vec![
            page(
                0,
                vec![
                    TextSpan::new("Title", 24.0, true, 50.0),
                    TextSpan::new("body", 10.0, false, 90.0),
                ],
            ),
            page(1, vec![TextSpan::new("more body", 11.0, false, 90.0)]),
        ];
        let stats = FontStatistics::from_pages(&pages, 12.0);
        assert_eq!(stats.span_count, 3);
        assert!((stats.avg_font_size - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_blank_spans_ignored() {
        let pages = vec![page(
            0,
            vec![
                TextSpan::new("   ", 72.0, false, 10.0),
                TextSpan::new("", 40.0, false, 10.0),
                TextSpan::new("text", 9.0, false, 10.0),
            ],
        )];
        let stats = FontStatistics::from_pages(&pages, 12.0);
        assert_eq!(stats.span_count, 1);
        assert_eq!(stats.avg_font_size, 9.0);
    }

    #[test]
    fn test_default_without_text() {
        let stats = FontStatistics::from_pages(&[], 12.0);
        assert_eq!(stats.avg_font_size, 12.0);
        assert_eq!(stats.span_count, 0);

        let blank = vec![page(0, vec![TextSpan::new(" ", 30.0, false, 0.0)])];
        assert_eq!(FontStatistics::from_pages(&blank, 12.0).avg_font_size, 12.0);
    }

    #[test]
    fn test_scaled() {
        let stats = FontStatistics {
            avg_font_size: 10.0,
            span_count: 1,
        };
        assert!((stats.scaled(1.5) - 15.0).abs() < 1e-6);
    }
}
