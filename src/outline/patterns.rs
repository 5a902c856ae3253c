//! Heading pattern table.
//!
//! An ordered list of textual heading rules, evaluated top to bottom with the
//! first match winning, plus the numbered form-label exclusion that is checked
//! before any of them. The table is compiled once and shared read-only.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PATTERN_TABLE: Lazy<PatternTable> = Lazy::new(PatternTable::build);

/// Section names recognized when they make up the whole line.
pub const SECTION_KEYWORDS: [&str; 9] = [
    "Abstract",
    "Introduction",
    "Methodology",
    "Results",
    "Discussion",
    "Conclusion",
    "References",
    "Bibliography",
    "Acknowledgments",
];

/// Kind of heading rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `1`, `1.1`, `1.1.1.` followed by text
    Numbered,
    /// `IV.` followed by text
    Roman,
    /// `B.` followed by text
    Lettered,
    /// `Chapter 3`, `Section 2: Scope`, `Part 1 - Overview`
    ChapterLike,
    /// A bare section name such as `References`
    KeywordSection,
}

impl PatternKind {
    /// Evaluation order; earlier kinds win.
    pub const PRIORITY: [PatternKind; 5] = [
        PatternKind::Numbered,
        PatternKind::Roman,
        PatternKind::Lettered,
        PatternKind::ChapterLike,
        PatternKind::KeywordSection,
    ];

    /// Short lowercase name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Numbered => "numbered",
            PatternKind::Roman => "roman",
            PatternKind::Lettered => "lettered",
            PatternKind::ChapterLike => "chapter",
            PatternKind::KeywordSection => "keyword",
        }
    }

    fn regex_source(self) -> String {
        match self {
            PatternKind::Numbered => r"^(\d+(?:\.\d+)*\.?)\s+(.+)$".to_string(),
            PatternKind::Roman => r"^([IVX]+\.)\s+(.+)$".to_string(),
            PatternKind::Lettered => r"^([A-Z]\.)\s+(.+)$".to_string(),
            PatternKind::ChapterLike => {
                r"(?i)^(chapter|section|part)\s+(\d+)[:\-\s]*(.*)$".to_string()
            }
            PatternKind::KeywordSection => {
                format!("(?i)^({})$", SECTION_KEYWORDS.join("|"))
            }
        }
    }
}

/// A successful rule match with its captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternMatch {
    Numbered { number: String, text: String },
    Roman { numeral: String, text: String },
    Lettered { letter: String, text: String },
    ChapterLike {
        keyword: String,
        number: String,
        text: Option<String>,
    },
    KeywordSection { keyword: String },
}

impl PatternMatch {
    /// The rule that produced this match.
    pub fn kind(&self) -> PatternKind {
        match self {
            PatternMatch::Numbered { .. } => PatternKind::Numbered,
            PatternMatch::Roman { .. } => PatternKind::Roman,
            PatternMatch::Lettered { .. } => PatternKind::Lettered,
            PatternMatch::ChapterLike { .. } => PatternKind::ChapterLike,
            PatternMatch::KeywordSection { .. } => PatternKind::KeywordSection,
        }
    }

    /// Number of dot-separated integer groups in a numbered heading's token.
    ///
    /// `2` → 1, `2.3` → 2, `2.3.1.` → 3. Only numbered headings carry a depth.
    pub fn numbering_depth(&self) -> Option<usize> {
        match self {
            PatternMatch::Numbered { number, .. } => {
                Some(number.trim_end_matches('.').split('.').count())
            }
            _ => None,
        }
    }
}

struct Rule {
    kind: PatternKind,
    regex: Regex,
}

/// Compiled heading rules in priority order.
pub struct PatternTable {
    rules: Vec<Rule>,
    form_label: Regex,
}

impl PatternTable {
    /// The process-wide table.
    pub fn global() -> &'static PatternTable {
        &PATTERN_TABLE
    }

    fn build() -> Self {
        let rules = PatternKind::PRIORITY
            .iter()
            .map(|&kind| Rule {
                kind,
                regex: Regex::new(&kind.regex_source()).expect("heading pattern is valid"),
            })
            .collect();

        Self {
            rules,
            form_label: Regex::new(r"^\d+(?:\([A-Za-z]\))?\.\s+\S")
                .expect("form label pattern is valid"),
        }
    }

    /// Rule kinds in evaluation order.
    pub fn kinds(&self) -> impl Iterator<Item = PatternKind> + '_ {
        self.rules.iter().map(|r| r.kind)
    }

    /// Match a line against the rules; the first matching rule wins.
    pub fn match_line(&self, text: &str) -> Option<PatternMatch> {
        let text = text.trim();
        self.rules.iter().find_map(|rule| {
            rule.regex
                .captures(text)
                .map(|caps| capture(rule.kind, &caps))
        })
    }

    /// Whether a line is a numbered form or list label such as `1(a). Sign here`.
    pub fn is_numbered_form_label(&self, text: &str) -> bool {
        self.form_label.is_match(text.trim())
    }
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn capture(kind: PatternKind, caps: &Captures<'_>) -> PatternMatch {
    match kind {
        PatternKind::Numbered => PatternMatch::Numbered {
            number: group(caps, 1),
            text: group(caps, 2),
        },
        PatternKind::Roman => PatternMatch::Roman {
            numeral: group(caps, 1),
            text: group(caps, 2),
        },
        PatternKind::Lettered => PatternMatch::Lettered {
            letter: group(caps, 1),
            text: group(caps, 2),
        },
        PatternKind::ChapterLike => {
            let text = group(caps, 3).trim().to_string();
            PatternMatch::ChapterLike {
                keyword: group(caps, 1),
                number: group(caps, 2),
                text: (!text.is_empty()).then_some(text),
            }
        }
        PatternKind::KeywordSection => PatternMatch::KeywordSection {
            keyword: group(caps, 1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static PatternTable {
        PatternTable::global()
    }

    #[test]
    fn test_priority_order() {
        let kinds: Vec<_> = table().kinds().collect();
        assert_eq!(kinds, PatternKind::PRIORITY.to_vec());
    }

    #[test]
    fn test_numbered() {
        let m = table().match_line("2.3.1 Background").unwrap();
        assert_eq!(
            m,
            PatternMatch::Numbered {
                number: "2.3.1".to_string(),
                text: "Background".to_string()
            }
        );
        assert_eq!(m.numbering_depth(), Some(3));

        assert_eq!(
            table().match_line("2.3 Background").unwrap().numbering_depth(),
            Some(2)
        );
        assert_eq!(
            table().match_line("2 Background").unwrap().numbering_depth(),
            Some(1)
        );
        assert_eq!(
            table().match_line("4.1. Results so far").unwrap().numbering_depth(),
            Some(2)
        );
    }

    #[test]
    fn test_numbered_requires_text() {
        assert!(table().match_line("2.3").is_none());
        assert!(table().match_line("42").is_none());
    }

    #[test]
    fn test_roman_and_lettered() {
        let m = table().match_line("IV. Findings").unwrap();
        assert_eq!(m.kind(), PatternKind::Roman);
        assert_eq!(m.numbering_depth(), None);

        let m = table().match_line("B. Eligibility").unwrap();
        assert_eq!(m.kind(), PatternKind::Lettered);

        // Single-letter roman numerals are claimed by the earlier rule.
        assert_eq!(
            table().match_line("I. Overview").unwrap().kind(),
            PatternKind::Roman
        );
        assert!(table().match_line("iv. lowercase numeral").is_none());
    }

    #[test]
    fn test_chapter_like() {
        let m = table().match_line("chapter 12: Results in context").unwrap();
        assert_eq!(
            m,
            PatternMatch::ChapterLike {
                keyword: "chapter".to_string(),
                number: "12".to_string(),
                text: Some("Results in context".to_string())
            }
        );

        let m = table().match_line("Section 4").unwrap();
        assert_eq!(
            m,
            PatternMatch::ChapterLike {
                keyword: "Section".to_string(),
                number: "4".to_string(),
                text: None
            }
        );

        assert_eq!(
            table().match_line("PART 2 - Appendices").unwrap().kind(),
            PatternKind::ChapterLike
        );
        assert!(table().match_line("Chapter One").is_none());
    }

    #[test]
    fn test_keyword_section() {
        let m = table().match_line("  References ").unwrap();
        assert_eq!(
            m,
            PatternMatch::KeywordSection {
                keyword: "References".to_string()
            }
        );
        assert!(table().match_line("ACKNOWLEDGMENTS").is_some());
        assert!(table().match_line("References and notes").is_none());
        assert!(table().match_line("Summary").is_none());
    }

    #[test]
    fn test_numbered_form_label() {
        assert!(table().is_numbered_form_label("1(a). Applicant must sign"));
        assert!(table().is_numbered_form_label("3. Date of birth"));
        assert!(table().is_numbered_form_label("  12. Name of employer"));
        assert!(!table().is_numbered_form_label("1.2 Scope"));
        assert!(!table().is_numbered_form_label("1 Introduction"));
        assert!(!table().is_numbered_form_label("1(ab). Two letters"));
    }

    #[test]
    fn test_plain_text_does_not_match() {
        assert!(table().match_line("The results were inconclusive.").is_none());
        assert!(table().match_line("").is_none());
    }
}
