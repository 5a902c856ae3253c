//! Glyph widths for the standard 14 fonts.
//!
//! Simple fonts that name a standard face are allowed to omit `Widths`, so
//! text set in them is measured against the AFM advances below. Widths are in
//! thousandths of an em and cover the printable ASCII range `32..=126`.

/// First code covered by the width tables.
const FIRST_CODE: u8 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    222, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Advance table for one standard face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardMetrics {
    /// Proportional face with per-glyph advances
    Proportional {
        table: &'static [u16; 95],
        default: u16,
    },
    /// Every glyph has the same advance (Courier)
    Monospace(u16),
}

impl StandardMetrics {
    /// Resolve a `BaseFont` name, tolerating subset prefixes and common
    /// aliases such as `Arial,Bold` or `TimesNewRomanPS-BoldMT`.
    pub fn for_base_font(base_font: &str) -> Option<Self> {
        let name = base_font
            .split_once('+')
            .map(|(_, rest)| rest)
            .unwrap_or(base_font)
            .to_lowercase()
            .replace(['-', ',', ' '], "");
        let bold = name.contains("bold") || name.contains("black") || name.contains("heavy");

        let (table, default): (&'static [u16; 95], u16) = if name.starts_with("courier") {
            return Some(StandardMetrics::Monospace(600));
        } else if name.starts_with("helvetica") || name.starts_with("arial") {
            (if bold { &HELVETICA_BOLD } else { &HELVETICA }, 556)
        } else if name.starts_with("times") {
            (if bold { &TIMES_BOLD } else { &TIMES_ROMAN }, 500)
        } else {
            return None;
        };
        Some(StandardMetrics::Proportional { table, default })
    }

    /// Advance of one single-byte character code.
    pub fn width(&self, code: u8) -> f32 {
        match *self {
            StandardMetrics::Monospace(w) => w as f32,
            StandardMetrics::Proportional { table, default } => code
                .checked_sub(FIRST_CODE)
                .and_then(|i| table.get(i as usize))
                .copied()
                .unwrap_or(default) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_width(metrics: StandardMetrics, text: &str) -> f32 {
        text.bytes().map(|b| metrics.width(b)).sum()
    }

    #[test]
    fn test_helvetica_advances() {
        let helvetica = StandardMetrics::for_base_font("Helvetica").unwrap();
        assert_eq!(string_width(helvetica, "Study"), 2557.0);
        assert_eq!(string_width(helvetica, "2.3.1"), 2224.0);
        assert_eq!(helvetica.width(b' '), 278.0);
    }

    #[test]
    fn test_bold_faces_are_wider() {
        let regular = StandardMetrics::for_base_font("Helvetica").unwrap();
        let bold = StandardMetrics::for_base_font("ABCDEF+Helvetica-Bold").unwrap();
        assert!(string_width(bold, "Background") > string_width(regular, "Background"));
    }

    #[test]
    fn test_aliases() {
        let times = StandardMetrics::for_base_font("TimesNewRomanPS-BoldMT").unwrap();
        assert_eq!(times.width(b'A'), 722.0);
        assert_eq!(times.width(b'%'), 1000.0);
        assert_eq!(
            StandardMetrics::for_base_font("Arial,Bold"),
            StandardMetrics::for_base_font("Helvetica-Bold")
        );
        assert_eq!(
            StandardMetrics::for_base_font("Courier-Oblique"),
            Some(StandardMetrics::Monospace(600))
        );
        assert!(StandardMetrics::for_base_font("CMR10").is_none());
    }

    #[test]
    fn test_codes_outside_table_use_default() {
        let helvetica = StandardMetrics::for_base_font("Helvetica").unwrap();
        assert_eq!(helvetica.width(0xE9), 556.0);
        assert_eq!(helvetica.width(0x09), 556.0);
    }
}
