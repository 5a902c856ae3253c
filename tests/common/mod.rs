//! Builds small PDFs in memory with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Text shown by one `Tj`, positioned with its own text matrix.
pub struct Run {
    pub text: &'static str,
    pub x: f32,
    pub bold: bool,
}

/// A line of text placed on a page, one or more runs on a shared baseline.
pub struct Line {
    pub runs: Vec<Run>,
    pub size: i64,
    pub y: i64,
}

/// A line shown by a single operator at the left margin.
pub fn line(text: &'static str, size: i64, bold: bool, y: i64) -> Line {
    placed(&[(text, 72.0, bold)], size, y)
}

/// A line set run by run, the way word processors and TeX place each word.
pub fn placed(runs: &[(&'static str, f32, bool)], size: i64, y: i64) -> Line {
    Line {
        runs: runs
            .iter()
            .map(|&(text, x, bold)| Run { text, x, bold })
            .collect(),
        size,
        y,
    }
}

/// Build a PDF with one content stream per page and an optional Info title.
pub fn build_pdf(pages: &[Vec<Line>], title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for l in lines {
            operations.push(Operation::new("BT", vec![]));
            for run in &l.runs {
                let font = if run.bold { "F2" } else { "F1" };
                operations.push(Operation::new("Tf", vec![font.into(), l.size.into()]));
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        1.into(),
                        Object::Real(run.x),
                        l.y.into(),
                    ],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(run.text)]));
            }
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Two-page report with numbered sections and a References heading.
pub fn report_pages() -> Vec<Vec<Line>> {
    vec![
        vec![
            line("Quarterly Field Report", 24, true, 720),
            line("Prepared by the survey team for internal review.", 10, false, 680),
            line("1 Introduction", 14, true, 640),
            line("This section introduces the work in plain body text.", 10, false, 620),
            line("1.1 Background", 10, false, 600),
        ],
        vec![
            line("2 Methods", 14, true, 720),
            line("Body text describing the methods used here.", 10, false, 700),
            line("References", 10, false, 680),
        ],
    ]
}
