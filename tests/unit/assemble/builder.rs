use std::{io::Cursor, sync::Arc};

use super::*;
use crate::assemble::plan::Inline;
use crate::assets::qr::{DEFAULT_CODE_PIXELS, generate_code};

fn jane_doe() -> LabRecord {
    LabRecord {
        course_title: "Intro to Systems".to_string(),
        student_name: "Jane Doe".to_string(),
        register_number: "RA001".to_string(),
        experiments: vec![Experiment {
            title: "Exp1".to_string(),
            date: "2024-01-01".to_string(),
            reference_url: "https://github.com/x/y".to_string(),
        }],
    }
}

fn record_with(n: usize) -> LabRecord {
    let mut rec = jane_doe();
    rec.experiments = (0..n)
        .map(|i| Experiment {
            title: format!("Experiment {i}"),
            date: String::new(),
            reference_url: format!("https://github.com/x/y/{i}"),
        })
        .collect();
    rec
}

fn codes_for(rec: &LabRecord) -> Vec<ScannableCode> {
    rec.experiments
        .iter()
        .map(|e| generate_code(&e.reference_url, DEFAULT_CODE_PIXELS).unwrap())
        .collect()
}

fn build(rec: &LabRecord, logo: Option<&InstitutionLogo>) -> AssembledDocument {
    build_document(rec, logo, &codes_for(rec)).unwrap()
}

fn logo(width: u32, height: u32) -> InstitutionLogo {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([0, 80, 160]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    InstitutionLogo {
        width,
        height,
        png: Arc::new(png),
    }
}

fn experiment_table(doc: &AssembledDocument) -> &Table {
    doc.tables().next().unwrap()
}

fn footer_table(doc: &AssembledDocument) -> &Table {
    doc.tables().nth(1).unwrap()
}

#[test]
fn table_has_one_row_per_experiment_plus_header() {
    for n in [0, 1, 3, 12] {
        let doc = build(&record_with(n), None);
        let table = experiment_table(&doc);
        assert_eq!(table.row_count(), n + 1);
        assert_eq!(table.column_count(), 6);
        for row in &table.rows {
            assert_eq!(row.cells.len(), 6);
        }
    }
}

#[test]
fn header_labels_are_bold_centered_and_boxed() {
    let doc = build(&jane_doe(), None);
    let table = experiment_table(&doc);
    for (col, label) in HEADER_LABELS.iter().enumerate() {
        let cell = table.cell(0, col).unwrap();
        assert_eq!(cell.plain_text(), *label);
        assert_eq!(cell.borders, CellBorders::all(BorderLine::SINGLE));

        let p = &cell.paragraphs[0];
        assert_eq!(p.align, Some(Align::Center));
        let Inline::Text(run) = &p.inlines[0] else {
            panic!("header cell should start with text");
        };
        assert!(run.style.bold);
        assert_eq!(run.style.size, Some(Pt(11)));
    }
}

#[test]
fn column_widths_are_fixed_on_every_row() {
    let mut rec = record_with(2);
    rec.experiments[1].title = "A very long experiment title ".repeat(20);
    let doc = build(&rec, None);
    let table = experiment_table(&doc);

    let expected: Vec<i64> = vec![720, 1152, 4320, 1152, 864, 1440];
    let grid: Vec<i64> = table.columns.iter().map(|l| l.twips()).collect();
    assert_eq!(grid, expected);
    for row in &table.rows {
        let widths: Vec<i64> = row.cells.iter().map(|c| c.width.twips()).collect();
        assert_eq!(widths, expected);
    }
}

#[test]
fn sequence_labels_are_zero_padded() {
    assert_eq!(sequence_label(0), "01");
    assert_eq!(sequence_label(11), "12");
    assert_eq!(sequence_label(99), "100");

    let doc = build(&record_with(12), None);
    let table = experiment_table(&doc);
    for i in 0..12 {
        let cell = table.cell(i + 1, 0).unwrap();
        assert_eq!(cell.plain_text(), format!("{:02}", i + 1));
        assert_eq!(cell.paragraphs[0].align, Some(Align::Center));
    }
}

#[test]
fn reference_row_matches_the_record() {
    let doc = build(&jane_doe(), None);
    let table = experiment_table(&doc);

    assert_eq!(table.cell(1, 0).unwrap().plain_text(), "01");
    assert_eq!(table.cell(1, 1).unwrap().plain_text(), "2024-01-01");

    let title = table.cell(1, 2).unwrap();
    assert_eq!(title.plain_text(), "Exp1\n\nhttps://github.com/x/y");
    let Some(Inline::Text(link)) = title.paragraphs[0].inlines.last() else {
        panic!("title cell should end with the link run");
    };
    assert_eq!(link.style.size, Some(Pt(9)));
    assert_eq!(link.style.color, Some(Rgb8::BLUE));
    assert!(link.style.underline);

    let code_cell = table.cell(1, 3).unwrap();
    let images: Vec<_> = code_cell.paragraphs[0].images().collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].pixel_width, DEFAULT_CODE_PIXELS);
    assert_eq!(images[0].width, Length::inches(CODE_WIDTH_IN));
    assert_eq!(images[0].height, Length::inches(CODE_WIDTH_IN));
    assert_eq!(code_cell.paragraphs[0].align, Some(Align::Center));

    assert_eq!(table.cell(1, 4).unwrap().plain_text(), "");
    assert_eq!(table.cell(1, 5).unwrap().plain_text(), "");
}

#[test]
fn footer_carries_name_and_register_number() {
    let doc = build(&jane_doe(), None);
    let footer = footer_table(&doc);
    assert_eq!(footer.row_count(), 2);
    assert_eq!(footer.column_count(), 2);
    assert!(!footer.grid_lines);

    assert_eq!(footer.cell(0, 0).unwrap().plain_text(), "Name: Jane Doe");
    let reg = footer.cell(0, 1).unwrap();
    assert_eq!(reg.plain_text(), "Register Number: RA001");
    assert_eq!(reg.paragraphs[0].align, Some(Align::Right));

    assert_eq!(footer.cell(1, 0).unwrap().plain_text(), "");
    assert_eq!(footer.cell(1, 1).unwrap().plain_text(), "");
    assert_eq!(footer.total_width(), doc.page.text_width());
}

#[test]
fn empty_experiments_give_header_only_table() {
    let doc = build(&record_with(0), None);
    assert_eq!(experiment_table(&doc).row_count(), 1);
}

#[test]
fn absent_logo_starts_with_the_course_title() {
    let doc = build(&jane_doe(), None);
    let Block::Paragraph(first) = &doc.blocks[0] else {
        panic!("first block should be a paragraph");
    };
    assert_eq!(first.images().count(), 0);
    assert_eq!(first.plain_text(), "Intro to Systems");
    assert_eq!(first.align, Some(Align::Center));
}

#[test]
fn present_logo_leads_at_fixed_width() {
    let logo = logo(400, 100);
    let doc = build(&jane_doe(), Some(&logo));

    let Block::Paragraph(first) = &doc.blocks[0] else {
        panic!("first block should be a paragraph");
    };
    let images: Vec<_> = first.images().collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].width, Length::inches(7.0));
    assert_eq!(images[0].height, Length::inches(1.75));
    assert_eq!(first.align, Some(Align::Center));

    let Block::Paragraph(spacer) = &doc.blocks[1] else {
        panic!("logo should be followed by a paragraph");
    };
    assert!(spacer.is_blank());

    let without = build(&jane_doe(), None);
    assert_eq!(doc.blocks.len(), without.blocks.len() + 2);
}

#[test]
fn block_order_is_fixed() {
    let doc = build(&jane_doe(), None);
    let kinds: Vec<&str> = doc
        .blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph(p) if p.is_blank() => "blank",
            Block::Paragraph(_) => "text",
            Block::Table(_) => "table",
        })
        .collect();
    assert_eq!(
        kinds,
        ["text", "blank", "table", "blank", "blank", "text", "blank", "table"]
    );

    let confirmation = doc
        .paragraphs()
        .find(|p| p.plain_text() == CONFIRMATION_TEXT)
        .unwrap();
    let Inline::Text(run) = &confirmation.inlines[0] else {
        panic!("confirmation should be text");
    };
    assert!(run.style.bold);
}

#[test]
fn title_is_bold_fourteen_point() {
    let doc = build(&jane_doe(), None);
    let title = doc.paragraphs().next().unwrap();
    let Inline::Text(run) = &title.inlines[0] else {
        panic!("title should be text");
    };
    assert!(run.style.bold);
    assert_eq!(run.style.size, Some(Pt(14)));
}

#[test]
fn page_geometry_is_constant() {
    let small = build(&record_with(0), None);
    let large = build(&record_with(5), Some(&logo(10, 10)));
    assert_eq!(small.page, large.page);
    assert_eq!(small.page.margin_top.twips(), 720);
    assert_eq!(small.page.margin_bottom.twips(), 1440);
    assert_eq!(small.page.margin_left.twips(), 1440);
    assert_eq!(small.page.margin_right.twips(), 1440);
}

#[test]
fn same_inputs_give_equal_documents() {
    let rec = record_with(4);
    let logo = logo(20, 10);
    assert_eq!(build(&rec, Some(&logo)), build(&rec, Some(&logo)));
    assert_eq!(build(&rec, None), build(&rec, None));
}

#[test]
fn mismatched_code_count_is_an_assembly_error() {
    let rec = record_with(2);
    let mut codes = codes_for(&rec);
    codes.pop();
    assert!(matches!(
        build_document(&rec, None, &codes),
        Err(LabrecError::Assembly(_))
    ));
}
