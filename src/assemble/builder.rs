use crate::{
    assemble::plan::{
        Align, AssembledDocument, Block, BorderLine, CellBorders, InlineImage, PageGeometry,
        Paragraph, RunStyle, Table, TableCell, TableRow,
    },
    assets::{logo::InstitutionLogo, qr::ScannableCode},
    foundation::{
        error::{LabrecError, LabrecResult},
        units::{Length, Pt, Rgb8},
    },
    record::model::{Experiment, LabRecord},
};

pub const HEADER_LABELS: [&str; 6] = [
    "Exp",
    "Date",
    "Name of The Experiment",
    "QR Code",
    "Mark",
    "Signature",
];

/// Column widths in inches, in [`HEADER_LABELS`] order.
pub const COLUMN_WIDTHS_IN: [f64; 6] = [0.5, 0.8, 3.0, 0.8, 0.6, 1.0];

pub const CONFIRMATION_TEXT: &str =
    "I confirm that the experiments and GitHub links provided are entirely my own work.";

pub const LOGO_WIDTH_IN: f64 = 7.0;
pub const CODE_WIDTH_IN: f64 = 0.75;

const TITLE_SIZE: Pt = Pt(14);
const HEADER_SIZE: Pt = Pt(11);
const LINK_SIZE: Pt = Pt(9);
const FOOTER_SIZE: Pt = Pt(11);

/// US Letter with the record's fixed margins.
pub fn page_geometry() -> PageGeometry {
    PageGeometry {
        width: Length::inches(8.5),
        height: Length::inches(11.0),
        margin_top: Length::inches(0.5),
        margin_bottom: Length::inches(1.0),
        margin_left: Length::inches(1.0),
        margin_right: Length::inches(1.0),
    }
}

/// Compose the full document tree.
///
/// `codes` must hold one code per experiment, in experiment order.
#[tracing::instrument(
    skip_all,
    fields(experiments = record.experiments.len(), logo = logo.is_some())
)]
pub fn build_document(
    record: &LabRecord,
    logo: Option<&InstitutionLogo>,
    codes: &[ScannableCode],
) -> LabrecResult<AssembledDocument> {
    if codes.len() != record.experiments.len() {
        return Err(LabrecError::assembly(format!(
            "expected {} code images, got {}",
            record.experiments.len(),
            codes.len()
        )));
    }

    let page = page_geometry();
    let mut blocks = Vec::new();

    if let Some(logo) = logo {
        let image = InlineImage::scaled_to_width(
            logo.png.clone(),
            logo.width,
            logo.height,
            Length::inches(LOGO_WIDTH_IN),
        );
        blocks.push(Block::Paragraph(
            Paragraph::empty().aligned(Align::Center).image(image),
        ));
        blocks.push(Block::Paragraph(Paragraph::empty()));
    }

    blocks.push(Block::Paragraph(
        Paragraph::text(
            record.course_title.as_str(),
            RunStyle::default().bold().size(TITLE_SIZE),
        )
        .aligned(Align::Center),
    ));
    blocks.push(Block::Paragraph(Paragraph::empty()));

    blocks.push(Block::Table(experiment_table(&record.experiments, codes)));

    blocks.push(Block::Paragraph(Paragraph::empty()));
    blocks.push(Block::Paragraph(Paragraph::empty()));
    blocks.push(Block::Paragraph(Paragraph::text(
        CONFIRMATION_TEXT,
        RunStyle::default().bold(),
    )));

    blocks.push(Block::Paragraph(Paragraph::empty()));
    blocks.push(Block::Table(footer_table(record, page.text_width())));

    tracing::debug!(blocks = blocks.len(), "document tree built");
    Ok(AssembledDocument { page, blocks })
}

fn column_widths() -> Vec<Length> {
    COLUMN_WIDTHS_IN.iter().copied().map(Length::inches).collect()
}

fn experiment_table(experiments: &[Experiment], codes: &[ScannableCode]) -> Table {
    let columns = column_widths();
    let mut rows = Vec::with_capacity(experiments.len() + 1);

    let header_style = RunStyle::default().bold().size(HEADER_SIZE);
    rows.push(TableRow {
        cells: HEADER_LABELS
            .iter()
            .zip(&columns)
            .map(|(label, width)| {
                let p = Paragraph::text(*label, header_style).aligned(Align::Center);
                TableCell::new(*width, p).with_borders(CellBorders::all(BorderLine::SINGLE))
            })
            .collect(),
    });

    for (idx, (exp, code)) in experiments.iter().zip(codes).enumerate() {
        rows.push(experiment_row(idx, exp, code, &columns));
    }

    Table {
        columns,
        rows,
        grid_lines: true,
    }
}

fn experiment_row(
    idx: usize,
    exp: &Experiment,
    code: &ScannableCode,
    columns: &[Length],
) -> TableRow {
    let link_style = RunStyle::default()
        .size(LINK_SIZE)
        .color(Rgb8::BLUE)
        .underline();

    let title = Paragraph::text(exp.title.as_str(), RunStyle::default())
        .line_break()
        .line_break()
        .run(exp.reference_url.as_str(), link_style);

    let side = code.side();
    let image =
        InlineImage::scaled_to_width(code.png.clone(), side, side, Length::inches(CODE_WIDTH_IN));

    let contents = [
        Paragraph::text(sequence_label(idx), RunStyle::default()).aligned(Align::Center),
        Paragraph::text(exp.date.as_str(), RunStyle::default()),
        title,
        Paragraph::empty().aligned(Align::Center).image(image),
        Paragraph::empty(),
        Paragraph::empty(),
    ];

    TableRow {
        cells: contents
            .into_iter()
            .zip(columns)
            .map(|(p, width)| TableCell::new(*width, p))
            .collect(),
    }
}

/// 1-based row ordinal, zero-padded to two digits.
pub fn sequence_label(idx: usize) -> String {
    format!("{:02}", idx + 1)
}

fn footer_table(record: &LabRecord, text_width: Length) -> Table {
    let half = text_width.scale(1, 2);
    let style = RunStyle::default().size(FOOTER_SIZE);

    let name = Paragraph::text(format!("Name: {}", record.student_name), style);
    let register =
        Paragraph::text(format!("Register Number: {}", record.register_number), style)
            .aligned(Align::Right);

    Table {
        columns: vec![half, half],
        rows: vec![
            TableRow {
                cells: vec![TableCell::new(half, name), TableCell::new(half, register)],
            },
            TableRow {
                cells: vec![
                    TableCell::new(half, Paragraph::empty()),
                    TableCell::new(half, Paragraph::empty()),
                ],
            },
        ],
        grid_lines: false,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/builder.rs"]
mod tests;
