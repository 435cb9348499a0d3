use std::io::Cursor;

use docx_rs::{
    AlignmentType, BorderType, BreakType, Docx, PageMargin, Pic, Run, TableCellBorder,
    TableCellBorderPosition, TableLayoutType, WidthType,
};

use crate::{
    assemble::plan::{
        Align, AssembledDocument, Block, BorderLine, CellBorders, Inline, InlineImage, Paragraph,
        RunStyle, Table, TableCell,
    },
    foundation::error::{LabrecError, LabrecResult},
};

/// Media type of the produced file.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Serialize an [`AssembledDocument`] into `.docx` bytes.
#[tracing::instrument(skip_all, fields(blocks = doc.blocks.len()))]
pub fn render_docx(doc: &AssembledDocument) -> LabrecResult<Vec<u8>> {
    let page = &doc.page;
    let mut docx = Docx::new()
        .page_size(to_u32(page.width.twips())?, to_u32(page.height.twips())?)
        .page_margin(
            PageMargin::new()
                .top(to_i32(page.margin_top.twips())?)
                .bottom(to_i32(page.margin_bottom.twips())?)
                .left(to_i32(page.margin_left.twips())?)
                .right(to_i32(page.margin_right.twips())?),
        );

    for block in &doc.blocks {
        docx = match block {
            Block::Paragraph(p) => docx.add_paragraph(paragraph(p)?),
            Block::Table(t) => docx.add_table(table(t)?),
        };
    }

    let mut out = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut out)
        .map_err(|e| LabrecError::assembly(format!("serialize docx: {e}")))?;

    let bytes = out.into_inner();
    tracing::debug!(bytes = bytes.len(), "docx serialized");
    Ok(bytes)
}

fn paragraph(p: &Paragraph) -> LabrecResult<docx_rs::Paragraph> {
    let mut out = docx_rs::Paragraph::new();
    for inline in &p.inlines {
        let run = match inline {
            Inline::Text(t) => styled_run(Run::new().add_text(t.text.as_str()), &t.style),
            Inline::LineBreak => Run::new().add_break(BreakType::TextWrapping),
            Inline::Image(img) => Run::new().add_image(picture(img)?),
        };
        out = out.add_run(run);
    }
    if let Some(align) = p.align {
        out = out.align(alignment(align));
    }
    Ok(out)
}

fn styled_run(mut run: Run, style: &RunStyle) -> Run {
    if style.bold {
        run = run.bold();
    }
    if let Some(size) = style.size {
        run = run.size(size.half_points());
    }
    if let Some(color) = style.color {
        run = run.color(color.to_hex());
    }
    if style.underline {
        run = run.underline("single");
    }
    run
}

fn picture(img: &InlineImage) -> LabrecResult<Pic> {
    // `Pic::new` panics on undecodable input, so the bytes are checked here first.
    image::load_from_memory_with_format(&img.png, image::ImageFormat::Png)
        .map_err(|e| LabrecError::asset(format!("embedded image is not a valid png: {e}")))?;
    Ok(Pic::new(&img.png).size(to_u32(img.width.emu())?, to_u32(img.height.emu())?))
}

fn table(t: &Table) -> LabrecResult<docx_rs::Table> {
    let grid = t
        .columns
        .iter()
        .map(|c| to_usize(c.twips()))
        .collect::<LabrecResult<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(t.rows.len());
    for row in &t.rows {
        let cells = row
            .cells
            .iter()
            .map(table_cell)
            .collect::<LabrecResult<Vec<_>>>()?;
        rows.push(docx_rs::TableRow::new(cells));
    }

    let mut out = docx_rs::Table::new(rows)
        .set_grid(grid)
        .layout(TableLayoutType::Fixed)
        .width(to_usize(t.total_width().twips())?, WidthType::Dxa);
    if !t.grid_lines {
        out = out.clear_all_border();
    }
    Ok(out)
}

fn table_cell(c: &TableCell) -> LabrecResult<docx_rs::TableCell> {
    let mut out = docx_rs::TableCell::new().width(to_usize(c.width.twips())?, WidthType::Dxa);
    for p in &c.paragraphs {
        out = out.add_paragraph(paragraph(p)?);
    }
    if !c.borders.is_empty() {
        out = apply_borders(out, &c.borders);
    }
    Ok(out)
}

fn apply_borders(mut cell: docx_rs::TableCell, borders: &CellBorders) -> docx_rs::TableCell {
    let edges = [
        (TableCellBorderPosition::Top, borders.top),
        (TableCellBorderPosition::Bottom, borders.bottom),
        (TableCellBorderPosition::Left, borders.left),
        (TableCellBorderPosition::Right, borders.right),
    ];
    for (position, line) in edges {
        if let Some(line) = line {
            cell = cell.set_border(cell_border(position, line));
        }
    }
    cell
}

fn cell_border(position: TableCellBorderPosition, line: BorderLine) -> TableCellBorder {
    TableCellBorder::new(position)
        .border_type(BorderType::Single)
        .size(line.size as usize)
        .color(line.color.to_hex())
}

fn alignment(align: Align) -> AlignmentType {
    match align {
        Align::Left => AlignmentType::Left,
        Align::Center => AlignmentType::Center,
        Align::Right => AlignmentType::Right,
    }
}

fn to_u32(v: i64) -> LabrecResult<u32> {
    u32::try_from(v).map_err(|_| LabrecError::assembly(format!("dimension {v} out of range")))
}

fn to_i32(v: i64) -> LabrecResult<i32> {
    i32::try_from(v).map_err(|_| LabrecError::assembly(format!("dimension {v} out of range")))
}

fn to_usize(v: i64) -> LabrecResult<usize> {
    usize::try_from(v).map_err(|_| LabrecError::assembly(format!("dimension {v} out of range")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/docx.rs"]
mod tests;
