use std::sync::Arc;

use crate::foundation::units::{Length, Pt, Rgb8};

/// Backend-agnostic description of a complete document.
///
/// The tree is a pure function of the build inputs: it can be compared structurally and
/// rendered by any writer without re-reading the record.
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledDocument {
    pub page: PageGeometry,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageGeometry {
    pub width: Length,
    pub height: Length,
    pub margin_top: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,
    pub margin_right: Length,
}

impl PageGeometry {
    pub fn text_width(&self) -> Length {
        Length::from_emu(self.width.emu() - self.margin_left.emu() - self.margin_right.emu())
    }
}

/// A top-level element of the document body.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub align: Option<Align>, // None inherits the style default
    pub inlines: Vec<Inline>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(TextRun),
    LineBreak,
    Image(InlineImage),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: RunStyle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub underline: bool,
    pub size: Option<Pt>,
    pub color: Option<Rgb8>,
}

impl RunStyle {
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn size(mut self, size: Pt) -> Self {
        self.size = Some(size);
        self
    }

    pub fn color(mut self, color: Rgb8) -> Self {
        self.color = Some(color);
        self
    }
}

/// A PNG placed inline, with its on-page display size.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineImage {
    pub png: Arc<Vec<u8>>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub width: Length,
    pub height: Length,
}

impl InlineImage {
    /// Display at `width`, deriving the height from the pixel aspect ratio.
    pub fn scaled_to_width(
        png: Arc<Vec<u8>>,
        pixel_width: u32,
        pixel_height: u32,
        width: Length,
    ) -> Self {
        Self {
            png,
            pixel_width,
            pixel_height,
            width,
            height: width.scale(pixel_height, pixel_width),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub columns: Vec<Length>,
    pub rows: Vec<TableRow>,
    /// Draw the table-wide grid (outer and inner borders).
    pub grid_lines: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    pub width: Length,
    pub paragraphs: Vec<Paragraph>,
    pub borders: CellBorders,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellBorders {
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderLine {
    /// Eighths of a point.
    pub size: u32,
    pub color: Rgb8,
}

impl BorderLine {
    /// Thin single black line.
    pub const SINGLE: Self = Self {
        size: 4,
        color: Rgb8::BLACK,
    };
}

impl CellBorders {
    pub fn all(line: BorderLine) -> Self {
        Self {
            top: Some(line),
            bottom: Some(line),
            left: Some(line),
            right: Some(line),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

impl Paragraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>, style: RunStyle) -> Self {
        Self::default().run(text, style)
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn run(mut self, text: impl Into<String>, style: RunStyle) -> Self {
        self.inlines.push(Inline::Text(TextRun {
            text: text.into(),
            style,
        }));
        self
    }

    pub fn line_break(mut self) -> Self {
        self.inlines.push(Inline::LineBreak);
        self
    }

    pub fn image(mut self, image: InlineImage) -> Self {
        self.inlines.push(Inline::Image(image));
        self
    }

    /// Text content with line breaks as `\n`; images contribute nothing.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(run) => out.push_str(&run.text),
                Inline::LineBreak => out.push('\n'),
                Inline::Image(_) => {}
            }
        }
        out
    }

    pub fn images(&self) -> impl Iterator<Item = &InlineImage> {
        self.inlines.iter().filter_map(|i| match i {
            Inline::Image(img) => Some(img),
            _ => None,
        })
    }

    pub fn is_blank(&self) -> bool {
        self.inlines.is_empty()
    }
}

impl TableCell {
    pub fn new(width: Length, paragraph: Paragraph) -> Self {
        Self {
            width,
            paragraphs: vec![paragraph],
            borders: CellBorders::default(),
        }
    }

    pub fn with_borders(mut self, borders: CellBorders) -> Self {
        self.borders = borders;
        self
    }

    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(col)
    }

    pub fn total_width(&self) -> Length {
        self.columns.iter().copied().sum()
    }
}

impl AssembledDocument {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }
}
