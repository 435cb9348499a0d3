//! labrec turns a student's lab record into a printable `.docx`.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: [`LabRecord::validate`] rejects records the assembler must never see
//! 2. **Generate codes**: one QR [`ScannableCode`] per experiment, optionally in parallel,
//!    re-joined in row order
//! 3. **Build**: `LabRecord + logo + codes -> AssembledDocument` (backend-agnostic tree)
//! 4. **Render**: `AssembledDocument -> .docx bytes`
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the built tree is a pure function of the record and logo; only the
//!   [`BuildId`] differs between two builds of the same input.
//! - **No IO in the core**: the logo arrives as an injected [`LogoStore`] snapshot and codes are
//!   handed to the document in memory.
#![forbid(unsafe_code)]

mod assemble;
mod assets;
mod foundation;
mod pipeline;
mod record;
mod render;

/// `tracing` subscriber setup for binaries.
pub mod logging;
/// HTTP surface (axum).
pub mod server;

pub use assemble::builder::{
    CODE_WIDTH_IN, COLUMN_WIDTHS_IN, CONFIRMATION_TEXT, HEADER_LABELS, LOGO_WIDTH_IN,
    build_document, page_geometry, sequence_label,
};
pub use assemble::plan::{
    Align, AssembledDocument, Block, BorderLine, CellBorders, Inline, InlineImage, PageGeometry,
    Paragraph, RunStyle, Table, TableCell, TableRow, TextRun,
};
pub use assets::logo::{CANONICAL_LOGO_NAME, InstitutionLogo, LogoFormat, LogoStore};
pub use assets::qr::{DEFAULT_CODE_PIXELS, ScannableCode, generate_code};
pub use foundation::error::{LabrecError, LabrecResult};
pub use foundation::units::{Length, Pt, Rgb8};
pub use pipeline::{
    AssembleOptions, BuildId, DocumentArtifact, assemble, assemble_with_options, generate_codes,
};
pub use record::model::{Experiment, LabRecord, OUTPUT_SUFFIX};
pub use render::docx::{DOCX_MEDIA_TYPE, render_docx};
