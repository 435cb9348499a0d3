use std::fmt;

use rayon::prelude::*;

use crate::{
    assemble::builder::build_document,
    assets::{
        logo::InstitutionLogo,
        qr::{DEFAULT_CODE_PIXELS, ScannableCode, generate_code},
    },
    foundation::error::{LabrecError, LabrecResult},
    record::model::LabRecord,
    render::docx::render_docx,
};

/// Unique identifier of one document build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildId(uuid::Uuid);

impl BuildId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Clone, Debug)]
pub struct AssembleOptions {
    /// Generate the per-row codes on the rayon pool.
    pub parallel: bool,
    /// Dedicated worker count; `None` uses the global pool.
    pub threads: Option<usize>,
}

impl AssembleOptions {
    pub fn validate(&self) -> LabrecResult<()> {
        if self.threads == Some(0) {
            return Err(LabrecError::validation(
                "assemble threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

/// A rendered `.docx`, ready for a sink.
#[derive(Clone, Debug)]
pub struct DocumentArtifact {
    pub build_id: BuildId,
    /// Display name, `<register_number>_Lab_Record.docx`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Validate, generate codes, build and render with default options.
pub fn assemble(
    record: &LabRecord,
    logo: Option<&InstitutionLogo>,
) -> LabrecResult<DocumentArtifact> {
    assemble_with_options(record, logo, &AssembleOptions::default())
}

/// Run the whole pipeline for one record.
///
/// Pipeline:
/// 1. [`LabRecord::validate`]
/// 2. [`generate_codes`] (one code per experiment, in row order)
/// 3. [`build_document`](crate::build_document)
/// 4. [`render_docx`](crate::render_docx)
///
/// Any failure aborts the build; no partial artifact is produced.
pub fn assemble_with_options(
    record: &LabRecord,
    logo: Option<&InstitutionLogo>,
    opts: &AssembleOptions,
) -> LabrecResult<DocumentArtifact> {
    record.validate()?;
    assemble_validated(record, logo, opts)
}

/// Steps 2-4 of [`assemble_with_options`]; `record` must already have passed validation.
#[tracing::instrument(
    skip_all,
    fields(
        build_id = tracing::field::Empty,
        register = %record.register_number,
        experiments = record.experiments.len()
    )
)]
pub(crate) fn assemble_validated(
    record: &LabRecord,
    logo: Option<&InstitutionLogo>,
    opts: &AssembleOptions,
) -> LabrecResult<DocumentArtifact> {
    let build_id = BuildId::new();
    tracing::Span::current().record("build_id", tracing::field::display(build_id));

    let codes = generate_codes(record, opts)?;
    let doc = build_document(record, logo, &codes)?;
    let bytes = render_docx(&doc)?;

    tracing::info!(bytes = bytes.len(), "lab record assembled");
    Ok(DocumentArtifact {
        build_id,
        file_name: record.output_file_name(),
        bytes,
    })
}

/// Generate one code per experiment, returned in experiment order.
pub fn generate_codes(
    record: &LabRecord,
    opts: &AssembleOptions,
) -> LabrecResult<Vec<ScannableCode>> {
    opts.validate()?;
    let urls: Vec<&str> = record
        .experiments
        .iter()
        .map(|e| e.reference_url.as_str())
        .collect();

    if !opts.parallel || urls.len() < 2 {
        return urls
            .into_iter()
            .map(|u| generate_code(u, DEFAULT_CODE_PIXELS))
            .collect();
    }

    let run = || {
        urls.par_iter()
            .map(|u| generate_code(u, DEFAULT_CODE_PIXELS))
            .collect::<LabrecResult<Vec<_>>>()
    };

    match opts.threads {
        Some(n) => build_thread_pool(n)?.install(run),
        None => run(),
    }
}

fn build_thread_pool(threads: usize) -> LabrecResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| LabrecError::assembly(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
