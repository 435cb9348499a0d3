/// Convenience result type used across labrec.
pub type LabrecResult<T> = Result<T, LabrecError>;

/// Top-level error taxonomy used by the document pipeline.
///
/// Every variant is terminal for the current build: nothing is retried and no partial
/// document is ever returned.
#[derive(thiserror::Error, Debug)]
pub enum LabrecError {
    /// Missing or malformed record fields, rejected before assembly begins.
    #[error("validation error: {0}")]
    Validation(String),

    /// A logo or generated code image could not be decoded, encoded or embedded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Failure while constructing or serializing the document tree.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LabrecError {
    /// Build a [`LabrecError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LabrecError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`LabrecError::Assembly`] value.
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    /// Short, stable name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Asset(_) => "asset",
            Self::Assembly(_) => "assembly",
            Self::Other(_) => "internal",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
