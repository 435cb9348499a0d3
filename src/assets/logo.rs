use std::{
    io::Cursor,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use anyhow::Context as _;
use image::ImageFormat;

use crate::foundation::error::{LabrecError, LabrecResult};

/// File name reported for a stored logo; every upload is normalized to PNG.
pub const CANONICAL_LOGO_NAME: &str = "college_logo.png";

/// Institution logo, normalized to PNG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstitutionLogo {
    pub width: u32,
    pub height: u32,
    pub png: Arc<Vec<u8>>,
}

/// Raster encodings accepted for a logo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoFormat {
    Png,
    Jpeg,
}

impl LogoFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Extension of the last `.`-separated component of `file_name`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl InstitutionLogo {
    /// Decode PNG or JPEG bytes, sniffing the format.
    pub fn from_bytes(bytes: &[u8]) -> LabrecResult<Self> {
        let format = match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => LogoFormat::Png,
            Ok(ImageFormat::Jpeg) => LogoFormat::Jpeg,
            Ok(other) => {
                return Err(LabrecError::asset(format!(
                    "unsupported logo encoding {other:?} (expected PNG or JPEG)"
                )));
            }
            Err(e) => return Err(LabrecError::asset(format!("unrecognized logo image: {e}"))),
        };
        Self::decode(bytes, format)
    }

    /// Decode bytes that are declared to be `format`.
    pub fn decode(bytes: &[u8], format: LogoFormat) -> LabrecResult<Self> {
        let img = image::load_from_memory_with_format(bytes, format.image_format())
            .map_err(|e| LabrecError::asset(format!("decode logo: {e}")))?;
        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(LabrecError::asset("logo has zero width or height"));
        }

        let png = if format == LogoFormat::Png {
            bytes.to_vec()
        } else {
            let mut buf = Vec::new();
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .context("re-encode logo as png")?;
            buf
        };

        Ok(Self {
            width,
            height,
            png: Arc::new(png),
        })
    }

    /// Validate an uploaded file the way the HTTP surface receives it.
    ///
    /// `content_type` must be an `image/*` type and the file name must end in
    /// `.png`, `.jpg` or `.jpeg`.
    pub fn from_upload(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> LabrecResult<Self> {
        if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
            return Err(LabrecError::validation("File must be an image"));
        }
        let format = file_name
            .and_then(LogoFormat::from_file_name)
            .ok_or_else(|| LabrecError::validation("Only PNG, JPG, JPEG files allowed"))?;
        Self::decode(bytes, format)
    }

    pub fn from_path(path: &Path) -> LabrecResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read logo '{}'", path.display()))?;
        match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(LogoFormat::from_extension)
        {
            Some(format) => Self::decode(&bytes, format),
            None => Self::from_bytes(&bytes),
        }
    }
}

/// Shared, replaceable slot for the current institution logo.
///
/// Builds take a snapshot with [`LogoStore::get`]; a concurrent upload never changes a
/// document that is already being assembled.
#[derive(Clone, Debug, Default)]
pub struct LogoStore {
    inner: Arc<RwLock<Option<Arc<InstitutionLogo>>>>,
}

impl LogoStore {
    pub fn new(initial: Option<InstitutionLogo>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial.map(Arc::new))),
        }
    }

    pub fn get(&self) -> Option<Arc<InstitutionLogo>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, logo: InstitutionLogo) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(logo));
    }

    pub fn is_present(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/logo.rs"]
mod tests;
