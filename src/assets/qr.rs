use std::{io::Cursor, sync::Arc};

use anyhow::Context as _;
use image::{ImageFormat, Rgb, RgbImage, imageops::FilterType};
use qrcode::{Color, EcLevel, QrCode};

use crate::foundation::error::{LabrecError, LabrecResult};

/// Default side length used for codes embedded in the experiment table.
pub const DEFAULT_CODE_PIXELS: u32 = 150;

const MODULE_PIXELS: u32 = 10;
const QUIET_ZONE_MODULES: u32 = 2;

/// A QR code rendered to an RGB raster, ready to embed.
#[derive(Clone, Debug)]
pub struct ScannableCode {
    pub content: String,
    pub image: RgbImage,
    /// PNG encoding of `image`.
    pub png: Arc<Vec<u8>>,
}

impl ScannableCode {
    pub fn side(&self) -> u32 {
        self.image.width()
    }
}

/// Encode `content` as a QR code and return it as a `pixel_size` square image.
///
/// The matrix is drawn at a fixed module size first and resampled afterwards, so the
/// module count stays minimal while the final footprint is exact.
pub fn generate_code(content: &str, pixel_size: u32) -> LabrecResult<ScannableCode> {
    if content.is_empty() {
        return Err(LabrecError::validation("code content must be non-empty"));
    }
    if pixel_size == 0 {
        return Err(LabrecError::validation("code pixel size must be > 0"));
    }

    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::L)
        .map_err(|e| LabrecError::asset(format!("encode qr code: {e}")))?;

    let matrix = render_modules(&code);
    let image = image::imageops::resize(&matrix, pixel_size, pixel_size, FilterType::Lanczos3);

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("encode qr code as png")?;

    Ok(ScannableCode {
        content: content.to_string(),
        image,
        png: Arc::new(png),
    })
}

fn render_modules(code: &QrCode) -> RgbImage {
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE_MODULES) * MODULE_PIXELS;

    RgbImage::from_fn(side, side, |x, y| {
        let mx = (x / MODULE_PIXELS).checked_sub(QUIET_ZONE_MODULES);
        let my = (y / MODULE_PIXELS).checked_sub(QUIET_ZONE_MODULES);
        let dark = match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                colors[(my * modules + mx) as usize] == Color::Dark
            }
            _ => false,
        };
        if dark { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/qr.rs"]
mod tests;
