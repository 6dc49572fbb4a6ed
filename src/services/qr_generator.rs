use crate::models::errors::AppError;
use image::{codecs::png::PngEncoder, ColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{types::Color, QrCode};
use std::path::Path;

/// Pixels per QR module
const MODULE_SIZE: u32 = 10;
/// Quiet zone around the symbol, in modules
const QUIET_ZONE: u32 = 4;

/// Renders URLs as QR codes in PNG form
#[derive(Debug, Clone)]
pub struct QrGenerator {
    module_size: u32,
    quiet_zone: u32,
}

impl Default for QrGenerator {
    fn default() -> Self {
        Self {
            module_size: MODULE_SIZE,
            quiet_zone: QUIET_ZONE,
        }
    }
}

impl QrGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_module_size(mut self, module_size: u32) -> Self {
        self.module_size = module_size.max(1);
        self
    }

    /// Encode `data` as a black-on-white QR bitmap
    pub fn render(&self, data: &str) -> Result<GrayImage, AppError> {
        let code = QrCode::new(data.as_bytes())
            .map_err(|e| AppError::qr_code_failed(format!("Failed to encode QR data: {}", e)))?;

        let width = code.width() as u32;
        let colors = code.to_colors();
        let side = (width + 2 * self.quiet_zone) * self.module_size;

        let image = GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / self.module_size) as i64 - self.quiet_zone as i64;
            let my = (y / self.module_size) as i64 - self.quiet_zone as i64;
            let inside = (0..width as i64).contains(&mx) && (0..width as i64).contains(&my);

            if inside && colors[(my as u32 * width + mx as u32) as usize] == Color::Dark {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });

        Ok(image)
    }

    /// Encode `data` as a QR code and serialize it to PNG bytes
    pub fn generate_png(&self, data: &str) -> Result<Vec<u8>, AppError> {
        let image = self.render(data)?;
        let mut buffer = Vec::new();

        PngEncoder::new(&mut buffer)
            .write_image(image.as_raw(), image.width(), image.height(), ColorType::L8)
            .map_err(|e| AppError::qr_code_failed(format!("PNG encoding failed: {}", e)))?;

        Ok(buffer)
    }

    /// Render the QR code for `data` and write it as a PNG file
    pub async fn save_png(&self, data: &str, path: &Path) -> Result<(), AppError> {
        let png = self.generate_png(data)?;
        tokio::fs::write(path, png).await.map_err(|e| {
            AppError::storage_failed(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// The URL a QR request should encode.
///
/// The "files" check looks at the path of the QR request itself, which for
/// `/qr` never contains "files", so the base URL is what gets encoded.
pub fn qr_target_url(base_url: &str, request_path: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    if request_path.contains("files") {
        format!("{}/files", base)
    } else {
        base.to_string()
    }
}
