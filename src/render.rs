/// Turns a payload into a scannable QR image: error correction level M, the
/// smallest symbol version that fits, black modules on white, serialized as
/// PNG and then as base64 text.

use base64::Engine as _;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use std::io::Cursor;

use crate::error::PixError;
use crate::tables::{BIT_BLACK, BIT_WHITE, DEFAULT_MODULE_SIZE, PNG_MIME};


#[derive(Clone,Copy,Hash,Eq,PartialEq,Debug)]
pub struct QrRenderer {
    module_size: u32,       // pixels per module side
    quiet_zone: bool,       // four module white border around the symbol
}

impl Default for QrRenderer {
    fn default() -> Self {
        QrRenderer {
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: true,
        }
    }
}

impl QrRenderer {
    pub fn new() -> QrRenderer {
        QrRenderer::default()
    }

    /// Side length of one module in pixels, at least 1
    pub fn module_size(mut self, pixels: u32) -> QrRenderer {
        self.module_size = pixels.max(1);
        self
    }

    pub fn quiet_zone(mut self, enabled: bool) -> QrRenderer {
        self.quiet_zone = enabled;
        self
    }

    /// Rasterize `payload` into a grayscale bitmap
    pub fn render_image(&self, payload: &str) -> Result<GrayImage, PixError> {
        if payload.is_empty() {
            return Err(PixError::invalid("cannot render an empty payload"));
        }
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)?;
        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_size, self.module_size)
            .quiet_zone(self.quiet_zone)
            .dark_color(BIT_BLACK)
            .light_color(BIT_WHITE)
            .build();

        debug!(version = ?code.version(),
               modules = code.width(),
               pixels = image.width(),
               "rendered pix qr code");
        Ok(image)
    }

    /// PNG bytes of the rendered symbol
    pub fn render_png(&self, payload: &str) -> Result<Vec<u8>, PixError> {
        let image = self.render_image(payload)?;
        let mut bytes: Vec<u8> = Vec::new();
        DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Base64 text of the PNG, ready to embed in a page
    pub fn render(&self, payload: &str) -> Result<String, PixError> {
        let bytes = self.render_png(payload)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Same as [`QrRenderer::render`], wrapped as a `data:` URL
    pub fn render_data_url(&self, payload: &str) -> Result<String, PixError> {
        Ok(format!("data:{};base64,{}", PNG_MIME, self.render(payload)?))
    }
}

/// Render with the default settings
pub fn render(payload: &str) -> Result<String, PixError> {
    QrRenderer::default().render(payload)
}
