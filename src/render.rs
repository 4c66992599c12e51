//! Rendering collaborator seam and image export.
//!
//! The engine never draws. A [`ChartRenderer`] turns a [`ChartDescription`]
//! into RGBA pixels and maps screen positions back to point indices; this
//! module only encodes what it returns.

use crate::data::chart_engine::ChartDescription;
use crate::data::error::{DataError, DataResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Raw pixels produced by a renderer, row-major RGBA8
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Something that can draw a chart description
pub trait ChartRenderer {
    fn render(
        &self,
        description: &ChartDescription,
        width: u32,
        height: u32,
    ) -> Result<RenderedImage, String>;

    /// Index of the data point under a position, if any
    fn point_at(&self, description: &ChartDescription, x: f32, y: f32) -> Option<usize>;
}

/// Render a chart and encode it as PNG bytes
pub fn export_png(
    renderer: &dyn ChartRenderer,
    description: &ChartDescription,
    width: u32,
    height: u32,
) -> DataResult<Vec<u8>> {
    let image = renderer
        .render(description, width, height)
        .map_err(DataError::Render)?;
    encode_png(image)
}

/// Encode renderer output as PNG
pub fn encode_png(image: RenderedImage) -> DataResult<Vec<u8>> {
    let (width, height) = (image.width, image.height);
    let buffer = RgbaImage::from_raw(width, height, image.rgba).ok_or_else(|| {
        DataError::Render(format!(
            "pixel buffer does not match {}x{} RGBA",
            width, height
        ))
    })?;

    let mut bytes = Vec::new();
    buffer.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    tracing::debug!(width, height, bytes = bytes.len(), "Encoded chart image");
    Ok(bytes)
}

/// Wrap PNG bytes as a `data:` URL for download collaborators
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
