use crate::draw::raster::RgbaBuffer;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat};

pub fn encode_png(buffer: &RgbaBuffer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&buffer.pixels, buffer.width, buffer.height, ColorType::Rgba8)
        .with_context(|| format!("encode {}x{} raster as png", buffer.width, buffer.height))?;
    Ok(out)
}

/// PNG bytes as standard padded base64, without a `data:image/png;base64,`
/// prefix.
pub fn encode_png_base64(buffer: &RgbaBuffer) -> Result<String> {
    let png = encode_png(buffer)?;
    Ok(general_purpose::STANDARD.encode(png))
}

/// Inverse of [`encode_png_base64`]. A leading data-URL prefix is tolerated.
pub fn decode_png_base64(payload: &str) -> Result<RgbaBuffer> {
    let payload = payload
        .split_once(',')
        .filter(|(head, _)| head.starts_with("data:"))
        .map(|(_, body)| body)
        .unwrap_or(payload);
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode base64 image payload")?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .context("decode png image")?
        .to_rgba8();
    let (width, height) = image.dimensions();
    RgbaBuffer::from_pixels(width, height, image.into_raw())
        .ok_or_else(|| anyhow!("decoded png has inconsistent pixel data"))
}
