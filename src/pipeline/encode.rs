//! Image encoding: rendered RGBA surface → PNG or JPEG bytes.
//!
//! PNG keeps the alpha channel, so a translucent background survives.
//! JPEG has no alpha; the surface is flattened onto white first, matching
//! what a browser canvas does in `toDataURL("image/jpeg")`.

use crate::config::ImageType;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered surface.
pub fn encode_surface(
    surface: &RgbaImage,
    format: ImageType,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    match format {
        ImageType::Png => {
            DynamicImage::ImageRgba8(surface.clone())
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
        ImageType::Jpg => {
            let flat = flatten_onto_white(surface);
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality).encode_image(&flat)?;
        }
    }
    debug!(
        "Encoded {}x{} surface → {} bytes {}",
        surface.width(),
        surface.height(),
        buf.len(),
        format
    );
    Ok(buf)
}

fn flatten_onto_white(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let blend = |c: u8| {
            let (c, a) = (c as u32, a as u32);
            ((c * a + 255 * (255 - a) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
