//! Page rendering: one page of an opened document → one encoded image.
//!
//! ## Why spawn_blocking?
//!
//! Both painting (pdfium, a C++ library) and PNG/JPEG encoding are CPU-bound.
//! `tokio::task::spawn_blocking` moves them onto the blocking pool so Tokio
//! worker threads never stall while several pages are in flight.
//!
//! The raw RGBA surface lives only inside the blocking task: it is encoded
//! and dropped before the task returns, so peak memory scales with the
//! number of pages in flight, not with the document length.

use crate::config::ConversionConfig;
use crate::error::Pdf2ImgError;
use crate::output::{EncodedImage, RenderedPage};
use crate::pipeline::backend::DocumentHandle;
use crate::pipeline::encode::encode_surface;
use crate::pipeline::viewport::{compute_scale, Viewport};
use std::sync::Arc;
use tracing::debug;

/// Render and encode 1-indexed `page_num` of `doc`.
pub async fn render_page(
    doc: Arc<dyn DocumentHandle>,
    page_num: usize,
    config: &ConversionConfig,
) -> Result<RenderedPage, Pdf2ImgError> {
    let scale_opts = config.scale_options();
    let background = config.background;
    let intent = config.intent;
    let img_type = config.img_type;
    let jpeg_quality = config.jpeg_quality;

    tokio::task::spawn_blocking(move || {
        let natural = doc.page_size(page_num)?;
        let scale = compute_scale(natural, &scale_opts);
        let viewport: Viewport = doc.viewport(page_num, scale)?;

        let surface = doc.render(page_num, &viewport, background, intent)?;
        let (width, height) = (surface.width(), surface.height());

        let bytes = encode_surface(&surface, img_type, jpeg_quality).map_err(|e| {
            Pdf2ImgError::EncodeFailed {
                page: page_num,
                format: img_type.to_string(),
                detail: e.to_string(),
            }
        })?;
        drop(surface);

        debug!(
            "Page {} → {}x{} px at scale {:.3} ({} bytes)",
            page_num,
            width,
            height,
            scale,
            bytes.len()
        );

        Ok(RenderedPage {
            page_num,
            width,
            height,
            scale,
            image: EncodedImage::new(img_type, bytes),
        })
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Render task panicked: {}", e)))?
}
