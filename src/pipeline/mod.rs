//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step. Keeping stages separate makes
//! each independently testable and lets the rendering backend be swapped
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ backend ──▶ viewport ──▶ render ──▶ encode
//! (bytes)   (open doc)  (fit scale)  (paint)    (PNG/JPEG)
//! ```
//!
//! 1. [`input`]   : load bytes, a local file or a URL into memory
//! 2. [`backend`] : open the document through a [`backend::RenderBackend`]
//!    (pdfium by default)
//! 3. [`viewport`]: shrink-only scale fitting against max width/height
//! 4. [`render`]  : paint one page; runs in `spawn_blocking`
//! 5. [`encode`]  : serialise the surface as PNG or JPEG

pub mod backend;
pub mod encode;
pub mod input;
pub mod render;
pub mod viewport;
