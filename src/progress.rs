//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as each page is rendered and encoded.
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, encoded_bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {} of {} done ({} bytes)", page_num, total_pages, encoded_bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// Pages render concurrently, so `on_page_start`, `on_page_complete` and
/// `on_page_error` may be called from different threads at the same time
/// and in any order. Implementations must protect shared mutable state
/// (e.g. `Mutex`, `AtomicUsize`). All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once per document before any page is rendered.
    ///
    /// `total_pages` is the length of the resolved selection, duplicates
    /// included, not the document's page count.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the renderer.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been rendered and encoded.
    ///
    /// # Arguments
    /// * `page_num`     : 1-indexed page number
    /// * `total_pages`  : selected pages
    /// * `encoded_bytes`: size of the encoded PNG/JPEG
    fn on_page_complete(&self, page_num: usize, total_pages: usize, encoded_bytes: usize) {
        let _ = (page_num, total_pages, encoded_bytes);
    }

    /// Called when rendering or encoding a page fails.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
