//! Error types for the pdf2img library.
//!
//! A single fatal error type, [`Pdf2ImgError`], covers every way a
//! conversion can fail. Variants are fine-grained so messages can name the
//! offending input, and each one maps onto a coarse [`ErrorKind`]:
//!
//! * [`ErrorKind::InvalidRange`]: the page selection is malformed or does
//!   not fit the document. Detected before any page is rendered.
//! * [`ErrorKind::DocumentLoad`]: the source could not be read, downloaded
//!   or opened (missing file, not a PDF, wrong password, corrupt xref).
//! * [`ErrorKind::Render`]: the renderer or encoder failed for one page.
//!   Never retried.
//!
//! `Config`, `Output` and `Internal` cover the remaining surfaces.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`Pdf2ImgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRange,
    DocumentLoad,
    Render,
    Config,
    Output,
    Internal,
}

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Page-selection errors ─────────────────────────────────────────────
    /// A page token could not be parsed.
    #[error("Invalid page selection '{token}': {reason}\nExpected 'all', 'firstPage', 'lastPage', a page number like 3, or a range like 1..3.")]
    InvalidPageToken { token: String, reason: String },

    /// A range token whose start is after its end.
    #[error("Invalid page range '{start}..{end}': start must be <= end")]
    ReversedRange { start: usize, end: usize },

    /// Selected page number exceeds the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// A list selection with no tokens in it.
    #[error("Page selection is empty")]
    EmptySelection,

    // ── Document-load errors ──────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The source was read, but is not a PDF.
    #[error("Source is not a valid PDF: '{source_name}'\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{source_name}' is corrupt: {detail}")]
    CorruptPdf { source_name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{source_name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { source_name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{source_name}'")]
    WrongPassword { source_name: String },

    /// The document opened but contains no pages at all.
    #[error("PDF '{source_name}' has no pages")]
    EmptyDocument { source_name: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the executable, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Render errors ─────────────────────────────────────────────────────
    /// The renderer returned an error for a specific page.
    #[error("Rendering failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The rendered surface could not be encoded.
    #[error("Encoding page {page} as {format} failed: {detail}")]
    EncodeFailed {
        page: usize,
        format: String,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or option validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output image file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two inputs would write an image to the same output file.
    #[error(
        "Output file '{path}' is already claimed by '{claimed_by}'\n\
Give the inputs distinct file names or convert them into separate directories."
    )]
    OutputNameCollision { path: PathBuf, claimed_by: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ImgError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPageToken { .. }
            | Self::ReversedRange { .. }
            | Self::PageOutOfRange { .. }
            | Self::EmptySelection => ErrorKind::InvalidRange,

            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::DownloadFailed { .. }
            | Self::DownloadTimeout { .. }
            | Self::NotAPdf { .. }
            | Self::CorruptPdf { .. }
            | Self::PasswordRequired { .. }
            | Self::WrongPassword { .. }
            | Self::EmptyDocument { .. }
            | Self::PdfiumBindingFailed(_) => ErrorKind::DocumentLoad,

            Self::RenderFailed { .. } | Self::EncodeFailed { .. } => ErrorKind::Render,

            Self::InvalidConfig(_) => ErrorKind::Config,
            Self::OutputWriteFailed { .. } | Self::OutputNameCollision { .. } => {
                ErrorKind::Output
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_invalid_range(&self) -> bool {
        self.kind() == ErrorKind::InvalidRange
    }

    pub(crate) fn invalid_token(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPageToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
