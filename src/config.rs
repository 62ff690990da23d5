//! Configuration types for PDF-to-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Every recognised option is a named
//! field with a documented default; `build()` validates the whole value once,
//! so the pipeline never has to re-check or re-parse an option.

use crate::color::Color;
use crate::error::Pdf2ImgError;
use crate::pages::PageSelection;
use crate::pipeline::backend::RenderBackend;
use crate::pipeline::viewport::ScaleOptions;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for a PDF-to-image conversion.
///
/// # Example
/// ```rust
/// use pdf2img::{ConversionConfig, ImageType};
///
/// let config = ConversionConfig::builder()
///     .scale(2.0)
///     .max_width(2000.0)
///     .img_type(ImageType::Jpg)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Base render scale: 1.0 renders one pixel per PDF point. Default: 3.0.
    pub scale: f32,

    /// Maximum rendered width in pixels. Default: unset.
    ///
    /// Setting either maximum enables shrink-only fitting; the unset one
    /// falls back to [`crate::pipeline::viewport::DEFAULT_MAX_DIMENSION`].
    pub max_width: Option<f32>,

    /// Maximum rendered height in pixels. Default: unset.
    pub max_height: Option<f32>,

    /// Cap both dimensions at 4096 px even without explicit maximums. Default: false.
    pub scale_for_browser_support: bool,

    /// Canvas colour painted before the page. Default: `rgb(255,255,255)`.
    pub background: Color,

    /// Rendering intent passed to the backend. Default: [`RenderIntent::Display`].
    pub intent: RenderIntent,

    /// Output encoding. Default: [`ImageType::Png`].
    pub img_type: ImageType,

    /// JPEG quality (1–100), ignored for PNG. Default: 92.
    pub jpeg_quality: u8,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// Options forwarded to the document loader.
    pub document: DocumentOptions,

    /// Maximum pages of one document rendered at the same time. Default: 8.
    pub concurrency: usize,

    /// Download timeout for URL sources in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Pre-constructed rendering backend. Default: pdfium.
    pub backend: Option<Arc<dyn RenderBackend>>,

    /// Optional progress callback for per-page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            scale: 3.0,
            max_width: None,
            max_height: None,
            scale_for_browser_support: false,
            background: Color::default(),
            intent: RenderIntent::default(),
            img_type: ImageType::default(),
            jpeg_quality: 92,
            pages: PageSelection::default(),
            document: DocumentOptions::default(),
            concurrency: 8,
            download_timeout_secs: 120,
            backend: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("scale", &self.scale)
            .field("max_width", &self.max_width)
            .field("max_height", &self.max_height)
            .field("scale_for_browser_support", &self.scale_for_browser_support)
            .field("background", &self.background)
            .field("intent", &self.intent)
            .field("img_type", &self.img_type)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("pages", &self.pages)
            .field("document", &self.document)
            .field("concurrency", &self.concurrency)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn RenderBackend>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The subset of options the viewport scaler needs.
    pub fn scale_options(&self) -> ScaleOptions {
        ScaleOptions {
            scale: self.scale,
            max_width: self.max_width,
            max_height: self.max_height,
            scale_for_browser_support: self.scale_for_browser_support,
        }
    }

    /// Plain, serialisable view of the options (no backend or callback).
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            scale: self.scale,
            max_width: self.max_width,
            max_height: self.max_height,
            scale_for_browser_support: self.scale_for_browser_support,
            background: self.background.to_string(),
            intent: self.intent,
            img_type: self.img_type,
            jpeg_quality: self.jpeg_quality,
            pages: self.pages.to_string(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Pdf2ImgError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        for (name, value) in [("max width", self.max_width), ("max height", self.max_height)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Pdf2ImgError::InvalidConfig(format!(
                        "{name} must be a positive number, got {v}"
                    )));
                }
            }
        }
        if self.concurrency == 0 {
            return Err(Pdf2ImgError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn max_width(mut self, px: f32) -> Self {
        self.config.max_width = Some(px);
        self
    }

    pub fn max_height(mut self, px: f32) -> Self {
        self.config.max_height = Some(px);
        self
    }

    pub fn scale_for_browser_support(mut self, v: bool) -> Self {
        self.config.scale_for_browser_support = v;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.config.background = color;
        self
    }

    pub fn intent(mut self, intent: RenderIntent) -> Self {
        self.config.intent = intent;
        self
    }

    pub fn img_type(mut self, img_type: ImageType) -> Self {
        self.config.img_type = img_type;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn pages(mut self, selection: impl Into<PageSelection>) -> Self {
        self.config.pages = selection.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.document.password = Some(pwd.into());
        self
    }

    pub fn document_options(mut self, options: DocumentOptions) -> Self {
        self.config.document = options;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn RenderBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImgError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// Lossless; keeps the alpha channel. (default)
    #[default]
    Png,
    /// Lossy; transparency is flattened onto the background.
    Jpg,
}

impl ImageType {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageType {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageType::Png),
            "jpg" | "jpeg" => Ok(ImageType::Jpg),
            other => Err(Pdf2ImgError::InvalidConfig(format!(
                "image type must be 'png' or 'jpg', got '{other}'"
            ))),
        }
    }
}

/// Target medium hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderIntent {
    /// Screen display (default).
    #[default]
    Display,
    /// Printing: print-quality rendering, no interactive form widgets.
    Print,
    /// Let the backend choose.
    Any,
}

impl FromStr for RenderIntent {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "display" => Ok(RenderIntent::Display),
            "print" => Ok(RenderIntent::Print),
            "any" => Ok(RenderIntent::Any),
            other => Err(Pdf2ImgError::InvalidConfig(format!(
                "intent must be 'display', 'print' or 'any', got '{other}'"
            ))),
        }
    }
}

/// Options forwarded verbatim to the document loader.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DocumentOptions {
    /// User password for encrypted documents.
    pub password: Option<String>,

    /// Backend-specific settings. The pdfium backend ignores unknown keys.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl fmt::Debug for DocumentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// Serialisable snapshot of a [`ConversionConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub scale: f32,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub scale_for_browser_support: bool,
    pub background: String,
    pub intent: RenderIntent,
    pub img_type: ImageType,
    pub jpeg_quality: u8,
    pub pages: String,
}
