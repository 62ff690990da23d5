//! Conversion results.
//!
//! [`Conversion`] mirrors the shape callers ask for: a selection that names
//! exactly one page (`firstPage`, `lastPage`, `7`) yields
//! [`Conversion::Single`]; everything else yields [`Conversion::Pages`] in
//! resolved-selection order.

use crate::config::ImageType;
use crate::pipeline::viewport::PageSize;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// An encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub format: ImageType,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(format: ImageType, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// `data:image/png;base64,...` form, ready for an `<img src>`.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Scale actually used, after shrink-only fitting.
    pub scale: f32,
    pub image: EncodedImage,
}

/// The result of converting one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// The selection named exactly one page.
    Single(RenderedPage),
    /// One entry per resolved page, duplicates included, in selection order.
    Pages(Vec<RenderedPage>),
}

impl Conversion {
    pub fn len(&self) -> usize {
        match self {
            Conversion::Single(_) => 1,
            Conversion::Pages(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Conversion::Single(_))
    }

    /// All pages regardless of shape.
    pub fn pages(&self) -> &[RenderedPage] {
        match self {
            Conversion::Single(p) => std::slice::from_ref(p),
            Conversion::Pages(p) => p,
        }
    }

    pub fn into_pages(self) -> Vec<RenderedPage> {
        match self {
            Conversion::Single(p) => vec![p],
            Conversion::Pages(p) => p,
        }
    }

    pub fn into_images(self) -> Vec<EncodedImage> {
        self.into_pages().into_iter().map(|p| p.image).collect()
    }
}

/// Page geometry of a document, without rendering anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    /// Natural page sizes in PDF points, page 1 first.
    pub page_sizes: Vec<PageSize>,
}

/// Per-page entry of the CLI's `--json` report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrittenImage {
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub path: std::path::PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize) -> RenderedPage {
        RenderedPage {
            page_num: n,
            width: 10,
            height: 20,
            scale: 1.0,
            image: EncodedImage::new(ImageType::Png, vec![1, 2, 3]),
        }
    }

    #[test]
    fn data_url_prefix() {
        let img = EncodedImage::new(ImageType::Jpg, b"abc".to_vec());
        assert_eq!(img.to_data_url(), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn single_exposes_one_page() {
        let c = Conversion::Single(page(4));
        assert!(c.is_single());
        assert_eq!(c.len(), 1);
        assert_eq!(c.pages()[0].page_num, 4);
    }

    #[test]
    fn pages_keep_order() {
        let c = Conversion::Pages(vec![page(3), page(1), page(2)]);
        let nums: Vec<usize> = c.pages().iter().map(|p| p.page_num).collect();
        assert_eq!(nums, vec![3, 1, 2]);
        assert_eq!(c.into_images().len(), 3);
    }
}
