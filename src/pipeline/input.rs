//! Input resolution: turn a user-supplied source into PDF bytes.
//!
//! pdfium opens documents straight from a byte slice, so every source ends up
//! in memory: raw bytes pass through, local files are read, URLs are
//! downloaded. The PDF magic bytes (`%PDF`) are checked before returning so
//! callers get a meaningful error rather than a renderer failure.

use crate::error::Pdf2ImgError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A document to convert.
#[derive(Clone)]
pub enum Source {
    /// PDF bytes already in memory.
    Bytes(Arc<[u8]>),
    /// A local file.
    Path(PathBuf),
    /// An HTTP/HTTPS URL.
    Url(String),
}

impl Source {
    /// Short human-readable name for logs and error messages.
    pub fn display_name(&self) -> String {
        match self {
            Source::Bytes(b) => format!("<{} bytes in memory>", b.len()),
            Source::Path(p) => p.display().to_string(),
            Source::Url(u) => u.clone(),
        }
    }

    /// File stem used for the `{f}` output-name placeholder.
    pub fn file_stem(&self) -> String {
        let stem = match self {
            Source::Bytes(_) => None,
            Source::Path(p) => p.file_stem().map(|s| s.to_string_lossy().into_owned()),
            Source::Url(u) => reqwest::Url::parse(u).ok().and_then(|parsed| {
                parsed
                    .path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
                    .filter(|last| !last.is_empty())
                    .map(|last| {
                        Path::new(&last)
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or(last)
                    })
            }),
        };
        stem.unwrap_or_else(|| "document".to_string())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if is_url(s) {
            Source::Url(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Source::from(s.as_str())
    }
}

impl From<PathBuf> for Source {
    fn from(p: PathBuf) -> Self {
        Source::Path(p)
    }
}

impl From<&Path> for Source {
    fn from(p: &Path) -> Self {
        Source::Path(p.to_path_buf())
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes.into())
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.into())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load the PDF bytes for `source`.
pub async fn load_source(source: &Source, timeout_secs: u64) -> Result<Arc<[u8]>, Pdf2ImgError> {
    let bytes = match source {
        Source::Bytes(b) => Arc::clone(b),
        Source::Path(p) => read_local(p).await?,
        Source::Url(u) => download_url(u, timeout_secs).await?,
    };
    check_magic(&bytes, &source.display_name())?;
    Ok(bytes)
}

fn check_magic(bytes: &[u8], name: &str) -> Result<(), Pdf2ImgError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(Pdf2ImgError::NotAPdf {
            source_name: name.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }
    Ok(())
}

/// Read a local file, mapping I/O failures to load errors.
async fn read_local(path: &Path) -> Result<Arc<[u8]>, Pdf2ImgError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes.into())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Pdf2ImgError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(Pdf2ImgError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Arc<[u8]>, Pdf2ImgError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Pdf2ImgError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            Pdf2ImgError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Pdf2ImgError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(&map_send_err)?;

    if !response.status().is_success() {
        return Err(Pdf2ImgError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(&map_send_err)?;
    info!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn source_from_str() {
        assert!(matches!(Source::from("https://x.org/a.pdf"), Source::Url(_)));
        assert!(matches!(Source::from("a.pdf"), Source::Path(_)));
    }

    #[test]
    fn file_stems() {
        assert_eq!(Source::from("/tmp/report.final.pdf").file_stem(), "report.final");
        assert_eq!(Source::from("https://x.org/papers/attn.pdf").file_stem(), "attn");
        assert_eq!(Source::from("https://x.org/").file_stem(), "document");
        assert_eq!(Source::from(vec![1u8, 2]).file_stem(), "document");
    }

    #[tokio::test]
    async fn bytes_must_be_pdf() {
        let err = load_source(&Source::from(b"GIF89a".to_vec()), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2ImgError::NotAPdf { ref magic, .. } if magic == b"GIF8"));

        let ok = load_source(&Source::from(b"%PDF-1.7\n".to_vec()), 5).await;
        tokio_test::assert_ok!(ok);
    }

    #[tokio::test]
    async fn missing_file() {
        let err = load_source(&Source::from("/definitely/not/here.pdf"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
    }
}
