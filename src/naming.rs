//! Output file naming for [`crate::convert::convert_to_dir`] and the CLI's
//! `--name` flag.
//!
//! | Placeholder | Expands to |
//! |-------------|------------|
//! | `{i}`   | 1-based index of the image in the output sequence |
//! | `{p}`   | 1-based page number |
//! | `{ext}` | `png` or `jpg` |
//! | `{f}`   | source file stem (`document` for in-memory bytes) |

use crate::error::Pdf2ImgError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

/// Default template: `report.pdf` page 3 → `report-3.png`.
pub const DEFAULT_NAME_TEMPLATE: &str = "{f}-{p}.{ext}";

/// A validated file-name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    template: String,
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_NAME_TEMPLATE.to_string(),
        }
    }
}

impl NameTemplate {
    /// Whether two different images can never expand to the same name.
    pub fn is_distinct_per_image(&self) -> bool {
        self.template.contains("{i}") || self.template.contains("{p}")
    }

    /// Reject templates that would make `count` images overwrite each other.
    pub fn check_count(&self, count: usize) -> Result<(), Pdf2ImgError> {
        if count > 1 && !self.is_distinct_per_image() {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "name template '{}' writes {} images to one file; add {{i}} or {{p}}",
                self.template, count
            )));
        }
        Ok(())
    }

    /// Expand the template.
    pub fn render(&self, index: usize, page_num: usize, ext: &str, stem: &str) -> String {
        RE_PLACEHOLDER
            .replace_all(&self.template, |caps: &regex::Captures<'_>| {
                match &caps[1] {
                    "i" => index.to_string(),
                    "p" => page_num.to_string(),
                    "ext" => ext.to_string(),
                    "f" => stem.to_string(),
                    // Rejected by `from_str`.
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl FromStr for NameTemplate {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(Pdf2ImgError::InvalidConfig(
                "name template must not be empty".into(),
            ));
        }
        if s.contains('/') || s.contains('\\') {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "name template '{}' must not contain path separators",
                s
            )));
        }
        if let Some(bad) = RE_PLACEHOLDER
            .captures_iter(s)
            .map(|c| c[1].to_string())
            .find(|name| !matches!(name.as_str(), "i" | "p" | "ext" | "f"))
        {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "unknown placeholder '{{{}}}' in name template (expected {{i}}, {{p}}, {{ext}} or {{f}})",
                bad
            )));
        }
        Ok(Self {
            template: s.to_string(),
        })
    }
}
