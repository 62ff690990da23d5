//! Page selection: parse user-facing page tokens and resolve them against a
//! document's page count.
//!
//! Parsing and resolution are split in two. [`PageToken::from_str`] checks
//! syntax only, so a bad `--pages` value is rejected before any document is
//! opened. [`PageSelection::resolve`] runs once the page count is known and
//! checks bounds. Neither step clamps: anything that does not fit is an
//! error naming the offending token.
//!
//! Page numbers are 1-based everywhere in this module.

use crate::error::Pdf2ImgError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One page-selection token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageToken {
    /// Every page, in order.
    All,
    /// Page 1.
    FirstPage,
    /// The last page of the document.
    LastPage,
    /// A single 1-based page number.
    Page(usize),
    /// An inclusive range of 1-based page numbers, `start <= end`.
    Range(usize, usize),
}

static RE_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());
static RE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?[0-9]+)\.\.(-?[0-9]+)$").unwrap());

fn parse_page_number(token: &str, digits: &str) -> Result<usize, Pdf2ImgError> {
    if digits.starts_with('-') {
        return Err(Pdf2ImgError::invalid_token(
            token,
            "page numbers must be positive",
        ));
    }
    let n: usize = digits
        .parse()
        .map_err(|_| Pdf2ImgError::invalid_token(token, "page number is too large"))?;
    if n == 0 {
        return Err(Pdf2ImgError::invalid_token(
            token,
            "pages are 1-indexed, minimum is 1",
        ));
    }
    Ok(n)
}

impl FromStr for PageToken {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => return Ok(PageToken::All),
            "firstPage" => return Ok(PageToken::FirstPage),
            "lastPage" => return Ok(PageToken::LastPage),
            "" => return Err(Pdf2ImgError::invalid_token(s, "empty token")),
            _ => {}
        }

        if s.trim() != s {
            return Err(Pdf2ImgError::invalid_token(
                s,
                "leading or trailing whitespace is not allowed",
            ));
        }

        if RE_PAGE.is_match(s) {
            return parse_page_number(s, s).map(PageToken::Page);
        }

        if let Some(caps) = RE_RANGE.captures(s) {
            let start = parse_page_number(s, &caps[1])?;
            let end = parse_page_number(s, &caps[2])?;
            if start > end {
                return Err(Pdf2ImgError::ReversedRange { start, end });
            }
            return Ok(PageToken::Range(start, end));
        }

        Err(Pdf2ImgError::invalid_token(s, "unrecognised token"))
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::All => f.write_str("all"),
            PageToken::FirstPage => f.write_str("firstPage"),
            PageToken::LastPage => f.write_str("lastPage"),
            PageToken::Page(n) => write!(f, "{n}"),
            PageToken::Range(a, b) => write!(f, "{a}..{b}"),
        }
    }
}

impl PageToken {
    /// Whether this token always denotes exactly one page.
    pub fn is_single_page(&self) -> bool {
        matches!(
            self,
            PageToken::FirstPage | PageToken::LastPage | PageToken::Page(_)
        )
    }

    /// Append the pages this token denotes to `out`.
    fn resolve_into(&self, total_pages: usize, out: &mut Vec<usize>) -> Result<(), Pdf2ImgError> {
        let check = |page: usize| {
            if page > total_pages {
                Err(Pdf2ImgError::PageOutOfRange {
                    page,
                    total: total_pages,
                })
            } else {
                Ok(page)
            }
        };

        match *self {
            PageToken::All => out.extend(1..=total_pages),
            PageToken::FirstPage => out.push(1),
            PageToken::LastPage => out.push(total_pages),
            PageToken::Page(0) => {
                return Err(Pdf2ImgError::invalid_token(
                    "0",
                    "pages are 1-indexed, minimum is 1",
                ))
            }
            PageToken::Page(n) => out.push(check(n)?),
            PageToken::Range(start, end) => {
                // Tokens built by hand can skip `from_str`; re-check here.
                if start == 0 {
                    return Err(Pdf2ImgError::invalid_token(
                        &self.to_string(),
                        "pages are 1-indexed, minimum is 1",
                    ));
                }
                if start > end {
                    return Err(Pdf2ImgError::ReversedRange { start, end });
                }
                check(end)?;
                out.extend(start..=end);
            }
        }
        Ok(())
    }
}

/// Which pages of a document to convert.
///
/// `Single` holds one token and drives the single-image shape contract:
/// `Single(FirstPage | LastPage | Page(_))` converts to one image, not a
/// one-element sequence. `List` always converts to a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    Single(PageToken),
    /// Resolved token by token and concatenated. Duplicates are kept.
    List(Vec<PageToken>),
}

impl Default for PageSelection {
    fn default() -> Self {
        PageSelection::Single(PageToken::All)
    }
}

impl From<PageToken> for PageSelection {
    fn from(token: PageToken) -> Self {
        PageSelection::Single(token)
    }
}

impl FromStr for PageSelection {
    type Err = Pdf2ImgError;

    /// Parse `"2..4"` as a single token or `"1,3..4"` as a list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(',') {
            Self::from_tokens(s.split(','))
        } else {
            s.parse().map(PageSelection::Single)
        }
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::Single(t) => write!(f, "{t}"),
            PageSelection::List(tokens) => {
                let parts: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl PageSelection {
    /// Parse several raw tokens into a `List` selection.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, Pdf2ImgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().parse::<PageToken>())
            .collect::<Result<Vec<_>, _>>()?;
        if tokens.is_empty() {
            return Err(Pdf2ImgError::EmptySelection);
        }
        Ok(PageSelection::List(tokens))
    }

    /// Whether the conversion result should be a single image.
    pub fn is_single_page(&self) -> bool {
        matches!(self, PageSelection::Single(t) if t.is_single_page())
    }

    /// Resolve into an ordered list of 1-based page numbers.
    ///
    /// Fails on the first token that does not fit `total_pages`; no partial
    /// result is returned.
    pub fn resolve(&self, total_pages: usize) -> Result<Vec<usize>, Pdf2ImgError> {
        if total_pages == 0 {
            return Err(Pdf2ImgError::PageOutOfRange { page: 1, total: 0 });
        }

        let mut pages = Vec::new();
        match self {
            PageSelection::Single(token) => token.resolve_into(total_pages, &mut pages)?,
            PageSelection::List(tokens) => {
                if tokens.is_empty() {
                    return Err(Pdf2ImgError::EmptySelection);
                }
                for token in tokens {
                    token.resolve_into(total_pages, &mut pages)?;
                }
            }
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn resolve(s: &str, total: usize) -> Result<Vec<usize>, Pdf2ImgError> {
        s.parse::<PageSelection>()?.resolve(total)
    }

    #[test]
    fn all_yields_every_page_in_order() {
        for total in 1..=12 {
            let expected: Vec<usize> = (1..=total).collect();
            assert_eq!(resolve("all", total).unwrap(), expected);
        }
    }

    #[test]
    fn first_and_last_page() {
        for total in 1..=6 {
            assert_eq!(resolve("firstPage", total).unwrap(), vec![1]);
            assert_eq!(resolve("lastPage", total).unwrap(), vec![total]);
        }
    }

    #[test]
    fn single_number() {
        assert_eq!(resolve("3", 5).unwrap(), vec![3]);
        assert_eq!(resolve("5", 5).unwrap(), vec![5]);
    }

    #[test]
    fn range() {
        assert_eq!(resolve("2..4", 5).unwrap(), vec![2, 3, 4]);
        assert_eq!(resolve("3..3", 5).unwrap(), vec![3]);
    }

    #[test]
    fn non_ascii_digits_are_unrecognised() {
        for token in ["\u{0663}", "1..\u{0663}", "\u{FF11}"] {
            let err = token.parse::<PageToken>().unwrap_err();
            match err {
                Pdf2ImgError::InvalidPageToken { ref reason, .. } => {
                    assert_eq!(reason, "unrecognised token", "{token:?}")
                }
                other => panic!("{token:?} gave {other}"),
            }
        }
    }

    #[test]
    fn reversed_range_fails() {
        let err = resolve("4..2", 5).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::ReversedRange { start: 4, end: 2 }));
        assert!(err.is_invalid_range());
    }

    #[test]
    fn out_of_bounds_fails() {
        let err = resolve("7", 5).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::PageOutOfRange { page: 7, total: 5 }));
        assert!(matches!(
            resolve("4..9", 5).unwrap_err(),
            Pdf2ImgError::PageOutOfRange { page: 9, .. }
        ));
    }

    #[test]
    fn zero_and_negative_fail() {
        for bad in ["0", "-1", "0..2", "-2..3", "1..0"] {
            let err = resolve(bad, 5).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRange, "token {bad:?}");
        }
    }

    #[test]
    fn malformed_tokens_fail() {
        for bad in ["", " 3", "3 ", "abc", "1...3", "1..", "..3", "1-3", "3.5", "+3", "first", "ALL"] {
            let err = bad.parse::<PageToken>().unwrap_err();
            assert!(err.is_invalid_range(), "token {bad:?} gave {err}");
        }
    }

    #[test]
    fn overflowing_number_fails() {
        let err = "99999999999999999999999".parse::<PageToken>().unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn list_concatenates_in_given_order() {
        let sel = PageSelection::from_tokens(["3", "1", "2"]).unwrap();
        assert_eq!(sel.resolve(3).unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn list_keeps_duplicates() {
        assert_eq!(resolve("1..3,2,lastPage", 4).unwrap(), vec![1, 2, 3, 2, 4]);
    }

    #[test]
    fn one_bad_token_fails_whole_list() {
        let sel = PageSelection::from_tokens(["1", "9"]).unwrap();
        assert!(sel.resolve(5).is_err());
        assert!(PageSelection::from_tokens(["1", "x"]).is_err());
    }

    #[test]
    fn empty_list_fails() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            PageSelection::from_tokens(empty).unwrap_err(),
            Pdf2ImgError::EmptySelection
        ));
        assert!(PageSelection::List(vec![]).resolve(3).is_err());
    }

    #[test]
    fn zero_page_document_fails() {
        assert!(PageSelection::default().resolve(0).is_err());
    }

    #[test]
    fn hand_built_tokens_are_rechecked() {
        assert!(PageSelection::Single(PageToken::Page(0)).resolve(3).is_err());
        assert!(PageSelection::Single(PageToken::Range(3, 1)).resolve(3).is_err());
        assert!(PageSelection::Single(PageToken::Range(0, 2)).resolve(3).is_err());
    }

    #[test]
    fn single_page_shape() {
        assert!("firstPage".parse::<PageSelection>().unwrap().is_single_page());
        assert!("lastPage".parse::<PageSelection>().unwrap().is_single_page());
        assert!("4".parse::<PageSelection>().unwrap().is_single_page());
        assert!(!"all".parse::<PageSelection>().unwrap().is_single_page());
        assert!(!"2..2".parse::<PageSelection>().unwrap().is_single_page());
        assert!(!PageSelection::from_tokens(["4"]).unwrap().is_single_page());
    }

    #[test]
    fn display_round_trips_tokens() {
        let sel: PageSelection = "1..3,lastPage".parse().unwrap();
        assert_eq!(sel.to_string(), "1..3,lastPage");
    }
}
