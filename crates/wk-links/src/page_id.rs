//! Structured wiki page identifier.

use std::fmt;
use std::str::FromStr;

/// Path sentinel for the root page of a book and language.
pub const HOMEPAGE: &str = "homepage";

/// Reference to a wiki page: book, language, path and optional anchor.
///
/// Once produced by the resolver, `book` and `lang` are non-empty, `path`
/// carries no leading or trailing slash and `fragment` is already slugged.
///
/// # Example
///
/// ```
/// use wk_links::PageId;
///
/// let id: PageId = "www:en:guide/intro#toc-setup".parse().unwrap();
/// assert_eq!(id.book, "www");
/// assert_eq!(id.path, "guide/intro");
/// assert_eq!(id.fragment.as_deref(), Some("toc-setup"));
/// assert_eq!(id.to_string(), "www:en:guide/intro#toc-setup");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageId {
    /// Content collection, e.g. `www`, `doc`, `doc-2.0`.
    pub book: String,
    /// Two-letter language code.
    pub lang: String,
    /// Slash-separated page path.
    pub path: String,
    /// Anchor within the page (e.g. `toc-installation`).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub fragment: Option<String>,
}

impl PageId {
    /// Create an identifier without fragment.
    #[must_use]
    pub fn new(book: impl Into<String>, lang: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            lang: lang.into(),
            path: path.into(),
            fragment: None,
        }
    }

    /// Set the fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Whether the path is the homepage sentinel.
    #[must_use]
    pub fn is_homepage(&self) -> bool {
        self.path == HOMEPAGE
    }

    /// Directory part of the path including the trailing slash.
    ///
    /// Returns `None` for top-level pages.
    #[must_use]
    pub fn dir(&self) -> Option<&str> {
        self.path.rfind('/').map(|pos| &self.path[..=pos])
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.book, self.lang, self.path)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Error returned when parsing a [`PageId`] from `book:lang:path` form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePageIdError {
    /// Book or language segment is missing.
    #[error("expected book:lang[:path], got {0:?}")]
    MissingSegment(String),
    /// Language is not a two-letter code.
    #[error("invalid language code {0:?}")]
    InvalidLang(String),
}

impl FromStr for PageId {
    type Err = ParsePageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, fragment) = match s.split_once('#') {
            Some((id, fragment)) => (id, Some(fragment)),
            None => (s, None),
        };

        let mut parts = id.splitn(3, ':');
        let book = parts.next().filter(|b| !b.is_empty());
        let lang = parts.next().filter(|l| !l.is_empty());
        let (Some(book), Some(lang)) = (book, lang) else {
            return Err(ParsePageIdError::MissingSegment(s.to_owned()));
        };
        if lang.len() != 2 || !lang.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(ParsePageIdError::InvalidLang(lang.to_owned()));
        }

        let path = parts.next().unwrap_or_default().trim_matches('/');
        let path = if path.is_empty() { HOMEPAGE } else { path };

        Ok(Self {
            book: book.to_owned(),
            lang: lang.to_owned(),
            path: path.to_owned(),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_owned),
        })
    }
}
