//! Rendered page and its metadata.

use std::collections::BTreeMap;

use wk_links::{PageId, Warning};

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking, e.g. `toc-installation`.
    pub id: String,
}

/// Result of rendering a wiki page.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Page {
    /// Page that was rendered.
    pub id: PageId,
    /// Rendered HTML body.
    pub html: String,
    /// `{{title}}` value, or the text of the first heading.
    pub title: Option<String>,
    /// `{{maintitle}}` value.
    pub main_title: Option<String>,
    /// Translations declared with `{{lang}}`: language code to page path.
    pub langs: BTreeMap<String, String>,
    /// Tags declared with `{{tags}}`.
    pub tags: Vec<String>,
    /// Table of contents. Empty when disabled.
    pub toc: Vec<TocEntry>,
    /// Whether the sidebar is shown.
    pub sidebar: bool,
    /// `{{theme}}` value.
    pub theme: Option<String>,
    /// Internal links found on the page, in document order.
    pub links: Vec<PageId>,
    /// Problems found while rendering.
    pub warnings: Vec<Warning>,
}
