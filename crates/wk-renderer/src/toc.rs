//! Table of contents extraction.

use crate::TocEntry;

/// Default HTML length above which [`TocMode::Auto`] produces a TOC.
pub const DEFAULT_TOC_THRESHOLD: usize = 4000;

/// How the table of contents is decided.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TocMode {
    /// Shown only for long pages.
    #[default]
    Auto,
    /// Never shown (`{{toc: no}}`).
    Off,
    /// Always shown. `{{toc: title}}` also lists the page title heading.
    Forced(String),
}

impl TocMode {
    /// Mode selected by a `{{toc}}` directive argument, `None` to keep the
    /// current mode.
    #[must_use]
    pub fn from_directive(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            "no" => Some(Self::Off),
            _ => Some(Self::Forced(raw.to_owned())),
        }
    }

    fn includes_title(&self) -> bool {
        matches!(self, Self::Forced(raw) if raw == "title")
    }
}

/// Heading as rendered, before TOC filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Heading {
    pub(crate) level: u8,
    pub(crate) title: String,
    pub(crate) id: Option<String>,
}

/// Build the table of contents for a rendered page.
///
/// The first heading is treated as the page title and dropped, unless the
/// mode asks for it, in which case it stays and is demoted one level.
pub(crate) fn build_toc(
    mode: &TocMode,
    headings: Vec<Heading>,
    html_len: usize,
    threshold: usize,
) -> Vec<TocEntry> {
    let enabled = match mode {
        TocMode::Auto => html_len > threshold,
        TocMode::Off => false,
        TocMode::Forced(_) => true,
    };
    if !enabled {
        return Vec::new();
    }

    let mut toc: Vec<TocEntry> = headings
        .into_iter()
        .filter(|heading| !heading.title.is_empty())
        .filter_map(|heading| {
            Some(TocEntry {
                level: heading.level,
                title: heading.title,
                id: heading.id?,
            })
        })
        .collect();

    if mode.includes_title() && !toc.is_empty() {
        toc[0].level += 1;
    } else if !toc.is_empty() {
        toc.remove(0);
    }

    toc
}
