//! Per-render state shared by the resolver and the markup hooks.

use std::fmt;
use std::path::Path;

use crate::{PageId, Warning};

/// External URL and filesystem roots used to build non-page URLs.
///
/// No defaults are enforced: an empty root simply yields a degenerate URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Paths {
    /// Public URL root of attachments (`<media_path>/<book>/<file>`).
    pub media_path: String,
    /// Filesystem root of attachments, used for existence checks.
    pub file_media_path: String,
    /// URL root of the generated API documentation.
    pub api_url: String,
    /// URL root of downloadable files.
    pub download_dir: String,
    /// Site domain, e.g. `example.org`.
    pub domain: String,
    /// URL prefix of user profiles; the numeric id is appended.
    pub profile_url: String,
}

/// File existence predicate used for attachment validation.
pub trait FileCheck {
    /// Whether a regular file exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

impl<F> FileCheck for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// [`FileCheck`] backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsFileCheck;

impl FileCheck for FsFileCheck {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// State of a single page render.
///
/// Created fresh for every document and never shared between renders. The
/// resolver only reads the current page and paths and appends warnings;
/// discovered links are recorded by the markup hooks through
/// [`record_link`](Self::record_link).
pub struct RenderContext {
    /// Page being rendered.
    pub current: PageId,
    /// URL and filesystem roots.
    pub paths: Paths,
    /// Internal links discovered so far, in document order.
    pub links: Vec<PageId>,
    /// Warnings collected so far, in document order.
    pub warnings: Vec<Warning>,
    file_check: Box<dyn FileCheck + Send>,
}

impl RenderContext {
    /// Create a context checking attachments on the local filesystem.
    #[must_use]
    pub fn new(current: PageId, paths: Paths) -> Self {
        Self {
            current,
            paths,
            links: Vec::new(),
            warnings: Vec::new(),
            file_check: Box::new(FsFileCheck),
        }
    }

    /// Replace the attachment existence check.
    #[must_use]
    pub fn with_file_check<C: FileCheck + Send + 'static>(mut self, check: C) -> Self {
        self.file_check = Box::new(check);
        self
    }

    /// Whether a file exists according to the configured check.
    #[must_use]
    pub fn file_exists(&self, path: &Path) -> bool {
        self.file_check.exists(path)
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: Warning) {
        tracing::debug!(page = %self.current, %warning, "Render warning");
        self.warnings.push(warning);
    }

    /// Record an internal link for cross-reference indexing.
    pub fn record_link(&mut self, id: PageId) {
        self.links.push(id);
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("current", &self.current)
            .field("paths", &self.paths)
            .field("links", &self.links)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}
