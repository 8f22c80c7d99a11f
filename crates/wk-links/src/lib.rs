//! Wiki link resolution and URL canonicalization.
//!
//! Raw link tokens found in wiki markup (`[book:lang:path#section]`) are
//! classified and resolved into either an opaque external URL or a structured
//! [`PageId`]. Internal identifiers are turned into site URLs by
//! [`canonicalize`].
//!
//! # Architecture
//!
//! - [`resolve`]: classifies a raw link and applies book-specific dispatch
//!   (downloads, attachments, API docs, user profiles, PHP manual)
//! - [`canonicalize`]: maps a [`PageId`] to a same-site or cross-site URL
//! - [`RenderContext`]: per-render state collecting discovered links and
//!   [`Warning`]s
//!
//! Resolution never fails. Malformed input degrades to an external link and
//! questionable input is reported through the context's warning list.
//!
//! # Example
//!
//! ```
//! use wk_links::{PageId, Paths, RenderContext, Resolution, canonicalize, resolve};
//!
//! let current = PageId::new("doc", "en", "guide/intro");
//! let mut ctx = RenderContext::new(current.clone(), Paths::default());
//!
//! let Resolution::Internal(id) = resolve("setup#Install it", &mut ctx) else {
//!     panic!("expected internal link");
//! };
//! assert_eq!(id.path, "guide/setup");
//! assert_eq!(canonicalize(&id, &current, "example.org"), "/en/guide/setup#toc-install-it");
//! ```

mod canonical;
mod context;
mod matcher;
mod page_id;
mod resolver;
mod slug;
mod warning;

pub use canonical::canonicalize;
pub use context::{FileCheck, FsFileCheck, Paths, RenderContext};
pub use page_id::{HOMEPAGE, PageId, ParsePageIdError};
pub use resolver::{BookKind, Resolution, resolve};
pub use slug::{slugify, slugify_path};
pub use warning::Warning;
