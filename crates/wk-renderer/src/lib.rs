//! Wiki page renderer.
//!
//! Converts wiki markup (`CommonMark` with wiki extensions) into an HTML page
//! body plus page metadata. Parsing is done by pulldown-cmark; this crate
//! hooks into it to:
//!
//! - extract `{{directives}}` that set page metadata,
//! - resolve link targets with [`wk_links`] and rewrite them to site URLs,
//! - create links from undefined references such as `[api:Nette\Forms\Form]`,
//! - give headings `toc-` anchors and build the table of contents,
//! - dispatch code blocks to registered [`Highlighter`]s.
//!
//! # Example
//!
//! ```
//! use wk_links::{PageId, Paths};
//! use wk_renderer::Convertor;
//!
//! let convertor = Convertor::new(Paths::default());
//! let page = convertor.parse(PageId::new("www", "en", "homepage"), "# Hello\n\n**Bold** text");
//!
//! assert_eq!(page.title.as_deref(), Some("Hello"));
//! assert_eq!(page.html, r#"<h1 id="toc-hello">Hello</h1><p><b>Bold</b> text</p>"#);
//! ```

mod code_block;
mod convertor;
mod directive;
mod links;
mod page;
mod renderer;
mod state;
mod toc;

pub use code_block::{Highlighter, Highlighters, highlighter_id, normalize_language};
pub use convertor::Convertor;
pub use page::{Page, TocEntry};
pub use state::escape_html;
pub use toc::{DEFAULT_TOC_THRESHOLD, TocMode};
