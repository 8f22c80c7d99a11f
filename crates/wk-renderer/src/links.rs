//! Link rewriting: resolves link targets and builds `<a>` elements.
//!
//! Three link forms reach the renderer:
//!
//! - `[text](target)` and defined references: the target is resolved.
//! - `[target]` or `[target][]` without a definition: a reference link whose
//!   label is derived from the resolved target.
//! - `[content][api]` / `[content][php]` without a definition: shorthand for
//!   `[content](api:content)`.

use std::fmt::Write;

use pulldown_cmark::{BrokenLink, CowStr, LinkType};
use wk_links::{PageId, RenderContext, Resolution, canonicalize, resolve, slugify_path};

use crate::state::escape_html;

/// Books usable as `[content][book]` shorthand.
const SHORTHAND_BOOKS: [&str; 2] = ["api", "php"];

/// Broken-link callback: turns every undefined reference into a link whose
/// destination is the reference label itself.
pub(crate) fn reference_target<'a>(link: BrokenLink<'a>) -> Option<(CowStr<'a>, CowStr<'a>)> {
    Some((link.reference, CowStr::Borrowed("")))
}

/// Link whose content is still being rendered.
#[derive(Debug)]
pub(crate) struct PendingLink {
    link_type: LinkType,
    dest: String,
    title: String,
    /// Plain text of the content.
    text: String,
    /// Rendered HTML of the content.
    html: String,
}

impl PendingLink {
    pub(crate) fn new(link_type: LinkType, dest: &str, title: &str) -> Self {
        Self {
            link_type,
            dest: dest.to_owned(),
            title: title.to_owned(),
            text: String::new(),
            html: String::new(),
        }
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Resolve the target and render the `<a>` element.
    ///
    /// Returns the HTML and the plain text of the link content.
    pub(crate) fn finish(self, ctx: &mut RenderContext, nofollow: bool) -> (String, String) {
        match self.link_type {
            LinkType::ShortcutUnknown | LinkType::CollapsedUnknown => {
                let resolution = resolve(&self.dest, ctx);
                let (label, lang) = match &resolution {
                    Resolution::Internal(id) => (
                        page_label(id).to_owned(),
                        (id.lang != ctx.current.lang).then(|| id.lang.clone()),
                    ),
                    Resolution::External(_) => (reference_label(&self.dest).to_owned(), None),
                };
                let href = href(&resolution, ctx);
                let anchor = Anchor {
                    href: &href,
                    title: &self.title,
                    lang: lang.as_deref(),
                    nofollow,
                };
                (anchor.render(&escape_html(&label)), label)
            }
            LinkType::Email => {
                let href = format!("mailto:{}", self.dest);
                let anchor = Anchor {
                    href: &href,
                    title: &self.title,
                    lang: None,
                    nofollow,
                };
                (anchor.render(&self.html), self.text)
            }
            link_type => {
                let target = match link_type {
                    LinkType::ReferenceUnknown => shorthand_target(&self.dest, &self.text),
                    _ => None,
                }
                .unwrap_or_else(|| self.dest.clone());

                let href = href(&resolve(&target, ctx), ctx);
                let anchor = Anchor {
                    href: &href,
                    title: &self.title,
                    lang: None,
                    nofollow,
                };
                (anchor.render(&self.html), self.text)
            }
        }
    }
}

/// `[content][api]` → `api:content`.
fn shorthand_target(reference: &str, content: &str) -> Option<String> {
    let book = reference.trim_end_matches(':');
    SHORTHAND_BOOKS
        .contains(&book)
        .then(|| format!("{book}:{content}"))
}

/// URL for a resolution. Internal links are recorded on the context.
fn href(resolution: &Resolution, ctx: &mut RenderContext) -> String {
    match resolution {
        Resolution::External(url) => url.clone(),
        Resolution::Internal(id) => {
            let url = canonicalize(id, &ctx.current, &ctx.paths.domain);
            ctx.record_link(PageId::new(
                id.book.clone(),
                id.lang.clone(),
                slugify_path(&id.path),
            ));
            url
        }
    }
}

/// Last path segment of an internal page.
fn page_label(id: &PageId) -> &str {
    id.path.rsplit('/').next().unwrap_or(&id.path)
}

/// Raw target without its book prefix (`api:Foo` → `Foo`) or leading `#`.
fn reference_label(raw: &str) -> &str {
    if let Some(section) = raw.strip_prefix('#') {
        return section;
    }

    let prefix_len = raw.bytes().take_while(u8::is_ascii_lowercase).count();
    let is_scheme = ["http", "ftp", "mailto"]
        .iter()
        .any(|scheme| raw.starts_with(scheme));

    match raw[prefix_len..].strip_prefix(':') {
        Some(rest) if prefix_len > 0 && !is_scheme => rest,
        _ => raw,
    }
}

struct Anchor<'a> {
    href: &'a str,
    title: &'a str,
    lang: Option<&'a str>,
    nofollow: bool,
}

impl Anchor<'_> {
    fn render(&self, content: &str) -> String {
        let mut html = format!(r#"<a href="{}""#, escape_html(self.href));
        if !self.title.is_empty() {
            write!(html, r#" title="{}""#, escape_html(self.title)).unwrap();
        }
        if let Some(lang) = self.lang {
            write!(html, r#" lang="{}""#, escape_html(lang)).unwrap();
        }
        if self.nofollow && self.href.contains("//") {
            html.push_str(r#" rel="nofollow""#);
        }
        write!(html, ">{content}</a>").unwrap();
        html
    }
}
