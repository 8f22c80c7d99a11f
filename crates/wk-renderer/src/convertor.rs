//! Page conversion entry point.

use std::path::Path;
use std::sync::Arc;

use pulldown_cmark::Parser;
use wk_links::{FileCheck, FsFileCheck, PageId, Paths, RenderContext};

use crate::code_block::{Highlighter, Highlighters};
use crate::directive::{PageMeta, extract};
use crate::links::reference_target;
use crate::renderer::{WikiRenderer, parser_options};
use crate::toc::{DEFAULT_TOC_THRESHOLD, build_toc};
use crate::Page;

/// Converts wiki pages to HTML.
///
/// Holds only configuration, so one convertor can render any number of pages;
/// every call to [`parse`](Self::parse) starts from a fresh [`RenderContext`].
///
/// # Example
///
/// ```
/// use wk_links::{PageId, Paths};
/// use wk_renderer::Convertor;
///
/// let paths = Paths {
///     domain: "example.org".to_owned(),
///     ..Paths::default()
/// };
/// let convertor = Convertor::new(paths);
///
/// let page = convertor.parse(
///     PageId::new("doc", "en", "forms/intro"),
///     "{{tags: forms}}\n# Forms\n\nSee [validation](validation).",
/// );
///
/// assert_eq!(page.title.as_deref(), Some("Forms"));
/// assert_eq!(page.tags, vec!["forms"]);
/// assert!(page.html.contains(r#"<a href="/en/forms/validation">validation</a>"#));
/// ```
pub struct Convertor {
    paths: Paths,
    file_check: Arc<dyn FileCheck + Send + Sync>,
    highlighters: Highlighters,
    toc_threshold: usize,
}

impl Convertor {
    /// Create a convertor checking attachments on the local filesystem.
    #[must_use]
    pub fn new(paths: Paths) -> Self {
        Self {
            paths,
            file_check: Arc::new(FsFileCheck),
            highlighters: Highlighters::new(),
            toc_threshold: DEFAULT_TOC_THRESHOLD,
        }
    }

    /// Replace the attachment existence check.
    #[must_use]
    pub fn with_file_check<C>(mut self, check: C) -> Self
    where
        C: FileCheck + Send + Sync + 'static,
    {
        self.file_check = Arc::new(check);
        self
    }

    /// Register a syntax highlighter under an identifier such as `Php`.
    #[must_use]
    pub fn with_highlighter<H>(mut self, id: impl Into<String>, highlighter: H) -> Self
    where
        H: Highlighter + Send + Sync + 'static,
    {
        self.highlighters.register(id, highlighter);
        self
    }

    /// HTML length above which pages get a table of contents automatically.
    #[must_use]
    pub fn with_toc_threshold(mut self, threshold: usize) -> Self {
        self.toc_threshold = threshold;
        self
    }

    /// URL and filesystem roots used for link resolution.
    #[must_use]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Render a page.
    ///
    /// Never fails; problems are reported in [`Page::warnings`].
    pub fn parse(&self, id: PageId, text: &str) -> Page {
        let mut ctx = self.context(id.clone());

        let (body, directives) = extract(text);
        let mut meta = PageMeta::default();
        for directive in &directives {
            meta.apply(directive, &mut ctx);
        }

        let parser =
            Parser::new_with_broken_link_callback(&body, parser_options(), Some(reference_target));
        let rendered = WikiRenderer::new(&mut ctx, &self.highlighters)
            .with_nofollow(meta.nofollow)
            .with_heading_top(meta.heading_top)
            .render(parser);

        let title = meta
            .title
            .or_else(|| rendered.headings.first().map(|heading| heading.title.clone()));
        let toc = build_toc(
            &meta.toc,
            rendered.headings,
            rendered.html.len(),
            self.toc_threshold,
        );

        tracing::info!(
            page = %id,
            links = ctx.links.len(),
            warnings = ctx.warnings.len(),
            toc = toc.len(),
            "Rendered page"
        );

        Page {
            id,
            html: rendered.html,
            title,
            main_title: meta.main_title,
            langs: meta.langs,
            tags: meta.tags,
            toc,
            sidebar: meta.sidebar,
            theme: meta.theme,
            links: ctx.links,
            warnings: ctx.warnings,
        }
    }

    fn context(&self, id: PageId) -> RenderContext {
        let check = Arc::clone(&self.file_check);
        RenderContext::new(id, self.paths.clone())
            .with_file_check(move |path: &Path| check.exists(path))
    }
}

impl std::fmt::Debug for Convertor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Convertor")
            .field("paths", &self.paths)
            .field("highlighters", &self.highlighters)
            .field("toc_threshold", &self.toc_threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use pretty_assertions::assert_eq;
    use wk_links::Warning;

    use super::*;
    use crate::{TocEntry, TocMode};

    fn paths() -> Paths {
        Paths {
            media_path: "/media".to_owned(),
            file_media_path: "/srv/media".to_owned(),
            api_url: "https://api.example.org".to_owned(),
            download_dir: "/download".to_owned(),
            domain: "example.org".to_owned(),
            profile_url: "/users/".to_owned(),
        }
    }

    fn convertor() -> Convertor {
        Convertor::new(paths()).with_file_check(|path: &Path| path.ends_with("logo.png"))
    }

    fn parse(text: &str) -> Page {
        convertor().parse(PageId::new("doc", "en", "forms/intro"), text)
    }

    const THREE_HEADINGS: &str = "# Forms\n\n## Validation\n\n## Rendering\n";

    #[test]
    fn test_toc_title_mode_keeps_title_heading() {
        let page = parse(&format!("{{{{toc: title}}}}\n{THREE_HEADINGS}"));

        assert_eq!(
            page.toc,
            vec![
                TocEntry {
                    level: 2,
                    title: "Forms".to_owned(),
                    id: "toc-forms".to_owned(),
                },
                TocEntry {
                    level: 2,
                    title: "Validation".to_owned(),
                    id: "toc-validation".to_owned(),
                },
                TocEntry {
                    level: 2,
                    title: "Rendering".to_owned(),
                    id: "toc-rendering".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_toc_forced_drops_title_heading() {
        let page = parse(&format!("{{{{toc: yes}}}}\n{THREE_HEADINGS}"));

        let ids: Vec<_> = page.toc.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["toc-validation", "toc-rendering"]);
    }

    #[test]
    fn test_toc_auto_short_page() {
        assert!(parse(THREE_HEADINGS).toc.is_empty());
    }

    #[test]
    fn test_toc_auto_long_page() {
        let mut text = THREE_HEADINGS.to_owned();
        for i in 0..100 {
            writeln!(text, "Paragraph number {i} with enough text to be long.\n").unwrap();
        }
        let page = parse(&text);

        assert!(page.html.len() > DEFAULT_TOC_THRESHOLD);
        assert_eq!(page.toc.len(), 2);
    }

    #[test]
    fn test_toc_threshold_configurable() {
        let page = convertor()
            .with_toc_threshold(10)
            .parse(PageId::new("doc", "en", "intro"), THREE_HEADINGS);

        assert_eq!(page.toc.len(), 2);
    }

    #[test]
    fn test_toc_off() {
        let mut text = "{{toc: no}}\n".to_owned();
        text.push_str(THREE_HEADINGS);
        text.push_str(&"Long text. ".repeat(1000));

        assert!(parse(&text).toc.is_empty());
    }

    #[test]
    fn test_title_from_first_heading() {
        let page = parse("Intro text\n\n## Setup\n\n# Other");
        assert_eq!(page.title.as_deref(), Some("Setup"));
    }

    #[test]
    fn test_title_directive_wins() {
        let page = parse("{{title: Forms guide}}\n# Forms");
        assert_eq!(page.title.as_deref(), Some("Forms guide"));
    }

    #[test]
    fn test_no_title() {
        assert_eq!(parse("Just text").title, None);
    }

    #[test]
    fn test_metadata_directives() {
        let page = parse(
            "{{maintitle: Nette}}\n{{theme: homepage}}\n{{sidebar: no}}\n{{lang: cs:formulare}}\n# Welcome",
        );

        assert_eq!(page.main_title.as_deref(), Some("Nette"));
        assert_eq!(page.theme.as_deref(), Some("homepage"));
        assert!(!page.sidebar);
        assert_eq!(page.langs.get("cs").map(String::as_str), Some("formulare"));
        assert_eq!(page.html, r#"<h2 id="toc-welcome">Welcome</h2>"#);
    }

    #[test]
    fn test_directives_removed_from_html() {
        let page = parse("{{tags: a, b}}\nText");

        assert_eq!(page.html, "<p>Text</p>");
        assert_eq!(page.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_links_collected_in_order() {
        let page = parse("[a](setup) [b](www:about#Team) [c](https://nette.org) [d](cs:uvod)");

        assert_eq!(
            page.links,
            vec![
                PageId::new("doc", "en", "forms/setup"),
                PageId::new("www", "en", "about"),
                PageId::new("doc", "cs", "uvod"),
            ]
        );
    }

    #[test]
    fn test_attachment_warnings() {
        let page = parse("![](x.png) [logo](attachment:logo.png) [plan](attachment:plan.pdf)");

        assert!(page.html.contains(r#"href="/media/doc/logo.png""#));
        assert!(page.html.contains(r#"href="/media/doc/plan.pdf""#));
        assert_eq!(
            page.warnings,
            vec![Warning::MissingAttachment {
                name: "plan.pdf".to_owned()
            }]
        );
    }

    #[test]
    fn test_unknown_directive_warning() {
        let page = parse("{{bogus}}\nText");

        assert_eq!(
            page.warnings,
            vec![Warning::UnknownDirective {
                name: "bogus".to_owned()
            }]
        );
        assert_eq!(page.html, "<p>Text</p>");
    }

    #[test]
    fn test_directive_in_code_span_is_code() {
        let mut text = "`{{toc: no}}` text\n\n".to_owned();
        text.push_str(THREE_HEADINGS);

        let page = convertor()
            .with_toc_threshold(10)
            .parse(PageId::new("doc", "en", "a/b"), &text);

        assert!(page.html.starts_with("<p><code>{{toc: no}}</code> text</p>"));
        assert_eq!(page.toc.len(), 2);
    }

    #[test]
    fn test_nofollow_directive() {
        let page = parse("{{nofollow}}\n[x](http://spam.example.com)");
        assert!(page.html.contains(r#"rel="nofollow""#));
    }

    #[test]
    fn test_highlighter() {
        let page = convertor()
            .with_highlighter("Php", |code: &str| format!("<span>{code}</span>"))
            .parse(PageId::new("doc", "en", "intro"), "```php\n$a = 1;\n```");

        assert_eq!(
            page.html,
            r#"<pre class="src-php"><code><span>$a = 1;</span></code></pre>"#
        );
    }

    #[test]
    fn test_parses_are_independent() {
        let convertor = convertor();
        let id = PageId::new("doc", "en", "intro");

        let first = convertor.parse(id.clone(), "{{bogus}}\n[a](setup)");
        let second = convertor.parse(id, "Plain");

        assert_eq!(first.links.len(), 1);
        assert_eq!(first.warnings.len(), 1);
        assert!(second.links.is_empty());
        assert!(second.warnings.is_empty());
        assert!(second.sidebar);
    }

    #[test]
    fn test_default_toc_mode_is_auto() {
        assert_eq!(TocMode::default(), TocMode::Auto);
    }

    #[test]
    fn test_convertor_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Convertor>();
    }
}
