//! HTML renderer for pulldown-cmark events with wiki link resolution.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Tag, TagEnd};
use wk_links::RenderContext;

use crate::code_block::{Highlighters, fence_language, render_code_block};
use crate::links::PendingLink;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, escape_html};
use crate::toc::Heading;

/// Parser options used for wiki pages.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Output of a render pass.
#[derive(Debug)]
pub(crate) struct Rendered {
    pub(crate) html: String,
    pub(crate) headings: Vec<Heading>,
}

/// Event renderer producing the page body.
///
/// Links are buffered until their end tag so the target can be resolved with
/// the full content at hand. Headings are buffered to compute their anchors.
pub(crate) struct WikiRenderer<'a> {
    ctx: &'a mut RenderContext,
    highlighters: &'a Highlighters,
    nofollow: bool,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    link: Option<PendingLink>,
    pending_image: Option<(String, String)>,
}

impl<'a> WikiRenderer<'a> {
    pub(crate) fn new(ctx: &'a mut RenderContext, highlighters: &'a Highlighters) -> Self {
        Self {
            ctx,
            highlighters,
            nofollow: false,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(1),
            link: None,
            pending_image: None,
        }
    }

    /// Add `rel="nofollow"` to absolute links.
    #[must_use]
    pub(crate) fn with_nofollow(mut self, nofollow: bool) -> Self {
        self.nofollow = nofollow;
        self
    }

    /// Output level of a level-1 heading.
    #[must_use]
    pub(crate) fn with_heading_top(mut self, top: u8) -> Self {
        self.heading = HeadingState::new(top);
        self
    }

    /// Render markdown events.
    pub(crate) fn render<'e, I>(mut self, events: I) -> Rendered
    where
        I: Iterator<Item = Event<'e>>,
    {
        for event in events {
            self.process_event(event);
        }

        Rendered {
            html: self.output,
            headings: self.heading.take_headings(),
        }
    }

    /// Push HTML to the innermost open buffer: link, heading or output.
    fn push_inline(&mut self, content: &str) {
        if let Some(link) = &mut self.link {
            link.push_html(content);
        } else if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    /// Push plain text to the innermost open text buffer.
    fn push_plain(&mut self, text: &str) {
        if let Some(link) = &mut self.link {
            link.push_text(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&escape_html(&html)),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info).map(ToOwned::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                if self.table.start_row() {
                    self.output.push_str(r#"<tr class="alt">"#);
                } else {
                    self.output.push_str("<tr>");
                }
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<i>"),
            Tag::Strong => self.push_inline("<b>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                self.link = Some(PendingLink::new(link_type, &dest_url, &title));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    let id_attr = id.map(|id| format!(r#" id="{id}""#)).unwrap_or_default();
                    write!(
                        self.output,
                        "<h{level}{id_attr}>{}</h{level}>",
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                render_code_block(lang.as_deref(), &content, self.highlighters, &mut self.output);
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</i>"),
            TagEnd::Strong => self.push_inline("</b>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.finish_link(),
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    self.image_tag(&src, &alt, &title);
                }
            }
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn finish_link(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        let (html, text) = link.finish(self.ctx, self.nofollow);
        if self.heading.is_active() {
            self.heading.push_text(&text);
        }
        self.push_inline(&html);
    }

    fn image_tag(&mut self, src: &str, alt: &str, title: &str) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        let html = format!(
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        );
        self.push_inline(&html);
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.push_plain(text);
            self.push_inline(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        self.push_plain(code);
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.push_plain(" ");
            self.push_inline("\n");
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        if checked {
            self.output.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            self.output.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::Parser;
    use wk_links::{PageId, Paths};

    use super::*;
    use crate::links::reference_target;

    fn context() -> RenderContext {
        let paths = Paths {
            api_url: "https://api.example.org".to_owned(),
            domain: "example.org".to_owned(),
            ..Paths::default()
        };
        RenderContext::new(PageId::new("doc", "en", "forms/intro"), paths)
    }

    fn render_with(markdown: &str, ctx: &mut RenderContext) -> Rendered {
        let parser =
            Parser::new_with_broken_link_callback(markdown, parser_options(), Some(reference_target));
        let highlighters = Highlighters::new();
        WikiRenderer::new(ctx, &highlighters).render(parser)
    }

    fn render(markdown: &str) -> Rendered {
        render_with(markdown, &mut context())
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("Hello, world!").html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id() {
        let result = render("## Section Title");

        assert_eq!(result.html, r#"<h2 id="toc-section-title">Section Title</h2>"#);
        assert_eq!(result.headings.len(), 1);
        assert_eq!(result.headings[0].title, "Section Title");
    }

    #[test]
    fn test_heading_without_slug_has_no_id() {
        assert_eq!(render("## ???").html, "<h2>???</h2>");
    }

    #[test]
    fn test_heading_top() {
        let mut ctx = context();
        let highlighters = Highlighters::new();
        let result = WikiRenderer::new(&mut ctx, &highlighters)
            .with_heading_top(2)
            .render(Parser::new("# Welcome"));

        assert_eq!(result.html, r#"<h2 id="toc-welcome">Welcome</h2>"#);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `composer`");

        assert!(result.html.contains("<code>composer</code>"));
        assert_eq!(result.headings[0].title, "Install composer");
    }

    #[test]
    fn test_heading_with_link() {
        let result = render("## See [validation](validation)");

        assert_eq!(
            result.html,
            r#"<h2 id="toc-see-validation">See <a href="/en/forms/validation">validation</a></h2>"#
        );
    }

    #[test]
    fn test_phrase_tags() {
        let result = render("*italic* and **bold** and ~~gone~~");
        assert_eq!(result.html, "<p><i>italic</i> and <b>bold</b> and <s>gone</s></p>");
    }

    #[test]
    fn test_inline_link_resolved() {
        let mut ctx = context();
        let result = render_with("Read [the rules](validation#Rules).", &mut ctx);

        assert_eq!(
            result.html,
            r#"<p>Read <a href="/en/forms/validation#toc-rules">the rules</a>.</p>"#
        );
        assert_eq!(ctx.links, vec![PageId::new("doc", "en", "forms/validation")]);
    }

    #[test]
    fn test_link_with_formatting() {
        let result = render("[**bold** link](https://nette.org)");
        assert_eq!(
            result.html,
            r#"<p><a href="https://nette.org"><b>bold</b> link</a></p>"#
        );
    }

    #[test]
    fn test_reference_link_creation() {
        let result = render("See [api:Nette\\Forms\\Form].");
        assert_eq!(
            result.html,
            r#"<p>See <a href="https://api.example.org/Nette.Forms.Form.html">Nette\Forms\Form</a>.</p>"#
        );
    }

    #[test]
    fn test_reference_link_to_page() {
        let result = render("[www:download]");
        assert_eq!(
            result.html,
            r#"<p><a href="http://example.org/en/download">download</a></p>"#
        );
    }

    #[test]
    fn test_defined_reference_is_normal_link() {
        let result = render("[setup]\n\n[setup]: https://example.com/setup");
        assert_eq!(
            result.html,
            r#"<p><a href="https://example.com/setup">setup</a></p>"#
        );
    }

    #[test]
    fn test_shorthand_reference() {
        let result = render("Use [strlen][php] here.");
        assert_eq!(
            result.html,
            r#"<p>Use <a href="http://php.net/strlen">strlen</a> here.</p>"#
        );
    }

    #[test]
    fn test_nofollow() {
        let mut ctx = context();
        let highlighters = Highlighters::new();
        let result = WikiRenderer::new(&mut ctx, &highlighters)
            .with_nofollow(true)
            .render(Parser::new("[a](https://example.com) [b](setup)"));

        assert_eq!(
            result.html,
            r#"<p><a href="https://example.com" rel="nofollow">a</a> <a href="/en/forms/setup">b</a></p>"#
        );
    }

    #[test]
    fn test_code_block() {
        let result = render("```PHP\n    echo 1;\n```");
        assert_eq!(result.html, r#"<pre class="src-php"><code>echo 1;</code></pre>"#);
    }

    #[test]
    fn test_code_block_text_not_linked() {
        let mut ctx = context();
        let result = render_with("```\n[setup]\n```", &mut ctx);

        assert_eq!(result.html, "<pre><code>[setup]</code></pre>");
        assert!(ctx.links.is_empty());
    }

    #[test]
    fn test_table_striping() {
        let result = render("| A |\n|---|\n| 1 |\n| 2 |\n| 3 |");
        assert_eq!(
            result.html,
            concat!(
                "<table><thead><tr><th>A</th></tr></thead><tbody>",
                "<tr><td>1</td></tr>",
                r#"<tr class="alt"><td>2</td></tr>"#,
                "<tr><td>3</td></tr>",
                "</tbody></table>"
            )
        );
    }

    #[test]
    fn test_image() {
        let result = render("![Logo](logo.png \"Nette\")");
        assert_eq!(
            result.html,
            r#"<p><img src="logo.png" title="Nette" alt="Logo"></p>"#
        );
    }

    #[test]
    fn test_block_html_escaped() {
        let result = render("<div>x</div>");
        assert!(result.html.starts_with("&lt;div&gt;x&lt;/div&gt;"));
        assert!(!result.html.contains("<div>"));
    }

    #[test]
    fn test_lists() {
        assert_eq!(render("- a\n- b").html, "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(render("3. a").html, r#"<ol start="3"><li>a</li></ol>"#);
    }

    #[test]
    fn test_task_list() {
        let result = render("- [x] done");
        assert!(
            result
                .html
                .contains(r#"<input type="checkbox" checked disabled> "#)
        );
    }
}
