//! Code block dispatch to syntax highlighters.
//!
//! Highlighting itself is pluggable: register a [`Highlighter`] under the
//! identifier derived from the fence language (see [`highlighter_id`]).
//! Blocks without a registered highlighter are rendered as escaped text.
//!
//! # Example
//!
//! ```
//! use wk_renderer::{Highlighters, highlighter_id, normalize_language};
//!
//! let mut highlighters = Highlighters::new();
//! highlighters.register("Php", |code: &str| format!("<span class=\"php\">{code}</span>"));
//!
//! let lang = normalize_language("PHP");
//! assert!(highlighters.get(&highlighter_id(&lang)).is_some());
//! ```

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::state::escape_html;

/// Syntax highlighter producing HTML from source code.
pub trait Highlighter {
    /// Highlight `code`. The result is inserted as-is, so it must be escaped.
    fn highlight(&self, code: &str) -> String;
}

impl<F> Highlighter for F
where
    F: Fn(&str) -> String,
{
    fn highlight(&self, code: &str) -> String {
        self(code)
    }
}

/// Highlighters keyed by identifier (`Php`, `LatteHtml`, ...).
#[derive(Default)]
pub struct Highlighters {
    by_id: HashMap<String, Box<dyn Highlighter + Send + Sync>>,
}

impl Highlighters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a highlighter, replacing any previous one with the same id.
    pub fn register<H>(&mut self, id: impl Into<String>, highlighter: H)
    where
        H: Highlighter + Send + Sync + 'static,
    {
        self.by_id.insert(id.into(), Box::new(highlighter));
    }

    /// Highlighter registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&(dyn Highlighter + Send + Sync)> {
        self.by_id.get(id).map(|highlighter| &**highlighter)
    }
}

impl fmt::Debug for Highlighters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.by_id.keys().collect();
        ids.sort();
        f.debug_struct("Highlighters").field("ids", &ids).finish()
    }
}

/// Canonical language of a fence tag.
///
/// ```
/// use wk_renderer::normalize_language;
///
/// assert_eq!(normalize_language("Latte"), "html");
/// assert_eq!(normalize_language("javascript"), "js");
/// assert_eq!(normalize_language("NEON"), "neon");
/// ```
#[must_use]
pub fn normalize_language(tag: &str) -> String {
    let lang = tag.to_lowercase();
    match lang.as_str() {
        "htmlcb" | "latte" => "html".to_owned(),
        "javascript" => "js".to_owned(),
        _ => lang,
    }
}

/// Highlighter identifier for a normalized language.
#[must_use]
pub fn highlighter_id(lang: &str) -> String {
    match lang {
        "html" => "LatteHtml".to_owned(),
        "js" => "LatteJavascript".to_owned(),
        _ => {
            let mut chars = lang.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        }
    }
}

/// Language token of a fence info string (`php linenums` → `php`).
pub(crate) fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}

/// Remove the indentation common to all non-blank lines and surrounding
/// blank lines.
pub(crate) fn outdent(code: &str) -> String {
    let indent = code
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut result = String::with_capacity(code.len());
    for line in code.lines() {
        let strip = line
            .char_indices()
            .take(indent)
            .take_while(|(_, c)| *c == ' ' || *c == '\t')
            .count();
        result.push_str(&line[strip..]);
        result.push('\n');
    }

    result.trim_matches('\n').to_owned()
}

/// Render a code block as `<pre class="src-…"><code>…</code></pre>`.
pub(crate) fn render_code_block(
    lang: Option<&str>,
    content: &str,
    highlighters: &Highlighters,
    out: &mut String,
) {
    let Some(tag) = lang.filter(|tag| !tag.is_empty()) else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(&outdent(content))).unwrap();
        return;
    };

    let lang = normalize_language(tag);
    let code = outdent(content);
    let body = match highlighters.get(&highlighter_id(&lang)) {
        Some(highlighter) => highlighter.highlight(&code),
        None => escape_html(&code),
    };

    write!(
        out,
        r#"<pre class="src-{}"><code>{body}</code></pre>"#,
        escape_html(&lang)
    )
    .unwrap();
}
