//! Directive syntax: `{{name}}`, `{{name: args}}`, `{{name(args)}}`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::fence::FenceTracker;

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}\n]+)\}\}").unwrap());

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)(?:\s*\((.*)\)|\s*:(.*))?$").unwrap()
});

/// Directive found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive {
    pub(crate) name: String,
    /// Comma-separated arguments, each trimmed.
    pub(crate) args: Vec<String>,
    /// Whole argument string, trimmed.
    pub(crate) raw: String,
}

impl Directive {
    /// Parse the text between `{{` and `}}`.
    pub(crate) fn parse(body: &str) -> Option<Self> {
        let caps = BODY_RE.captures(body.trim())?;
        let raw = (2..=3)
            .find_map(|i| caps.get(i))
            .map_or("", |m| m.as_str().trim());

        let args = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(|arg| arg.trim().to_owned()).collect()
        };

        Some(Self {
            name: caps[1].to_owned(),
            args,
            raw: raw.to_owned(),
        })
    }

    /// First argument, if any.
    pub(crate) fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Remove directives from the markup and return them in document order.
///
/// Fenced and indented code blocks and inline code spans are left untouched,
/// as is `{{...}}` text that does not look like a directive.
pub(crate) fn extract(text: &str) -> (String, Vec<Directive>) {
    let mut output = String::with_capacity(text.len());
    let mut directives = Vec::new();
    let mut fence = FenceTracker::new();
    let mut in_paragraph = false;

    for line in text.split_inclusive('\n') {
        if fence.update(line) || fence.in_fence() {
            output.push_str(line);
            in_paragraph = false;
            continue;
        }

        if line.trim().is_empty() {
            output.push_str(line);
            in_paragraph = false;
            continue;
        }

        // Indented lines only continue a paragraph; elsewhere they are code
        if !in_paragraph && is_indented_code(line) {
            output.push_str(line);
            continue;
        }

        let spans = code_spans(line);
        let replaced = DIRECTIVE_RE.replace_all(line, |caps: &Captures<'_>| {
            let start = caps.get(0).map_or(0, |m| m.start());
            if spans.iter().any(|span| span.contains(&start)) {
                return caps[0].to_owned();
            }
            match Directive::parse(&caps[1]) {
                Some(directive) => {
                    directives.push(directive);
                    String::new()
                }
                None => caps[0].to_owned(),
            }
        });
        // Headings and lines emptied by directive removal end paragraphs
        in_paragraph = !replaced.trim().is_empty() && !replaced.trim_start().starts_with('#');
        output.push_str(&replaced);
    }

    (output, directives)
}

/// Four columns of leading whitespace.
fn is_indented_code(line: &str) -> bool {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
        if width >= 4 {
            return true;
        }
    }
    false
}

/// Byte ranges of inline code spans on a line.
///
/// A span opens with a run of backticks and closes with the next run of the
/// same length. Unclosed runs are literal backticks.
fn code_spans(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let run_at = |pos: usize| bytes[pos..].iter().take_while(|&&b| b == b'`').count();

    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] != b'`' {
            pos += 1;
            continue;
        }

        let open = run_at(pos);
        let mut search = pos + open;
        let mut close = None;
        while search < bytes.len() {
            if bytes[search] == b'`' {
                let len = run_at(search);
                if len == open {
                    close = Some(search + len);
                    break;
                }
                search += len;
            } else {
                search += 1;
            }
        }

        match close {
            Some(end) => {
                spans.push(pos..end);
                pos = end;
            }
            None => pos += open,
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn directive(name: &str, args: &[&str], raw: &str) -> Directive {
        Directive {
            name: name.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            raw: raw.to_owned(),
        }
    }

    #[test]
    fn test_parse_bare() {
        assert_eq!(Directive::parse("toc"), Some(directive("toc", &[], "")));
    }

    #[test]
    fn test_parse_colon() {
        assert_eq!(
            Directive::parse("tags: php, nette ,, latte"),
            Some(directive("tags", &["php", "nette", "", "latte"], "php, nette ,, latte"))
        );
    }

    #[test]
    fn test_parse_parens() {
        assert_eq!(
            Directive::parse("lang(cs:homepage)"),
            Some(directive("lang", &["cs:homepage"], "cs:homepage"))
        );
    }

    #[test]
    fn test_parse_rejects_space_separated_args() {
        assert_eq!(Directive::parse("title Getting started"), None);
    }

    #[test]
    fn test_parse_rejects_non_identifier() {
        assert_eq!(Directive::parse("$var"), None);
        assert_eq!(Directive::parse(" "), None);
    }

    #[test]
    fn test_extract_removes_directives() {
        let (text, directives) = extract("{{toc: title}}\n# Intro\n\nText {{nofollow}} here\n");

        assert_eq!(text, "\n# Intro\n\nText  here\n");
        assert_eq!(
            directives,
            vec![directive("toc", &["title"], "title"), directive("nofollow", &[], "")]
        );
    }

    #[test]
    fn test_extract_skips_fenced_code() {
        let input = "```\n{{toc}}\n```\n{{sidebar: no}}\n";
        let (text, directives) = extract(input);

        assert_eq!(text, "```\n{{toc}}\n```\n\n");
        assert_eq!(directives, vec![directive("sidebar", &["no"], "no")]);
    }

    #[test]
    fn test_extract_skips_code_spans() {
        let input = "`{{toc: no}}` text ``a ` {{sidebar}}`` {{nofollow}}\n";
        let (text, directives) = extract(input);

        assert_eq!(text, "`{{toc: no}}` text ``a ` {{sidebar}}`` \n");
        assert_eq!(directives, vec![directive("nofollow", &[], "")]);
    }

    #[test]
    fn test_extract_unclosed_backtick_is_literal() {
        let (text, directives) = extract("It`s {{toc}}\n");

        assert_eq!(text, "It`s \n");
        assert_eq!(directives, vec![directive("toc", &[], "")]);
    }

    #[test]
    fn test_extract_skips_indented_code() {
        let input = "Intro\n\n    {{toc: no}}\n\t{{sidebar: no}}\n\n{{nofollow}}\n";
        let (text, directives) = extract(input);

        assert_eq!(text, "Intro\n\n    {{toc: no}}\n\t{{sidebar: no}}\n\n\n");
        assert_eq!(directives, vec![directive("nofollow", &[], "")]);
    }

    #[test]
    fn test_extract_indented_paragraph_continuation() {
        let (text, directives) = extract("Intro\n    {{toc}} more\n");

        assert_eq!(text, "Intro\n     more\n");
        assert_eq!(directives, vec![directive("toc", &[], "")]);
    }

    #[test]
    fn test_extract_indented_code_after_directive_line() {
        let (text, directives) = extract("{{toc}}\n    {{sidebar: no}}\n");

        assert_eq!(text, "\n    {{sidebar: no}}\n");
        assert_eq!(directives, vec![directive("toc", &[], "")]);
    }

    #[test]
    fn test_extract_keeps_unparseable_braces() {
        let (text, directives) = extract("Template {{$name}} stays\n");

        assert_eq!(text, "Template {{$name}} stays\n");
        assert!(directives.is_empty());
    }

    #[test]
    fn test_extract_multiple_on_one_line() {
        let (_, directives) = extract("{{maintitle: Nette}}{{theme: homepage}}");
        let names: Vec<_> = directives.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(names, vec!["maintitle", "theme"]);
    }
}
