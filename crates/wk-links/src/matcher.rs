//! Structured link syntax: `[book:][[:/]lang]name[#section]`.

use std::sync::LazyLock;

use regex::Regex;

/// Book prefix: three or more lowercase letters, optional `-D.D` version, colon.
static BOOK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]{3,}(?:-[0-9]\.[0-9])?):").unwrap());

/// Parts of a structured link. Absent parts are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LinkMatch<'a> {
    pub(crate) book: Option<&'a str>,
    pub(crate) lang: Option<&'a str>,
    pub(crate) name: Option<&'a str>,
    pub(crate) section: Option<&'a str>,
}

/// Split a raw link into its structured parts.
///
/// Returns `None` when the section spans more than one line.
pub(crate) fn parse_link(raw: &str) -> Option<LinkMatch<'_>> {
    let mut rest = raw;

    let book = BOOK_RE
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    if let Some(book) = book {
        rest = &rest[book.len() + 1..];
    }

    let lang = parse_lang(rest);
    if let Some((_, consumed)) = lang {
        rest = &rest[consumed..];
    }

    let (name, section) = match rest.split_once('#') {
        Some((name, section)) => {
            let section = section.strip_suffix('\n').unwrap_or(section);
            if section.contains('\n') {
                return None;
            }
            (name, Some(section))
        }
        None => (rest, None),
    };

    Some(LinkMatch {
        book,
        lang: lang.map(|(lang, _)| lang),
        name: (!name.is_empty()).then_some(name),
        section,
    })
}

/// Two-letter language code, optionally preceded by `:` or `/`, followed by
/// `:`, `/`, `#` or end of input.
///
/// Returns the code and the number of bytes consumed (the follower is not
/// consumed).
fn parse_lang(s: &str) -> Option<(&str, usize)> {
    let skip = usize::from(matches!(s.as_bytes().first(), Some(b':' | b'/')));
    let candidate = s[skip..].as_bytes();

    let is_code = candidate.len() >= 2 && candidate[..2].iter().all(u8::is_ascii_lowercase);
    let is_terminated = candidate.len() == 2 || matches!(candidate.get(2), Some(b':' | b'/' | b'#'));

    (is_code && is_terminated).then(|| (&s[skip..skip + 2], skip + 2))
}
