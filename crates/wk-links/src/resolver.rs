//! Link classification and resolution.

use std::path::Path;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::matcher::{LinkMatch, parse_link};
use crate::{HOMEPAGE, PageId, RenderContext, Warning, slugify};

/// Links passed through verbatim: e-mail addresses, absolute URLs, bare hosts.
static EXTERNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:.+@|https?:|ftp:|mailto:|ftp\.|www\.)").unwrap()
});

/// Characters left unescaped by PHP-style form encoding.
const FORM_ENCODE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Outcome of resolving a raw link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Final URL, used as-is.
    External(String),
    /// Wiki page that still needs [`canonicalize`](crate::canonicalize).
    Internal(PageId),
}

impl Resolution {
    /// The page identifier for internal links.
    #[must_use]
    pub fn as_internal(&self) -> Option<&PageId> {
        match self {
            Self::Internal(id) => Some(id),
            Self::External(_) => None,
        }
    }
}

/// Books with dedicated URL schemes. Everything else is a wiki page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookKind {
    /// Downloadable file.
    Download,
    /// File attached to the current book.
    Attachment,
    /// Generated API documentation.
    Api,
    /// User profile by numeric id.
    User,
    /// PHP manual.
    Php,
    /// Regular wiki page.
    Page,
}

impl BookKind {
    /// Classify a book name.
    #[must_use]
    pub fn of(book: &str) -> Self {
        match book {
            "download" => Self::Download,
            "attachment" => Self::Attachment,
            "api" => Self::Api,
            "user" => Self::User,
            "php" => Self::Php,
            _ => Self::Page,
        }
    }
}

/// Resolve a raw link relative to the page being rendered.
///
/// Never fails: unparseable input is returned unchanged as
/// [`Resolution::External`] and reported as [`Warning::UnresolvableLink`].
/// Missing attachments are reported as [`Warning::MissingAttachment`] while
/// still producing their URL.
///
/// Discovered internal links are *not* recorded here; that is up to the
/// caller, since metadata directives resolve links without rendering them.
///
/// # Example
///
/// ```
/// use wk_links::{PageId, Paths, RenderContext, Resolution, resolve};
///
/// let paths = Paths {
///     api_url: "https://api.example.org".to_owned(),
///     ..Paths::default()
/// };
/// let mut ctx = RenderContext::new(PageId::new("doc", "en", "intro"), paths);
///
/// assert_eq!(
///     resolve(r"api:Foo\Bar::baz()", &mut ctx),
///     Resolution::External("https://api.example.org/Foo.Bar.html#_baz".to_owned())
/// );
/// ```
pub fn resolve(raw: &str, ctx: &mut RenderContext) -> Resolution {
    let resolution = classify(raw, ctx);
    tracing::trace!(raw, ?resolution, "Resolved link");
    resolution
}

fn classify(raw: &str, ctx: &mut RenderContext) -> Resolution {
    if EXTERNAL_RE.is_match(raw) {
        return Resolution::External(raw.to_owned());
    }

    if let Some(anchor) = raw.strip_prefix('#') {
        let section = raw.strip_prefix("#toc-").unwrap_or(anchor);
        return Resolution::External(format!("#toc-{}", slugify(section)));
    }

    let Some(link) = parse_link(raw) else {
        ctx.warn(Warning::UnresolvableLink {
            raw: raw.to_owned(),
        });
        return Resolution::External(raw.to_owned());
    };

    let raw_name = link.name.unwrap_or_default();
    let name = normalize_name(raw_name, &link, &ctx.current);
    let section = link.section.unwrap_or_default();
    let book = link.book.map_or_else(
        || default_book(&ctx.current.book).to_owned(),
        str::to_owned,
    );

    match BookKind::of(&book) {
        BookKind::Download => {
            Resolution::External(format!("{}/{name}", ctx.paths.download_dir))
        }
        BookKind::Attachment => attachment(&name, ctx),
        BookKind::Api => Resolution::External(format!(
            "{}/{}",
            ctx.paths.api_url,
            api_path(raw_name)
        )),
        BookKind::User => Resolution::External(format!(
            "{}{}",
            ctx.paths.profile_url,
            profile_id(raw_name)
        )),
        BookKind::Php => Resolution::External(php_manual_url(raw_name, section)),
        BookKind::Page => Resolution::Internal(PageId {
            book,
            lang: link.lang.unwrap_or(&ctx.current.lang).to_owned(),
            path: name,
            fragment: fragment(section),
        }),
    }
}

/// Fold colons, collapse the homepage sentinel and expand relative names
/// against the current page's directory.
fn normalize_name(raw_name: &str, link: &LinkMatch<'_>, current: &PageId) -> String {
    let mut name = raw_name.replace(':', "/");
    name.truncate(name.trim_end_matches('/').len());

    if name.is_empty() || name.to_lowercase().trim_matches('/') == HOMEPAGE {
        HOMEPAGE.clone_into(&mut name);
    }

    if !name.starts_with('/')
        && link.book.is_none()
        && link.lang.is_none()
        && let Some(dir) = current.dir()
    {
        name.insert_str(0, dir);
    }

    name.trim_matches('/').to_owned()
}

/// Pages of the `meta` book link into `www` by default.
fn default_book(current: &str) -> &str {
    if current == "meta" { "www" } else { current }
}

fn fragment(section: &str) -> Option<String> {
    let section = section.strip_prefix("toc-").unwrap_or(section);
    if section.is_empty() {
        return None;
    }
    Some(format!("toc-{}", slugify(section)))
}

fn attachment(name: &str, ctx: &mut RenderContext) -> Resolution {
    let book = &ctx.current.book;
    let file = format!("{}/{book}/{name}", ctx.paths.file_media_path);
    let url = format!("{}/{book}/{name}", ctx.paths.media_path);

    if !ctx.file_exists(Path::new(&file)) {
        ctx.warn(Warning::MissingAttachment {
            name: name.to_owned(),
        });
    }

    Resolution::External(url)
}

/// Map `Namespace\Class`, `Class::method()` and `Class::$member` references
/// to API documentation pages.
fn api_path(raw_name: &str) -> String {
    let path = raw_name.replace('\\', ".");

    if path.contains("()") {
        path.replace("()", "").replace("::", ".html#_")
    } else if path.contains("::") {
        path.replace("::", ".html#")
    } else {
        path + ".html"
    }
}

/// Leading integer of the name, `0` when there is none.
fn profile_id(raw_name: &str) -> i64 {
    let s = raw_name.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |id| sign * id)
}

fn php_manual_url(raw_name: &str, section: &str) -> String {
    let function = raw_name.strip_suffix("()").unwrap_or(raw_name);
    let mut url = format!(
        "http://php.net/{}",
        utf8_percent_encode(function, FORM_ENCODE)
            .to_string()
            .replace("%20", "+")
    );
    if !section.is_empty() {
        url.push('#');
        url.push_str(section);
    }
    url
}
