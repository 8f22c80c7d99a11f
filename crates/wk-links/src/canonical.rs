//! Site URLs for internal page identifiers.

use crate::{HOMEPAGE, PageId, slugify_path};

/// Build the URL of `id` as seen from the page `current`.
///
/// Links within the current book are host-relative. Links into another book
/// are absolute, on the book's subdomain of `domain` (`www` is served from the
/// bare domain). A versioned book such as `doc-2.0` is served from the `doc`
/// subdomain under a `2.0/` path prefix.
///
/// ```
/// use wk_links::{PageId, canonicalize};
///
/// let current = PageId::new("www", "en", "homepage");
/// let id = PageId::new("doc-2.0", "cs", "Getting Started").with_fragment("toc-di");
///
/// assert_eq!(
///     canonicalize(&id, &current, "example.org"),
///     "http://doc.example.org/cs/2.0/getting-started#toc-di"
/// );
/// ```
#[must_use]
pub fn canonicalize(id: &PageId, current: &PageId, domain: &str) -> String {
    let (primary, secondary) = match id.book.split_once('-') {
        Some((primary, secondary)) => (primary, Some(secondary)),
        None => (id.book.as_str(), None),
    };

    let mut url = String::new();

    if id.book != current.book {
        url.push_str("http://");
        if primary != "www" {
            url.push_str(primary);
            url.push('.');
        }
        url.push_str(domain);
    }

    url.push('/');
    url.push_str(&id.lang);
    url.push('/');

    if let Some(secondary) = secondary {
        url.push_str(secondary);
        url.push('/');
    }

    if id.path != HOMEPAGE {
        url.push_str(&slugify_path(&id.path));
    }

    if let Some(fragment) = id.fragment.as_deref().filter(|f| !f.is_empty()) {
        url.push('#');
        url.push_str(fragment);
    }

    url
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn url(id: &str, current: &str) -> String {
        canonicalize(
            &id.parse().unwrap(),
            &current.parse().unwrap(),
            "example.org",
        )
    }

    #[test]
    fn test_same_book_is_host_relative() {
        assert_eq!(url("doc:en:guide/setup", "doc:en:intro"), "/en/guide/setup");
    }

    #[test]
    fn test_same_book_other_lang() {
        assert_eq!(url("doc:cs:intro", "doc:en:intro"), "/cs/intro");
    }

    #[test]
    fn test_homepage_collapses() {
        assert_eq!(url("doc:en:homepage", "doc:en:intro"), "/en/");
    }

    #[test]
    fn test_cross_book_uses_subdomain() {
        assert_eq!(
            url("forum:en:rules", "doc:en:intro"),
            "http://forum.example.org/en/rules"
        );
    }

    #[test]
    fn test_www_uses_bare_domain() {
        assert_eq!(url("www:en:homepage", "doc:en:intro"), "http://example.org/en/");
    }

    #[test]
    fn test_versioned_book() {
        assert_eq!(
            url("doc-2.0:en:guide", "doc:en:intro"),
            "http://doc.example.org/en/2.0/guide"
        );
        assert_eq!(url("doc-2.0:en:guide", "doc-2.0:en:intro"), "/en/2.0/guide");
    }

    #[test]
    fn test_path_is_slugged() {
        assert_eq!(
            url("doc:en:Guide/Getting Started", "doc:en:intro"),
            "/en/guide/getting-started"
        );
    }

    #[test]
    fn test_fragment() {
        assert_eq!(
            url("doc:en:setup#toc-install", "doc:en:intro"),
            "/en/setup#toc-install"
        );
    }

    #[test]
    fn test_deterministic() {
        let id: PageId = "doc:en:guide/di#toc-usage".parse().unwrap();
        let current: PageId = "www:en:homepage".parse().unwrap();

        assert_eq!(
            canonicalize(&id, &current, "example.org"),
            canonicalize(&id, &current, "example.org")
        );
    }
}
