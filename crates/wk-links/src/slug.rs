//! Slug generation for page paths and anchors.

/// Convert text to a URL-safe slug.
///
/// Diacritics and other non-ASCII characters are transliterated, the result
/// is lower-cased and every run of characters outside `[a-z0-9]` collapses
/// into a single dash. Leading and trailing dashes are removed.
///
/// # Examples
///
/// ```
/// use wk_links::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Žluťoučký kůň"), "zlutoucky-kun");
/// assert_eq!(slugify("#toc-Setup"), "toc-setup");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    webalize(text, false)
}

/// Like [`slugify`] but keeps `/` so nested page paths stay nested.
///
/// ```
/// use wk_links::slugify_path;
///
/// assert_eq!(slugify_path("Guide/Getting Started"), "guide/getting-started");
/// ```
#[must_use]
pub fn slugify_path(text: &str) -> String {
    webalize(text, true)
}

fn webalize(text: &str, keep_slash: bool) -> String {
    let ascii = deunicode::deunicode(text);
    let mut result = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_alphanumeric() || (keep_slash && c == '/') {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.push(c);
        } else {
            pending_dash = true;
        }
    }

    result
}
