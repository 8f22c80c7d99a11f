//! Non-fatal problems found while rendering a page.

/// Warning collected during a render.
///
/// Warnings never abort rendering; they are surfaced to the caller next to
/// the rendered HTML.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Warning {
    /// Link syntax could not be parsed; the raw text is used as the URL.
    #[error("Unresolvable link {raw}")]
    UnresolvableLink {
        /// Link text as written in the markup.
        raw: String,
    },
    /// Attachment link points to a file that does not exist.
    #[error("Missing file {name}")]
    MissingAttachment {
        /// Attachment name relative to the book's media directory.
        name: String,
    },
    /// Directive name is not recognized.
    #[error("Unknown directive: {name}")]
    UnknownDirective {
        /// Directive name as written.
        name: String,
    },
}
