//! State structs tracking context during event processing.

use std::collections::HashSet;

use pulldown_cmark::Alignment;
use wk_links::slugify;

use crate::toc::Heading;

/// Highest heading level HTML supports.
const MAX_HEADING_LEVEL: u8 = 6;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    /// Language tag from the fence, if any.
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
    /// Body rows started so far.
    row_count: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
        self.row_count = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    /// Start a body row. Returns `true` for even rows, which are striped.
    pub(crate) fn start_row(&mut self) -> bool {
        self.cell_index = 0;
        self.row_count += 1;
        self.row_count % 2 == 0
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Alignment style attribute for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    /// End image capture and return the alt text.
    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// State for tracking headings and generating their anchors.
pub(crate) struct HeadingState {
    /// Output level of a level-1 heading.
    top: u8,
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Plain text of the current heading, for the title and slug.
    text: String,
    /// HTML of the current heading, with inline formatting.
    html: String,
    headings: Vec<Heading>,
    used_ids: HashSet<String>,
}

impl HeadingState {
    pub(crate) fn new(top: u8) -> Self {
        Self {
            top: top.max(1),
            current_level: None,
            text: String::new(),
            html: String::new(),
            headings: Vec::new(),
            used_ids: HashSet::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading and record it.
    ///
    /// Returns (output level, id, html) or None if not in a heading.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, Option<String>, String)> {
        let level = self.current_level.take()?;
        let title = std::mem::take(&mut self.text).trim().to_owned();
        let html = std::mem::take(&mut self.html);

        let level = (level + self.top - 1).min(MAX_HEADING_LEVEL);
        let id = self.generate_id(&title);

        self.headings.push(Heading {
            level,
            title,
            id: id.clone(),
        });

        Some((level, id, html))
    }

    /// `toc-` + slug, suffixed with `-2`, `-3`, ... when already taken.
    fn generate_id(&mut self, title: &str) -> Option<String> {
        let slug = slugify(title);
        if slug.is_empty() {
            return None;
        }

        let base = format!("toc-{slug}");
        let mut id = base.clone();
        let mut counter = 2;
        while self.used_ids.contains(&id) {
            id = format!("{base}-{counter}");
            counter += 1;
        }
        self.used_ids.insert(id.clone());
        Some(id)
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn take_headings(&mut self) -> Vec<Heading> {
        std::mem::take(&mut self.headings)
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(state: &mut HeadingState, level: u8, text: &str) -> (u8, Option<String>) {
        state.start_heading(level);
        state.push_text(text);
        let (level, id, _html) = state.complete_heading().unwrap();
        (level, id)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_code_block_state() {
        let mut state = CodeBlockState::default();
        assert!(!state.is_active());

        state.start(Some("php".to_owned()));
        assert!(state.is_active());

        state.push_str("echo 1;");
        let (lang, content) = state.end();
        assert_eq!(lang.as_deref(), Some("php"));
        assert_eq!(content, "echo 1;");
        assert!(!state.is_active());
    }

    #[test]
    fn test_table_state_alignment() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::Right]);

        state.start_head();
        assert!(state.is_in_head());
        assert_eq!(state.current_alignment_style(), r#" style="text-align:left""#);

        state.next_cell();
        assert_eq!(state.current_alignment_style(), r#" style="text-align:right""#);

        state.next_cell();
        assert_eq!(state.current_alignment_style(), "");

        state.end_head();
        assert!(!state.is_in_head());
    }

    #[test]
    fn test_table_state_striping() {
        let mut state = TableState::default();
        state.start(Vec::new());

        assert!(!state.start_row());
        assert!(state.start_row());
        assert!(!state.start_row());

        state.start(Vec::new());
        assert!(!state.start_row());
    }

    #[test]
    fn test_image_state() {
        let mut state = ImageState::default();
        state.start();
        state.push_str("alt text");

        assert!(state.is_active());
        assert_eq!(state.end(), "alt text");
        assert!(!state.is_active());
    }

    #[test]
    fn test_heading_ids() {
        let mut state = HeadingState::new(1);

        assert_eq!(complete(&mut state, 2, "Getting Started"), (2, Some("toc-getting-started".to_owned())));
        assert_eq!(complete(&mut state, 2, "???"), (2, None));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let mut state = HeadingState::new(1);

        let ids: Vec<_> = ["FAQ", "FAQ", "FAQ", "FAQ 2"]
            .into_iter()
            .map(|text| complete(&mut state, 2, text).1.unwrap())
            .collect();

        assert_eq!(ids, vec!["toc-faq", "toc-faq-2", "toc-faq-3", "toc-faq-2-2"]);
    }

    #[test]
    fn test_heading_top_shifts_levels() {
        let mut state = HeadingState::new(2);

        assert_eq!(complete(&mut state, 1, "A").0, 2);
        assert_eq!(complete(&mut state, 6, "B").0, 6);
    }

    #[test]
    fn test_headings_recorded_with_trimmed_title() {
        let mut state = HeadingState::new(1);
        complete(&mut state, 1, "  Title  ");

        let headings = state.take_headings();
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].title, "Title");
        assert_eq!(headings[0].id.as_deref(), Some("toc-title"));
    }
}
