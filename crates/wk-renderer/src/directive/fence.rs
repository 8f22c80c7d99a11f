//! Code fence tracking for directive extraction.
//!
//! Directive syntax appearing inside fenced code blocks is code, not markup.

/// Tracks code fence state during line-by-line processing.
///
/// Fences use backticks or tildes (three or more). The closing fence must use
/// the same character and be at least as long as the opening fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character used for the current fence.
    fence_char: Option<char>,
    /// Length of the opening fence.
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state from a line.
    ///
    /// Returns `true` if the line opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        match self.fence_char {
            Some(fence_char) => {
                if is_closing_fence(trimmed, fence_char, self.fence_len) {
                    self.fence_char = None;
                    self.fence_len = 0;
                    return true;
                }
                false
            }
            None => match detect_fence(trimmed) {
                Some((ch, len)) => {
                    self.fence_char = Some(ch);
                    self.fence_len = len;
                    true
                }
                None => false,
            },
        }
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Same character, at least as long as the opening fence, nothing but
/// whitespace after it.
fn is_closing_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_line_inside_fence() {
        let mut tracker = FenceTracker::new();

        assert!(tracker.update("```php\n"));
        assert!(!tracker.update("{{toc}}\n"));
        assert!(tracker.in_fence());

        assert!(tracker.update("```\n"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_fence_closes_only_on_matching_run() {
        let mut tracker = FenceTracker::new();

        tracker.update("~~~~\n");
        assert!(!tracker.update("```\n"));
        assert!(!tracker.update("~~~\n"));
        assert!(!tracker.update("~~~~ {{toc}}\n"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_inline_code_not_a_fence() {
        let mut tracker = FenceTracker::new();

        assert!(!tracker.update("``{{toc}}`` text\n"));
        assert!(!tracker.in_fence());
    }
}
