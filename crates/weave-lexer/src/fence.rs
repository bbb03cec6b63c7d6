//! Code fence detection.
//!
//! Code fences in `CommonMark` can use backticks or tildes (three or more).
//! The closing fence must use the same character and be at least as long
//! as the opening fence.

/// An opened code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenFence {
    /// Character used for the fence (backtick or tilde).
    fence_char: char,
    /// Length of the opening fence (minimum length for closing).
    fence_len: usize,
    /// Info string after the fence characters.
    pub(crate) info: String,
}

impl OpenFence {
    /// Detect if a line opens a code fence.
    pub(crate) fn detect(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let fence_char = trimmed.chars().next()?;
        if fence_char != '`' && fence_char != '~' {
            return None;
        }

        let fence_len = trimmed.chars().take_while(|&c| c == fence_char).count();
        if fence_len < 3 {
            return None;
        }

        let info = trimmed[fence_len..].trim();
        // Backtick fences cannot carry backticks in their info string
        if fence_char == '`' && info.contains('`') {
            return None;
        }

        Some(Self {
            fence_char,
            fence_len,
            info: info.to_owned(),
        })
    }

    /// Check if a line is a valid closing fence for this fence.
    ///
    /// The closing fence must use the same character, be at least as long as
    /// the opening, and contain only fence characters and trailing whitespace.
    pub(crate) fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let count = trimmed
            .chars()
            .take_while(|&c| c == self.fence_char)
            .count();
        if count < self.fence_len {
            return false;
        }

        trimmed[count..].chars().all(char::is_whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence() {
        let fence = OpenFence::detect("```rust").unwrap();
        assert_eq!(fence.info, "rust");
        assert!(!fence.is_closed_by("fn main() {}"));
        assert!(fence.is_closed_by("```"));
    }

    #[test]
    fn test_tilde_fence() {
        let fence = OpenFence::detect("~~~python").unwrap();
        assert!(!fence.is_closed_by("print('hello')"));
        assert!(fence.is_closed_by("~~~"));
    }

    #[test]
    fn test_longer_closing_fence() {
        let fence = OpenFence::detect("```").unwrap();
        assert!(fence.is_closed_by("````"));
    }

    #[test]
    fn test_shorter_fence_not_closing() {
        let fence = OpenFence::detect("````").unwrap();
        assert!(!fence.is_closed_by("```"));
        assert!(fence.is_closed_by("````"));
    }

    #[test]
    fn test_mixed_fence_chars() {
        let fence = OpenFence::detect("```").unwrap();
        assert!(!fence.is_closed_by("~~~"));
    }

    #[test]
    fn test_indented_fence() {
        let fence = OpenFence::detect("   ```rust").unwrap();
        assert_eq!(fence.info, "rust");
        assert!(fence.is_closed_by("  ```"));
    }

    #[test]
    fn test_closing_fence_with_trailing_text_is_content() {
        let fence = OpenFence::detect("```").unwrap();
        assert!(!fence.is_closed_by("``` not a close"));
        assert!(fence.is_closed_by("```  \n"));
    }

    #[test]
    fn test_two_backticks_not_fence() {
        assert_eq!(OpenFence::detect("``inline code``"), None);
    }

    #[test]
    fn test_backtick_info_with_backtick_not_fence() {
        assert_eq!(OpenFence::detect("```foo`bar"), None);
    }

    #[test]
    fn test_regular_line_no_fence() {
        assert_eq!(OpenFence::detect("This is a regular line"), None);
        assert_eq!(OpenFence::detect(""), None);
    }
}
