//! Code span detection and masking.
//!
//! Fenced blocks and inline code are swapped for placeholder tokens before
//! links or tags are scanned, then swapped back.

use regex::Regex;
use std::sync::LazyLock;

/// A range of bytes that is inside a fenced block or inline code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockRange {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line number where the code starts (1-indexed).
    pub start_line: usize,
    /// Line number where the code ends (1-indexed).
    pub end_line: usize,
    /// Whether this is a fenced code block (vs inline code).
    pub is_fenced: bool,
}

// Matches inline code - simple pattern for single backticks
static INLINE_CODE_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]+`").unwrap());

// Matches inline code with double backticks (can contain single backticks)
static INLINE_CODE_DOUBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"``(?:[^`]|`[^`])*``").unwrap());

/// Opening or closing fence: indentation, then a run of 3+ backticks or tildes.
fn fence_of(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    (len >= 3).then_some((ch, len))
}

fn is_closing_fence(line: &str, ch: char, len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= len && trimmed.chars().all(|c| c == ch)
}

/// Find all fenced block and inline code ranges in content.
///
/// A fence without a closing line is not a code block.
pub fn find_code_block_ranges(content: &str) -> Vec<CodeBlockRange> {
    let mut ranges = Vec::new();

    // (fence char, fence length, start offset, start line)
    let mut open: Option<(char, usize, usize, usize)> = None;
    let mut offset = 0;

    for (idx, raw_line) in content.split_inclusive('\n').enumerate() {
        let line_num = idx + 1;
        let line = raw_line.trim_end_matches(['\n', '\r']);

        match open {
            None => {
                if let Some((ch, len)) = fence_of(line) {
                    open = Some((ch, len, offset, line_num));
                }
            }
            Some((ch, len, start, start_line)) => {
                if is_closing_fence(line, ch, len) {
                    ranges.push(CodeBlockRange {
                        start,
                        end: offset + line.len(),
                        start_line,
                        end_line: line_num,
                        is_fenced: true,
                    });
                    open = None;
                }
            }
        }

        offset += raw_line.len();
    }

    // Find inline code (but not inside fenced blocks)
    for m in INLINE_CODE_DOUBLE.find_iter(content) {
        let (start, end) = (m.start(), m.end());
        if ranges.iter().any(|r| overlaps(r, start, end)) {
            continue;
        }
        ranges.push(inline_range(content, start, end));
    }

    for m in INLINE_CODE_SINGLE.find_iter(content) {
        let (start, end) = (m.start(), m.end());
        if ranges.iter().any(|r| overlaps(r, start, end)) {
            continue;
        }
        ranges.push(inline_range(content, start, end));
    }

    ranges.sort_by_key(|r| r.start);
    ranges
}

fn overlaps(range: &CodeBlockRange, start: usize, end: usize) -> bool {
    start < range.end && end > range.start
}

fn inline_range(content: &str, start: usize, end: usize) -> CodeBlockRange {
    CodeBlockRange {
        start,
        end,
        start_line: content[..start].matches('\n').count() + 1,
        end_line: content[..end].matches('\n').count() + 1,
        is_fenced: false,
    }
}

/// Check if a line number is inside any fenced code block.
pub fn is_line_in_fenced_code_block(line: usize, ranges: &[CodeBlockRange]) -> bool {
    ranges
        .iter()
        .any(|r| r.is_fenced && line >= r.start_line && line <= r.end_line)
}

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

fn token(index: usize) -> String {
    format!("{}{}{}", TOKEN_OPEN, index, TOKEN_CLOSE)
}

/// Text with its code spans replaced by indexed placeholder tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// The masked text.
    pub text: String,
    /// Original code spans; slot `i` replaces token `i`.
    pub slots: Vec<String>,
}

impl MaskedText {
    /// Put the code spans back into `text` (the masked text or any string
    /// derived from it).
    pub fn restore(&self, text: &str) -> String {
        if self.slots.is_empty() {
            return text.to_string();
        }
        let mut out = text.to_string();
        for (idx, slot) in self.slots.iter().enumerate().rev() {
            out = out.replace(&token(idx), slot);
        }
        out
    }
}

/// Reversible masking of code spans.
pub struct CodeMasker;

impl CodeMasker {
    /// Replace every fenced block and inline code span with a placeholder.
    pub fn mask(content: &str) -> MaskedText {
        let ranges = find_code_block_ranges(content);
        let mut text = String::with_capacity(content.len());
        let mut slots = Vec::with_capacity(ranges.len());
        let mut last = 0;

        for range in ranges {
            text.push_str(&content[last..range.start]);
            text.push_str(&token(slots.len()));
            slots.push(content[range.start..range.end].to_string());
            last = range.end;
        }
        text.push_str(&content[last..]);

        MaskedText { text, slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_code_block() {
        let content = r#"Some text

```rust
let x = [[not a link]];
```

More text"#;

        let ranges = find_code_block_ranges(content);
        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].is_fenced);
        assert_eq!(ranges[0].start_line, 3);
        assert_eq!(ranges[0].end_line, 5);
    }

    #[test]
    fn test_empty_fenced_block() {
        let ranges = find_code_block_ranges("```\n```\nafter");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].end, 7);
    }

    #[test]
    fn test_indented_fence() {
        let content = "- item\n  ```\n  #not-a-tag\n  ```\n";
        let ranges = find_code_block_ranges(content);
        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].is_fenced);
    }

    #[test]
    fn test_unclosed_fence_is_not_code() {
        let ranges = find_code_block_ranges("```\nnever closed [[Link]]");
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_inline_code() {
        let content = "Some `inline [[code]]` here";
        let ranges = find_code_block_ranges(content);
        assert_eq!(ranges.len(), 1);
        assert!(!ranges[0].is_fenced);
    }

    #[test]
    fn test_double_backtick_inline() {
        let content = "Some ``inline `code` with backticks`` here";
        let ranges = find_code_block_ranges(content);
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn test_tilde_and_backtick_blocks() {
        let content = "```\nouter\n```\n\ntext\n\n~~~\ninner\n~~~";
        let ranges = find_code_block_ranges(content);
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn test_mask_hides_code() {
        let content = "a `[[x]]` b\n```\n#tag\n```\nc";
        let masked = CodeMasker::mask(content);
        assert_eq!(masked.slots.len(), 2);
        assert!(!masked.text.contains("[[x]]"));
        assert!(!masked.text.contains("#tag"));
        assert_eq!(masked.restore(&masked.text), content);
    }

    #[test]
    fn test_restore_after_edit() {
        let masked = CodeMasker::mask("x `y` z");
        let edited = masked.text.replace('x', "X");
        assert_eq!(masked.restore(&edited), "X `y` z");
    }

    #[test]
    fn test_restore_many_slots() {
        // Twelve spans so token 1 and token 10 coexist
        let content: String = (0..12).map(|i| format!("`c{}` ", i)).collect();
        let masked = CodeMasker::mask(&content);
        assert_eq!(masked.slots.len(), 12);
        assert_eq!(masked.restore(&masked.text), content);
    }
}
