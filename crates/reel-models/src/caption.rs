//! Caption text normalization.

/// Normalize free caption text for rendering.
///
/// Line breaks (`\r\n`, `\n`, `\r`) become spaces and any run of whitespace
/// collapses to a single space. Leading and trailing whitespace is dropped.
pub fn normalize_caption(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a caption for list display, appending an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_newlines_and_spaces() {
        assert_eq!(normalize_caption("Hello   world\n"), "Hello world");
        assert_eq!(normalize_caption("a\r\nb\rc\nd"), "a b c d");
        assert_eq!(normalize_caption("  \t tabs\tand  spaces "), "tabs and spaces");
    }

    #[test]
    fn test_blank_caption_is_empty() {
        assert_eq!(normalize_caption(""), "");
        assert_eq!(normalize_caption(" \n\r\n "), "");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
        assert_eq!(preview("a longer caption", 8), "a longer…");
    }
}
