//! Text helpers for log lines and console output.

/// Single-line preview of at most `max_chars` characters.
///
/// Newlines are folded into spaces; an ellipsis marks truncation.
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat: String = s
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if flat.chars().count() <= max_chars {
        return flat;
    }

    let kept: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("CMD:LIST", 20), "CMD:LIST");
    }

    #[test]
    fn test_preview_folds_newlines() {
        assert_eq!(preview("Sure.\nCMD:LIST\n", 40), "Sure. CMD:LIST");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("hello world", 8), "hello...");
        assert_eq!(preview("日本語テキスト", 5), "日本...");
    }
}
