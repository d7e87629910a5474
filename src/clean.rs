//! Whitespace normalization applied to every extracted document before it
//! is written to `processed_dir`.

use regex::Regex;
use std::sync::LazyLock;

static TRAILING_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid regex"));
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static INLINE_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Normalize line endings, strip trailing blanks, collapse blank-line and
/// space runs, and trim the result.
///
/// The output never contains `\r`, never has more than one consecutive
/// blank line, and is a fixed point: `clean_text(&clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    // Trailing blanks go first so whitespace-only lines count as blank.
    let text = TRAILING_WS.replace_all(&text, "");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    let text = INLINE_WS.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(clean_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn collapses_blank_lines() {
        assert_eq!(clean_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        assert_eq!(clean_text("a\n  \n\t\n \nb"), "a\n\nb");
        assert_eq!(clean_text("a\n\n \n\nb"), "a\n\nb");
    }

    #[test]
    fn strips_trailing_and_collapses_inline_space() {
        assert_eq!(clean_text("Dose:   5 mg\t\t daily   \nnext"), "Dose: 5 mg daily\nnext");
    }

    #[test]
    fn trims_document_edges() {
        assert_eq!(clean_text("\n\n  Title\n\n"), "Title");
        assert_eq!(clean_text("   \r\n\t "), "");
    }

    #[test]
    fn keeps_single_leading_space_inside_lines() {
        assert_eq!(clean_text("a\n b"), "a\n b");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "x \r\n\r\n\r\n  y\t\tz  ",
            "  \n\n\n \t \n  a  b  \n\n\n",
            "Ünïcödé   text\r\rend",
        ];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", s);
            assert!(!once.contains("\n\n\n"));
            assert!(!once.contains('\r'));
        }
    }
}
