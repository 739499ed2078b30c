use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// "retrie-\nval" -> "retrieval"
static BROKEN_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w)").expect("broken-word pattern is valid")
});

/// Cleans up raw page text from the PDF extractor.
///
/// Applies NFKC normalization (ligatures, full-width forms), rejoins words
/// hyphenated across a line break, collapses runs of spaces inside a line and
/// keeps at most one blank line between paragraphs.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    let joined = BROKEN_WORD.replace_all(&normalized, "$1$2");

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in joined.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(words.join(" "));
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs.join("\n\n")
}
