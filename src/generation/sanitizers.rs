//! Text sanitizers for content copied from API definitions into generated code

use once_cell::sync::Lazy;
use regex::Regex;

static TYPOGRAPHIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse free text into one line that is safe inside a line comment of
/// every target language.
///
/// Typographic quotes and dashes become ASCII, whitespace runs (including
/// newlines) become a single space, and comment terminators are broken up.
pub fn doc_line(input: &str) -> String {
    let ascii = TYPOGRAPHIC.replace_all(input, |caps: &regex::Captures| match &caps[0] {
        "\u{2018}" | "\u{2019}" => "'",
        "\u{201C}" | "\u{201D}" => "\"",
        _ => "-",
    });
    let single = WHITESPACE.replace_all(ascii.trim(), " ");
    single.replace("*/", "* /")
}

/// First sentence of `doc_line(input)`, cut at `max` characters
pub fn summary_line(input: &str, max: usize) -> String {
    let line = doc_line(input);
    let sentence = match line.find(". ") {
        Some(end) => &line[..=end],
        None => line.as_str(),
    };
    if sentence.chars().count() <= max {
        return sentence.trim_end().to_string();
    }
    let cut: String = sentence.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
