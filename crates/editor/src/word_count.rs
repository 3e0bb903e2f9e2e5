//! Word counting for markup content

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Count whitespace-separated words in `markup`, ignoring tags.
///
/// Every tag is replaced by a single space first, so `a<br>b` counts as two.
pub fn count_words(markup: &str) -> usize {
    if markup.is_empty() {
        return 0;
    }
    let text = TAG.replace_all(markup, " ");
    text.split_whitespace().count()
}

/// "1 word" / "N words"
pub fn word_label(count: usize) -> String {
    if count == 1 {
        "1 word".to_string()
    } else {
        format!("{} words", count)
    }
}
