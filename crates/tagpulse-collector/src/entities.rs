use std::sync::LazyLock;

use regex::Regex;

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("valid mention regex"));
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));

/// Extracts `@mentions` and `#hashtags` from post text, in order of appearance.
#[must_use]
pub fn extract_entities(text: &str) -> (Vec<String>, Vec<String>) {
    let mentions = MENTION_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    let hashtags = HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    (mentions, hashtags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_order() {
        let (mentions, hashtags) =
            extract_entities("@alice says #nifty50 up, cc @bob_99 #BankNifty");
        assert_eq!(mentions, vec!["@alice", "@bob_99"]);
        assert_eq!(hashtags, vec!["#nifty50", "#BankNifty"]);
    }

    #[test]
    fn repeated_entities_are_kept() {
        let (_, hashtags) = extract_entities("#nifty #nifty");
        assert_eq!(hashtags, vec!["#nifty", "#nifty"]);
    }

    #[test]
    fn bare_symbols_are_ignored() {
        let (mentions, hashtags) = extract_entities("email me @ home, # of lots");
        assert!(mentions.is_empty());
        assert!(hashtags.is_empty());
    }
}
