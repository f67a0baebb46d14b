//! Keyword-rule classifier and signed keyword scorer.
//!
//! Both use case-insensitive substring presence: a keyword counts once per
//! post no matter how often it appears, and `"short"` matches inside
//! `"shortly"`. The classifier and the scorer use different keyword lists.

use tagpulse_core::{PostRecord, ScoredPost, Sentiment};

/// Keywords the classifier treats as bullish.
pub(crate) const CLASSIFIER_BUY: &[&str] =
    &["buy", "bullish", "long", "breakout", "target", "support"];

/// Keywords the classifier treats as bearish.
pub(crate) const CLASSIFIER_SELL: &[&str] =
    &["sell", "bearish", "short", "resistance", "fall", "downside"];

/// Keywords that add one point to [`keyword_score`].
pub(crate) const SCORE_BUY: &[&str] = &["buy", "bullish", "long", "breakout", "target"];

/// Keywords that subtract one point from [`keyword_score`].
pub(crate) const SCORE_SELL: &[&str] = &["sell", "bearish", "short", "resistance", "fall"];

fn hits(lowered: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| lowered.contains(*k)).count()
}

/// Classifies a post body by comparing buy and sell keyword hits.
///
/// Ties, including no hits at all, are neutral.
#[must_use]
pub fn classify(body: &str) -> Sentiment {
    let lowered = body.to_lowercase();
    let buy = hits(&lowered, CLASSIFIER_BUY);
    let sell = hits(&lowered, CLASSIFIER_SELL);
    match buy.cmp(&sell) {
        std::cmp::Ordering::Greater => Sentiment::Buy,
        std::cmp::Ordering::Less => Sentiment::Sell,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Buy keywords present minus sell keywords present.
#[must_use]
// Both counts are bounded by the keyword list lengths.
#[allow(clippy::cast_possible_wrap)]
pub fn keyword_score(body: &str) -> i64 {
    let lowered = body.to_lowercase();
    hits(&lowered, SCORE_BUY) as i64 - hits(&lowered, SCORE_SELL) as i64
}

/// Attaches classifier sentiment and keyword score to one post.
#[must_use]
pub fn score_post(post: PostRecord) -> ScoredPost {
    let sentiment = classify(&post.body);
    let keyword_score = keyword_score(&post.body);
    ScoredPost {
        post,
        sentiment,
        keyword_score,
    }
}

/// Scores every post, preserving order.
#[must_use]
pub fn score_posts(posts: Vec<PostRecord>) -> Vec<ScoredPost> {
    let scored: Vec<ScoredPost> = posts.into_iter().map(score_post).collect();
    tracing::info!(posts = scored.len(), "scored posts");
    scored
}

/// Builds a [`ScoredPost`] from a stored row, classifying the body when the
/// row carries no sentiment label.
#[must_use]
pub fn with_sentiment(post: PostRecord, keyword_score: i64, sentiment: Option<Sentiment>) -> ScoredPost {
    let sentiment = sentiment.unwrap_or_else(|| classify(&post.body));
    ScoredPost {
        post,
        sentiment,
        keyword_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(body: &str) -> PostRecord {
        PostRecord {
            hashtag: "#nifty50".to_string(),
            author: "Alice".to_string(),
            timestamp: "2025-08-01T09:15:00.000Z".to_string(),
            body: body.to_string(),
            like_count: 0,
            repost_count: 0,
            mentions: Vec::new(),
            hashtags_found: Vec::new(),
        }
    }

    #[test]
    fn breakout_target_long_is_buy() {
        assert_eq!(classify("Nifty breakout, target 20000, go long"), Sentiment::Buy);
    }

    #[test]
    fn bearish_resistance_is_sell() {
        assert_eq!(
            classify("Bearish below resistance, expect a fall"),
            Sentiment::Sell
        );
    }

    #[test]
    fn no_keywords_is_neutral() {
        assert_eq!(classify("Markets open at 9:15"), Sentiment::Neutral);
        assert_eq!(classify(""), Sentiment::Neutral);
    }

    #[test]
    fn equal_hits_is_neutral() {
        assert_eq!(classify("buy the dip or sell the rip"), Sentiment::Neutral);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("BULLISH"), Sentiment::Buy);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        // One buy keyword repeated three times loses to two distinct sell keywords.
        assert_eq!(classify("buy buy buy, bearish, short"), Sentiment::Sell);
        assert_eq!(keyword_score("buy buy buy"), 1);
    }

    #[test]
    fn keywords_match_as_substrings() {
        assert_eq!(classify("will update shortly"), Sentiment::Sell);
        assert_eq!(keyword_score("nightfall"), -1);
    }

    #[test]
    fn support_counts_for_classifier_but_not_score() {
        assert_eq!(classify("holding support"), Sentiment::Buy);
        assert_eq!(keyword_score("holding support"), 0);
    }

    #[test]
    fn downside_counts_for_classifier_but_not_score() {
        assert_eq!(classify("more downside"), Sentiment::Sell);
        assert_eq!(keyword_score("more downside"), 0);
    }

    #[test]
    fn keyword_score_is_signed_difference() {
        assert_eq!(keyword_score("Nifty breakout, target 20000, go long"), 3);
        assert_eq!(keyword_score("bearish, sell into resistance"), -3);
    }

    #[test]
    fn classifier_is_deterministic() {
        let body = "long bias but watch resistance";
        let first = classify(body);
        for _ in 0..10 {
            assert_eq!(classify(body), first);
        }
    }

    #[test]
    fn score_posts_preserves_order() {
        let scored = score_posts(vec![post("go long"), post("sell now"), post("flat")]);
        let sentiments: Vec<_> = scored.iter().map(|s| s.sentiment).collect();
        assert_eq!(
            sentiments,
            vec![Sentiment::Buy, Sentiment::Sell, Sentiment::Neutral]
        );
        assert_eq!(scored[0].keyword_score, 1);
        assert_eq!(scored[1].keyword_score, -1);
    }

    #[test]
    fn with_sentiment_keeps_given_label() {
        let scored = with_sentiment(post("go long"), 5, Some(Sentiment::Sell));
        assert_eq!(scored.sentiment, Sentiment::Sell);
        assert_eq!(scored.keyword_score, 5);
    }

    #[test]
    fn with_sentiment_classifies_when_missing() {
        let scored = with_sentiment(post("go long"), 1, None);
        assert_eq!(scored.sentiment, Sentiment::Buy);
    }
}
