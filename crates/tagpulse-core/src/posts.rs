use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder the feed extractor writes when an author or timestamp is absent.
pub const NOT_AVAILABLE: &str = "N/A";

/// One post observed in a hashtag feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Hashtag query the post was found under.
    pub hashtag: String,
    /// Raw author display text, or [`NOT_AVAILABLE`].
    pub author: String,
    /// Source-provided datetime string, or [`NOT_AVAILABLE`].
    pub timestamp: String,
    /// Extracted text with newlines flattened to spaces.
    pub body: String,
    pub like_count: u64,
    pub repost_count: u64,
    /// `@handle` mentions in order of appearance.
    pub mentions: Vec<String>,
    /// `#tag` tokens in order of appearance.
    pub hashtags_found: Vec<String>,
}

/// Keyword-rule stance of a post, also used as the daily trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Buy,
    Sell,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Buy => "buy",
            Sentiment::Sell => "sell",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Sentiment::Buy),
            "sell" => Ok(Sentiment::Sell),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment '{other}'")),
        }
    }
}

/// A post with its classifier sentiment and signed keyword score attached.
///
/// The two derived fields come from different keyword lists and may disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub post: PostRecord,
    pub sentiment: Sentiment,
    pub keyword_score: i64,
}

/// One row of the daily signal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySignal {
    pub date: NaiveDate,
    pub tweet_volume: usize,
    pub buy_pct: f64,
    pub sell_pct: f64,
    pub neutral_pct: f64,
    pub avg_keyword_score: f64,
    pub composite_score: f64,
    pub signal: Sentiment,
    pub confidence_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_round_trips_through_str() {
        for s in [Sentiment::Buy, Sentiment::Sell, Sentiment::Neutral] {
            assert_eq!(s.to_string().parse::<Sentiment>().unwrap(), s);
        }
    }

    #[test]
    fn sentiment_parse_is_case_insensitive() {
        assert_eq!(" BUY ".parse::<Sentiment>().unwrap(), Sentiment::Buy);
    }

    #[test]
    fn sentiment_parse_rejects_unknown() {
        assert!("hold".parse::<Sentiment>().is_err());
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Sell).unwrap();
        assert_eq!(json, "\"sell\"");
    }

    #[test]
    fn daily_signal_date_serializes_as_iso_date() {
        let row = DailySignal {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            tweet_volume: 0,
            buy_pct: 0.0,
            sell_pct: 0.0,
            neutral_pct: 0.0,
            avg_keyword_score: 0.0,
            composite_score: 0.0,
            signal: Sentiment::Neutral,
            confidence_pct: 0.0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date"], "2025-08-01");
        assert_eq!(json["signal"], "neutral");
    }
}
