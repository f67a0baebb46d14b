//! Daily composite signal over scored posts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tagpulse_core::{DailySignal, ScoredPost, Sentiment};

use crate::timestamp::post_date;

/// Composite scores strictly above this are a buy signal.
pub const BUY_THRESHOLD: f64 = 0.65;
/// Composite scores strictly below this are a sell signal.
pub const SELL_THRESHOLD: f64 = 0.35;
/// Daily volume at which the volume term saturates.
pub const VOLUME_CAP: f64 = 500.0;

const BUY_WEIGHT: f64 = 0.5;
const KEYWORD_WEIGHT: f64 = 0.3;
const VOLUME_WEIGHT: f64 = 0.2;
/// Average keyword score that maps to a full keyword term.
const KEYWORD_SCALE: f64 = 5.0;

/// Maps a composite score to a signal. Both thresholds are exclusive.
#[must_use]
pub fn signal_for_score(score: f64) -> Sentiment {
    if score > BUY_THRESHOLD {
        Sentiment::Buy
    } else if score < SELL_THRESHOLD {
        Sentiment::Sell
    } else {
        Sentiment::Neutral
    }
}

/// Rounds to `decimals` places, breaking exact ties to the even digit.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Computes one day's signal from the posts dated on it.
///
/// An empty group yields zeros and a neutral signal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_group(date: NaiveDate, posts: &[&ScoredPost]) -> DailySignal {
    let volume = posts.len();
    if volume == 0 {
        return DailySignal {
            date,
            tweet_volume: 0,
            buy_pct: 0.0,
            sell_pct: 0.0,
            neutral_pct: 0.0,
            avg_keyword_score: 0.0,
            composite_score: 0.0,
            signal: Sentiment::Neutral,
            confidence_pct: 0.0,
        };
    }

    let count = |s: Sentiment| posts.iter().filter(|p| p.sentiment == s).count() as f64;
    let total = volume as f64;
    let buy_pct = count(Sentiment::Buy) / total;
    let sell_pct = count(Sentiment::Sell) / total;
    let neutral_pct = count(Sentiment::Neutral) / total;
    let avg_keyword = posts.iter().map(|p| p.keyword_score as f64).sum::<f64>() / total;

    let composite = BUY_WEIGHT * buy_pct
        + KEYWORD_WEIGHT * (avg_keyword / KEYWORD_SCALE)
        + VOLUME_WEIGHT * (total / VOLUME_CAP).min(1.0);

    DailySignal {
        date,
        tweet_volume: volume,
        buy_pct: round_to(buy_pct, 3),
        sell_pct: round_to(sell_pct, 3),
        neutral_pct: round_to(neutral_pct, 3),
        avg_keyword_score: round_to(avg_keyword, 2),
        composite_score: round_to(composite, 3),
        signal: signal_for_score(composite),
        confidence_pct: round_to(composite * 100.0, 1),
    }
}

/// Groups posts by calendar day and computes each day's signal.
///
/// Posts whose timestamp cannot be dated are excluded. Rows come back sorted
/// by date ascending.
#[must_use]
pub fn aggregate_daily(posts: &[ScoredPost]) -> Vec<DailySignal> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&ScoredPost>> = BTreeMap::new();
    let mut undated = 0usize;

    for post in posts {
        match post_date(&post.post.timestamp) {
            Some(day) => by_day.entry(day).or_default().push(post),
            None => undated += 1,
        }
    }

    if undated > 0 {
        tracing::warn!(undated, "dropped posts with unparseable timestamps");
    }

    let rows: Vec<DailySignal> = by_day
        .iter()
        .map(|(day, group)| aggregate_group(*day, group))
        .collect();
    tracing::info!(posts = posts.len(), days = rows.len(), "aggregated daily signals");
    rows
}
