//! Keyword-rule sentiment and daily signal aggregation for collected posts.
//!
//! Classifies each post body as buy, sell or neutral, attaches a signed
//! keyword score, and rolls scored posts up into one composite signal per
//! calendar day.

pub mod aggregate;
pub mod scorer;
pub mod timestamp;

pub use aggregate::{
    aggregate_daily, aggregate_group, signal_for_score, BUY_THRESHOLD, SELL_THRESHOLD,
    VOLUME_CAP,
};
pub use scorer::{classify, keyword_score, score_post, score_posts, with_sentiment};
pub use timestamp::post_date;
