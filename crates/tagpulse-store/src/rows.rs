//! Flat table rows and their mapping to domain records.
//!
//! Column names follow the on-disk layout (`username`, `content`, `likes`,
//! `retweets`); entity lists are stored as one `", "`-joined string.

use serde::{Deserialize, Serialize};
use tagpulse_core::{PostRecord, ScoredPost, Sentiment};

const ENTITY_SEPARATOR: &str = ", ";

/// One row of the raw post table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRow {
    pub hashtag: String,
    pub username: String,
    pub timestamp: String,
    pub content: String,
    pub likes: u64,
    pub retweets: u64,
    #[serde(default)]
    pub mentions: String,
    #[serde(default)]
    pub hashtags: String,
}

/// One row of the scored post table.
///
/// Only `timestamp`, `content` and `keyword_score` are required to
/// aggregate; the other columns default when a table omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRow {
    #[serde(default)]
    pub hashtag: String,
    #[serde(default)]
    pub username: String,
    pub timestamp: String,
    pub content: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub mentions: String,
    #[serde(default)]
    pub hashtags: String,
    pub keyword_score: i64,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

fn join_entities(items: &[String]) -> String {
    items.join(ENTITY_SEPARATOR)
}

fn split_entities(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

impl From<&PostRecord> for PostRow {
    fn from(post: &PostRecord) -> Self {
        Self {
            hashtag: post.hashtag.clone(),
            username: post.author.clone(),
            timestamp: post.timestamp.clone(),
            content: post.body.clone(),
            likes: post.like_count,
            retweets: post.repost_count,
            mentions: join_entities(&post.mentions),
            hashtags: join_entities(&post.hashtags_found),
        }
    }
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            hashtag: row.hashtag,
            author: row.username,
            timestamp: row.timestamp,
            body: row.content,
            like_count: row.likes,
            repost_count: row.retweets,
            mentions: split_entities(&row.mentions),
            hashtags_found: split_entities(&row.hashtags),
        }
    }
}

impl From<&ScoredPost> for ScoredRow {
    fn from(scored: &ScoredPost) -> Self {
        let post = PostRow::from(&scored.post);
        Self {
            hashtag: post.hashtag,
            username: post.username,
            timestamp: post.timestamp,
            content: post.content,
            likes: post.likes,
            retweets: post.retweets,
            mentions: post.mentions,
            hashtags: post.hashtags,
            keyword_score: scored.keyword_score,
            sentiment: Some(scored.sentiment),
        }
    }
}

impl ScoredRow {
    /// Splits the row into its post, keyword score and optional label.
    #[must_use]
    pub fn into_parts(self) -> (PostRecord, i64, Option<Sentiment>) {
        let post = PostRow {
            hashtag: self.hashtag,
            username: self.username,
            timestamp: self.timestamp,
            content: self.content,
            likes: self.likes,
            retweets: self.retweets,
            mentions: self.mentions,
            hashtags: self.hashtags,
        };
        (post.into(), self.keyword_score, self.sentiment)
    }
}
