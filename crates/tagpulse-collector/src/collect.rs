//! Scroll/extract loop and multi-hashtag orchestration.

use tagpulse_core::{PostRecord, NOT_AVAILABLE};

use crate::cancel::CancelToken;
use crate::count::parse_count;
use crate::delay::DelayPolicy;
use crate::entities::extract_entities;
use crate::error::CollectorError;
use crate::hasher::{content_hash, ContentHash};
use crate::seen::SeenSet;
use crate::session::{FeedSession, RawPost};

/// Volume and scroll budgets for one hashtag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectLimits {
    /// Maximum unique posts retained per hashtag.
    pub max_posts: usize,
    /// Maximum scroll iterations per hashtag.
    pub max_scrolls: usize,
}

impl Default for CollectLimits {
    fn default() -> Self {
        Self {
            max_posts: 2000,
            max_scrolls: 150,
        }
    }
}

/// Why a hashtag's scroll loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `max_posts` unique records were retained.
    ReachedCap,
    /// `max_scrolls` iterations ran without reaching the cap.
    ScrollBudgetExhausted,
    Cancelled,
    /// The feed could not be opened or stopped responding; records gathered
    /// before the failure are kept.
    Failed(String),
}

/// Result of collecting one hashtag.
#[derive(Debug, Clone)]
pub struct HashtagCollection {
    pub hashtag: String,
    pub records: Vec<PostRecord>,
    pub scrolls: usize,
    pub duplicates_skipped: usize,
    pub extraction_failures: usize,
    pub stop: StopReason,
}

impl HashtagCollection {
    fn empty(hashtag: &str, stop: StopReason) -> Self {
        Self {
            hashtag: hashtag.to_string(),
            records: Vec::new(),
            scrolls: 0,
            duplicates_skipped: 0,
            extraction_failures: 0,
            stop,
        }
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        matches!(self.stop, StopReason::Failed(_))
    }
}

/// Summary of a multi-hashtag run with the merged records.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    /// Records from all hashtags in visit order, unique by content hash.
    pub records: Vec<PostRecord>,
    /// Per-hashtag outcomes, records moved out into [`Self::records`].
    pub hashtags: Vec<HashtagSummary>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagSummary {
    pub hashtag: String,
    pub collected: usize,
    pub scrolls: usize,
    pub duplicates_skipped: usize,
    pub extraction_failures: usize,
    pub stop: StopReason,
}

impl HashtagSummary {
    #[must_use]
    pub fn failed(&self) -> bool {
        matches!(self.stop, StopReason::Failed(_))
    }
}

impl CollectionReport {
    #[must_use]
    pub fn failed_hashtags(&self) -> usize {
        self.hashtags
            .iter()
            .filter(|h| h.failed())
            .count()
    }
}

/// Dedup key of a container, or `None` when it has no visible text.
#[must_use]
pub fn record_hash(raw: &RawPost) -> Option<ContentHash> {
    if raw.text.trim().is_empty() {
        return None;
    }
    Some(content_hash(
        raw.author.as_deref().unwrap_or(NOT_AVAILABLE),
        raw.timestamp.as_deref().unwrap_or(NOT_AVAILABLE),
        &raw.text,
    ))
}

/// Turns raw container fields into a record plus its dedup key.
///
/// Returns `None` for containers with no visible text. Missing author or
/// timestamp become [`NOT_AVAILABLE`]; unreadable counts become `0`.
#[must_use]
pub fn build_record(hashtag: &str, raw: &RawPost) -> Option<(ContentHash, PostRecord)> {
    let hash = record_hash(raw)?;
    let (mentions, hashtags_found) = extract_entities(&raw.text);

    let record = PostRecord {
        hashtag: hashtag.to_string(),
        author: raw
            .author
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        timestamp: raw
            .timestamp
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        body: raw.text.replace('\n', " "),
        like_count: raw.likes.as_deref().map_or(0, parse_count),
        repost_count: raw.reposts.as_deref().map_or(0, parse_count),
        mentions,
        hashtags_found,
    };

    Some((hash, record))
}

/// Drives a [`FeedSession`] through hashtag feeds under a scroll and volume budget.
pub struct Collector<S> {
    session: S,
    delay: DelayPolicy,
    limits: CollectLimits,
    cancel: CancelToken,
}

impl<S: FeedSession> Collector<S> {
    #[must_use]
    pub fn new(session: S, delay: DelayPolicy, limits: CollectLimits, cancel: CancelToken) -> Self {
        Self {
            session,
            delay,
            limits,
            cancel,
        }
    }

    /// Hands the session back, e.g. so the caller can close it.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Collects all `hashtags` sequentially against one session and one seen set.
    ///
    /// A post seen under several hashtags is retained once, attributed to the
    /// first hashtag that observed it. Per-hashtag failures are logged and the
    /// next hashtag proceeds.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::NoDataCollected`] if no records were retained at all.
    /// - [`CollectorError::Cancelled`] if cancelled before anything was retained.
    pub async fn collect_all(
        &mut self,
        hashtags: &[String],
        seen: &mut SeenSet,
    ) -> Result<CollectionReport, CollectorError> {
        let mut records = Vec::new();
        let mut summaries = Vec::with_capacity(hashtags.len());
        let mut cancelled = false;

        for tag in hashtags {
            if self.cancel.is_cancelled() {
                tracing::warn!(hashtag = %tag, "cancelled before hashtag; stopping run");
                cancelled = true;
                break;
            }

            tracing::info!(hashtag = %tag, "searching");
            let collection = self.collect_hashtag(tag, seen).await;

            match &collection.stop {
                StopReason::Failed(reason) => tracing::error!(
                    hashtag = %tag,
                    kept = collection.records.len(),
                    error = %reason,
                    "hashtag collection failed"
                ),
                stop => tracing::info!(
                    hashtag = %tag,
                    collected = collection.records.len(),
                    scrolls = collection.scrolls,
                    duplicates = collection.duplicates_skipped,
                    failures = collection.extraction_failures,
                    stop = ?stop,
                    "hashtag collection finished"
                ),
            }

            if collection.stop == StopReason::Cancelled {
                cancelled = true;
            }

            summaries.push(HashtagSummary {
                hashtag: collection.hashtag,
                collected: collection.records.len(),
                scrolls: collection.scrolls,
                duplicates_skipped: collection.duplicates_skipped,
                extraction_failures: collection.extraction_failures,
                stop: collection.stop,
            });
            records.extend(collection.records);

            if cancelled {
                break;
            }
        }

        let report = CollectionReport {
            records,
            hashtags: summaries,
            cancelled,
        };

        if report.records.is_empty() {
            if report.cancelled {
                return Err(CollectorError::Cancelled);
            }
            tracing::error!(
                attempted = report.hashtags.len(),
                failed = report.failed_hashtags(),
                "no posts collected across all hashtags"
            );
            return Err(CollectorError::NoDataCollected {
                attempted: report.hashtags.len(),
                failed: report.failed_hashtags(),
            });
        }

        Ok(report)
    }

    /// Opens the feed for `hashtag` and runs the scroll loop.
    ///
    /// Never returns an error: a failure to open or advance the feed is
    /// reported through [`StopReason::Failed`] with whatever was gathered.
    pub async fn collect_hashtag(&mut self, hashtag: &str, seen: &mut SeenSet) -> HashtagCollection {
        if let Err(e) = self.session.open_feed(hashtag).await {
            return HashtagCollection::empty(hashtag, StopReason::Failed(e.to_string()));
        }
        self.scroll_loop(hashtag, seen).await
    }

    async fn scroll_loop(&mut self, hashtag: &str, seen: &mut SeenSet) -> HashtagCollection {
        let mut out = HashtagCollection::empty(hashtag, StopReason::ScrollBudgetExhausted);

        if self.limits.max_posts == 0 {
            out.stop = StopReason::ReachedCap;
            return out;
        }

        for scroll in 1..=self.limits.max_scrolls {
            if self.cancel.is_cancelled() {
                out.stop = StopReason::Cancelled;
                return out;
            }

            if let Err(e) = self.session.scroll().await {
                out.stop = StopReason::Failed(e.to_string());
                return out;
            }
            out.scrolls = scroll;
            self.delay.wait().await;

            let containers = match self.session.containers().await {
                Ok(c) => c,
                Err(e) => {
                    out.stop = StopReason::Failed(e.to_string());
                    return out;
                }
            };
            tracing::info!(
                hashtag,
                scroll,
                containers = containers.len(),
                "scroll step"
            );

            for container in &containers {
                let raw = match self.session.extract(container).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        out.extraction_failures += 1;
                        tracing::warn!(hashtag, scroll, error = %e, "skipped post container");
                        continue;
                    }
                };

                let Some(hash) = record_hash(&raw) else {
                    continue;
                };
                if !seen.insert(hash) {
                    out.duplicates_skipped += 1;
                    continue;
                }
                // Only posts not seen before are turned into records.
                if let Some((_, record)) = build_record(hashtag, &raw) {
                    out.records.push(record);
                }

                if out.records.len() % 100 == 0 {
                    tracing::info!(hashtag, collected = out.records.len(), "collection progress");
                }

                if out.records.len() >= self.limits.max_posts {
                    tracing::info!(
                        hashtag,
                        max_posts = self.limits.max_posts,
                        "reached max posts limit"
                    );
                    out.stop = StopReason::ReachedCap;
                    return out;
                }
            }
        }

        out
    }
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
