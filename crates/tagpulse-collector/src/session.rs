//! The browser-session seam the collection loop drives.

use async_trait::async_trait;

use crate::error::CollectorError;

/// Raw fields read from one rendered post container, before parsing.
///
/// Sub-fields that are absent from the container are `None`; only a failure
/// to read the container itself is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPost {
    /// Full inner text of the container.
    pub text: String,
    /// `datetime` attribute of the container's `<time>` element.
    pub timestamp: Option<String>,
    /// Display text of the author name element.
    pub author: Option<String>,
    /// Unparsed like-count label, e.g. `1.2K`.
    pub likes: Option<String>,
    /// Unparsed repost-count label.
    pub reposts: Option<String>,
}

/// A live, already-authenticated feed session.
///
/// Implementations own whatever browser connection they need; the collector
/// only ever drives one session from a single task.
#[async_trait]
pub trait FeedSession: Send {
    /// Opaque handle to one rendered post container.
    type Container: Send + Sync;

    /// Loads the live search feed for `hashtag`.
    async fn open_feed(&mut self, hashtag: &str) -> Result<(), CollectorError>;

    /// Advances the feed view by one scroll step.
    async fn scroll(&mut self) -> Result<(), CollectorError>;

    /// Enumerates the post containers currently rendered.
    async fn containers(&mut self) -> Result<Vec<Self::Container>, CollectorError>;

    /// Reads the raw fields of one container.
    async fn extract(&mut self, container: &Self::Container) -> Result<RawPost, CollectorError>;
}
