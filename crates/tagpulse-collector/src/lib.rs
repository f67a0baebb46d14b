//! Hashtag feed collection: drives a browser session through live search
//! results, extracts post records, and deduplicates them by content hash.

pub mod cancel;
pub mod collect;
pub mod count;
pub mod delay;
pub mod entities;
pub mod error;
pub mod hasher;
mod retry;
pub mod seen;
pub mod session;
pub mod webdriver;

pub use cancel::CancelToken;
pub use collect::{
    build_record, record_hash, CollectLimits, CollectionReport, Collector, HashtagCollection, HashtagSummary,
    StopReason,
};
pub use count::parse_count;
pub use delay::DelayPolicy;
pub use entities::extract_entities;
pub use error::CollectorError;
pub use hasher::{content_hash, ContentHash};
pub use seen::SeenSet;
pub use session::{FeedSession, RawPost};
pub use webdriver::{ElementRef, WebDriverConfig, WebDriverSession};
