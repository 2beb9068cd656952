// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod collect;
pub mod config;
pub mod dedup;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod relevance;
pub mod report;
pub mod sentiment;
pub mod store;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{summarize, Summary};
pub use crate::config::TriageConfig;
pub use crate::dedup::SeenKeys;
pub use crate::error::TriageError;
pub use crate::model::{OpinionItem, Platform, RawPost, Sentiment, SentimentLabel};
pub use crate::pipeline::{PipelineOutput, RejectReason, TriagePipeline};
