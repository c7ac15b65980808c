//! Well-known event type names for the mailing-list archive pipeline.
//!
//! Services are free to define further event types; these are the ones the
//! shipped pipeline stages exchange.

/// A raw archive (mbox or equivalent) has been fetched and stored.
pub const ARCHIVE_INGESTED: &str = "ArchiveIngested";

/// An ingested archive has been split into individual messages.
pub const MESSAGES_PARSED: &str = "MessagesParsed";

/// Embeddings have been generated for a parsed message batch.
pub const EMBEDDINGS_GENERATED: &str = "EmbeddingsGenerated";

/// A summarization run has been requested for a thread or digest window.
pub const SUMMARY_REQUESTED: &str = "SummaryRequested";

/// A summarization run has completed and its output is stored.
pub const SUMMARY_COMPLETED: &str = "SummaryCompleted";

/// The event types the shipped pipeline stages exchange.
pub fn well_known_event_types() -> &'static [&'static str] {
    &[
        ARCHIVE_INGESTED,
        MESSAGES_PARSED,
        EMBEDDINGS_GENERATED,
        SUMMARY_REQUESTED,
        SUMMARY_COMPLETED,
    ]
}
