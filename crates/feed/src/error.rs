// ABOUTME: Error types for feed read and create operations.
// ABOUTME: Provides the FeedError enum covering dialect, fetch, and create-precondition failures.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while reading or creating a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The document root matches none of the supported feed grammars.
    #[error("unsupported feed dialect: {0}")]
    UnsupportedDialect(String),

    /// The document is not well-formed XML or has no parseable root.
    #[error("malformed feed: {0}")]
    Malformed(String),

    /// The fetch did not complete within the configured timeout.
    #[error("fetch timed out: {0}")]
    FetchTimeout(String),

    /// Network or file I/O failure while fetching or writing.
    #[error("fetch failed: {0}")]
    FetchIo(String),

    /// A required channel property (title, description, link) is absent.
    #[error("missing required feed property: {0}")]
    MissingProperty(String),

    /// The item data for a create call is absent or not a sequence.
    #[error("missing feed data: {0}")]
    MissingData(String),

    /// XML serialization failed while generating output.
    #[error("failed to generate feed XML: {0}")]
    Generate(String),
}

impl FeedError {
    /// Creates a Malformed error from an underlying XML error.
    pub fn malformed(err: impl fmt::Display) -> Self {
        FeedError::Malformed(err.to_string())
    }

    /// Creates a FetchIo error with a custom message.
    pub fn io(err: impl fmt::Display) -> Self {
        FeedError::FetchIo(err.to_string())
    }

    /// Creates a Generate error from an underlying writer error.
    pub fn generate(err: impl fmt::Display) -> Self {
        FeedError::Generate(err.to_string())
    }
}
