// ABOUTME: The read and create operations tying fetch, parse, filter, and generate together.
// ABOUTME: Routes parse results to the requested output destinations and handles file writes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};

use crate::dialect::FeedType;
use crate::error::FeedError;
use crate::fetch::{fetch_source, FetchOptions};
use crate::filter::{apply_filter, ItemPredicate};
use crate::generator::generate;
use crate::normalize::{ColumnMap, FeedDocument};
use crate::parser::parse_feed_bytes;

/// Options for one read call: where to fetch from, how to trim the item
/// sequence, and which output destinations to populate.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub source: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub max_items: Option<usize>,
    /// Compatibility toggles; the extension sub-parsers actually run on
    /// namespace presence, so these never disable anything.
    pub itunes: bool,
    pub media_rss: bool,
    pub want_result: bool,
    pub want_metadata: bool,
    pub want_items: bool,
    pub want_xml: bool,
    pub output_file: Option<PathBuf>,
    pub overwrite: bool,
}

impl ReadOptions {
    pub fn new(source: impl Into<String>) -> Self {
        let fetch_defaults = FetchOptions::default();
        ReadOptions {
            source: source.into(),
            timeout: fetch_defaults.timeout,
            user_agent: fetch_defaults.user_agent,
            max_items: None,
            itunes: true,
            media_rss: true,
            want_result: false,
            want_metadata: false,
            want_items: false,
            want_xml: false,
            output_file: None,
            overwrite: false,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Requests the full `{channel, items}` structure.
    pub fn result(mut self) -> Self {
        self.want_result = true;
        self
    }

    /// Backward-compatible alias for [`ReadOptions::result`].
    pub fn name(self) -> Self {
        self.result()
    }

    /// Requests the metadata-only structure (channel fields, no items key).
    pub fn metadata(mut self) -> Self {
        self.want_metadata = true;
        self
    }

    /// Requests the items-only sequence.
    pub fn items(mut self) -> Self {
        self.want_items = true;
        self
    }

    /// Backward-compatible alias for [`ReadOptions::items`].
    pub fn query(self) -> Self {
        self.items()
    }

    /// Requests the raw XML of the fetched document, verbatim.
    pub fn xml(mut self) -> Self {
        self.want_xml = true;
        self
    }

    pub fn output_file(mut self, path: impl Into<PathBuf>, overwrite: bool) -> Self {
        self.output_file = Some(path.into());
        self.overwrite = overwrite;
        self
    }
}

/// Populated read destinations. Exactly the requested ones are set.
#[derive(Debug, Clone, Default)]
pub struct ReadOutput {
    pub result: Option<Value>,
    pub metadata: Option<Value>,
    pub items: Option<Value>,
    pub xml: Option<String>,
    pub skipped_items: u32,
}

/// Fetches, parses, filters, and routes a feed in one synchronous call.
///
/// All requested destinations are populated from the same single parse;
/// requesting none is legal and leaves only the file-write side effect.
pub fn read(opts: &ReadOptions, predicate: Option<ItemPredicate<'_>>) -> Result<ReadOutput, FeedError> {
    let fetch_opts = FetchOptions {
        timeout: opts.timeout,
        user_agent: opts.user_agent.clone(),
    };
    let bytes = fetch_source(&opts.source, &fetch_opts)?;

    let parsed = parse_feed_bytes(&bytes)?;
    let items = apply_filter(parsed.items, predicate, opts.max_items);

    let mut output = ReadOutput {
        skipped_items: parsed.skipped_items,
        ..ReadOutput::default()
    };

    if opts.want_result {
        output.result = Some(json!({
            "channel": parsed.channel,
            "items": items,
        }));
    }
    if opts.want_metadata {
        output.metadata = Some(serde_json::to_value(&parsed.channel).map_err(FeedError::generate)?);
    }
    if opts.want_items {
        output.items = Some(serde_json::to_value(&items).map_err(FeedError::generate)?);
    }
    if opts.want_xml {
        output.xml = Some(String::from_utf8_lossy(&bytes).into_owned());
    }
    if let Some(ref path) = opts.output_file {
        write_output_file(path, &bytes, opts.overwrite)?;
    }

    Ok(output)
}

/// Options for one create call: either properties + data (+ columnMap) or
/// a single pre-assembled structure, plus the output grammar and routing.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub properties: Option<Value>,
    pub data: Option<Value>,
    /// A pre-assembled structure with channel fields and nested items,
    /// equivalent to supplying properties + data.
    pub name: Option<Value>,
    pub column_map: Option<ColumnMap>,
    pub feed_type: FeedType,
    pub escape_chars: bool,
    pub output_file: Option<PathBuf>,
    pub overwrite: bool,
}

/// Normalizes the caller input and generates feed XML.
///
/// Fails with `MissingProperty` / `MissingData` before any XML is emitted
/// when the required inputs are absent; writes the output file only after
/// generation succeeds.
pub fn create(opts: &CreateOptions) -> Result<String, FeedError> {
    let document = build_document(opts)?;
    let xml = generate(
        &document.channel,
        &document.items,
        opts.feed_type,
        opts.escape_chars,
    )?;

    if let Some(ref path) = opts.output_file {
        write_output_file(path, xml.as_bytes(), opts.overwrite)?;
    }

    Ok(xml)
}

fn build_document(opts: &CreateOptions) -> Result<FeedDocument, FeedError> {
    if let Some(ref value) = opts.name {
        return FeedDocument::from_value(value);
    }

    let properties = opts
        .properties
        .as_ref()
        .and_then(Value::as_object)
        .ok_or_else(|| {
            FeedError::MissingProperty(
                "create requires properties (or a pre-assembled feed structure)".into(),
            )
        })?;

    // An empty array of zero items is valid; a missing or non-sequence
    // data argument is not.
    let data = opts
        .data
        .as_ref()
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FeedError::MissingData("create requires a data sequence of item records".into())
        })?;

    Ok(FeedDocument::from_parts(
        properties,
        data,
        opts.column_map.as_ref(),
    ))
}

/// Writes bytes to a destination path, honoring the overwrite flag.
fn write_output_file(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), FeedError> {
    if path.exists() && !overwrite {
        return Err(FeedError::FetchIo(format!(
            "refusing to overwrite existing file: {}",
            path.display()
        )));
    }
    std::fs::write(path, bytes).map_err(FeedError::io)
}
