// ABOUTME: Record normalization for the create path.
// ABOUTME: Maps caller records (optionally through a ColumnMap) onto Channel and Item structs.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::FeedError;
use crate::models::{Channel, FeedDate, Item};

/// Translation table from canonical field name to the caller's field name.
pub type ColumnMap = HashMap<String, String>;

/// A generic caller-supplied record.
pub type Record = Map<String, Value>;

/// A fully assembled generation input: channel properties plus items,
/// built per call and consumed once by the generator.
#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    pub channel: Channel,
    pub items: Vec<Item>,
}

impl FeedDocument {
    /// Builds a document from separate properties and data arguments.
    pub fn from_parts(properties: &Record, data: &[Value], column_map: Option<&ColumnMap>) -> Self {
        let items = data
            .iter()
            .filter_map(Value::as_object)
            .map(|record| normalize_item(record, column_map))
            .collect();
        FeedDocument {
            channel: normalize_channel(properties),
            items,
        }
    }

    /// Builds a document from one pre-assembled structure carrying channel
    /// fields and a nested `items` sequence (the round-trip input). This is
    /// equivalent to, not different from, supplying properties + data.
    pub fn from_value(value: &Value) -> Result<Self, FeedError> {
        let record = value.as_object().ok_or_else(|| {
            FeedError::MissingProperty("feed structure must be a struct of channel fields".into())
        })?;

        // The structure may nest the channel under a "channel" key (the
        // shape `read` produces) or carry the fields at the top level.
        let channel_record = record
            .get("channel")
            .and_then(Value::as_object)
            .unwrap_or(record);

        let items = record
            .get("items")
            .and_then(Value::as_array)
            .map(|data| {
                data.iter()
                    .filter_map(Value::as_object)
                    .map(|r| normalize_item(r, None))
                    .collect()
            })
            .unwrap_or_default();

        Ok(FeedDocument {
            channel: normalize_channel(channel_record),
            items,
        })
    }
}

/// Resolves a canonical field against a record: an explicit canonical key
/// wins, then the ColumnMap translation, then the field is absent.
fn resolve<'a>(record: &'a Record, map: Option<&ColumnMap>, key: &str) -> Option<&'a Value> {
    if let Some(v) = record.get(key) {
        if !v.is_null() {
            return Some(v);
        }
    }
    let mapped = map?.get(key)?;
    record.get(mapped).filter(|v| !v.is_null())
}

/// Renders a scalar record value as field text.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn resolve_text(record: &Record, map: Option<&ColumnMap>, key: &str) -> String {
    resolve(record, map, key).map(text_of).unwrap_or_default()
}

/// Accepts either an already-typed timestamp string or loose date text;
/// unparsable strings are kept as literals so generation still proceeds.
fn resolve_date(record: &Record, map: Option<&ColumnMap>, key: &str) -> Option<FeedDate> {
    let raw = resolve_text(record, map, key);
    if raw.is_empty() {
        None
    } else {
        Some(FeedDate::parse(&raw))
    }
}

/// Splits a category value: a comma-delimited string becomes the ordered
/// sequence, an array is used as-is; the first entry doubles as `category`.
fn resolve_categories(record: &Record, map: Option<&ColumnMap>) -> Vec<String> {
    if let Some(v) = resolve(record, map, "categories").or_else(|| resolve(record, map, "category"))
    {
        match v {
            Value::Array(values) => values
                .iter()
                .map(text_of)
                .filter(|s| !s.is_empty())
                .collect(),
            other => text_of(other)
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    } else {
        Vec::new()
    }
}

/// Normalizes one generic record into an item, honoring the ColumnMap.
pub fn normalize_item(record: &Record, column_map: Option<&ColumnMap>) -> Item {
    let categories = resolve_categories(record, column_map);
    let category = categories.first().cloned().unwrap_or_default();
    Item {
        title: resolve_text(record, column_map, "title"),
        content: resolve_text(record, column_map, "content"),
        description: resolve_text(record, column_map, "description"),
        pub_date: resolve_date(record, column_map, "publishedDate"),
        updated: resolve_date(record, column_map, "updated"),
        link: resolve_text(record, column_map, "link"),
        author: resolve_text(record, column_map, "author"),
        category,
        categories,
        guid: resolve_text(record, column_map, "guid"),
        comments: resolve_text(record, column_map, "comments"),
        ..Item::default()
    }
}

/// Normalizes channel properties. The ColumnMap applies to item records
/// only; channel properties always use canonical names.
pub fn normalize_channel(record: &Record) -> Channel {
    Channel {
        title: resolve_text(record, None, "title"),
        description: resolve_text(record, None, "description"),
        link: resolve_text(record, None, "link"),
        language: resolve_text(record, None, "language"),
        author: resolve_text(record, None, "author"),
        published: resolve_date(record, None, "publishedDate"),
        itunes: None,
    }
}
