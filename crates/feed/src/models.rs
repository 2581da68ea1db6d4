// ABOUTME: Dialect-independent data model for parsed and generated feeds.
// ABOUTME: Defines Channel, Item, extension blocks, FeedDate, and the ParsedFeed result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_parse::parse_flexible_time;

/// A date value that is either a parsed timestamp or the original
/// unparsable text, kept verbatim so one bad date never aborts a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedDate {
    Timestamp(DateTime<Utc>),
    Literal(String),
}

impl FeedDate {
    /// Parses a date string with the flexible parser, falling back to the
    /// literal text when no known format matches.
    pub fn parse(s: &str) -> FeedDate {
        match parse_flexible_time(s) {
            Some(dt) => FeedDate::Timestamp(dt),
            None => FeedDate::Literal(s.to_string()),
        }
    }

    /// RFC 2822 rendering for RSS 2.0 output; literals pass through.
    pub fn to_rfc2822(&self) -> String {
        match self {
            FeedDate::Timestamp(dt) => dt.to_rfc2822(),
            FeedDate::Literal(s) => s.clone(),
        }
    }

    /// RFC 3339 rendering for Atom output; literals pass through.
    pub fn to_rfc3339(&self) -> String {
        match self {
            FeedDate::Timestamp(dt) => dt.to_rfc3339(),
            FeedDate::Literal(s) => s.clone(),
        }
    }
}

impl From<DateTime<Utc>> for FeedDate {
    fn from(dt: DateTime<Utc>) -> Self {
        FeedDate::Timestamp(dt)
    }
}

/// A media enclosure attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub length: u64,
}

/// iTunes podcast owner contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItunesOwner {
    pub name: String,
    pub email: String,
}

/// Channel-level iTunes podcast extension block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItunesChannelExt {
    pub image: String,
    pub categories: Vec<String>,
    pub explicit: bool,
    pub author: String,
    pub title: String,
    pub subtitle: String,
    pub summary: String,
    pub owner: Option<ItunesOwner>,
}

/// Item-level iTunes podcast extension block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItunesItemExt {
    pub duration_seconds: u32,
    pub explicit: bool,
    pub title: String,
    pub subtitle: String,
    pub summary: String,
    pub keywords: String,
    pub episode: Option<u32>,
    pub season: Option<u32>,
    pub episode_type: String,
    pub image: String,
    pub block: bool,
}

/// Media RSS thumbnail; attribute values are copied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaThumbnail {
    pub url: String,
    pub width: String,
    pub height: String,
    pub time: String,
}

/// Channel metadata shared by all three dialects.
///
/// Fields read from a fetched document may be empty (tolerant read);
/// title, description, and link are validated before generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub description: String,
    pub link: String,
    pub language: String,
    pub author: String,
    #[serde(rename = "publishedDate")]
    pub published: Option<FeedDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes: Option<ItunesChannelExt>,
}

/// A single normalized feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub content: String,
    pub description: String,
    #[serde(rename = "publishedDate")]
    pub pub_date: Option<FeedDate>,
    pub updated: Option<FeedDate>,
    pub link: String,
    pub author: String,
    /// First listed category.
    pub category: String,
    /// All listed categories, document order.
    pub categories: Vec<String>,
    pub guid: String,
    #[serde(rename = "isPermaLink")]
    pub is_perma_link: bool,
    pub comments: String,
    pub enclosures: Vec<Enclosure>,
    /// Title of the owning channel, stamped after the channel is parsed.
    #[serde(rename = "channelTitle")]
    pub channel_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes: Option<ItunesItemExt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_thumbnail: Option<MediaThumbnail>,
}

impl Default for Item {
    fn default() -> Self {
        Item {
            title: String::new(),
            content: String::new(),
            description: String::new(),
            pub_date: None,
            updated: None,
            link: String::new(),
            author: String::new(),
            category: String::new(),
            categories: Vec::new(),
            guid: String::new(),
            // RSS 2.0 semantics: a guid without an isPermaLink attribute is a permalink.
            is_perma_link: true,
            comments: String::new(),
            enclosures: Vec::new(),
            channel_title: String::new(),
            itunes: None,
            media_thumbnail: None,
        }
    }
}

/// The result of one parse call: channel, items, and the count of
/// malformed items dropped along the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFeed {
    pub channel: Channel,
    pub items: Vec<Item>,
    pub skipped_items: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_date_parse_timestamp() {
        let d = FeedDate::parse("2024-01-15T10:30:00Z");
        assert!(matches!(d, FeedDate::Timestamp(_)));
        assert_eq!(d.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_feed_date_parse_literal_fallback() {
        let d = FeedDate::parse("sometime last week");
        assert_eq!(d, FeedDate::Literal("sometime last week".to_string()));
        assert_eq!(d.to_rfc2822(), "sometime last week");
    }

    #[test]
    fn test_item_default_is_perma_link() {
        assert!(Item::default().is_perma_link);
    }
}
