// ABOUTME: Core feed engine: parse RSS 2.0 / RDF-RSS 1.0 / Atom 1.0 into one model and back.
// ABOUTME: Provides fetching, dialect sniffing, normalization, generation, filtering, and routing.

pub mod dialect;
pub mod duration_parse;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod generator;
pub mod itunes_ext;
pub mod media_ext;
pub mod models;
pub mod normalize;
pub mod ops;
pub mod parser;
pub mod time_parse;

pub use dialect::{sniff_dialect, Dialect, FeedType};
pub use duration_parse::parse_duration_seconds;
pub use error::FeedError;
pub use fetch::{fetch_source, FetchOptions};
pub use filter::{apply_filter, ItemPredicate};
pub use generator::generate;
pub use models::{
    Channel, Enclosure, FeedDate, Item, ItunesChannelExt, ItunesItemExt, ItunesOwner,
    MediaThumbnail, ParsedFeed,
};
pub use normalize::{normalize_channel, normalize_item, ColumnMap, FeedDocument, Record};
pub use ops::{create, read, CreateOptions, ReadOptions, ReadOutput};
pub use parser::parse_feed_bytes;
pub use time_parse::parse_flexible_time;
