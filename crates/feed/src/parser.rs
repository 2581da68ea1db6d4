// ABOUTME: Dialect-specific feed parsers producing the normalized model.
// ABOUTME: Event-driven walkers for RSS 2.0 / RDF-RSS 1.0 and Atom 1.0 with tolerant-read policy.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::dialect::{attribute, sniff_dialect, Dialect};
use crate::duration_parse::parse_duration_seconds;
use crate::error::FeedError;
use crate::itunes_ext::{is_explicit, parse_itunes_extensions, ChannelItunes, ItemItunes};
use crate::media_ext::parse_media_extensions;
use crate::models::{
    Channel, Enclosure, FeedDate, Item, ItunesChannelExt, ItunesItemExt, ItunesOwner, ParsedFeed,
};

/// Parses feed bytes into the normalized channel + item model.
///
/// The dialect is sniffed from the root element; extension readers run
/// whenever their namespace is declared there, regardless of dialect.
/// Malformed individual items are dropped and counted, never fatal.
pub fn parse_feed_bytes(data: &[u8]) -> Result<ParsedFeed, FeedError> {
    let dialect = sniff_dialect(data)?;

    let mut raw = match dialect {
        Dialect::Rss2 | Dialect::RdfRss1 => parse_rss(data),
        Dialect::Atom1 => parse_atom(data),
    };

    let itunes = parse_itunes_extensions(data);
    if itunes.channel.namespace_declared {
        raw.channel.itunes = Some(channel_itunes_ext(&itunes.channel));
        for (item, doc_idx) in raw.items.iter_mut().zip(&raw.doc_indices) {
            let ext = itunes.items.get(*doc_idx).cloned().unwrap_or_default();
            item.itunes = Some(item_itunes_ext(&ext));
        }
    }

    let media = parse_media_extensions(data);
    if media.namespace_declared {
        for (item, doc_idx) in raw.items.iter_mut().zip(&raw.doc_indices) {
            item.media_thumbnail = media.thumbnails.get(*doc_idx).cloned().flatten();
        }
    }

    // Stamp each item with its owning channel's title once it is known.
    for item in &mut raw.items {
        item.channel_title = raw.channel.title.clone();
    }

    Ok(ParsedFeed {
        channel: raw.channel,
        items: raw.items,
        skipped_items: raw.skipped,
    })
}

/// Intermediate parse state before extension merge: items carry their
/// document-order index so extension data lines up after skips.
#[derive(Default)]
struct RawParse {
    channel: Channel,
    items: Vec<Item>,
    doc_indices: Vec<usize>,
    skipped: u32,
}

impl RawParse {
    /// Commits a finished item, dropping it as malformed when it has no
    /// usable content at all.
    fn finish_item(&mut self, item: Item, doc_idx: usize) {
        if item.title.is_empty() && item.description.is_empty() && item.link.is_empty() {
            self.skipped += 1;
        } else {
            self.items.push(item);
            self.doc_indices.push(doc_idx);
        }
    }
}

/// Canonical destinations for element text, selected per dialect by the
/// element-name tables in `rss_target` / `atom_target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    ChanTitle,
    ChanDescription,
    ChanLink,
    ChanLanguage,
    ChanAuthor,
    ChanDate,
    ItemTitle,
    ItemLink,
    ItemDescription,
    ItemContent,
    ItemDate,
    ItemUpdated,
    ItemAuthor,
    ItemCategory,
    ItemGuid,
    ItemComments,
}

/// RSS 2.0 / RDF-RSS 1.0 element table. RDF feeds reuse the RSS item
/// vocabulary plus Dublin Core fields; both map onto the same targets.
fn rss_target(name: &str, in_item: bool) -> Option<Target> {
    if in_item {
        match name {
            "title" => Some(Target::ItemTitle),
            "link" => Some(Target::ItemLink),
            "description" => Some(Target::ItemDescription),
            "content:encoded" => Some(Target::ItemContent),
            "pubDate" | "dc:date" => Some(Target::ItemDate),
            "author" | "dc:creator" => Some(Target::ItemAuthor),
            "category" | "dc:subject" => Some(Target::ItemCategory),
            "guid" => Some(Target::ItemGuid),
            "comments" => Some(Target::ItemComments),
            _ => None,
        }
    } else {
        match name {
            "title" => Some(Target::ChanTitle),
            "description" => Some(Target::ChanDescription),
            "link" => Some(Target::ChanLink),
            "language" | "dc:language" => Some(Target::ChanLanguage),
            "managingEditor" | "dc:creator" => Some(Target::ChanAuthor),
            "pubDate" | "dc:date" => Some(Target::ChanDate),
            _ => None,
        }
    }
}

/// Atom 1.0 element table (link and category are attribute-driven and
/// handled separately).
fn atom_target(local: &str, in_entry: bool, in_author: bool) -> Option<Target> {
    if in_author {
        return match (local, in_entry) {
            ("name", true) => Some(Target::ItemAuthor),
            ("name", false) => Some(Target::ChanAuthor),
            _ => None,
        };
    }
    if in_entry {
        match local {
            "title" => Some(Target::ItemTitle),
            "summary" => Some(Target::ItemDescription),
            "content" => Some(Target::ItemContent),
            "published" => Some(Target::ItemDate),
            "updated" => Some(Target::ItemUpdated),
            "id" => Some(Target::ItemGuid),
            _ => None,
        }
    } else {
        match local {
            "title" => Some(Target::ChanTitle),
            "subtitle" => Some(Target::ChanDescription),
            "updated" => Some(Target::ChanDate),
            _ => None,
        }
    }
}

/// Containers inside an RSS channel whose children reuse channel element
/// names and must not clobber channel fields.
fn is_rss_container(local: &str) -> bool {
    local == "image" || local == "textinput" || local == "textInput"
}

fn parse_rss(data: &[u8]) -> RawParse {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut raw = RawParse::default();
    let mut buf = Vec::new();

    let mut in_item = false;
    let mut container_depth = 0u32;
    let mut item = Item::default();
    let mut doc_idx = 0usize;
    let mut target: Option<Target> = None;
    let mut text = String::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                if local == "item" {
                    in_item = true;
                    item = Item::default();
                    continue;
                }
                if !in_item && is_rss_container(local) {
                    container_depth += 1;
                    continue;
                }
                if container_depth > 0 {
                    continue;
                }

                if in_item && local == "enclosure" {
                    item.enclosures.push(Enclosure {
                        url: attribute(e, "url").unwrap_or_default(),
                        mime_type: attribute(e, "type").unwrap_or_default(),
                        length: attribute(e, "length")
                            .and_then(|l| l.parse().ok())
                            .unwrap_or(0),
                    });
                    continue;
                }

                if let Some(t) = rss_target(&name, in_item) {
                    if t == Target::ItemGuid {
                        // isPermaLink defaults to true when the attribute is absent.
                        item.is_perma_link = !attribute(e, "isPermaLink")
                            .is_some_and(|v| v.eq_ignore_ascii_case("false"));
                    }
                    target = Some(t);
                    text.clear();
                }
            }
            Ok(Event::Text(ref e)) => {
                if target.is_some() {
                    text.push_str(&text_content(e));
                }
            }
            Ok(Event::CData(e)) => {
                if target.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                if local == "item" {
                    in_item = false;
                    target = None;
                    raw.finish_item(std::mem::take(&mut item), doc_idx);
                    doc_idx += 1;
                    continue;
                }
                if !in_item && is_rss_container(local) {
                    container_depth = container_depth.saturating_sub(1);
                    continue;
                }

                if let Some(t) = target.take() {
                    commit(&mut raw.channel, &mut item, t, text.trim());
                    text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => {
                // Well-formedness broke mid-document: keep what parsed
                // cleanly and count any half-built item as skipped.
                if in_item {
                    raw.skipped += 1;
                }
                break;
            }
            _ => {}
        }
    }

    raw
}

fn parse_atom(data: &[u8]) -> RawParse {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut raw = RawParse::default();
    let mut buf = Vec::new();

    let mut in_entry = false;
    let mut in_author = false;
    let mut in_source = false;
    let mut item = Item::default();
    let mut doc_idx = 0usize;
    let mut target: Option<Target> = None;
    let mut text = String::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name).to_string();

                match local.as_str() {
                    "entry" => {
                        in_entry = true;
                        // Atom ids are opaque, never permalinks.
                        item = Item {
                            is_perma_link: false,
                            ..Item::default()
                        };
                        continue;
                    }
                    "author" => {
                        in_author = true;
                        continue;
                    }
                    "source" if in_entry => {
                        in_source = true;
                        continue;
                    }
                    _ => {}
                }
                if in_source {
                    continue;
                }

                if local == "link" {
                    let rel = attribute(e, "rel");
                    let alternate = rel.as_deref().is_none_or(|r| r == "alternate");
                    if alternate {
                        if let Some(href) = attribute(e, "href") {
                            if in_entry && item.link.is_empty() {
                                item.link = href;
                            } else if !in_entry && raw.channel.link.is_empty() {
                                raw.channel.link = href;
                            }
                        }
                    } else if in_entry && rel.as_deref() == Some("enclosure") {
                        item.enclosures.push(Enclosure {
                            url: attribute(e, "href").unwrap_or_default(),
                            mime_type: attribute(e, "type").unwrap_or_default(),
                            length: attribute(e, "length")
                                .and_then(|l| l.parse().ok())
                                .unwrap_or(0),
                        });
                    }
                    continue;
                }

                if local == "category" && in_entry {
                    if let Some(term) = attribute(e, "term") {
                        if item.category.is_empty() {
                            item.category = term.clone();
                        }
                        item.categories.push(term);
                    }
                    continue;
                }

                if let Some(t) = atom_target(&local, in_entry, in_author) {
                    // An out-of-line <content src="..."/> has no text body.
                    if t == Target::ItemContent {
                        if let Some(src) = attribute(e, "src") {
                            item.content = src;
                            continue;
                        }
                    }
                    target = Some(t);
                    text.clear();
                }
            }
            Ok(Event::Text(ref e)) => {
                if target.is_some() {
                    text.push_str(&text_content(e));
                }
            }
            Ok(Event::CData(e)) => {
                if target.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                match local {
                    "entry" => {
                        in_entry = false;
                        target = None;
                        raw.finish_item(std::mem::take(&mut item), doc_idx);
                        doc_idx += 1;
                        continue;
                    }
                    "author" => {
                        in_author = false;
                        continue;
                    }
                    "source" => {
                        in_source = false;
                        continue;
                    }
                    _ => {}
                }

                if let Some(t) = target.take() {
                    commit(&mut raw.channel, &mut item, t, text.trim());
                    text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => {
                if in_entry {
                    raw.skipped += 1;
                }
                break;
            }
            _ => {}
        }
    }

    raw
}

/// Decodes element text, falling back to the raw bytes when an entity
/// cannot be resolved (tolerant read).
fn text_content(e: &quick_xml::events::BytesText) -> String {
    match e.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(e.as_ref()).into_owned(),
    }
}

/// Writes accumulated element text into its canonical field.
fn commit(channel: &mut Channel, item: &mut Item, target: Target, text: &str) {
    if text.is_empty() {
        return;
    }
    match target {
        Target::ChanTitle => channel.title = text.to_string(),
        Target::ChanDescription => channel.description = text.to_string(),
        Target::ChanLink => channel.link = text.to_string(),
        Target::ChanLanguage => channel.language = text.to_string(),
        Target::ChanAuthor => channel.author = text.to_string(),
        Target::ChanDate => channel.published = Some(FeedDate::parse(text)),
        Target::ItemTitle => item.title = text.to_string(),
        Target::ItemLink => item.link = text.to_string(),
        Target::ItemDescription => item.description = text.to_string(),
        Target::ItemContent => item.content = text.to_string(),
        Target::ItemDate => item.pub_date = Some(FeedDate::parse(text)),
        Target::ItemUpdated => item.updated = Some(FeedDate::parse(text)),
        Target::ItemAuthor => item.author = text.to_string(),
        Target::ItemCategory => {
            if item.category.is_empty() {
                item.category = text.to_string();
            }
            item.categories.push(text.to_string());
        }
        Target::ItemGuid => item.guid = text.to_string(),
        Target::ItemComments => item.comments = text.to_string(),
    }
}

fn channel_itunes_ext(raw: &ChannelItunes) -> ItunesChannelExt {
    let owner = match (&raw.owner_name, &raw.owner_email) {
        (None, None) => None,
        (name, email) => Some(ItunesOwner {
            name: name.clone().unwrap_or_default(),
            email: email.clone().unwrap_or_default(),
        }),
    };
    ItunesChannelExt {
        image: raw.image.clone().unwrap_or_default(),
        categories: raw.categories.clone(),
        explicit: is_explicit(raw.explicit.as_deref()),
        author: raw.author.clone().unwrap_or_default(),
        title: raw.title.clone().unwrap_or_default(),
        subtitle: raw.subtitle.clone().unwrap_or_default(),
        summary: raw.summary.clone().unwrap_or_default(),
        owner,
    }
}

fn item_itunes_ext(raw: &ItemItunes) -> ItunesItemExt {
    ItunesItemExt {
        duration_seconds: raw
            .duration
            .as_deref()
            .and_then(parse_duration_seconds)
            .unwrap_or(0),
        explicit: is_explicit(raw.explicit.as_deref()),
        title: raw.title.clone().unwrap_or_default(),
        subtitle: raw.subtitle.clone().unwrap_or_default(),
        summary: raw.summary.clone().unwrap_or_default(),
        keywords: raw.keywords.clone().unwrap_or_default(),
        episode: raw.episode.as_deref().and_then(|v| v.parse().ok()),
        season: raw.season.as_deref().and_then(|v| v.parse().ok()),
        episode_type: raw.episode_type.clone().unwrap_or_default(),
        image: raw.image.clone().unwrap_or_default(),
        block: is_explicit(raw.block.as_deref()),
    }
}
