// ABOUTME: Raw XML reader for the iTunes podcast extension namespace.
// ABOUTME: Collects channel-level and per-item itunes:* fields in document order.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::dialect::attribute;

/// iTunes fields gathered at the channel (or Atom feed) level.
#[derive(Debug, Default, Clone)]
pub struct ChannelItunes {
    /// True when the document root declares the iTunes namespace.
    pub namespace_declared: bool,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub explicit: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub summary: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

/// iTunes fields gathered for one item, raw string values as found.
#[derive(Debug, Default, Clone)]
pub struct ItemItunes {
    pub duration: Option<String>,
    pub explicit: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub summary: Option<String>,
    pub keywords: Option<String>,
    pub episode: Option<String>,
    pub season: Option<String>,
    pub episode_type: Option<String>,
    pub image: Option<String>,
    pub block: Option<String>,
}

/// All iTunes extension data for one document; items in document order,
/// matching the index order the dialect parser produces.
#[derive(Debug, Default, Clone)]
pub struct ItunesExtensions {
    pub channel: ChannelItunes,
    pub items: Vec<ItemItunes>,
}

/// Parses iTunes extension elements out of raw feed bytes.
///
/// Runs as an independent pass over the document so the dialect parsers
/// stay extension-agnostic; results are merged back in by item index.
pub fn parse_itunes_extensions(data: &[u8]) -> ItunesExtensions {
    let mut result = ItunesExtensions::default();
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_item = false;
    let mut in_owner = false;
    let mut current_item = ItemItunes::default();
    let mut current_element: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                if local == "rss" || local == "feed" || local == "RDF" {
                    result.channel.namespace_declared =
                        crate::dialect::declares_namespace_containing(e, "itunes.com");
                }

                match local {
                    "item" | "entry" => {
                        in_item = true;
                        current_item = ItemItunes::default();
                    }
                    _ => {}
                }

                if let Some(itunes_name) = name.strip_prefix("itunes:") {
                    match itunes_name {
                        "image" => {
                            if let Some(href) = attribute(e, "href") {
                                if in_item {
                                    current_item.image = Some(href);
                                } else {
                                    result.channel.image = Some(href);
                                }
                            }
                        }
                        "category" => {
                            // Nested subcategories arrive as their own
                            // itunes:category elements and are appended flat.
                            if !in_item {
                                if let Some(text) = attribute(e, "text") {
                                    result.channel.categories.push(text);
                                }
                            }
                        }
                        "owner" => in_owner = true,
                        "name" | "email" if in_owner => {
                            current_element = Some(itunes_name.to_string());
                        }
                        "author" | "duration" | "explicit" | "title" | "subtitle" | "summary"
                        | "keywords" | "episode" | "season" | "episodeType" | "block" => {
                            current_element = Some(itunes_name.to_string());
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref elem) = current_element {
                    let text = e.unescape().map(|s| s.into_owned()).unwrap_or_default();
                    if !text.is_empty() {
                        store_field(&mut result.channel, &mut current_item, in_item, elem, text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                match local {
                    "item" | "entry" => {
                        result.items.push(current_item.clone());
                        in_item = false;
                    }
                    "owner" if name.starts_with("itunes:") => in_owner = false,
                    _ => {}
                }

                if name.starts_with("itunes:") {
                    current_element = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    result
}

fn store_field(
    channel: &mut ChannelItunes,
    item: &mut ItemItunes,
    in_item: bool,
    elem: &str,
    text: String,
) {
    if in_item {
        match elem {
            // item-level itunes:author has no slot in the item block
            "author" => {}
            "duration" => item.duration = Some(text),
            "explicit" => item.explicit = Some(text),
            "title" => item.title = Some(text),
            "subtitle" => item.subtitle = Some(text),
            "summary" => item.summary = Some(text),
            "keywords" => item.keywords = Some(text),
            "episode" => item.episode = Some(text),
            "season" => item.season = Some(text),
            "episodeType" => item.episode_type = Some(text),
            "block" => item.block = Some(text),
            _ => {}
        }
    } else {
        match elem {
            "author" => channel.author = Some(text),
            "explicit" => channel.explicit = Some(text),
            "title" => channel.title = Some(text),
            "subtitle" => channel.subtitle = Some(text),
            "summary" => channel.summary = Some(text),
            "name" => channel.owner_name = Some(text),
            "email" => channel.owner_email = Some(text),
            _ => {}
        }
    }
}

/// True for the case-insensitive values iTunes treats as explicit.
pub fn is_explicit(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let lower = v.to_lowercase();
        lower == "yes" || lower == "true" || lower == "explicit"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_itunes_channel_and_items() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
    <channel>
        <title>Test Podcast</title>
        <itunes:image href="https://podcast/feed-img.jpg"/>
        <itunes:author>Feed Author</itunes:author>
        <itunes:subtitle>A show</itunes:subtitle>
        <itunes:summary>About the show</itunes:summary>
        <itunes:explicit>yes</itunes:explicit>
        <itunes:category text="Technology">
            <itunes:category text="Software How-To"/>
        </itunes:category>
        <itunes:owner>
            <itunes:name>Owner Name</itunes:name>
            <itunes:email>owner@example.com</itunes:email>
        </itunes:owner>
        <item>
            <guid>ep-1</guid>
            <title>Episode 1</title>
            <itunes:duration>45:30</itunes:duration>
            <itunes:explicit>yes</itunes:explicit>
            <itunes:image href="https://podcast/ep1-img.jpg"/>
            <itunes:episode>12</itunes:episode>
            <itunes:season>2</itunes:season>
            <itunes:episodeType>full</itunes:episodeType>
            <itunes:keywords>rust,feeds</itunes:keywords>
            <itunes:block>no</itunes:block>
        </item>
        <item>
            <guid>ep-2</guid>
            <title>Episode 2</title>
            <itunes:duration>01:02:03</itunes:duration>
        </item>
    </channel>
</rss>"#;

        let ext = parse_itunes_extensions(rss.as_bytes());

        assert!(ext.channel.namespace_declared);
        assert_eq!(
            ext.channel.image,
            Some("https://podcast/feed-img.jpg".to_string())
        );
        assert_eq!(ext.channel.author, Some("Feed Author".to_string()));
        assert_eq!(
            ext.channel.categories,
            vec!["Technology".to_string(), "Software How-To".to_string()]
        );
        assert_eq!(ext.channel.owner_name, Some("Owner Name".to_string()));
        assert_eq!(
            ext.channel.owner_email,
            Some("owner@example.com".to_string())
        );

        assert_eq!(ext.items.len(), 2);
        let ep1 = &ext.items[0];
        assert_eq!(ep1.duration, Some("45:30".to_string()));
        assert_eq!(ep1.explicit, Some("yes".to_string()));
        assert_eq!(ep1.episode, Some("12".to_string()));
        assert_eq!(ep1.season, Some("2".to_string()));
        assert_eq!(ep1.episode_type, Some("full".to_string()));
        assert_eq!(ep1.keywords, Some("rust,feeds".to_string()));
        assert_eq!(ep1.block, Some("no".to_string()));
        assert_eq!(ext.items[1].duration, Some("01:02:03".to_string()));
    }

    #[test]
    fn test_no_namespace_declared() {
        let rss = r#"<rss version="2.0"><channel><title>Blog</title></channel></rss>"#;
        let ext = parse_itunes_extensions(rss.as_bytes());
        assert!(!ext.channel.namespace_declared);
        assert!(ext.channel.image.is_none());
    }

    #[test]
    fn test_is_explicit() {
        assert!(is_explicit(Some("yes")));
        assert!(is_explicit(Some("TRUE")));
        assert!(is_explicit(Some("Explicit")));
        assert!(!is_explicit(Some("no")));
        assert!(!is_explicit(Some("clean")));
        assert!(!is_explicit(None));
    }
}
