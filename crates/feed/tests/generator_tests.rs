// ABOUTME: Integration tests for feed generation and parse/generate round-trips.
// ABOUTME: Covers RSS 2.0 and Atom 1.0 output, escaping, and the columnMap path.

use pretty_assertions::assert_eq;
use serde_json::json;
use syndic_feed::{
    create, generate, parse_feed_bytes, Channel, CreateOptions, FeedType, Item,
};

fn channel() -> Channel {
    Channel {
        title: "T".to_string(),
        description: "D".to_string(),
        link: "https://e.com".to_string(),
        ..Channel::default()
    }
}

#[test]
fn test_rss2_round_trip() {
    let items = vec![Item {
        title: "I1".to_string(),
        link: "https://e.com/1".to_string(),
        description: "d1".to_string(),
        ..Item::default()
    }];
    let xml = generate(&channel(), &items, FeedType::Rss2, false).unwrap();

    let feed = parse_feed_bytes(xml.as_bytes()).unwrap();
    assert_eq!(feed.channel.title, "T");
    assert_eq!(feed.channel.description, "D");
    assert_eq!(feed.channel.link, "https://e.com");
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].title, "I1");
    assert_eq!(feed.items[0].channel_title, "T");
}

#[test]
fn test_atom_round_trip() {
    let items = vec![Item {
        title: "Entry".to_string(),
        link: "https://e.com/entry".to_string(),
        description: "summary text".to_string(),
        guid: "urn:e:1".to_string(),
        ..Item::default()
    }];
    let xml = generate(&channel(), &items, FeedType::Atom1, false).unwrap();

    let feed = parse_feed_bytes(xml.as_bytes()).unwrap();
    assert_eq!(feed.channel.title, "T");
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].title, "Entry");
    assert_eq!(feed.items[0].guid, "urn:e:1");
    assert_eq!(feed.items[0].description, "summary text");
}

#[test]
fn test_escaped_round_trip_restores_text() {
    let items = vec![Item {
        title: "Post with <tags> & ampersands".to_string(),
        link: "https://e.com/p".to_string(),
        ..Item::default()
    }];
    let xml = generate(&channel(), &items, FeedType::Rss2, true).unwrap();
    assert!(xml.contains("&lt;tags&gt;"));
    assert!(!xml.contains("<tags>"));

    // The reader decodes the entities back to the original text.
    let feed = parse_feed_bytes(xml.as_bytes()).unwrap();
    assert_eq!(feed.items[0].title, "Post with <tags> & ampersands");
}

#[test]
fn test_create_with_column_map() {
    let opts = CreateOptions {
        properties: Some(json!({
            "title": "News Feed",
            "description": "Latest news",
            "link": "https://example.com/news"
        })),
        data: Some(json!([
            {
                "headline": "News Item 1",
                "url": "https://example.com/news1",
                "body": "News body content",
                "writer": "Reporter Name"
            }
        ])),
        column_map: Some(
            [
                ("title", "headline"),
                ("link", "url"),
                ("description", "body"),
                ("author", "writer"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ),
        ..CreateOptions::default()
    };

    let xml = create(&opts).unwrap();
    assert!(xml.contains("News Item 1"));
    assert!(xml.contains("https://example.com/news1"));
    assert!(xml.contains("Reporter Name"));
}

#[test]
fn test_create_with_categories_and_dates() {
    let opts = CreateOptions {
        properties: Some(json!({
            "title": "Category Test Feed",
            "description": "Testing categories",
            "link": "https://example.com"
        })),
        data: Some(json!([
            {
                "title": "Categorized Post",
                "link": "https://example.com/cat-post",
                "category": "Tech,News,Development",
                "publishedDate": "2024-01-20 14:15:00"
            }
        ])),
        ..CreateOptions::default()
    };

    let xml = create(&opts).unwrap();
    assert!(xml.contains("<category>Tech</category>"));
    assert!(xml.contains("<category>News</category>"));
    assert!(xml.contains("<category>Development</category>"));
    assert!(xml.contains("<pubDate>Sat, 20 Jan 2024 14:15:00 +0000</pubDate>"));

    // Category order survives a round-trip.
    let feed = parse_feed_bytes(xml.as_bytes()).unwrap();
    assert_eq!(feed.items[0].categories, vec!["Tech", "News", "Development"]);
    assert_eq!(feed.items[0].category, "Tech");
}

#[test]
fn test_read_structure_feeds_back_into_create() {
    let source = r#"<rss version="2.0"><channel>
        <title>Original</title>
        <link>https://orig.example</link>
        <description>Original feed</description>
        <item><title>Item A</title><link>https://orig.example/a</link><description>a</description></item>
        <item><title>Item B</title><link>https://orig.example/b</link><description>b</description></item>
    </channel></rss>"#;

    let feed = parse_feed_bytes(source.as_bytes()).unwrap();
    let mut structure = serde_json::to_value(&feed.channel).unwrap();
    structure["title"] = json!("Modified Feed Title");
    structure["items"] = serde_json::to_value(&feed.items).unwrap();

    let opts = CreateOptions {
        name: Some(structure),
        ..CreateOptions::default()
    };
    let xml = create(&opts).unwrap();
    assert!(xml.contains("Modified Feed Title"));
    assert!(xml.contains("Item A"));
    assert!(xml.contains("Item B"));
}

#[test]
fn test_rss2_content_encoded_declares_namespace() {
    let items = vec![Item {
        title: "I1".to_string(),
        content: "<p>full body</p>".to_string(),
        ..Item::default()
    }];
    let xml = generate(&channel(), &items, FeedType::Rss2, true).unwrap();
    assert!(xml.contains("xmlns:content=\"http://purl.org/rss/1.0/modules/content/\""));
    assert!(xml.contains("<content:encoded>&lt;p&gt;full body&lt;/p&gt;</content:encoded>"));
}
