// ABOUTME: Feed XML generation for RSS 2.0 and Atom 1.0.
// ABOUTME: Serializes the normalized model with required-field validation and an escaping policy.

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use crate::dialect::FeedType;
use crate::error::FeedError;
use crate::models::{Channel, Item};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Serializes a channel and its items to feed XML in the chosen dialect.
///
/// Channel title, description, and link must be present; generation fails
/// with `MissingProperty` before any XML is emitted otherwise. When
/// `escape_chars` is on, the five XML special characters in element text
/// are replaced with entities; attribute values are never governed by the
/// flag. An empty item slice is valid and produces a channel with no items.
pub fn generate(
    channel: &Channel,
    items: &[Item],
    feed_type: FeedType,
    escape_chars: bool,
) -> Result<String, FeedError> {
    for (field, value) in [
        ("title", &channel.title),
        ("description", &channel.description),
        ("link", &channel.link),
    ] {
        if value.is_empty() {
            return Err(FeedError::MissingProperty(format!(
                "channel {field} is required to create a feed"
            )));
        }
    }

    let mut out = XmlOut::new();
    match feed_type {
        FeedType::Rss2 => write_rss2(&mut out, channel, items, escape_chars)?,
        FeedType::Atom1 => write_atom1(&mut out, channel, items, escape_chars)?,
    }
    String::from_utf8(out.into_bytes()).map_err(FeedError::generate)
}

/// Replaces the five XML special characters with their entities.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Thin wrapper over the quick-xml writer that funnels write failures
/// into FeedError.
struct XmlOut {
    w: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        XmlOut {
            w: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.w.into_inner()
    }

    fn event(&mut self, ev: Event) -> Result<(), FeedError> {
        self.w.write_event(ev).map_err(FeedError::generate)
    }

    fn decl(&mut self) -> Result<(), FeedError> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, name: &str) -> Result<(), FeedError> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> Result<(), FeedError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name>text</name>`. Text is inserted verbatim unless
    /// `escape` is set; the escaping decision is made per field.
    fn text_element(&mut self, name: &str, text: &str, escape: bool) -> Result<(), FeedError> {
        self.start(name)?;
        let body = if escape {
            escape_text(text)
        } else {
            text.to_string()
        };
        self.event(Event::Text(BytesText::from_escaped(body.as_str())))?;
        self.end(name)
    }

    /// Writes the element only when the value is non-empty.
    fn optional(&mut self, name: &str, text: &str, escape: bool) -> Result<(), FeedError> {
        if text.is_empty() {
            Ok(())
        } else {
            self.text_element(name, text, escape)
        }
    }
}

fn write_rss2(
    out: &mut XmlOut,
    channel: &Channel,
    items: &[Item],
    esc: bool,
) -> Result<(), FeedError> {
    out.decl()?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    if items.iter().any(|i| !i.content.is_empty()) {
        rss.push_attribute(("xmlns:content", CONTENT_NS));
    }
    out.event(Event::Start(rss))?;
    out.start("channel")?;

    out.text_element("title", &channel.title, esc)?;
    out.text_element("link", &channel.link, false)?;
    out.text_element("description", &channel.description, esc)?;
    out.optional("language", &channel.language, false)?;
    out.optional("managingEditor", &channel.author, esc)?;
    if let Some(ref date) = channel.published {
        out.text_element("pubDate", &date.to_rfc2822(), false)?;
    }

    for item in items {
        out.start("item")?;
        out.optional("title", &item.title, esc)?;
        out.optional("link", &item.link, false)?;
        out.optional("description", &item.description, esc)?;
        out.optional("content:encoded", &item.content, esc)?;
        out.optional("author", &item.author, esc)?;
        for category in &item.categories {
            out.text_element("category", category, esc)?;
        }
        if let Some(ref date) = item.pub_date {
            out.text_element("pubDate", &date.to_rfc2822(), false)?;
        }
        out.optional("comments", &item.comments, false)?;
        if !item.guid.is_empty() {
            let mut guid = BytesStart::new("guid");
            if !item.is_perma_link {
                guid.push_attribute(("isPermaLink", "false"));
            }
            out.event(Event::Start(guid))?;
            out.event(Event::Text(BytesText::from_escaped(item.guid.as_str())))?;
            out.end("guid")?;
        }
        for enc in &item.enclosures {
            let mut el = BytesStart::new("enclosure");
            el.push_attribute(("url", enc.url.as_str()));
            el.push_attribute(("type", enc.mime_type.as_str()));
            el.push_attribute(("length", enc.length.to_string().as_str()));
            out.event(Event::Empty(el))?;
        }
        out.end("item")?;
    }

    out.end("channel")?;
    out.end("rss")
}

fn write_atom1(
    out: &mut XmlOut,
    channel: &Channel,
    items: &[Item],
    esc: bool,
) -> Result<(), FeedError> {
    out.decl()?;

    let mut feed = BytesStart::new("feed");
    feed.push_attribute(("xmlns", ATOM_NS));
    out.event(Event::Start(feed))?;

    out.text_element("title", &channel.title, esc)?;
    out.text_element("subtitle", &channel.description, esc)?;
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", channel.link.as_str()));
    out.event(Event::Empty(link))?;
    out.text_element("id", &channel.link, false)?;
    // Atom requires <updated>; inject generation time when the caller
    // supplied no date.
    let updated = channel
        .published
        .as_ref()
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339());
    out.text_element("updated", &updated, false)?;
    if !channel.author.is_empty() {
        out.start("author")?;
        out.text_element("name", &channel.author, esc)?;
        out.end("author")?;
    }

    for item in items {
        out.start("entry")?;
        out.optional("title", &item.title, esc)?;
        if !item.link.is_empty() {
            let mut link = BytesStart::new("link");
            link.push_attribute(("href", item.link.as_str()));
            out.event(Event::Empty(link))?;
        }
        let id = if item.guid.is_empty() {
            &item.link
        } else {
            &item.guid
        };
        out.optional("id", id, false)?;
        if let Some(ref date) = item.pub_date {
            out.text_element("published", &date.to_rfc3339(), false)?;
        }
        let entry_updated = item
            .updated
            .as_ref()
            .or(item.pub_date.as_ref())
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        out.text_element("updated", &entry_updated, false)?;
        out.optional("summary", &item.description, esc)?;
        out.optional("content", &item.content, esc)?;
        if !item.author.is_empty() {
            out.start("author")?;
            out.text_element("name", &item.author, esc)?;
            out.end("author")?;
        }
        for category in &item.categories {
            let mut el = BytesStart::new("category");
            el.push_attribute(("term", category.as_str()));
            out.event(Event::Empty(el))?;
        }
        out.end("entry")?;
    }

    out.end("feed")
}
