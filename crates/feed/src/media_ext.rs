// ABOUTME: Raw XML reader for the Media RSS extension namespace.
// ABOUTME: Collects per-item media:thumbnail attributes verbatim, in document order.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::dialect::attribute;
use crate::models::MediaThumbnail;

/// Media RSS data for one document; one slot per item, document order.
#[derive(Debug, Default, Clone)]
pub struct MediaExtensions {
    /// True when the document root declares the Media RSS namespace.
    pub namespace_declared: bool,
    pub thumbnails: Vec<Option<MediaThumbnail>>,
}

/// Parses media:thumbnail elements out of raw feed bytes.
///
/// Attribute values are copied verbatim; missing optional attributes are
/// left empty. The first thumbnail per item wins.
pub fn parse_media_extensions(data: &[u8]) -> MediaExtensions {
    let mut result = MediaExtensions::default();
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_item = false;
    let mut current: Option<MediaThumbnail> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                if local == "rss" || local == "feed" || local == "RDF" {
                    result.namespace_declared =
                        crate::dialect::declares_namespace_containing(e, "search.yahoo.com/mrss");
                }

                match local {
                    "item" | "entry" => {
                        in_item = true;
                        current = None;
                    }
                    _ => {}
                }

                if name == "media:thumbnail" && in_item && current.is_none() {
                    current = Some(MediaThumbnail {
                        url: attribute(e, "url").unwrap_or_default(),
                        width: attribute(e, "width").unwrap_or_default(),
                        height: attribute(e, "height").unwrap_or_default(),
                        time: attribute(e, "time").unwrap_or_default(),
                    });
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);
                if local == "item" || local == "entry" {
                    result.thumbnails.push(current.take());
                    in_item = false;
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
