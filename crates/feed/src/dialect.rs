// ABOUTME: Feed dialect detection from the document root element.
// ABOUTME: Also defines the FeedType enum selecting the output grammar for generation.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::str::FromStr;

use crate::error::FeedError;

/// The three concrete feed grammars recognized on the read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Rss2,
    RdfRss1,
    Atom1,
}

/// The output grammars available to the generator. RDF/RSS 1.0 is
/// read-only and has no counterpart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    #[default]
    Rss2,
    Atom1,
}

impl FromStr for FeedType {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rss_2.0" | "rss2" | "rss" => Ok(FeedType::Rss2),
            "atom_1.0" | "atom1" | "atom" => Ok(FeedType::Atom1),
            other => Err(FeedError::UnsupportedDialect(format!(
                "unknown feed type \"{other}\""
            ))),
        }
    }
}

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Inspects the root element of a document and selects the parsing rules.
///
/// Decision rule: `<rss version="2...">` is RSS 2.0; an RDF root with a
/// `channel` child is RDF/RSS 1.0; a `feed` root in the Atom namespace is
/// Atom 1.0. Anything else is an unsupported dialect; a document with no
/// parseable root element at all is malformed.
pub fn sniff_dialect(data: &[u8]) -> Result<Dialect, FeedError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut root: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name).to_string();

                match root {
                    None => match local.as_str() {
                        "rss" => {
                            if attribute(e, "version").is_some_and(|v| v.starts_with('2')) {
                                return Ok(Dialect::Rss2);
                            }
                            return Err(FeedError::UnsupportedDialect(
                                "rss root without a 2.x version attribute".to_string(),
                            ));
                        }
                        "RDF" => root = Some(local),
                        "feed" => {
                            if declares_namespace(e, ATOM_NS) {
                                return Ok(Dialect::Atom1);
                            }
                            return Err(FeedError::UnsupportedDialect(
                                "feed root outside the Atom namespace".to_string(),
                            ));
                        }
                        other => {
                            return Err(FeedError::UnsupportedDialect(format!(
                                "unrecognized root element <{other}>"
                            )))
                        }
                    },
                    // Inside an RDF root: the first channel child settles it.
                    Some(_) if local == "channel" => return Ok(Dialect::RdfRss1),
                    Some(_) => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                if root.is_none() {
                    return Err(FeedError::malformed(e));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    match root {
        Some(_) => Err(FeedError::UnsupportedDialect(
            "RDF root without a channel child".to_string(),
        )),
        None => Err(FeedError::Malformed("no root element found".to_string())),
    }
}

/// Returns an attribute value from an element, if present.
pub(crate) fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if key == name {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

/// Checks whether an element declares the given namespace URI via any
/// xmlns attribute.
pub(crate) fn declares_namespace(e: &BytesStart, uri: &str) -> bool {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if key.starts_with("xmlns") {
            let value = String::from_utf8_lossy(&attr.value);
            if value.trim_end_matches('/') == uri.trim_end_matches('/') {
                return true;
            }
        }
    }
    false
}

/// Looser namespace check for extension URIs that appear with minor
/// variations in the wild (http vs https, trailing slash).
pub(crate) fn declares_namespace_containing(e: &BytesStart, fragment: &str) -> bool {
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        if key.starts_with("xmlns") {
            let value = String::from_utf8_lossy(&attr.value);
            if value.contains(fragment) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_rss2() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel/></rss>"#;
        assert_eq!(sniff_dialect(xml.as_bytes()).unwrap(), Dialect::Rss2);
    }

    #[test]
    fn test_sniff_rss2_minor_version() {
        let xml = r#"<rss version="2.0.1"><channel/></rss>"#;
        assert_eq!(sniff_dialect(xml.as_bytes()).unwrap(), Dialect::Rss2);
    }

    #[test]
    fn test_sniff_rdf() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
            xmlns="http://purl.org/rss/1.0/">
            <channel rdf:about="https://example.org/"><title>T</title></channel>
        </rdf:RDF>"#;
        assert_eq!(sniff_dialect(xml.as_bytes()).unwrap(), Dialect::RdfRss1);
    }

    #[test]
    fn test_sniff_atom() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>T</title></feed>"#;
        assert_eq!(sniff_dialect(xml.as_bytes()).unwrap(), Dialect::Atom1);
    }

    #[test]
    fn test_sniff_rss_old_version_rejected() {
        let xml = r#"<rss version="0.91"><channel/></rss>"#;
        assert!(matches!(
            sniff_dialect(xml.as_bytes()),
            Err(FeedError::UnsupportedDialect(_))
        ));
    }

    #[test]
    fn test_sniff_unknown_root() {
        let xml = r#"<html><body/></html>"#;
        assert!(matches!(
            sniff_dialect(xml.as_bytes()),
            Err(FeedError::UnsupportedDialect(_))
        ));
    }

    #[test]
    fn test_sniff_no_root_is_malformed() {
        assert!(matches!(
            sniff_dialect(b"   "),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            sniff_dialect(b"just some text, no markup"),
            Err(FeedError::Malformed(_))
        ));
    }

    #[test]
    fn test_feed_type_from_str() {
        assert_eq!("rss_2.0".parse::<FeedType>().unwrap(), FeedType::Rss2);
        assert_eq!("atom_1.0".parse::<FeedType>().unwrap(), FeedType::Atom1);
        assert!("rdf_1.0".parse::<FeedType>().is_err());
    }
}
