//! RSS and Atom parsing into [`ParsedFeed`].
//!
//! The document is read with the streaming reader into a small element tree
//! that keeps qualified names, so `media:title` or `itunes:summary` never
//! collide with `title` or `summary`. Entity references are resolved against
//! the HTML5 table because feeds routinely use `&nbsp;` and friends without
//! declaring them.

use quick_xml::Decoder;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::fmt::Display;

use crate::error::{DigestError, Result};
use crate::models::{ParsedFeed, RawEntry};

/// Timestamp and summary candidates, each list in priority order.
const PUBLISHED: &[&str] = &["published", "issued", "dc:date", "dcterms:issued"];
const UPDATED: &[&str] = &["updated", "modified", "dcterms:modified"];
const CREATED: &[&str] = &["created", "dcterms:created"];
const PUB_DATE: &[&str] = &["pubDate"];
const SUMMARY: &[&str] = &["summary"];
const DESCRIPTION: &[&str] = &["description"];
const CONTENT: &[&str] = &["content:encoded", "content"];

/// An element with its qualified name, attributes and children.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug)]
enum Node {
    Text(String),
    Element(Element),
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Descendant text in document order, with child markup dropped.
    fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// First non-blank text among the children named in `names`. Earlier
    /// names win over later ones, then document order.
    fn first_text(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| {
            self.children(*name)
                .map(|el| el.text().trim().to_string())
                .find(|t| !t.is_empty())
        })
    }

    fn push_text(&mut self, text: &str) {
        match self.children.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }
}

/// Parse an RSS or Atom document.
///
/// # Errors
///
/// Returns [`DigestError::Parse`] when the document is not well-formed, has
/// no root element, or its root is neither `rss`, `RDF` nor `feed`.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let root = parse_tree(xml.trim_start_matches('\u{feff}'))?;
    let root_name = root.name.rsplit(':').next().unwrap_or_default().to_string();

    match root_name.as_str() {
        "rss" | "RDF" => Ok(rss_to_feed(&root)),
        "feed" => Ok(atom_to_feed(&root)),
        other => Err(DigestError::Parse(format!("unsupported root element <{}>", other))),
    }
}

fn parse_error(e: impl Display) -> DigestError {
    DigestError::Parse(e.to_string())
}

/// Build the element tree of the first root element in `xml`.
///
/// Children carrying the root's own prefix (`<atom:feed>` / `<atom:entry>`)
/// are stored under their local name.
fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;
    let decoder = reader.decoder();

    let mut stack: Vec<Element> = Vec::new();
    let mut root_prefix: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() {
                    root_prefix = e
                        .name()
                        .prefix()
                        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
                }
                stack.push(open_element(&e, decoder, root_prefix.as_deref())?);
            }
            Ok(Event::End(_)) => {
                let Some(done) = stack.pop() else {
                    return Err(parse_error("unbalanced end tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(done)),
                    None => return Ok(done),
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&t.decode().map_err(parse_error)?);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&c.decode().map_err(parse_error)?);
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&resolve_reference(&r));
                }
            }
            Ok(Event::Eof) => {
                let msg = if stack.is_empty() {
                    "document has no root element"
                } else {
                    "unexpected end of document"
                };
                return Err(parse_error(msg));
            }
            Err(e) => return Err(parse_error(e)),
            _ => {}
        }
    }
}

fn open_element(e: &BytesStart<'_>, decoder: Decoder, root_prefix: Option<&str>) -> Result<Element> {
    let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let local = root_prefix
        .and_then(|p| qname.strip_prefix(p))
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::to_string);
    let name = local.unwrap_or(qname);

    let mut attrs = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(parse_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.decode_and_unescape_value(decoder) {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attrs.push((key, value));
    }

    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Character references become the character, known named entities their
/// text. Anything else is kept verbatim rather than failing the feed.
fn resolve_reference(r: &BytesRef<'_>) -> String {
    if let Ok(Some(ch)) = r.resolve_char_ref() {
        return ch.to_string();
    }
    let name = r.decode().unwrap_or_default();
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("&{};", name))
}

/// RSS 0.9x/2.0 keep items in `<channel>`; RSS 1.0 puts them beside it.
fn rss_to_feed(root: &Element) -> ParsedFeed {
    let channel = root.children("channel").next();
    let entries = channel
        .into_iter()
        .flat_map(|c| c.children("item"))
        .chain(root.children("item"))
        .map(raw_entry)
        .collect();
    ParsedFeed {
        title: channel.and_then(|c| c.first_text(&["title"])),
        entries,
    }
}

fn atom_to_feed(root: &Element) -> ParsedFeed {
    ParsedFeed {
        title: root.first_text(&["title"]),
        entries: root.children("entry").map(raw_entry).collect(),
    }
}

fn raw_entry(el: &Element) -> RawEntry {
    RawEntry {
        title: el.first_text(&["title"]),
        link: pick_link(el).or_else(|| permalink_guid(el)),
        published: el.first_text(PUBLISHED),
        updated: el.first_text(UPDATED),
        created: el.first_text(CREATED),
        pub_date: el.first_text(PUB_DATE),
        summary: el.first_text(SUMMARY),
        description: el.first_text(DESCRIPTION),
        content: el.first_text(CONTENT),
    }
}

/// RSS text link first, then an Atom `alternate` (or rel-less) href, then
/// any href at all.
fn pick_link(el: &Element) -> Option<String> {
    let text = el
        .children("link")
        .map(|l| l.text().trim().to_string())
        .find(|t| !t.is_empty());
    let href = |want_alternate: bool| {
        el.children("link")
            .filter(|l| !want_alternate || matches!(l.attr("rel"), None | Some("alternate")))
            .filter_map(|l| l.attr("href").map(str::trim))
            .find(|h| !h.is_empty())
            .map(str::to_string)
    };
    text.or_else(|| href(true)).or_else(|| href(false))
}

fn permalink_guid(el: &Element) -> Option<String> {
    el.children("guid")
        .filter(|g| !matches!(g.attr("isPermaLink"), Some("false")))
        .map(|g| g.text().trim().to_string())
        .find(|v| v.starts_with("http://") || v.starts_with("https://"))
}
