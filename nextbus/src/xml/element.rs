//! Element tree built from a quick-xml event stream.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Error returned when a document cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// The reader rejected the input
    #[error("malformed XML at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// End of input reached with an element still open
    #[error("element <{0}> is never closed")]
    Unclosed(String),

    /// The document contains no element at all
    #[error("document has no root element")]
    NoRoot,

    /// A second top-level element follows the root
    #[error("document has more than one root element")]
    MultipleRoots,

    /// An element or attribute name is not valid UTF-8
    #[error("invalid UTF-8 in name")]
    InvalidName,
}

/// A parsed XML element before any type coercion.
///
/// `text` holds the character data that appears directly inside the element
/// before its first child element, and is `None` when that is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

impl Element {
    /// Create an element with no attributes, children or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set the direct text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Number of elements in this subtree, including `self`.
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Element::element_count).sum::<usize>()
    }
}

/// An element that is still open while the document is being read.
struct OpenElement {
    element: Element,
    text: String,
}

impl OpenElement {
    fn push_text(&mut self, text: &str) {
        // Only text before the first child counts as the element's own text
        if self.element.children.is_empty() {
            self.text.push_str(text);
        }
    }

    fn close(mut self) -> Element {
        if !self.text.is_empty() {
            self.element.text = Some(self.text);
        }
        self.element
    }
}

/// Parse a complete XML document into its root [`Element`].
///
/// Entity and character references are unescaped. Comments, processing
/// instructions, the XML declaration and text outside the root element are
/// ignored.
///
/// # Examples
///
/// ```
/// use nextbus::xml::parse_document;
///
/// let root = parse_document(r#"<body><agency tag="sf-muni"/></body>"#).unwrap();
/// assert_eq!(root.tag, "body");
/// assert_eq!(root.children[0].attributes[0], ("tag".to_string(), "sf-muni".to_string()));
/// ```
pub fn parse_document(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Syntax {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                stack.push(OpenElement {
                    element: start_element(&e, &reader)?,
                    text: String::new(),
                });
            }
            Event::Empty(e) => {
                let element = start_element(&e, &reader)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                // quick-xml verifies that end names match their start tags
                if let Some(open) = stack.pop() {
                    attach(open.close(), &mut stack, &mut root)?;
                }
            }
            Event::Text(e) => {
                if let Some(open) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| XmlError::Syntax {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    open.push_text(&text);
                }
            }
            Event::CData(e) => {
                if let Some(open) = stack.last_mut() {
                    let text = std::str::from_utf8(e.as_ref()).map_err(|err| XmlError::Syntax {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    open.push_text(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.element.tag));
    }

    root.ok_or(XmlError::NoRoot)
}

/// Place a finished element under its parent, or make it the root.
fn attach(
    element: Element,
    stack: &mut [OpenElement],
    root: &mut Option<Element>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

/// Read the name and attributes of a start (or empty) tag.
fn start_element(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, XmlError> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|_| XmlError::InvalidName)?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|_| XmlError::InvalidName)?
            .to_string();
        let value = attr.unescape_value().map_err(|e| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        attributes.push((key, value.into_owned()));
    }

    Ok(Element {
        tag,
        attributes,
        children: Vec::new(),
        text: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_in_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<body copyright="All data copyright agencies listed below and NextBus Inc 2024.">
<agency tag="actransit" title="AC Transit" regionTitle="California-Northern"/>
<agency tag="sf-muni" title="San Francisco Muni" shortTitle="SF Muni" regionTitle="California-Northern"/>
</body>"#;

        let root = parse_document(xml).unwrap();
        assert_eq!(root.tag, "body");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].tag, "agency");
        assert_eq!(
            root.children[1].attributes[2],
            ("shortTitle".to_string(), "SF Muni".to_string())
        );
        assert_eq!(root.element_count(), 3);
    }

    #[test]
    fn text_is_kept_raw() {
        let root = parse_document("<tr><stop tag=\"S1\">08:15:00</stop><stop tag=\"S2\">--</stop></tr>")
            .unwrap();
        assert_eq!(root.text, None);
        assert_eq!(root.children[0].text.as_deref(), Some("08:15:00"));
        assert_eq!(root.children[1].text.as_deref(), Some("--"));
    }

    #[test]
    fn text_after_first_child_is_not_element_text() {
        let root = parse_document("<a>lead<b/>tail</a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("lead"));
        assert_eq!(root.children[0].text, None);
    }

    #[test]
    fn empty_element_has_no_text() {
        let root = parse_document("<a></a>").unwrap();
        assert_eq!(root.text, None);
        assert!(root.children.is_empty());
    }

    #[test]
    fn entities_are_unescaped() {
        let root = parse_document(r#"<a title="Fish &amp; Chips">1 &lt; 2</a>"#).unwrap();
        assert_eq!(root.attributes[0].1, "Fish & Chips");
        assert_eq!(root.text.as_deref(), Some("1 < 2"));
    }

    #[test]
    fn cdata_counts_as_text() {
        let root = parse_document("<Error><![CDATA[bad <route>]]></Error>").unwrap();
        assert_eq!(root.text.as_deref(), Some("bad <route>"));
    }

    #[test]
    fn mismatched_end_tag_is_an_error() {
        assert!(matches!(
            parse_document("<a><b></a>"),
            Err(XmlError::Syntax { .. })
        ));
    }

    #[test]
    fn unclosed_root_is_an_error() {
        assert!(parse_document("<body><agency/>").is_err());
    }

    #[test]
    fn empty_document_has_no_root() {
        assert_eq!(parse_document(""), Err(XmlError::NoRoot));
        assert_eq!(parse_document("<!-- nothing -->"), Err(XmlError::NoRoot));
    }

    #[test]
    fn second_root_is_rejected() {
        assert_eq!(parse_document("<a/><b/>"), Err(XmlError::MultipleRoots));
    }

    #[test]
    fn builder_matches_parsed_tree() {
        let built = Element::new("direction")
            .with_attribute("tag", "D1")
            .with_child(Element::new("stop").with_attribute("tag", "S1"));
        let parsed = parse_document(r#"<direction tag="D1"><stop tag="S1"/></direction>"#).unwrap();
        assert_eq!(built, parsed);
    }
}
