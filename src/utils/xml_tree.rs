//! Quick-XML based element tree
//!
//! Upstream listing documents have to be probed for several shapes in turn,
//! so instead of streaming them once we read them into a small owned tree.
//! Only what the extractors look at is kept: names, attributes, direct text
//! and children.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::errors::{SourceError, SourceResult};

/// One element of a parsed XML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `media:title`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Direct text and CDATA content, entities resolved, not trimmed
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Name with any namespace prefix removed
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with exactly this name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of the first direct child named `name`, if non-empty
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(XmlElement::trimmed_text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// This element and all of its descendants in document order
    pub fn iter(&self) -> Elements<'_> {
        Elements { stack: vec![self] }
    }

    /// All descendants in document order, excluding this element
    pub fn descendants(&self) -> Elements<'_> {
        Elements {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order walk over an element tree
pub struct Elements<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Parse a complete XML document into its root element
pub fn parse_document(content: &str) -> SourceResult<XmlElement> {
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_start(e)?);
            }

            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e)?;
                attach(element, &mut stack, &mut root)?;
            }

            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error("closing tag without matching opening tag"))?;
                attach(element, &mut stack, &mut root)?;
            }

            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| xml_error(format!("Invalid UTF-8 in text: {e}")))?;
                    current.text.push_str(text);
                }
            }

            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| xml_error(format!("Invalid UTF-8 in CDATA: {e}")))?;
                    current.text.push_str(text);
                }
            }

            Ok(Event::GeneralRef(e)) => {
                if let Some(current) = stack.last_mut() {
                    if let Some(ch) = e
                        .resolve_char_ref()
                        .map_err(|e| xml_error(format!("Invalid character reference: {e}")))?
                    {
                        current.text.push(ch);
                    } else {
                        let name = std::str::from_utf8(&e)
                            .map_err(|e| xml_error(format!("Invalid UTF-8 in entity: {e}")))?;
                        match resolve_predefined_entity(name) {
                            Some(resolved) => current.text.push_str(resolved),
                            // unknown entities are kept as written
                            None => {
                                current.text.push('&');
                                current.text.push_str(name);
                                current.text.push(';');
                            }
                        }
                    }
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(xml_error(format!(
                    "XML parsing error at position {}: {e}",
                    reader.error_position()
                )));
            }

            _ => {} // declarations, doctype, comments, processing instructions
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| xml_error("document has no root element"))
}

fn element_from_start(start: &BytesStart) -> SourceResult<XmlElement> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| xml_error(format!("Invalid UTF-8 in XML element name: {e}")))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes().flatten() {
        if let (Ok(key), Ok(raw)) = (
            std::str::from_utf8(attr.key.as_ref()),
            std::str::from_utf8(&attr.value),
        ) {
            let value = unescape(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            attributes.push((key.to_string(), value));
        }
    }

    Ok(XmlElement {
        name,
        attributes,
        ..Default::default()
    })
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> SourceResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(xml_error("document has more than one root element")),
    }
    Ok(())
}

fn xml_error<S: Into<String>>(message: S) -> SourceError {
    SourceError::parse("xml", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_elements_and_attributes() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
            <tv><programme start="20240101120000" stop="20240101130000">
                <title> Morning News </title>
                <icon src="a.png"/>
            </programme></tv>"#,
        )
        .unwrap();

        assert_eq!(root.name, "tv");
        let programme = root.child("programme").unwrap();
        assert_eq!(programme.attr("start"), Some("20240101120000"));
        assert_eq!(programme.child_text("title").as_deref(), Some("Morning News"));
        assert_eq!(programme.child("icon").unwrap().attr("src"), Some("a.png"));
    }

    #[test]
    fn test_resolves_entities_and_cdata() {
        let root = parse_document(
            "<item><title>Tom &amp; Jerry&#39;s</title><description><![CDATA[<b>bold</b>]]></description></item>",
        )
        .unwrap();
        assert_eq!(root.child_text("title").as_deref(), Some("Tom & Jerry's"));
        assert_eq!(root.child_text("description").as_deref(), Some("<b>bold</b>"));
    }

    #[test]
    fn test_unescapes_attribute_values() {
        let root = parse_document(r#"<channel name="A &amp; B"/>"#).unwrap();
        assert_eq!(root.attr("name"), Some("A & B"));
    }

    #[test]
    fn test_iteration_order_is_document_order() {
        let root = parse_document("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        let names: Vec<&str> = root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_local_name_strips_prefix() {
        let root = parse_document(r#"<media:show xmlns:media="urn:x"/>"#).unwrap();
        assert_eq!(root.local_name(), "show");
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        assert!(parse_document("<tv><programme></tv>").is_err());
        assert!(parse_document("<tv>").is_err());
        assert!(parse_document("").is_err());
        assert!(parse_document("just text").is_err());
    }
}
