use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{ParseError, ParseResult};

/// Minimal element tree for the legacy XML responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn new(start: &BytesStart) -> Self {
        Element {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            children: Vec::new(),
        }
    }

    /// Parses a document and returns its root element.
    pub fn parse(text: &str) -> ParseResult<Element> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::new(&start)),
                Event::Empty(start) => {
                    let element = Element::new(&start);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => return Ok(element),
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        ParseError::XmlStructure("closing tag without an open element".into())
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(element)),
                        None => return Ok(element),
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(text);
                    }
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Err(ParseError::XmlStructure(match stack.last() {
            Some(open) => format!("element <{}> is never closed", open.name),
            None => "document has no root element".into(),
        }))
    }

    fn push_text(&mut self, text: Cow<str>) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Node::Text(text.into_owned()));
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|e| e.name == name)
    }

    /// Every element below this one named `name`, in document order.
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.children() {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    pub fn first_descendant(&self, name: &str) -> Option<&Element> {
        for child in self.children() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Text of the first child node, when that node is text.
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Node::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Text of the first direct child named `name`.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(Element::text).map(str::to_string)
    }

    /// Text of the first descendant named `name`.
    pub fn descendant_text(&self, name: &str) -> Option<String> {
        self.first_descendant(name)
            .and_then(Element::text)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_document() {
        let root = Element::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <person>
              <id>42</id>
              <location><name>Istanbul</name><country><code>tr</code></country></location>
              <empty/>
            </person>"#,
        )
        .unwrap();
        assert_eq!(root.name(), "person");
        assert_eq!(root.child_text("id").as_deref(), Some("42"));
        assert_eq!(root.descendant_text("code").as_deref(), Some("tr"));
        assert!(root.child("empty").unwrap().text().is_none());
        assert!(root.child("code").is_none());
    }

    #[test]
    fn entities_are_unescaped() {
        let root = Element::parse("<a><u>http://x/?a=1&amp;b=2</u></a>").unwrap();
        assert_eq!(root.child_text("u").as_deref(), Some("http://x/?a=1&b=2"));
    }

    #[test]
    fn descendants_in_document_order() {
        let root =
            Element::parse("<r><s><n>1</n><s><n>2</n></s></s><s><n>3</n></s></r>").unwrap();
        let texts: Vec<String> = root
            .descendants("s")
            .into_iter()
            .filter_map(|s| s.child_text("n"))
            .collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn element_with_children_has_no_text() {
        let root = Element::parse("<r><company><name>Acme</name></company></r>").unwrap();
        assert!(root.child("company").unwrap().text().is_none());
    }

    #[test]
    fn unclosed_document_fails() {
        assert!(matches!(
            Element::parse("<person><id>1</id>"),
            Err(ParseError::XmlStructure(_))
        ));
    }

    #[test]
    fn mismatched_tags_fail() {
        assert!(Element::parse("<person><id>1</name></person>").is_err());
    }

    #[test]
    fn empty_document_fails() {
        assert!(Element::parse("").is_err());
    }
}
