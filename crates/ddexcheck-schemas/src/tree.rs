//! Navigable XML document tree built on quick-xml
//!
//! The tree keeps what the schema checker and the rule engine need: local
//! names, attributes, trimmed text, source positions and slash-delimited
//! element paths (`/NewReleaseMessage/ResourceList/SoundRecording[2]`).
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A 1-based line/column location in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The document could not be turned into a tree
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct TreeError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl TreeError {
    fn at(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            line: position.line,
            column: position.column,
        }
    }
}

/// An attribute as written on the element (qualified name kept)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

impl XmlAttribute {
    /// Attribute name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }
}

/// One element of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name, namespace prefix stripped
    pub name: String,
    pub prefix: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    /// Trimmed direct text and CDATA content
    pub text: String,
    pub children: Vec<XmlElement>,
    pub position: Position,
    pub path: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>, position: Position) -> Result<Self, TreeError> {
        let qname = start.name();
        let name = String::from_utf8_lossy(qname.local_name().as_ref()).into_owned();
        let prefix = qname
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| TreeError::at(format!("malformed attribute: {e}"), position))?;
            let value = attr
                .unescape_value()
                .map_err(|e| TreeError::at(format!("malformed attribute value: {e}"), position))?;
            attributes.push(XmlAttribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: value.into_owned(),
            });
        }

        Ok(Self {
            name,
            prefix,
            attributes,
            text: String::new(),
            children: Vec::new(),
            position,
            path: String::new(),
        })
    }

    /// Look up an attribute by qualified or local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .or_else(|| self.attributes.iter().find(|a| a.local_name() == name && !a.name.starts_with("xmlns")))
            .map(|a| a.value.as_str())
    }

    /// First direct child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child with the given name, if non-empty
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str()).filter(|t| !t.is_empty())
    }

    /// This element and everything below it, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element at or below this one with the given local name
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().find(|e| e.name == name)
    }

    /// Namespace URI bound to this element's prefix (or the default namespace)
    pub fn namespace(&self) -> Option<&str> {
        let key = match &self.prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        self.attributes
            .iter()
            .find(|a| a.name == key)
            .map(|a| a.value.as_str())
    }

    fn assign_paths(&mut self, path: String) {
        self.path = path;
        let mut totals: HashMap<String, usize> = HashMap::new();
        for child in &self.children {
            *totals.entry(child.name.clone()).or_insert(0) += 1;
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        for child in &mut self.children {
            let index = seen.entry(child.name.clone()).or_insert(0);
            *index += 1;
            let segment = if totals.get(&child.name).copied().unwrap_or(1) > 1 {
                format!("{}[{}]", child.name, index)
            } else {
                child.name.clone()
            };
            child.assign_paths(format!("{}/{}", self.path, segment));
        }
    }
}

/// Pre-order iterator over an element subtree
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Parse XML text into a tree
    pub fn parse(text: &str) -> Result<Self, TreeError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines = LineIndex::new(text);

        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                let offset = reader.error_position() as usize;
                TreeError::at(e.to_string(), lines.locate(text, offset))
            })?;
            let tag_start = text[before.min(text.len())..]
                .find('<')
                .map(|i| before + i)
                .unwrap_or(before);
            let position = lines.locate(text, tag_start);

            match event {
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(TreeError::at("content after the root element", position));
                    }
                    stack.push(XmlElement::from_start(&start, position)?);
                }
                Event::Empty(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(TreeError::at("content after the root element", position));
                    }
                    let element = XmlElement::from_start(&start, position)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| TreeError::at("unexpected closing tag", position))?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(content) => {
                    let value = content
                        .unescape()
                        .map_err(|e| TreeError::at(e.to_string(), position))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(value.trim()),
                        None if value.trim().is_empty() => {}
                        None => {
                            let at = lines.locate(text, before);
                            return Err(TreeError::at("text outside the root element", at));
                        }
                    }
                }
                Event::CData(content) => {
                    let bytes = content.into_inner();
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(String::from_utf8_lossy(&bytes).trim());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            let end = lines.locate(text, text.len());
            return Err(TreeError::at(format!("element <{}> is never closed", open.name), end));
        }

        let mut root = root.ok_or_else(|| TreeError::at("document has no root element", Position { line: 1, column: 1 }))?;
        let path = format!("/{}", root.name);
        root.assign_paths(path);
        Ok(Self { root })
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Every element in document order
    pub fn elements(&self) -> Descendants<'_> {
        self.root.descendants()
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Byte offset to line/column translation
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn locate(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(text.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let start = self.starts[line];
        let column = text
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - start);
        Position {
            line: line + 1,
            column: column + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ern:NewReleaseMessage xmlns:ern="http://ddex.net/xml/ern/382" MessageSchemaVersionId="ern/382">
  <ResourceList>
    <SoundRecording><ResourceReference>A1</ResourceReference></SoundRecording>
    <SoundRecording><ResourceReference>A2</ResourceReference></SoundRecording>
  </ResourceList>
  <Note><![CDATA[ raw & text ]]></Note>
</ern:NewReleaseMessage>"#;

    #[test]
    fn test_parse_builds_tree() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let root = doc.root();
        assert_eq!(root.name, "NewReleaseMessage");
        assert_eq!(root.prefix.as_deref(), Some("ern"));
        assert_eq!(root.namespace(), Some("http://ddex.net/xml/ern/382"));
        assert_eq!(root.attribute("MessageSchemaVersionId"), Some("ern/382"));
        assert_eq!(root.child("Note").unwrap().text, "raw & text");
    }

    #[test]
    fn test_paths_index_repeated_siblings_only() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let paths: Vec<&str> = doc
            .elements()
            .filter(|e| e.name == "ResourceReference")
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/NewReleaseMessage/ResourceList/SoundRecording[1]/ResourceReference",
                "/NewReleaseMessage/ResourceList/SoundRecording[2]/ResourceReference",
            ]
        );
        assert_eq!(doc.root().child("ResourceList").unwrap().path, "/NewReleaseMessage/ResourceList");
    }

    #[test]
    fn test_positions_point_at_tags() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root().position, Position { line: 2, column: 1 });
        let list = doc.root().child("ResourceList").unwrap();
        assert_eq!(list.position, Position { line: 3, column: 3 });
    }

    #[test]
    fn test_unclosed_element_is_error() {
        assert!(XmlDocument::parse("<a><b></b>").is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_error() {
        assert!(XmlDocument::parse("<a><b></c></a>").is_err());
    }

    #[test]
    fn test_empty_document_is_error() {
        let err = XmlDocument::parse("   ").unwrap_err();
        assert!(err.message.contains("no root"));
    }

    #[test]
    fn test_second_root_is_error() {
        assert!(XmlDocument::parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_bom_is_tolerated() {
        let doc = XmlDocument::parse("\u{feff}<a>x</a>").unwrap();
        assert_eq!(doc.root().text, "x");
    }
}
