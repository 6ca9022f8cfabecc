//! Generic markup element tree.
//!
//! Rule definitions arrive as markup documents. The network builder never
//! looks at raw markup; it walks [`Element`] trees and asks them to print
//! themselves back to text when a structural hash is needed.
//!
//! Text content is trimmed on read. Mixed content (text interleaved with
//! child elements) is flattened: all text pieces are concatenated and
//! written back before the children.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::CoreError;

/// A single markup element with its attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element with the given tag name and no content.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Add an attribute. Attribute order is preserved.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// The tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an attribute value by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The trimmed text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// The first child element, if any.
    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// The first child element with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterate over child elements with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a markup document and return its root element.
    ///
    /// Declarations, comments and processing instructions are ignored.
    /// Exactly one root element is accepted.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => return Err(syntax_error(reader.buffer_position(), &e)),
            };

            match event {
                Event::Start(start) => {
                    stack.push(Self::from_start(&start, reader.buffer_position())?);
                }
                Event::Empty(start) => {
                    let element = Self::from_start(&start, reader.buffer_position())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(end) => {
                    let element = stack.pop().ok_or_else(|| {
                        CoreError::Unbalanced(format!(
                            "unexpected </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| syntax_error(reader.buffer_position(), &e))?;
                    append_text(stack.last_mut(), &text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    append_text(stack.last_mut(), text.trim());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(CoreError::Unbalanced(format!("unclosed <{}>", open.name)));
        }

        root.ok_or(CoreError::EmptyDocument)
    }

    /// Build an element from a start tag. `position` is the reader offset
    /// just past the tag.
    fn from_start<P>(start: &BytesStart<'_>, position: P) -> Result<Self, CoreError>
    where
        P: TryInto<u64> + Copy,
    {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| syntax_error(position, &e))?;
            let value = attr
                .unescape_value()
                .map_err(|e| syntax_error(position, &e))?;
            element.attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }

    /// Print the element (and its whole subtree) as compact markup.
    pub fn to_markup(&self) -> Result<String, CoreError> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), CoreError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        if let Some(ref text) = self.text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CoreError> {
    writer
        .write_event(event)
        .map_err(|e| CoreError::Serialization(e.to_string()))
}

fn syntax_error(position: impl TryInto<u64>, err: &dyn std::fmt::Display) -> CoreError {
    CoreError::Syntax {
        position: position.try_into().unwrap_or(u64::MAX),
        message: err.to_string(),
    }
}

fn append_text(target: Option<&mut Element>, text: &str) {
    let Some(element) = target else { return };
    if text.is_empty() {
        return;
    }
    match element.text {
        Some(ref mut existing) => existing.push_str(text),
        None => element.text = Some(text.to_owned()),
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), CoreError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(CoreError::MultipleRoots(element.name));
    }
    *root = Some(element);
    Ok(())
}
