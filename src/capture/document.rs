use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use std::io::Read;
use xml5ever::driver::parse_document;
use xml5ever::tendril::TendrilSink;

use crate::scraper::ScrapeError;

lazy_static! {
    /// Markup constructs in document order; only `name` captures are tags
    static ref TAG_RE: Regex = Regex::new(
        r#"(?s)<!--.*?-->|<\?.*?\?>|<!\[CDATA\[.*?\]\]>|<![^>]*>|<(?P<close>/?)(?P<name>[^\s/>!?]+)(?:"[^"]*"|'[^']*'|[^"'>])*?(?P<empty>/?)>"#
    )
    .unwrap();
}

/// Parsed structured document produced by one generation pass
///
/// The rc-based DOM is copied into an owned, immutable tree so it can be
/// walked any number of times after the buffer is released.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Option<Element>,
}

/// An element with its attributes, child elements and text content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Document {
    /// Parse a UTF-8 XML stream.
    ///
    /// The parser recovers from input that ends inside an open element, so a
    /// truncated stream is rejected before it is handed over.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, ScrapeError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| ScrapeError::MalformedDocument(e.to_string()))?;
        check_elements_closed(text).map_err(ScrapeError::MalformedDocument)?;

        let dom: RcDom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut text.as_bytes())?;

        if let Some(error) = dom.errors.first() {
            return Err(ScrapeError::MalformedDocument(error.to_string()));
        }

        let root = dom
            .document
            .children
            .borrow()
            .iter()
            .find_map(Element::from_handle);

        Ok(Self { root })
    }

    pub fn from_xml(xml: &str) -> Result<Self, ScrapeError> {
        Self::parse(&mut xml.as_bytes())
    }

    /// First element of the document, if any
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn from_handle(handle: &Handle) -> Option<Self> {
        let NodeData::Element {
            ref name,
            ref attrs,
            ..
        } = handle.data
        else {
            return None;
        };

        let mut element = Element::new(&*name.local);
        element.attributes = attrs
            .borrow()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();

        for child in handle.children.borrow().iter() {
            match child.data {
                NodeData::Text { ref contents } => element.text.push_str(&contents.borrow()),
                NodeData::Element { .. } => element.children.extend(Element::from_handle(child)),
                _ => {}
            }
        }

        Some(element)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Boolean attribute; accepts `true`, `True` and `1`
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.attr(name), Some(value) if value.eq_ignore_ascii_case("true") || value == "1")
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Builder helpers for tests and hand-assembled documents
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }
}

/// Every start tag must be matched by its end tag before the input ends
fn check_elements_closed(text: &str) -> Result<(), String> {
    let mut open: Vec<&str> = Vec::new();

    for caps in TAG_RE.captures_iter(text) {
        let Some(name) = caps.name("name").map(|m| m.as_str()) else {
            continue;
        };
        let closing = caps.name("close").map_or(false, |m| !m.as_str().is_empty());
        let empty = caps.name("empty").map_or(false, |m| !m.as_str().is_empty());

        if closing {
            match open.pop() {
                Some(top) if top == name => {}
                Some(top) => return Err(format!("</{}> closes <{}>", name, top)),
                None => return Err(format!("</{}> without a start tag", name)),
            }
        } else if !empty {
            open.push(name);
        }
    }

    match open.last() {
        Some(name) => Err(format!("<{}> is not closed at end of input", name)),
        None => Ok(()),
    }
}

impl From<Element> for Document {
    fn from(root: Element) -> Self {
        Self { root: Some(root) }
    }
}
