//! DOM access layer
//!
//! The heuristics never talk to a rendering engine directly. They consume
//! the capability traits defined here, implemented by whatever hosts the web
//! content:
//! - DomElement: element handles (tag, attributes, tree links, geometry)
//! - ComputedStyle: computed CSS property lookup
//! - DomWindow: location, viewport, style resolution and document access
//! - DomSelection / DomRange: the current text selection
//!
//! An in-memory implementation built from JSON snapshots lives in [`memory`].

pub mod element;
pub mod memory;

pub use element::{ElementNode, PageSnapshot, SnapshotNode, TextSnapshot};
pub use memory::{FrameContext, MemoryDocument, MemoryElement, MemoryRange, MemorySelection, MemoryStyle, MemoryWindow};

use crate::error::Result;
use crate::rect::Rect;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Values of the input `type` attribute browsers recognize. `datetime` is
/// kept for older markup.
const INPUT_TYPES: [&str; 23] = [
    "button", "checkbox", "color", "date", "datetime", "datetime-local", "email", "file", "hidden", "image",
    "month", "number", "password", "radio", "range", "reset", "search", "submit", "tel", "text", "time", "url",
    "week",
];

/// A child node as seen through `childNodes`
#[derive(Debug, Clone, PartialEq)]
pub enum Node<E> {
    Element(E),
    Text(TextNode),
    /// Comments, processing instructions and other node types
    Other,
}

/// Text node data together with the rect its rendered glyphs occupy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextNode {
    pub data: String,
    pub rect: Rect,
}

impl<E> Node<E> {
    pub fn as_element(&self) -> Option<&E> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }
}

/// Handle to an element of the host document.
///
/// Handles are cheap to clone. Equality is node identity: two handles are
/// equal when they point at the same node.
pub trait DomElement: Clone + PartialEq + Debug {
    /// Upper-case tag name (`"DIV"`, `"IMG"`)
    fn tag_name(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    fn parent_element(&self) -> Option<Self>;

    /// Element children, in document order
    fn children(&self) -> Vec<Self>;

    /// All child nodes, in document order
    fn child_nodes(&self) -> Vec<Node<Self>>;

    fn bounding_client_rect(&self) -> Rect;

    /// Rendered text of the element and its descendants
    fn inner_text(&self) -> String;

    /// Replace the element's content with a single text node
    fn set_inner_text(&self, text: &str);

    /// Current value of a form control (`input`, `textarea`)
    fn value(&self) -> Option<String>;

    fn outer_html(&self) -> String;

    /// Lower-case tag name
    fn local_name(&self) -> String {
        self.tag_name().to_ascii_lowercase()
    }

    fn is_tag(&self, tag: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag)
    }

    fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    fn src(&self) -> Option<String> {
        self.attribute("src")
    }

    fn href(&self) -> Option<String> {
        self.attribute("href")
    }

    /// The `type` property of an input: lower-cased attribute, `"text"` when
    /// missing or not a known input type
    fn input_type(&self) -> String {
        self.attribute("type")
            .map(|t| t.to_ascii_lowercase())
            .filter(|t| INPUT_TYPES.contains(&t.as_str()))
            .unwrap_or_else(|| "text".to_string())
    }

    /// Check if `other` is this element or one of its descendants
    fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent_element();
        }
        false
    }

    /// All descendant elements, depth-first in document order
    fn descendants(&self) -> Vec<Self> {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(element) = stack.pop() {
            stack.extend(element.children().into_iter().rev());
            found.push(element);
        }
        found
    }

    /// Descendant elements with the given tag, like `querySelectorAll(tag)`
    fn query_selector_all_by_tag(&self, tag: &str) -> Vec<Self> {
        self.descendants()
            .into_iter()
            .filter(|element| element.is_tag(tag))
            .collect()
    }

    fn offset_left(&self) -> f64 {
        0.0
    }

    fn offset_top(&self) -> f64 {
        0.0
    }

    fn offset_parent(&self) -> Option<Self> {
        None
    }

    fn scroll_left(&self) -> f64 {
        0.0
    }

    fn scroll_top(&self) -> f64 {
        0.0
    }

    /// Width of the content, overflow included
    fn scroll_width(&self) -> f64 {
        self.bounding_client_rect().width
    }

    /// Height of the content, overflow included
    fn scroll_height(&self) -> f64 {
        self.bounding_client_rect().height
    }
}

/// Computed style of an element
pub trait ComputedStyle {
    /// Value of a CSS property, empty string when unknown
    fn property_value(&self, name: &str) -> String;

    fn display(&self) -> String {
        self.property_value("display")
    }

    fn position(&self) -> String {
        self.property_value("position")
    }

    fn background_image(&self) -> String {
        self.property_value("background-image")
    }
}

/// A range of the current selection
pub trait DomRange: Clone {
    type Element: DomElement;

    /// Rects of the boxes making up the range
    fn client_rects(&self) -> Vec<Rect>;

    /// Serialized markup of the range contents
    fn html(&self) -> String;

    /// Text content of the range
    fn text(&self) -> String;

    /// Deepest element containing the whole range
    fn common_ancestor_container(&self) -> Option<Self::Element>;
}

/// The document's current text selection
pub trait DomSelection {
    type Range: DomRange;

    fn is_collapsed(&self) -> bool;

    /// Stringified selection content
    fn text(&self) -> String;

    fn range_count(&self) -> usize;

    fn range_at(&self, index: usize) -> Option<Self::Range>;
}

/// The window hosting a document
pub trait DomWindow {
    type Element: DomElement;
    type Style: ComputedStyle;
    type Selection: DomSelection;

    fn location(&self) -> Location;

    /// `None` when style resolution is unavailable for the element
    fn computed_style(&self, element: &Self::Element) -> Option<Self::Style>;

    fn inner_width(&self) -> f64;

    fn inner_height(&self) -> f64;

    /// Source of randomness for identifiers, not cryptographically significant
    fn random_u32(&self) -> u32;

    /// Whether this window is the top level browsing context.
    ///
    /// Returns [`ShootError::CrossOriginFrame`](crate::error::ShootError::CrossOriginFrame)
    /// when the top level window can't be inspected.
    fn is_top_level(&self) -> Result<bool>;

    fn body(&self) -> Option<Self::Element>;

    /// The `<html>` element
    fn document_element(&self) -> Option<Self::Element>;

    fn active_element(&self) -> Option<Self::Element>;

    fn selection(&self) -> Option<Self::Selection>;

    fn element_from_point(&self, x: f64, y: f64) -> Option<Self::Element>;

    /// Create a detached element
    fn create_element(&self, tag_name: &str) -> Self::Element;

    fn is_body(&self, element: &Self::Element) -> bool {
        self.body().is_some_and(|body| &body == element)
    }
}

/// Window location broken into the parts the heuristics look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    pub href: String,
    pub hostname: String,
    pub pathname: String,
}

impl Location {
    /// Split an href into hostname and pathname.
    ///
    /// Unparsable hrefs keep the raw href with an empty hostname and pathname.
    pub fn parse(href: &str) -> Self {
        match url::Url::parse(href) {
            Ok(url) => Self {
                href: href.to_string(),
                hostname: url.host_str().unwrap_or_default().to_string(),
                pathname: url.path().to_string(),
            },
            Err(e) => {
                log::debug!("Failed to parse location {:?}: {}", href, e);
                Self {
                    href: href.to_string(),
                    hostname: String::new(),
                    pathname: String::new(),
                }
            }
        }
    }
}
