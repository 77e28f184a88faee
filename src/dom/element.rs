use crate::error::{Result, ShootError};
use crate::rect::Rect;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serializable snapshot of an element and its subtree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "img", "iframe")
    pub tag_name: String,

    /// Element attributes, in source order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Computed style properties (hyphenated CSS names)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub style: IndexMap<String, String>,

    /// Child nodes (elements and text)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,

    /// Bounding client rect
    #[serde(default)]
    pub bounding_box: Rect,

    /// Form control value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default)]
    pub scroll_left: f64,

    #[serde(default)]
    pub scroll_top: f64,
}

/// A child node of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SnapshotNode {
    Element(ElementNode),
    Text(TextSnapshot),
}

/// Text node of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextSnapshot {
    pub text: String,

    #[serde(default)]
    pub bounding_box: Rect,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
            style: IndexMap::new(),
            children: Vec::new(),
            bounding_box: Rect::default(),
            value: None,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    /// Builder method: set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set a computed style property
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Builder method: append a text node sharing the element's bounding box
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let bounding_box = self.bounding_box;
        self.children.push(SnapshotNode::Text(TextSnapshot {
            text: text.into(),
            bounding_box,
        }));
        self
    }

    /// Builder method: append a child element
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.add_child(child);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children.into_iter().map(SnapshotNode::Element).collect();
        self
    }

    /// Builder method: set bounding box
    pub fn with_bounding_box(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = Rect::new(x, y, width, height);
        self
    }

    /// Builder method: set form control value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder method: set scroll offsets
    pub fn with_scroll(mut self, left: f64, top: f64) -> Self {
        self.scroll_left = left;
        self.scroll_top = top;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(SnapshotNode::Element(child));
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Check the snapshot is usable: every element needs a tag name
    pub fn validate(&self) -> Result<()> {
        if self.tag_name.trim().is_empty() {
            return Err(ShootError::InvalidSnapshot("element without tag name".to_string()));
        }
        for child in &self.children {
            if let SnapshotNode::Element(element) = child {
                element.validate()?;
            }
        }
        Ok(())
    }

    /// Serialize back to markup
    pub fn to_html(&self) -> String {
        let tag = self.tag_name.to_ascii_lowercase();
        let mut parts = vec![format!("<{}", tag)];

        for (key, value) in &self.attributes {
            parts.push(format!(" {}=\"{}\"", key, escape_html(value)));
        }
        parts.push(">".to_string());

        if is_void_element(&tag) {
            return parts.join("");
        }

        for child in &self.children {
            match child {
                SnapshotNode::Element(element) => parts.push(element.to_html()),
                SnapshotNode::Text(text) => parts.push(escape_html(&text.text)),
            }
        }

        parts.push(format!("</{}>", tag));
        parts.join("")
    }
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "track" | "wbr"
    )
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    720.0
}

fn default_true() -> bool {
    true
}

/// A captured page: location, viewport and the document tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSnapshot {
    /// Location of the window
    pub href: String,

    /// Location loaded when the window was created, if it has navigated since
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_href: Option<String>,

    #[serde(default = "default_viewport_width")]
    pub inner_width: f64,

    #[serde(default = "default_viewport_height")]
    pub inner_height: f64,

    /// Whether the page is loaded in the top level frame
    #[serde(default = "default_true")]
    pub top_level: bool,

    /// `id` of the focused element, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_element: Option<String>,

    /// Document root (`html`, `body`, or any element to be wrapped into a body)
    pub root: ElementNode,
}

impl PageSnapshot {
    /// Parse a page snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: PageSnapshot = serde_json::from_str(json)
            .map_err(|e| ShootError::SnapshotParse(format!("Failed to parse page JSON: {}", e)))?;
        snapshot.root.validate()?;
        Ok(snapshot)
    }

    /// Convert the page snapshot to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ShootError::SnapshotParse(format!("Failed to serialize page to JSON: {}", e)))
    }
}
