//! In-memory DOM
//!
//! Implements the DOM traits over an arena built from an [`ElementNode`]
//! snapshot, so the heuristics can run without a rendering engine: in unit
//! tests, in the inspection CLI, or on pages captured elsewhere.

use super::element::{ElementNode, PageSnapshot, SnapshotNode, TextSnapshot, escape_html};
use super::{ComputedStyle, DomElement, DomRange, DomSelection, DomWindow, Location, Node, TextNode};
use crate::error::{Result, ShootError};
use crate::rect::Rect;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum ChildSlot {
    Element(usize),
    Text(TextNode),
}

#[derive(Debug, Clone)]
struct NodeData {
    tag_name: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    rect: Rect,
    value: Option<String>,
    scroll_left: f64,
    scroll_top: f64,
    parent: Option<usize>,
    children: Vec<ChildSlot>,
}

impl NodeData {
    fn from_snapshot(node: &ElementNode, parent: Option<usize>) -> Self {
        Self {
            tag_name: node.tag_name.to_ascii_uppercase(),
            attributes: node.attributes.clone(),
            style: node.style.clone(),
            rect: node.bounding_box,
            value: node.value.clone(),
            scroll_left: node.scroll_left,
            scroll_top: node.scroll_top,
            parent,
            children: Vec::new(),
        }
    }

    fn detached(tag_name: &str) -> Self {
        Self::from_snapshot(&ElementNode::new(tag_name), None)
    }
}

/// Arena holding every element of a document
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: RefCell<Vec<NodeData>>,
    root: usize,
}

impl MemoryDocument {
    /// Build a document from a snapshot root.
    ///
    /// An `html` root is used as is, a `body` root is wrapped into `html`,
    /// and any other element is wrapped into `html > body`.
    pub fn from_snapshot(root: &ElementNode) -> Result<Rc<Self>> {
        root.validate()?;

        let wrapped;
        let root = if root.is_tag("html") {
            root
        } else if root.is_tag("body") {
            wrapped = ElementNode::new("html")
                .with_bounding_box(root.bounding_box.x, root.bounding_box.y, root.bounding_box.width, root.bounding_box.height)
                .with_child(root.clone());
            &wrapped
        } else {
            let body = ElementNode::new("body")
                .with_bounding_box(root.bounding_box.x, root.bounding_box.y, root.bounding_box.width, root.bounding_box.height)
                .with_child(root.clone());
            wrapped = ElementNode::new("html")
                .with_bounding_box(root.bounding_box.x, root.bounding_box.y, root.bounding_box.width, root.bounding_box.height)
                .with_child(body);
            &wrapped
        };

        let mut nodes = Vec::new();
        Self::insert_static(root, None, &mut nodes);
        log::trace!("Built in-memory document with {} elements", nodes.len());

        Ok(Rc::new(Self {
            nodes: RefCell::new(nodes),
            root: 0,
        }))
    }

    /// Recursively copy a snapshot subtree into the arena, returning its index
    fn insert_static(node: &ElementNode, parent: Option<usize>, nodes: &mut Vec<NodeData>) -> usize {
        let index = nodes.len();
        nodes.push(NodeData::from_snapshot(node, parent));

        for child in &node.children {
            let slot = match child {
                SnapshotNode::Element(element) => ChildSlot::Element(Self::insert_static(element, Some(index), nodes)),
                SnapshotNode::Text(text) => ChildSlot::Text(TextNode {
                    data: text.text.clone(),
                    rect: text.bounding_box,
                }),
            };
            nodes[index].children.push(slot);
        }

        index
    }

    /// The `<html>` element
    pub fn document_element(self: &Rc<Self>) -> MemoryElement {
        MemoryElement {
            document: Rc::clone(self),
            index: self.root,
        }
    }

    /// The `<body>` element, if the document has one
    pub fn body(self: &Rc<Self>) -> Option<MemoryElement> {
        self.document_element()
            .children()
            .into_iter()
            .find(|child| child.is_tag("body"))
    }

    /// First element with the given `id` attribute, in document order
    pub fn element_by_id(self: &Rc<Self>, id: &str) -> Option<MemoryElement> {
        let root = self.document_element();
        std::iter::once(root.clone())
            .chain(root.descendants())
            .find(|element| element.id().as_deref() == Some(id))
    }

    /// Create an element that isn't attached to the tree
    pub fn create_element(self: &Rc<Self>, tag_name: &str) -> MemoryElement {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData::detached(tag_name));
        MemoryElement {
            document: Rc::clone(self),
            index: nodes.len() - 1,
        }
    }

    /// Number of elements in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }
}

/// Handle to an element of a [`MemoryDocument`]
#[derive(Clone)]
pub struct MemoryElement {
    document: Rc<MemoryDocument>,
    index: usize,
}

impl MemoryElement {
    fn with_data<T>(&self, f: impl FnOnce(&NodeData) -> T) -> T {
        f(&self.document.nodes.borrow()[self.index])
    }

    fn handle(&self, index: usize) -> MemoryElement {
        MemoryElement {
            document: Rc::clone(&self.document),
            index,
        }
    }

    /// Computed style properties set on this element
    fn style_properties(&self) -> IndexMap<String, String> {
        self.with_data(|data| data.style.clone())
    }

    /// Copy the element and its subtree back into a snapshot
    pub fn to_snapshot(&self) -> ElementNode {
        let (mut node, slots) = self.with_data(|data| {
            let mut node = ElementNode::new(data.tag_name.to_ascii_lowercase());
            node.attributes = data.attributes.clone();
            node.style = data.style.clone();
            node.bounding_box = data.rect;
            node.value = data.value.clone();
            node.scroll_left = data.scroll_left;
            node.scroll_top = data.scroll_top;
            (node, data.children.clone())
        });

        for slot in slots {
            node.children.push(match slot {
                ChildSlot::Element(index) => SnapshotNode::Element(self.handle(index).to_snapshot()),
                ChildSlot::Text(text) => SnapshotNode::Text(TextSnapshot {
                    text: text.data,
                    bounding_box: text.rect,
                }),
            });
        }
        node
    }

    /// Whether the element's own style hides it from hit testing
    fn is_display_none(&self) -> bool {
        self.with_data(|data| data.style.get("display").is_some_and(|d| d == "none"))
    }

    /// Deepest element under the point, later siblings painting on top
    fn hit_test(&self, x: f64, y: f64) -> Option<MemoryElement> {
        if self.is_display_none() {
            return None;
        }
        for child in self.children().into_iter().rev() {
            if let Some(hit) = child.hit_test(x, y) {
                return Some(hit);
            }
        }
        if self.bounding_client_rect().contains_point(x, y) {
            Some(self.clone())
        } else {
            None
        }
    }

    /// Nearest ancestor with a non-static position, or the body
    fn positioned_ancestor(&self) -> Option<MemoryElement> {
        let mut current = self.parent_element();
        while let Some(element) = current {
            if element.is_tag("body") {
                return Some(element);
            }
            let position = MemoryStyle::new(element.style_properties(), element.bounding_client_rect()).position();
            if position != "static" {
                return Some(element);
            }
            current = element.parent_element();
        }
        None
    }
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.document, &other.document) && self.index == other.index
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, id) = self.with_data(|data| (data.tag_name.clone(), data.attributes.get("id").cloned()));
        match id {
            Some(id) => write!(f, "<{}#{}>@{}", tag.to_ascii_lowercase(), id, self.index),
            None => write!(f, "<{}>@{}", tag.to_ascii_lowercase(), self.index),
        }
    }
}

impl DomElement for MemoryElement {
    fn tag_name(&self) -> String {
        self.with_data(|data| data.tag_name.clone())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.with_data(|data| data.attributes.get(name).cloned())
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.document.nodes.borrow_mut()[self.index]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.document.nodes.borrow_mut()[self.index]
            .attributes
            .shift_remove(name);
    }

    fn parent_element(&self) -> Option<Self> {
        self.with_data(|data| data.parent).map(|index| self.handle(index))
    }

    fn children(&self) -> Vec<Self> {
        let indices: Vec<usize> = self.with_data(|data| {
            data.children
                .iter()
                .filter_map(|slot| match slot {
                    ChildSlot::Element(index) => Some(*index),
                    ChildSlot::Text(_) => None,
                })
                .collect()
        });
        indices.into_iter().map(|index| self.handle(index)).collect()
    }

    fn child_nodes(&self) -> Vec<Node<Self>> {
        let slots = self.with_data(|data| data.children.clone());
        slots
            .into_iter()
            .map(|slot| match slot {
                ChildSlot::Element(index) => Node::Element(self.handle(index)),
                ChildSlot::Text(text) => Node::Text(text),
            })
            .collect()
    }

    fn bounding_client_rect(&self) -> Rect {
        self.with_data(|data| data.rect)
    }

    fn inner_text(&self) -> String {
        self.child_nodes()
            .into_iter()
            .map(|node| match node {
                Node::Element(element) => element.inner_text(),
                Node::Text(text) => text.data,
                Node::Other => String::new(),
            })
            .collect()
    }

    fn set_inner_text(&self, text: &str) {
        let rect = self.bounding_client_rect();
        self.document.nodes.borrow_mut()[self.index].children = vec![ChildSlot::Text(TextNode {
            data: text.to_string(),
            rect,
        })];
    }

    fn value(&self) -> Option<String> {
        self.with_data(|data| data.value.clone())
    }

    fn outer_html(&self) -> String {
        self.to_snapshot().to_html()
    }

    fn offset_left(&self) -> f64 {
        let rect = self.bounding_client_rect();
        match self.offset_parent() {
            Some(parent) => rect.x - parent.bounding_client_rect().x,
            None => rect.x,
        }
    }

    fn offset_top(&self) -> f64 {
        let rect = self.bounding_client_rect();
        match self.offset_parent() {
            Some(parent) => rect.y - parent.bounding_client_rect().y,
            None => rect.y,
        }
    }

    fn offset_parent(&self) -> Option<Self> {
        if self.is_tag("body") || self.is_tag("html") {
            return None;
        }
        self.positioned_ancestor()
    }

    fn scroll_left(&self) -> f64 {
        self.with_data(|data| data.scroll_left)
    }

    fn scroll_top(&self) -> f64 {
        self.with_data(|data| data.scroll_top)
    }
}

/// Computed style of a [`MemoryElement`].
///
/// Properties missing from the snapshot resolve to their CSS initial value;
/// `width` and `height` resolve to the used size of the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStyle {
    properties: IndexMap<String, String>,
    rect: Rect,
}

impl MemoryStyle {
    pub fn new(properties: IndexMap<String, String>, rect: Rect) -> Self {
        Self { properties, rect }
    }

    fn initial_value(&self, name: &str) -> String {
        match name {
            "display" => "block".to_string(),
            "visibility" => "visible".to_string(),
            "opacity" => "1".to_string(),
            "position" => "static".to_string(),
            "overflow" | "overflow-x" | "overflow-y" => "visible".to_string(),
            "clip" => "auto".to_string(),
            "clip-path" | "background-image" => "none".to_string(),
            "width" => format!("{}px", self.rect.width),
            "height" => format!("{}px", self.rect.height),
            _ => String::new(),
        }
    }
}

impl ComputedStyle for MemoryStyle {
    fn property_value(&self, name: &str) -> String {
        match self.properties.get(name) {
            Some(value) => value.clone(),
            None if name == "overflow-x" || name == "overflow-y" => self
                .properties
                .get("overflow")
                .cloned()
                .unwrap_or_else(|| self.initial_value(name)),
            None => self.initial_value(name),
        }
    }
}

/// A selected range: its text and the rects of its line boxes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryRange {
    pub text: String,
    pub rects: Vec<Rect>,
    pub common_ancestor: Option<MemoryElement>,
}

impl MemoryRange {
    pub fn new(text: impl Into<String>, rects: Vec<Rect>) -> Self {
        Self {
            text: text.into(),
            rects,
            common_ancestor: None,
        }
    }

    /// Builder method: set the element containing the range
    pub fn with_common_ancestor(mut self, element: &MemoryElement) -> Self {
        self.common_ancestor = Some(element.clone());
        self
    }
}

impl DomRange for MemoryRange {
    type Element = MemoryElement;

    fn client_rects(&self) -> Vec<Rect> {
        self.rects.clone()
    }

    fn html(&self) -> String {
        escape_html(&self.text)
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn common_ancestor_container(&self) -> Option<MemoryElement> {
        self.common_ancestor.clone()
    }
}

/// Text selection of a [`MemoryWindow`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemorySelection {
    pub ranges: Vec<MemoryRange>,
}

impl MemorySelection {
    pub fn new(ranges: Vec<MemoryRange>) -> Self {
        Self { ranges }
    }
}

impl DomSelection for MemorySelection {
    type Range = MemoryRange;

    fn is_collapsed(&self) -> bool {
        self.ranges.iter().all(|range| range.text.is_empty())
    }

    fn text(&self) -> String {
        self.ranges.iter().map(|range| range.text.as_str()).collect()
    }

    fn range_count(&self) -> usize {
        self.ranges.len()
    }

    fn range_at(&self, index: usize) -> Option<MemoryRange> {
        self.ranges.get(index).cloned()
    }
}

/// Browsing context a window is loaded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameContext {
    #[default]
    TopLevel,
    /// Iframe whose top level window is readable
    SameOriginFrame,
    /// Iframe whose top level window can't be accessed
    CrossOriginFrame,
}

/// Window over a [`MemoryDocument`]
pub struct MemoryWindow {
    document: Rc<MemoryDocument>,
    location: RefCell<Location>,
    inner_width: f64,
    inner_height: f64,
    frame: FrameContext,
    styles_available: bool,
    active_element: RefCell<Option<MemoryElement>>,
    selection: RefCell<MemorySelection>,
    rng: RefCell<StdRng>,
}

impl MemoryWindow {
    /// Create a top level window with a 1280x720 viewport
    pub fn new(document: Rc<MemoryDocument>, href: &str) -> Self {
        Self {
            document,
            location: RefCell::new(Location::parse(href)),
            inner_width: 1280.0,
            inner_height: 720.0,
            frame: FrameContext::TopLevel,
            styles_available: true,
            active_element: RefCell::new(None),
            selection: RefCell::new(MemorySelection::default()),
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    /// Build a document from a snapshot root and open it in a top level window
    pub fn from_root(root: &ElementNode, href: &str) -> Result<Self> {
        Ok(Self::new(MemoryDocument::from_snapshot(root)?, href))
    }

    /// Build a document and its window from a page snapshot.
    ///
    /// `first_href` is not applied here; it belongs to the embed resolver
    /// created for the window.
    pub fn from_snapshot(page: &PageSnapshot) -> Result<Self> {
        let document = MemoryDocument::from_snapshot(&page.root)?;
        let frame = if page.top_level {
            FrameContext::TopLevel
        } else {
            FrameContext::SameOriginFrame
        };

        let window = Self::new(Rc::clone(&document), &page.href)
            .with_viewport(page.inner_width, page.inner_height)
            .with_frame(frame);

        if let Some(id) = &page.active_element {
            let element = document
                .element_by_id(id)
                .ok_or_else(|| ShootError::InvalidSnapshot(format!("No active element with id {}", id)))?;
            window.focus(Some(&element));
        }

        Ok(window)
    }

    /// Builder method: set viewport size
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.inner_width = width;
        self.inner_height = height;
        self
    }

    /// Builder method: set the browsing context
    pub fn with_frame(mut self, frame: FrameContext) -> Self {
        self.frame = frame;
        self
    }

    /// Builder method: make computed style lookups unavailable
    pub fn without_computed_style(mut self) -> Self {
        self.styles_available = false;
        self
    }

    /// Builder method: seed the random source
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.borrow_mut() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn document(&self) -> &Rc<MemoryDocument> {
        &self.document
    }

    /// Change the current location, as a same-document navigation would
    pub fn navigate(&self, href: &str) {
        log::debug!("Navigating in-memory window to {}", href);
        *self.location.borrow_mut() = Location::parse(href);
    }

    /// Move focus to an element, or clear it
    pub fn focus(&self, element: Option<&MemoryElement>) {
        *self.active_element.borrow_mut() = element.cloned();
    }

    /// Replace the current selection
    pub fn select(&self, selection: MemorySelection) {
        *self.selection.borrow_mut() = selection;
    }
}

impl DomWindow for MemoryWindow {
    type Element = MemoryElement;
    type Style = MemoryStyle;
    type Selection = MemorySelection;

    fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn computed_style(&self, element: &MemoryElement) -> Option<MemoryStyle> {
        if !self.styles_available {
            return None;
        }
        Some(MemoryStyle::new(element.style_properties(), element.bounding_client_rect()))
    }

    fn inner_width(&self) -> f64 {
        self.inner_width
    }

    fn inner_height(&self) -> f64 {
        self.inner_height
    }

    fn random_u32(&self) -> u32 {
        self.rng.borrow_mut().r#gen()
    }

    fn is_top_level(&self) -> Result<bool> {
        match self.frame {
            FrameContext::TopLevel => Ok(true),
            FrameContext::SameOriginFrame => Ok(false),
            FrameContext::CrossOriginFrame => Err(ShootError::CrossOriginFrame),
        }
    }

    fn body(&self) -> Option<MemoryElement> {
        self.document.body()
    }

    fn document_element(&self) -> Option<MemoryElement> {
        Some(self.document.document_element())
    }

    fn active_element(&self) -> Option<MemoryElement> {
        self.active_element.borrow().clone().or_else(|| self.body())
    }

    fn selection(&self) -> Option<MemorySelection> {
        Some(self.selection.borrow().clone())
    }

    fn element_from_point(&self, x: f64, y: f64) -> Option<MemoryElement> {
        self.document.document_element().hit_test(x, y)
    }

    fn create_element(&self, tag_name: &str) -> MemoryElement {
        self.document.create_element(tag_name)
    }
}
