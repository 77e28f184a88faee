//! Capture eligibility
//!
//! Decides which elements are worth capturing (meaningful), and when the
//! pointing affordance has to stay out of the way: while typing in a text
//! field or while a text selection exists.

use super::element::{
    get_content_editable, get_text_value, is_image_container, is_media, is_textual_input_type, is_visible,
};
use super::embed::EmbedResolver;
use crate::dom::{DomElement, DomSelection, DomWindow, Node};
use serde::{Deserialize, Serialize};

const MARKUP_CHARS: [char; 6] = ['•', '-', '|', '–', '—', '·'];

/// A position in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Last known pointer position
pub type MouseLocation = Coordinates;

/// Modifier keys held during a pointer or keyboard event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModifierState {
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    /// Key value of keyboard events (`"Alt"`, `"a"`)
    pub key: Option<String>,
}

/// Check if the text is a single bullet or dash character
pub fn is_only_markup_char(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => MARKUP_CHARS.contains(&c),
        _ => false,
    }
}

/// Returns whether a text is useful enough as a single unit.
///
/// Rather than requiring some minimum length, only text made of a lone
/// markup character is filtered out.
pub fn is_text_meaningful(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !is_only_markup_char(trimmed)
}

/// Checks if an element is meaningful enough to be included within the
/// highlighted area: it's visible, and it's embeddable, a media, an image
/// or has some actual text content.
///
/// Embeds are recognized with the default configuration. Use
/// [`is_meaningful_with`] to honor a [`HelperConfig`](crate::HelperConfig).
pub fn is_meaningful<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    is_meaningful_with(element, &EmbedResolver::with_default_pattern(win))
}

/// [`is_meaningful`] recognizing embeds with the given resolver
pub fn is_meaningful_with<W: DomWindow>(element: &W::Element, resolver: &EmbedResolver<'_, W>) -> bool {
    let win = resolver.window();
    let has_content = resolver.is_embeddable_element(element)
        || is_media(element)
        || is_image_container(element, win)
        || get_text_value(element).is_some_and(|text| is_text_meaningful(&text));

    has_content && is_visible(element, win)
}

/// Returns true if the element matches known markup to ignore on specific sites
pub fn is_useless_site_specific_element<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    // Amazon magnifier
    win.location().hostname.contains("amazon.") && element.id().as_deref() == Some("magnifierLens")
}

/// The element is meaningful, or one of its direct children is. Embeds are
/// recognized with the default configuration.
pub fn is_meaningful_or_children_are<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    is_meaningful_or_children_are_with(element, &EmbedResolver::with_default_pattern(win))
}

pub fn is_meaningful_or_children_are_with<W: DomWindow>(element: &W::Element, resolver: &EmbedResolver<'_, W>) -> bool {
    is_meaningful_with(element, resolver)
        || element
            .children()
            .iter()
            .any(|child| is_meaningful_with(child, resolver))
}

/// Direct child nodes worth capturing: elements that are meaningful or have
/// meaningful children, and text nodes with meaningful text. Embeds are
/// recognized with the default configuration.
pub fn get_meaningful_child_nodes<W: DomWindow>(element: &W::Element, win: &W) -> Vec<Node<W::Element>> {
    get_meaningful_child_nodes_with(element, &EmbedResolver::with_default_pattern(win))
}

pub fn get_meaningful_child_nodes_with<W: DomWindow>(
    element: &W::Element,
    resolver: &EmbedResolver<'_, W>,
) -> Vec<Node<W::Element>> {
    element
        .child_nodes()
        .into_iter()
        .filter(|node| match node {
            Node::Element(child) => is_meaningful_or_children_are_with(child, resolver),
            Node::Text(text) => is_text_meaningful(&text.data),
            Node::Other => false,
        })
        .collect()
}

pub fn is_useless_or_children_are<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    !is_meaningful_or_children_are(element, win)
}

/// Every element and text node below `element`, depth-first in document
/// order. An element without such descendants yields itself.
pub fn get_element_and_text_child_nodes_recursively<E: DomElement>(element: &E) -> Vec<Node<E>> {
    let mut nodes = Vec::new();
    collect_element_and_text_nodes(element, &mut nodes);

    if nodes.is_empty() {
        return vec![Node::Element(element.clone())];
    }
    nodes
}

fn collect_element_and_text_nodes<E: DomElement>(element: &E, nodes: &mut Vec<Node<E>>) {
    for child in element.child_nodes() {
        match child {
            Node::Element(child) => {
                nodes.push(Node::Element(child.clone()));
                collect_element_and_text_nodes(&child, nodes);
            }
            Node::Text(text) => nodes.push(Node::Text(text)),
            Node::Other => {}
        }
    }
}

/// Returns true if Alt (Option on macOS) is the only modifier pressed
pub fn is_only_alt_key(event: &ModifierState) -> bool {
    let alt_key = event.alt_key || event.key.as_deref() == Some("Alt");
    alt_key && !event.ctrl_key && !event.meta_key && !event.shift_key
}

/// Returns true when the target has `contenteditable="true"` or `contenteditable="plaintext-only"`
pub fn is_explicitly_content_editable<E: DomElement>(target: &E) -> bool {
    matches!(get_content_editable(target).as_str(), "true" | "plaintext-only")
}

/// Check for an inherited contenteditable value by walking up the ancestors
/// until an explicitly set value is found
pub fn get_inherited_content_editable<E: DomElement>(element: &E) -> bool {
    let mut current = element.clone();
    loop {
        if is_explicitly_content_editable(&current) {
            return true;
        }
        if get_content_editable(&current) != "inherit" {
            return false;
        }
        match current.parent_element() {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// The target is a textual `<input>`/`<textarea>`, or is content editable
pub fn is_target_textual_input<E: DomElement>(target: &E) -> bool {
    is_textual_input_type(target) || get_inherited_content_editable(target)
}

/// Returns true when the target is inside the focused element. Always false
/// while the body has focus.
pub fn is_event_target_active<W: DomWindow>(win: &W, target: &W::Element) -> bool {
    win.active_element()
        .is_some_and(|active| !win.is_body(&active) && active.contains(target))
}

pub fn is_active_textual_input<W: DomWindow>(win: &W, target: &W::Element) -> bool {
    is_event_target_active(win, target) && is_target_textual_input(target)
}

/// Returns true when either coordinate differs from the last mouse location,
/// or when there is no last location
pub fn has_mouse_location_changed(mouse_location: Option<&MouseLocation>, client_x: f64, client_y: f64) -> bool {
    match mouse_location {
        Some(location) => location.x != client_x || location.y != client_y,
        None => true,
    }
}

/// Returns true when the focused element is a text input or content editable
pub fn has_focused_textual_input<W: DomWindow>(win: &W) -> bool {
    win.active_element()
        .is_some_and(|target| is_target_textual_input(&target))
}

/// Pointing is disabled while typing in a text input or with an active text selection
pub fn is_point_disabled<W: DomWindow>(win: &W, target: &W::Element) -> bool {
    is_active_textual_input(win, target) || has_focused_textual_input(win) || has_selection(win)
}

/// Returns whether the document has a non-empty text selection
pub fn has_selection<W: DomWindow>(win: &W) -> bool {
    win.selection()
        .is_some_and(|selection| !selection.is_collapsed() && !selection.text().is_empty())
}

pub fn get_selection_ranges<S: DomSelection>(selection: &S) -> Vec<S::Range> {
    (0..selection.range_count())
        .filter_map(|index| selection.range_at(index))
        .collect()
}

pub fn get_selection<W: DomWindow>(win: &W) -> Option<W::Selection> {
    win.selection()
}

pub fn get_element_at_mouse_location<W: DomWindow>(win: &W, mouse_location: &MouseLocation) -> Option<W::Element> {
    win.element_from_point(mouse_location.x, mouse_location.y)
}

/// Document position of the element's top left corner, taking the scroll
/// position of its ancestors into account
pub fn get_top_left<E: DomElement>(element: &E) -> Coordinates {
    let mut offset = Coordinates::default();
    let mut current = Some(element.clone());
    while let Some(node) = current {
        offset.x += node.offset_left();
        offset.y += node.offset_top();
        current = node.offset_parent();
    }

    let mut scrolled = Coordinates::default();
    let mut current = element.parent_element();
    while let Some(node) = current {
        scrolled.x += node.scroll_left();
        scrolled.y += node.scroll_top();
        if node.is_tag("html") {
            break;
        }
        current = node.parent_element();
    }

    Coordinates::new(offset.x - scrolled.x, offset.y - scrolled.y)
}
