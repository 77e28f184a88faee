//! Clipping resolution
//!
//! Walks the ancestor chain of an element to find which ancestors clip it
//! through `overflow`, `clip` or `clip-path`, and computes the area left
//! visible by those ancestors. The area can extend infinitely along an axis
//! that no ancestor clips.

use crate::dom::{ComputedStyle, DomElement, DomWindow};
use crate::rect::{self, Rect};

/// Check if a style lets content overflow on every axis
fn is_non_clipping<S: ComputedStyle>(style: &S) -> bool {
    style.property_value("overflow") == "visible"
        && style.property_value("overflow-x") == "visible"
        && style.property_value("overflow-y") == "visible"
        && style.property_value("clip") == "auto"
        && style.property_value("clip-path") == "none"
}

/// Return the first overflow escaping element between `element` and the body.
///
/// CSS overflow clipping is escaped by elements positioned against the
/// viewport or against a containing block outside the clipping container:
/// - `fixed` elements always escape.
/// - `absolute` elements escape when their nearest positioned ancestor is
///   missing or lies outside `clipping_container`. When that ancestor is the
///   container or inside it the element stays clipped and the walk goes on.
pub fn get_overflow_escaping_element<W: DomWindow>(
    element: &W::Element,
    clipping_container: &W::Element,
    win: &W,
) -> Option<W::Element> {
    let mut current = element.clone();
    loop {
        if win.is_body(&current) {
            return None;
        }
        let style = win.computed_style(&current)?;
        match style.position().as_str() {
            "fixed" => return Some(current),
            "absolute" => {
                let parent = current.parent_element();
                let positioned_ancestor = super::element::get_positioned_element(parent.as_ref(), win);
                let escapes = match &positioned_ancestor {
                    None => true,
                    Some(ancestor) => !clipping_container.contains(ancestor),
                };
                if escapes {
                    return Some(current);
                }
                current = parent?;
            }
            _ => current = current.parent_element()?,
        }
    }
}

/// Find the element itself or its first ancestor with an `overflow`, `clip`
/// or `clip-path` property clipping its content. Elements without computed
/// style are skipped.
pub fn get_clipping_element<W: DomWindow>(element: &W::Element, win: &W) -> Option<W::Element> {
    let mut current = element.clone();
    loop {
        if win.is_body(&current) {
            return None;
        }
        if let Some(style) = win.computed_style(&current) {
            if !is_non_clipping(&style) {
                return Some(current);
            }
        }
        current = current.parent_element()?;
    }
}

/// Every element clipping `element`, innermost first
pub fn get_clipping_elements<W: DomWindow>(element: &W::Element, win: &W) -> Vec<W::Element> {
    let mut clipping_elements = Vec::new();
    let mut current = element.clone();

    while let Some(clipping_element) = get_clipping_element(&current, win) {
        let parent = clipping_element.parent_element();
        clipping_elements.push(clipping_element);
        match parent {
            Some(parent) if !win.is_body(&parent) => current = parent,
            _ => break,
        }
    }

    clipping_elements
}

/// Area an element clips its content to. Only clipping on the x axis leaves
/// the area vertically unbounded, and the other way around.
fn clip_rect<W: DomWindow>(element: &W::Element, win: &W) -> Option<Rect> {
    let style = win.computed_style(element)?;
    if is_non_clipping(&style) {
        return None;
    }

    let overflow_x = style.property_value("overflow-x") != "visible";
    let overflow_y = style.property_value("overflow-y") != "visible";
    let bounds = element.bounding_client_rect();

    if overflow_x && !overflow_y {
        Some(Rect::horizontal_band(bounds.x, bounds.width))
    } else if overflow_y && !overflow_x {
        Some(Rect::vertical_band(bounds.y, bounds.height))
    } else {
        Some(bounds)
    }
}

/// Intersection of the clipping areas of the given elements.
///
/// Elements that don't clip (or have no computed style) contribute nothing.
/// When the running area becomes empty the next area starts over, so only
/// the last areas are intersected. Returns `None` when nothing clips.
pub fn get_clipping_area<W: DomWindow>(elements: &[W::Element], win: &W) -> Option<Rect> {
    elements
        .iter()
        .filter_map(|element| clip_rect(element, win))
        .fold(None, |clipping_area, area| match clipping_area {
            Some(clipping_area) => rect::intersection(&clipping_area, &area),
            None => Some(area),
        })
}

/// The clipping elements of `element` it doesn't escape from
pub fn get_clipping_containers<W: DomWindow>(element: &W::Element, win: &W) -> Vec<W::Element> {
    get_clipping_elements(element, win)
        .into_iter()
        .filter(|container| match get_overflow_escaping_element(element, container, win) {
            None => true,
            Some(escaping) => escaping.contains(container),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementNode, MemoryElement, MemoryWindow};

    fn window(root: ElementNode) -> MemoryWindow {
        MemoryWindow::from_root(&root, "https://example.com/").unwrap()
    }

    fn by_id(win: &MemoryWindow, id: &str) -> MemoryElement {
        win.document().element_by_id(id).unwrap()
    }

    fn node(tag: &str, id: &str, x: f64, y: f64, width: f64, height: f64) -> ElementNode {
        ElementNode::new(tag)
            .with_attribute("id", id)
            .with_bounding_box(x, y, width, height)
    }

    fn nested_clipping_page() -> MemoryWindow {
        window(
            ElementNode::new("body").with_child(
                node("div", "outer", 0.0, 0.0, 500.0, 500.0)
                    .with_style("overflow", "hidden")
                    .with_child(
                        node("div", "middle", 0.0, 0.0, 500.0, 500.0).with_child(
                            node("div", "inner", 10.0, 0.0, 100.0, 50.0)
                                .with_style("overflow-x", "hidden")
                                .with_style("overflow-y", "visible")
                                .with_child(node("span", "leaf", 10.0, 0.0, 300.0, 20.0)),
                        ),
                    ),
            ),
        )
    }

    #[test]
    fn test_get_clipping_element() {
        let win = nested_clipping_page();

        assert_eq!(get_clipping_element(&by_id(&win, "leaf"), &win), Some(by_id(&win, "inner")));
        assert_eq!(get_clipping_element(&by_id(&win, "middle"), &win), Some(by_id(&win, "outer")));
        assert_eq!(get_clipping_element(&win.body().unwrap(), &win), None);
    }

    #[test]
    fn test_clip_and_clip_path_clip() {
        let win = window(
            ElementNode::new("body")
                .with_child(node("div", "clip", 0.0, 0.0, 10.0, 10.0).with_style("clip", "rect(0px, 5px, 5px, 0px)").with_child(node("i", "a", 0.0, 0.0, 1.0, 1.0)))
                .with_child(node("div", "path", 0.0, 0.0, 10.0, 10.0).with_style("clip-path", "circle(50%)").with_child(node("i", "b", 0.0, 0.0, 1.0, 1.0))),
        );

        assert_eq!(get_clipping_element(&by_id(&win, "a"), &win), Some(by_id(&win, "clip")));
        assert_eq!(get_clipping_element(&by_id(&win, "b"), &win), Some(by_id(&win, "path")));
    }

    #[test]
    fn test_get_clipping_elements_innermost_first() {
        let win = nested_clipping_page();
        let elements = get_clipping_elements(&by_id(&win, "leaf"), &win);

        assert_eq!(elements, vec![by_id(&win, "inner"), by_id(&win, "outer")]);
    }

    #[test]
    fn test_no_clipping_elements() {
        let win = window(ElementNode::new("body").with_child(node("div", "free", 0.0, 0.0, 10.0, 10.0)));

        assert!(get_clipping_elements(&by_id(&win, "free"), &win).is_empty());
        assert_eq!(get_clipping_area(&[], &win), None);
    }

    #[test]
    fn test_clipping_area_single_axis() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "outer", 0.0, 0.0, 500.0, 500.0).with_child(
                    node("div", "inner", 10.0, 0.0, 100.0, 50.0)
                        .with_style("overflow-x", "hidden")
                        .with_style("overflow-y", "visible")
                        .with_child(node("span", "leaf", 10.0, 0.0, 300.0, 20.0)),
                ),
            ),
        );

        let area = get_clipping_area(&[by_id(&win, "inner"), by_id(&win, "outer")], &win).unwrap();
        assert_eq!(area.x, 10.0);
        assert_eq!(area.width, 100.0);
        assert_eq!(area.y, f64::NEG_INFINITY);
        assert_eq!(area.height, f64::INFINITY);

        let containers = get_clipping_elements(&by_id(&win, "leaf"), &win);
        assert_eq!(get_clipping_area(&containers, &win), Some(area));
    }

    #[test]
    fn test_clipping_area_vertical_axis() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "scroller", 0.0, 40.0, 300.0, 200.0)
                    .with_style("overflow-y", "auto"),
            ),
        );

        let area = get_clipping_area(&[by_id(&win, "scroller")], &win).unwrap();
        assert_eq!(area.y, 40.0);
        assert_eq!(area.height, 200.0);
        assert_eq!(area.x, f64::NEG_INFINITY);
        assert_eq!(area.width, f64::INFINITY);
    }

    #[test]
    fn test_clipping_area_intersects_nested_clips() {
        let win = nested_clipping_page();
        let elements = get_clipping_elements(&by_id(&win, "leaf"), &win);

        assert_eq!(get_clipping_area(&elements, &win), Some(Rect::new(10.0, 0.0, 100.0, 500.0)));
    }

    #[test]
    fn test_clipping_area_disjoint_clips() {
        let win = window(
            ElementNode::new("body")
                .with_child(node("div", "left", 0.0, 0.0, 100.0, 100.0).with_style("overflow", "hidden"))
                .with_child(node("div", "right", 200.0, 0.0, 100.0, 100.0).with_style("overflow", "hidden")),
        );

        assert_eq!(get_clipping_area(&[by_id(&win, "left"), by_id(&win, "right")], &win), None);
    }

    #[test]
    fn test_clipping_area_restarts_after_empty_intersection() {
        let win = window(
            ElementNode::new("body")
                .with_child(node("div", "left", 0.0, 0.0, 100.0, 100.0).with_style("overflow", "hidden"))
                .with_child(node("div", "right", 200.0, 0.0, 100.0, 100.0).with_style("overflow", "hidden"))
                .with_child(node("div", "corner", 0.0, 0.0, 50.0, 50.0).with_style("overflow", "hidden")),
        );
        let elements = [by_id(&win, "left"), by_id(&win, "right"), by_id(&win, "corner")];

        assert_eq!(get_clipping_area(&elements, &win), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_absolute_inside_positioned_container_is_clipped() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "container", 0.0, 0.0, 100.0, 100.0)
                    .with_style("overflow", "hidden")
                    .with_style("position", "relative")
                    .with_child(node("div", "popup", 50.0, 50.0, 200.0, 200.0).with_style("position", "absolute")),
            ),
        );
        let popup = by_id(&win, "popup");
        let container = by_id(&win, "container");

        assert_eq!(get_overflow_escaping_element(&popup, &container, &win), None);
        assert_eq!(get_clipping_containers(&popup, &win), vec![container]);
    }

    #[test]
    fn test_absolute_positioned_outside_container_escapes() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "wrapper", 0.0, 0.0, 400.0, 400.0)
                    .with_style("position", "relative")
                    .with_child(
                        node("div", "container", 0.0, 0.0, 100.0, 100.0)
                            .with_style("overflow", "hidden")
                            .with_child(node("div", "popup", 50.0, 50.0, 200.0, 200.0).with_style("position", "absolute")),
                    ),
            ),
        );
        let popup = by_id(&win, "popup");
        let container = by_id(&win, "container");

        assert_eq!(get_overflow_escaping_element(&popup, &container, &win), Some(popup.clone()));
        assert!(get_clipping_containers(&popup, &win).is_empty());
    }

    #[test]
    fn test_absolute_without_positioned_ancestor_escapes() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "container", 0.0, 0.0, 100.0, 100.0)
                    .with_style("overflow", "hidden")
                    .with_child(node("div", "popup", 50.0, 50.0, 200.0, 200.0).with_style("position", "absolute")),
            ),
        );
        let popup = by_id(&win, "popup");

        assert_eq!(
            get_overflow_escaping_element(&popup, &by_id(&win, "container"), &win),
            Some(popup.clone())
        );
        assert!(get_clipping_containers(&popup, &win).is_empty());
    }

    #[test]
    fn test_fixed_always_escapes() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "container", 0.0, 0.0, 100.0, 100.0)
                    .with_style("overflow", "hidden")
                    .with_style("position", "relative")
                    .with_child(node("div", "banner", 0.0, 0.0, 1280.0, 40.0).with_style("position", "fixed")),
            ),
        );
        let banner = by_id(&win, "banner");

        assert_eq!(
            get_overflow_escaping_element(&banner, &by_id(&win, "container"), &win),
            Some(banner.clone())
        );
        assert!(get_clipping_containers(&banner, &win).is_empty());
    }

    #[test]
    fn test_escaping_ancestor_keeps_inner_container() {
        let win = window(
            ElementNode::new("body").with_child(
                node("div", "dialog", 0.0, 0.0, 600.0, 400.0)
                    .with_style("position", "fixed")
                    .with_child(
                        node("div", "scroller", 0.0, 0.0, 600.0, 300.0)
                            .with_style("overflow-y", "scroll")
                            .with_child(node("p", "text", 0.0, 0.0, 600.0, 900.0)),
                    ),
            ),
        );
        let text = by_id(&win, "text");

        assert_eq!(
            get_overflow_escaping_element(&text, &by_id(&win, "scroller"), &win),
            Some(by_id(&win, "dialog"))
        );
        assert_eq!(get_clipping_containers(&text, &win), vec![by_id(&win, "scroller")]);
    }
}
