//! Element classification
//!
//! Stateless predicates answering visibility, media/image and text input
//! questions about a single element. Missing computed style is treated as
//! "no information" and resolves to the permissive answer.

use super::embed::EmbedResolver;
use crate::config::{DEFAULT_LARGER_THAN_WINDOW_PERCENT, DEFAULT_PARENT_SEARCH_DEPTH};
use crate::dom::{ComputedStyle, DomElement, DomWindow};
use crate::rect::Rect;
use once_cell::sync::Lazy;
use regex::Regex;

static CLIP_RECT_ZERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"rect\((0(px)?[, ]+){3}0px\)").expect("valid clip regex"));

// Only single percentage insets of 50% and more hide the element
static CLIP_PATH_INSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"inset\(([5-9]\d|100)%\)").expect("valid clip-path regex"));

static BACKGROUND_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"url\(([^)]+)").expect("valid url regex"));

const TEXTUAL_INPUT_TYPES: [&str; 13] = [
    "text",
    "email",
    "password",
    "date",
    "datetime-local",
    "month",
    "number",
    "search",
    "tel",
    "time",
    "url",
    "week",
    // legacy
    "datetime",
];

pub fn get_attribute<E: DomElement>(name: &str, element: &E) -> Option<String> {
    element.attribute(name)
}

pub fn get_type<E: DomElement>(element: &E) -> Option<String> {
    get_attribute("type", element)
}

/// The `contenteditable` attribute, `"inherit"` when missing or empty
pub fn get_content_editable<E: DomElement>(element: &E) -> String {
    get_attribute("contenteditable", element)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "inherit".to_string())
}

/// Returns if an element is a textarea or an input with a text based type
/// (text, email, date, number...)
pub fn is_textual_input_type<E: DomElement>(element: &E) -> bool {
    match element.local_name().as_str() {
        "textarea" => true,
        "input" => TEXTUAL_INPUT_TYPES.contains(&element.input_type().as_str()),
        _ => false,
    }
}

/// Text value of an element: the value of text inputs and textareas, the
/// rendered text of anything else. `None` for non-textual inputs.
pub fn get_text_value<E: DomElement>(element: &E) -> Option<String> {
    match element.local_name().as_str() {
        "input" => {
            if is_textual_input_type(element) {
                element.value()
            } else {
                None
            }
        }
        "textarea" => element.value(),
        _ => Some(element.inner_text()),
    }
}

/// URL of the computed background image, quotes stripped
pub fn get_background_image_url<W: DomWindow>(element: &W::Element, win: &W) -> Option<String> {
    let style = win.computed_style(element)?;
    let background = style.background_image();
    let captures = BACKGROUND_URL.captures(&background)?;
    let url = captures.get(1)?.as_str().replace(['\'', '"'], "");
    Some(url)
}

fn has_background_image<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    win.computed_style(element)
        .is_some_and(|style| BACKGROUND_URL.is_match(&style.background_image()))
}

/// Check the computed style for any of the usual ways of hiding an element
fn is_hidden_by_style<S: ComputedStyle>(style: &S) -> bool {
    let width = style.property_value("width");
    let height = style.property_value("height");

    style.display() == "none"
        // opacity isn't considered: sites put transparent inputs on top of custom UI
        || matches!(style.property_value("visibility").as_str(), "hidden" | "collapse")
        // 1px tracking pixels
        || (width == "1px" && height == "1px")
        || matches!(width.as_str(), "0px" | "0")
        || matches!(height.as_str(), "0px" | "0")
        || (style.position() == "absolute" && CLIP_RECT_ZERO.is_match(&style.property_value("clip")))
        || CLIP_PATH_INSET.is_match(&style.property_value("clip-path"))
}

/// Determine whether an element is visible based on its computed style, and
/// on its bounding box when the style doesn't rule it out.
pub fn is_visible<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    if let Some(style) = win.computed_style(element) {
        if is_hidden_by_style(&style) {
            return false;
        }
    }

    // Layout is the expensive part, only query it when still visible
    element.bounding_client_rect().has_area()
}

/// Returns whether an element is a video or audio element, or contains one
pub fn is_media<E: DomElement>(element: &E) -> bool {
    matches!(element.local_name().as_str(), "video" | "audio")
        || element
            .descendants()
            .iter()
            .any(|descendant| descendant.is_tag("video") || descendant.is_tag("audio"))
}

/// Default image matcher: `img` and `svg` elements
pub fn image_element_matcher<E: DomElement>(element: &E) -> bool {
    matches!(element.local_name().as_str(), "img" | "svg")
}

/// Matcher accepting images and elements containing an `img` or `svg`
pub fn image_or_image_child_matcher<E: DomElement>(element: &E) -> bool {
    image_element_matcher(element)
        || element
            .descendants()
            .iter()
            .any(|descendant| image_element_matcher(descendant))
}

/// Check whether an element is an image, or has a background image url.
/// The background image can be a data uri.
pub fn is_image<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    is_image_with(element, win, image_element_matcher::<W::Element>)
}

/// [`is_image`] with a custom element matcher
pub fn is_image_with<W, F>(element: &W::Element, win: &W, matcher: F) -> bool
where
    W: DomWindow,
    F: Fn(&W::Element) -> bool,
{
    matcher(element) || has_background_image(element, win)
}

pub fn is_image_or_contains_image_child<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    is_image_with(element, win, image_or_image_child_matcher::<W::Element>)
}

/// Returns whether an element is an image container: an image itself, or an
/// element whose children are all image containers
pub fn is_image_container<W: DomWindow>(element: &W::Element, win: &W) -> bool {
    if is_image(element, win) {
        return true;
    }
    let children = element.children();
    !children.is_empty() && children.iter().all(|child| is_image_container(child, win))
}

/// Closest element of the given tag, starting with the element itself.
///
/// At most `max_depth` elements are inspected. The search never climbs past
/// `body` unless `body` is the tag searched for, and an element without a
/// parent is never returned.
pub fn has_parent_of_type<E: DomElement>(element: &E, tag_type: &str, max_depth: usize) -> Option<E> {
    let searching_body = tag_type.eq_ignore_ascii_case("BODY");
    let mut current = element.clone();
    let mut remaining = max_depth;

    loop {
        if remaining == 0 {
            return None;
        }
        if !searching_body && current.is_tag("BODY") {
            return None;
        }
        let parent = current.parent_element()?;
        if current.is_tag(tag_type) {
            return Some(current);
        }
        remaining -= 1;
        current = parent;
    }
}

/// [`has_parent_of_type`] with the default depth of 10. See
/// [`EmbedResolver::find_parent_of_type`] for the configured depth.
pub fn find_parent_of_type<E: DomElement>(element: &E, tag_type: &str) -> Option<E> {
    has_parent_of_type(element, tag_type, DEFAULT_PARENT_SEARCH_DEPTH)
}

/// Returns the root svg element for the given element if any
pub fn get_svg_root<E: DomElement>(element: &E) -> Option<E> {
    let mut current = element.clone();
    loop {
        match current.local_name().as_str() {
            "body" | "html" => return None,
            "svg" => return Some(current),
            _ => current = current.parent_element()?,
        }
    }
}

/// Returns the first positioned element out of the element itself and its ancestors.
///
/// Elements without computed style count as positioned.
pub fn get_positioned_element<W: DomWindow>(element: Option<&W::Element>, win: &W) -> Option<W::Element> {
    let mut current = element.cloned();
    while let Some(element) = current {
        if win.is_body(&element) {
            return None;
        }
        let is_static = win
            .computed_style(&element)
            .is_some_and(|style| style.position() == "static");
        if !is_static {
            return Some(element);
        }
        current = element.parent_element();
    }
    None
}

/// Checks if bounds are more than 110% taller or wider than the viewport.
/// Height is checked first so the width lookup can be skipped.
///
/// The threshold is 110%, older documentation of this check said 120%.
pub fn is_larger_than_window<W: DomWindow>(bounds: &Rect, win: &W) -> bool {
    is_larger_than_window_by(bounds, win, DEFAULT_LARGER_THAN_WINDOW_PERCENT)
}

/// [`is_larger_than_window`] with a custom threshold in percent
pub fn is_larger_than_window_by<W: DomWindow>(bounds: &Rect, win: &W, percent: f64) -> bool {
    let y_percent = (100.0 / win.inner_height()) * bounds.height;
    if y_percent > percent {
        return true;
    }
    let x_percent = (100.0 / win.inner_width()) * bounds.width;
    x_percent > percent
}

/// Substitute embeddable elements with the link to their content.
///
/// Uses the default embed providers; [`EmbedResolver::parse_element_based_on_styles`]
/// uses the configured ones.
pub fn parse_element_based_on_styles<W: DomWindow>(element: &W::Element, win: &W) -> W::Element {
    EmbedResolver::with_default_pattern(win).parse_element_based_on_styles(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementNode, MemoryWindow};

    const HREF: &str = "https://example.com/";

    fn window(root: ElementNode) -> MemoryWindow {
        MemoryWindow::from_root(&root, HREF).unwrap()
    }

    fn by_id(win: &MemoryWindow, id: &str) -> crate::dom::MemoryElement {
        win.document().element_by_id(id).unwrap()
    }

    fn sized(tag: &str, id: &str) -> ElementNode {
        ElementNode::new(tag)
            .with_attribute("id", id)
            .with_bounding_box(0.0, 0.0, 100.0, 50.0)
    }

    #[test]
    fn test_content_editable_default() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("div", "plain"))
                .with_child(sized("div", "empty").with_attribute("contenteditable", ""))
                .with_child(sized("div", "edit").with_attribute("contenteditable", "true")),
        );

        assert_eq!(get_content_editable(&by_id(&win, "plain")), "inherit");
        assert_eq!(get_content_editable(&by_id(&win, "empty")), "inherit");
        assert_eq!(get_content_editable(&by_id(&win, "edit")), "true");
    }

    #[test]
    fn test_is_textual_input_type() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("textarea", "area"))
                .with_child(sized("input", "untyped"))
                .with_child(sized("input", "email").with_attribute("type", "email"))
                .with_child(sized("input", "legacy").with_attribute("type", "datetime"))
                .with_child(sized("input", "checkbox").with_attribute("type", "checkbox"))
                .with_child(sized("div", "div")),
        );

        assert!(is_textual_input_type(&by_id(&win, "area")));
        assert!(is_textual_input_type(&by_id(&win, "untyped")));
        assert!(is_textual_input_type(&by_id(&win, "email")));
        assert!(is_textual_input_type(&by_id(&win, "legacy")));
        assert!(!is_textual_input_type(&by_id(&win, "checkbox")));
        assert!(!is_textual_input_type(&by_id(&win, "div")));
        assert_eq!(get_type(&by_id(&win, "email")), Some("email".to_string()));
    }

    #[test]
    fn test_unknown_input_type_is_text() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("input", "bogus").with_attribute("type", "bogus"))
                .with_child(sized("input", "upper").with_attribute("type", "CHECKBOX")),
        );

        assert_eq!(by_id(&win, "bogus").input_type(), "text");
        assert!(is_textual_input_type(&by_id(&win, "bogus")));
        assert_eq!(by_id(&win, "upper").input_type(), "checkbox");
        assert!(!is_textual_input_type(&by_id(&win, "upper")));
    }

    #[test]
    fn test_get_text_value() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("input", "text").with_value("typed"))
                .with_child(sized("input", "check").with_attribute("type", "checkbox").with_value("on"))
                .with_child(sized("textarea", "area").with_value("long text"))
                .with_child(sized("p", "para").with_text("Hello")),
        );

        assert_eq!(get_text_value(&by_id(&win, "text")), Some("typed".to_string()));
        assert_eq!(get_text_value(&by_id(&win, "check")), None);
        assert_eq!(get_text_value(&by_id(&win, "area")), Some("long text".to_string()));
        assert_eq!(get_text_value(&by_id(&win, "para")), Some("Hello".to_string()));
    }

    #[test]
    fn test_display_none_is_never_visible() {
        let win = window(ElementNode::new("body").with_child(sized("div", "hidden").with_style("display", "none")));
        assert!(!is_visible(&by_id(&win, "hidden"), &win));
    }

    #[test]
    fn test_zero_size_style_wins_over_geometry() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("div", "zero-width").with_style("width", "0px"))
                .with_child(sized("div", "zero-height").with_style("height", "0"))
                .with_child(sized("div", "pixel").with_style("width", "1px").with_style("height", "1px")),
        );

        assert!(!is_visible(&by_id(&win, "zero-width"), &win));
        assert!(!is_visible(&by_id(&win, "zero-height"), &win));
        assert!(!is_visible(&by_id(&win, "pixel"), &win));
    }

    #[test]
    fn test_visibility_and_clipping_styles() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("div", "hidden").with_style("visibility", "hidden"))
                .with_child(sized("div", "collapsed").with_style("visibility", "collapse"))
                .with_child(
                    sized("div", "clipped")
                        .with_style("position", "absolute")
                        .with_style("clip", "rect(0px, 0px, 0px, 0px)"),
                )
                .with_child(
                    sized("div", "clip-static")
                        .with_style("position", "static")
                        .with_style("clip", "rect(0px, 0px, 0px, 0px)"),
                )
                .with_child(sized("div", "inset").with_style("clip-path", "inset(50%)"))
                .with_child(sized("div", "inset-full").with_style("clip-path", "inset(100%)"))
                .with_child(sized("div", "inset-small").with_style("clip-path", "inset(10%)"))
                .with_child(sized("div", "transparent").with_style("opacity", "0")),
        );

        assert!(!is_visible(&by_id(&win, "hidden"), &win));
        assert!(!is_visible(&by_id(&win, "collapsed"), &win));
        assert!(!is_visible(&by_id(&win, "clipped"), &win));
        assert!(is_visible(&by_id(&win, "clip-static"), &win));
        assert!(!is_visible(&by_id(&win, "inset"), &win));
        assert!(!is_visible(&by_id(&win, "inset-full"), &win));
        assert!(is_visible(&by_id(&win, "inset-small"), &win));
        assert!(is_visible(&by_id(&win, "transparent"), &win));
    }

    #[test]
    fn test_visible_without_style_uses_geometry() {
        let root = ElementNode::new("body")
            .with_child(sized("div", "sized").with_style("display", "none"))
            .with_child(ElementNode::new("div").with_attribute("id", "empty"));
        let win = MemoryWindow::from_root(&root, HREF).unwrap().without_computed_style();

        assert!(is_visible(&by_id(&win, "sized"), &win));
        assert!(!is_visible(&by_id(&win, "empty"), &win));
    }

    #[test]
    fn test_is_media() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("video", "video"))
                .with_child(sized("div", "player").with_child(sized("div", "inner").with_child(sized("audio", "audio"))))
                .with_child(sized("div", "plain")),
        );

        assert!(is_media(&by_id(&win, "video")));
        assert!(is_media(&by_id(&win, "player")));
        assert!(!is_media(&by_id(&win, "plain")));
    }

    #[test]
    fn test_is_image() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("img", "img"))
                .with_child(sized("svg", "svg"))
                .with_child(sized("div", "background").with_style("background-image", "url(\"cover.jpg\")"))
                .with_child(sized("div", "wrapper").with_child(sized("img", "inner")))
                .with_child(sized("div", "plain")),
        );

        assert!(is_image(&by_id(&win, "img"), &win));
        assert!(is_image(&by_id(&win, "svg"), &win));
        assert!(is_image(&by_id(&win, "background"), &win));
        assert!(!is_image(&by_id(&win, "wrapper"), &win));
        assert!(is_image_or_contains_image_child(&by_id(&win, "wrapper"), &win));
        assert!(!is_image_or_contains_image_child(&by_id(&win, "plain"), &win));
        assert!(is_image_with(&by_id(&win, "plain"), &win, |e: &crate::dom::MemoryElement| e.is_tag("div")));
    }

    #[test]
    fn test_get_background_image_url() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("div", "quoted").with_style("background-image", "url(\"https://cdn.example.com/a.png\")"))
                .with_child(sized("div", "single").with_style("background-image", "url('b.png')"))
                .with_child(sized("div", "gradient").with_style("background-image", "linear-gradient(red, blue)")),
        );

        assert_eq!(
            get_background_image_url(&by_id(&win, "quoted"), &win),
            Some("https://cdn.example.com/a.png".to_string())
        );
        assert_eq!(get_background_image_url(&by_id(&win, "single"), &win), Some("b.png".to_string()));
        assert_eq!(get_background_image_url(&by_id(&win, "gradient"), &win), None);
    }

    #[test]
    fn test_is_image_container() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("div", "gallery").with_child(sized("img", "a")).with_child(sized("span", "b").with_child(sized("svg", "c"))))
                .with_child(
                    sized("div", "mixed")
                        .with_child(sized("img", "d"))
                        .with_child(sized("p", "caption").with_text("Caption")),
                )
                .with_child(sized("div", "empty")),
        );

        assert!(is_image_container(&by_id(&win, "gallery"), &win));
        assert!(!is_image_container(&by_id(&win, "mixed"), &win));
        assert!(!is_image_container(&by_id(&win, "empty"), &win));
        assert_eq!(is_image_container(&by_id(&win, "a"), &win), is_image(&by_id(&win, "a"), &win));
    }

    #[test]
    fn test_has_parent_of_type() {
        let win = window(
            ElementNode::new("body").with_child(
                sized("a", "link").with_attribute("href", "/watch?v=1").with_child(
                    sized("div", "d1").with_child(sized("div", "d2").with_child(sized("span", "leaf"))),
                ),
            ),
        );
        let leaf = by_id(&win, "leaf");

        assert_eq!(has_parent_of_type(&leaf, "A", 10), Some(by_id(&win, "link")));
        assert_eq!(has_parent_of_type(&leaf, "A", 3), None);
        assert_eq!(has_parent_of_type(&leaf, "A", 4), Some(by_id(&win, "link")));
        assert_eq!(has_parent_of_type(&leaf, "SPAN", 1), Some(leaf.clone()));
        assert_eq!(find_parent_of_type(&leaf, "TABLE"), None);
        assert_eq!(find_parent_of_type(&leaf, "BODY"), win.body());
    }

    #[test]
    fn test_get_svg_root() {
        let win = window(
            ElementNode::new("body")
                .with_child(sized("svg", "icon").with_child(sized("g", "group").with_child(sized("path", "path"))))
                .with_child(sized("div", "div")),
        );

        assert_eq!(get_svg_root(&by_id(&win, "path")), Some(by_id(&win, "icon")));
        assert_eq!(get_svg_root(&by_id(&win, "icon")), Some(by_id(&win, "icon")));
        assert_eq!(get_svg_root(&by_id(&win, "div")), None);
    }

    #[test]
    fn test_get_positioned_element() {
        let win = window(
            ElementNode::new("body").with_child(
                sized("div", "relative")
                    .with_style("position", "relative")
                    .with_child(sized("div", "static").with_child(sized("span", "leaf"))),
            ),
        );

        assert_eq!(get_positioned_element(Some(&by_id(&win, "leaf")), &win), Some(by_id(&win, "relative")));
        assert_eq!(get_positioned_element(win.body().as_ref(), &win), None);
        assert_eq!(get_positioned_element(None, &win), None);

        let flat = window(ElementNode::new("body").with_child(sized("div", "static")));
        assert_eq!(get_positioned_element(Some(&by_id(&flat, "static")), &flat), None);
    }

    #[test]
    fn test_is_larger_than_window() {
        let win = window(ElementNode::new("body")).with_viewport(1000.0, 500.0);

        assert!(is_larger_than_window(&Rect::new(0.0, 0.0, 100.0, 560.0), &win));
        assert!(!is_larger_than_window(&Rect::new(0.0, 0.0, 100.0, 540.0), &win));
        assert!(is_larger_than_window(&Rect::new(0.0, 0.0, 1101.0, 10.0), &win));
        assert!(!is_larger_than_window(&Rect::new(0.0, 0.0, 1000.0, 500.0), &win));
        assert!(is_larger_than_window_by(&Rect::new(0.0, 0.0, 1000.0, 500.0), &win, 90.0));
    }
}
