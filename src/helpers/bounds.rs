//! Frame bounds
//!
//! Computes the rectangles the host draws around pointed, shot and selected
//! content, and the payloads reporting them. Bounds hug the meaningful
//! content of an element (text boxes, images, media) rather than its box,
//! and are cut to the area left visible by clipping ancestors.

use super::clipping::{get_clipping_area, get_clipping_containers};
use super::element::{get_svg_root, is_image, is_larger_than_window_by, is_media};
use super::embed::EmbedResolver;
use super::groups::{RangeGroup, ShootGroup};
use super::point_and_shoot::{
    get_element_and_text_child_nodes_recursively, get_meaningful_child_nodes_with, is_meaningful_or_children_are_with,
    is_meaningful_with,
};
use crate::config::HelperConfig;
use crate::dom::{DomElement, DomRange, DomWindow, Node};
use crate::error::Result;
use crate::rect::{self, Rect};
use serde::Serialize;

/// Element the bounds were computed for, which can differ from the
/// requested one (svg root, meaningful ancestor)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBounds<E> {
    pub element: E,
    pub rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointTarget {
    pub id: String,
    pub rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShootTarget {
    pub id: String,
    pub rect: Rect,
    pub html: String,
    pub text: String,
}

/// Shoot targets with bounds, and the ids of the groups without any
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShootBounds {
    pub targets: Vec<ShootTarget>,
    pub dismissed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRect {
    pub id: String,
    pub html: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTarget {
    pub id: String,
    pub rect_data: Vec<RangeRect>,
    pub html: String,
    pub text: String,
}

/// Message sent to the host, serialized as `{"point": ...}`, `{"shoot": [...]}`
/// or `{"select": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundsPayload {
    Point(PointTarget),
    Shoot(Vec<ShootTarget>),
    Select(Vec<SelectTarget>),
}

/// Grow `area` with `bounds`, then cut it to the clipping area.
///
/// Missing bounds leave the area as is.
pub fn set_area(area: Option<Rect>, bounds: Option<Rect>, clipping_area: Option<Rect>) -> Option<Rect> {
    let new_area = match (area, bounds) {
        (Some(area), Some(bounds)) => Some(rect::bounding_rect(&area, &bounds)),
        (None, Some(bounds)) => Some(bounds),
        (area, None) => area,
    };

    match (new_area, clipping_area) {
        (Some(new_area), Some(clipping_area)) => rect::intersection(&new_area, &clipping_area),
        (new_area, _) => new_area,
    }
}

pub struct FrameBounds<'w, W: DomWindow> {
    resolver: EmbedResolver<'w, W>,
    max_bounds_children: usize,
    bounds_parent_depth: usize,
    larger_than_window_percent: f64,
    max_range_child_nodes: usize,
}

impl<'w, W: DomWindow> FrameBounds<'w, W> {
    pub fn new(win: &'w W, config: &HelperConfig) -> Result<Self> {
        Ok(Self::with_resolver(EmbedResolver::new(win, config)?, config))
    }

    /// Use an existing resolver, keeping its first loaded location
    pub fn with_resolver(resolver: EmbedResolver<'w, W>, config: &HelperConfig) -> Self {
        Self {
            resolver,
            max_bounds_children: config.max_bounds_children,
            bounds_parent_depth: config.bounds_parent_depth,
            larger_than_window_percent: config.larger_than_window_percent,
            max_range_child_nodes: config.max_range_child_nodes,
        }
    }

    pub fn resolver(&self) -> &EmbedResolver<'w, W> {
        &self.resolver
    }

    /// Visual bounds of an element.
    ///
    /// When the element has meaningful child nodes the bounds are the union
    /// of theirs, computed recursively. When the element isn't meaningful the
    /// closest meaningful ancestor is used instead.
    pub fn element_bounds(&self, element: &W::Element) -> ElementBounds<W::Element> {
        self.element_bounds_within(element, None, None, self.bounds_parent_depth)
    }

    fn element_bounds_within(
        &self,
        element: &W::Element,
        area: Option<Rect>,
        clipping_area: Option<Rect>,
        parent_depth: usize,
    ) -> ElementBounds<W::Element> {
        let win = self.resolver.window();

        // Inside an embeddable iframe the whole frame is collected
        if self.resolver.is_on_full_embeddable_page() {
            return ElementBounds {
                element: element.clone(),
                rect: Some(Rect::new(0.0, 0.0, win.inner_width(), win.inner_height())),
            };
        }

        let element = get_svg_root(element).unwrap_or_else(|| element.clone());
        let bounds = element.bounding_client_rect();

        if is_larger_than_window_by(&bounds, win, self.larger_than_window_percent) {
            log::trace!("Skipping bounds of {:?}, larger than the window", element);
            return ElementBounds { element, rect: area };
        }

        if !is_meaningful_or_children_are_with(&element, &self.resolver) {
            if parent_depth > 0 {
                if let Some(parent) = element.parent_element() {
                    return self.element_bounds_within(&parent, area, clipping_area, parent_depth - 1);
                }
            }
            return ElementBounds { element, rect: area };
        }

        let is_document_root = win.is_body(&element) || win.document_element().as_ref() == Some(&element);
        let clipping_area = match clipping_area {
            None if !is_document_root => get_clipping_area(&get_clipping_containers(&element, win), win),
            clipping_area => clipping_area,
        };

        // Large trees use the plain element rect
        if element.descendants().len() > self.max_bounds_children {
            log::trace!("Using element rect of {:?}, too many descendants", element);
            return ElementBounds {
                rect: set_area(area, Some(bounds), clipping_area),
                element,
            };
        }
        let child_nodes = get_meaningful_child_nodes_with(&element, &self.resolver);
        if child_nodes.len() > self.max_bounds_children {
            log::trace!("Using element rect of {:?}, too many child nodes", element);
            return ElementBounds {
                rect: set_area(area, Some(bounds), clipping_area),
                element,
            };
        }

        let select_whole_element =
            is_image(&element, win) || is_media(&element) || self.resolver.is_embeddable_element(&element);

        let mut area = area;
        if !child_nodes.is_empty() && !select_whole_element {
            for child in child_nodes {
                match child {
                    Node::Element(child) if child.is_tag("svg") => {
                        area = set_area(area, Some(child.bounding_client_rect()), clipping_area);
                    }
                    Node::Element(child) => {
                        let child_bounds = self.element_bounds_within(&child, area, clipping_area, parent_depth);
                        area = set_area(area, child_bounds.rect, clipping_area);
                    }
                    Node::Text(text) => {
                        if text.rect.has_area() {
                            area = set_area(area, Some(text.rect), clipping_area);
                        }
                    }
                    Node::Other => {}
                }
            }
            return ElementBounds { element, rect: area };
        }

        if is_meaningful_with(&element, &self.resolver) {
            area = set_area(area, Some(bounds), clipping_area);
        }
        ElementBounds { element, rect: area }
    }

    pub fn point_bounds(&self, target: &ShootGroup<W::Element>) -> PointTarget {
        PointTarget {
            id: target.id.clone(),
            rect: self.element_bounds(&target.element).rect,
        }
    }

    /// Bounds of the shot groups. Groups without bounds are reported as dismissed.
    pub fn shoot_bounds(&self, groups: &[ShootGroup<W::Element>]) -> ShootBounds {
        let mut shoot_bounds = ShootBounds::default();

        for group in groups {
            let ElementBounds { element, rect } = self.element_bounds(&group.element);
            match rect {
                Some(rect) => shoot_bounds.targets.push(ShootTarget {
                    id: group.id.clone(),
                    rect,
                    html: self.resolver.parse_element_based_on_styles(&element).outer_html(),
                    text: element.inner_text(),
                }),
                None => {
                    log::debug!("Dismissing shoot group {}, no bounds", group.id);
                    shoot_bounds.dismissed.push(group.id.clone());
                }
            }
        }

        shoot_bounds
    }

    /// Rects of the selected ranges, one target per range. Rects of useless
    /// elements inside the range are left out.
    pub fn select_bounds<R>(&self, groups: &[RangeGroup<R>]) -> Vec<SelectTarget>
    where
        R: DomRange<Element = W::Element>,
    {
        groups
            .iter()
            .map(|group| {
                let mut range_rects = group.range.client_rects();
                let rects_to_dismiss = self.useless_rects(group.range.common_ancestor_container());
                if !rects_to_dismiss.is_empty() {
                    range_rects = rect::filter_rect_array_by_rect_array(&range_rects, &rects_to_dismiss);
                }

                SelectTarget {
                    id: group.id.clone(),
                    rect_data: range_rects
                        .into_iter()
                        .enumerate()
                        .map(|(index, rect)| RangeRect {
                            id: format!("{}-{}", group.id, index),
                            html: String::new(),
                            rect,
                        })
                        .collect(),
                    html: group.range.html(),
                    text: group.range.text(),
                }
            })
            .collect()
    }

    /// Full size rects of the useless elements below `parent`. Large
    /// subtrees are skipped.
    fn useless_rects(&self, parent: Option<W::Element>) -> Vec<Rect> {
        let Some(parent) = parent else {
            return Vec::new();
        };
        if parent.child_nodes().len() >= self.max_range_child_nodes {
            return Vec::new();
        }
        let nodes = get_element_and_text_child_nodes_recursively(&parent);
        if nodes.len() >= self.max_range_child_nodes {
            return Vec::new();
        }

        nodes
            .iter()
            .filter_map(Node::as_element)
            .filter(|element| !is_meaningful_or_children_are_with(*element, &self.resolver))
            .map(|element| {
                let bounds = element.bounding_client_rect();
                Rect::new(bounds.x, bounds.y, element.scroll_width(), element.scroll_height())
            })
            .collect()
    }
}

/// Keeps the last payload of each kind, so only changes reach the host
#[derive(Debug, Default)]
pub struct BoundsReporter {
    point: Option<BoundsPayload>,
    shoot: Option<BoundsPayload>,
    select: Option<BoundsPayload>,
}

impl BoundsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payload when it differs from the last one of its kind
    pub fn report(&mut self, payload: BoundsPayload) -> Option<BoundsPayload> {
        let last = match payload {
            BoundsPayload::Point(_) => &mut self.point,
            BoundsPayload::Shoot(_) => &mut self.shoot,
            BoundsPayload::Select(_) => &mut self.select,
        };
        if last.as_ref() == Some(&payload) {
            log::trace!("Bounds unchanged, not reporting");
            return None;
        }
        *last = Some(payload.clone());
        Some(payload)
    }
}
