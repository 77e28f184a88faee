use crate::dom::{DomElement, DomRange};

/// A shot element, as collected by the user
#[derive(Debug, Clone, PartialEq)]
pub struct ShootGroup<E: DomElement> {
    pub id: String,
    pub element: E,
    pub text: Option<String>,
}

impl<E: DomElement> ShootGroup<E> {
    pub fn new(id: impl Into<String>, element: E) -> Self {
        Self {
            id: id.into(),
            element,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A collected text selection
#[derive(Debug, Clone, PartialEq)]
pub struct RangeGroup<R: DomRange> {
    pub id: String,
    pub range: R,
    pub text: Option<String>,
}

impl<R: DomRange> RangeGroup<R> {
    pub fn new(id: impl Into<String>, range: R) -> Self {
        Self {
            id: id.into(),
            range,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Replace the group of the same element in place, or append the new one
pub fn upsert_shoot_group<E: DomElement>(new_item: ShootGroup<E>, groups: &mut Vec<ShootGroup<E>>) {
    match groups.iter().position(|group| group.element == new_item.element) {
        Some(index) => groups[index] = new_item,
        None => groups.push(new_item),
    }
}

/// Replace the group with the same id in place, or append the new one
pub fn upsert_range_group<R: DomRange>(new_item: RangeGroup<R>, groups: &mut Vec<RangeGroup<R>>) {
    match groups.iter().position(|group| group.id == new_item.id) {
        Some(index) => groups[index] = new_item,
        None => groups.push(new_item),
    }
}
