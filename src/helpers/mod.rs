//! Capture heuristics
//!
//! - [`element`]: per-element classification (visibility, images, media, inputs)
//! - [`clipping`]: clipping ancestors and the area they leave visible
//! - [`embed`]: embeddable content recognition and link substitution
//! - [`point_and_shoot`]: meaningful content and pointing eligibility
//! - [`bounds`]: capture rectangles and host payloads
//! - [`groups`], [`util`]: collected groups and small helpers

pub mod bounds;
pub mod clipping;
pub mod element;
pub mod embed;
pub mod groups;
pub mod memo;
pub mod point_and_shoot;
pub mod util;

pub use bounds::{BoundsPayload, BoundsReporter, ElementBounds, FrameBounds, PointTarget, SelectTarget, ShootBounds, ShootTarget};
pub use embed::EmbedResolver;
pub use groups::{RangeGroup, ShootGroup, upsert_range_group, upsert_shoot_group};
pub use memo::Memo;
pub use point_and_shoot::{Coordinates, ModifierState, MouseLocation};
