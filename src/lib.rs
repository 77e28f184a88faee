//! # point-and-shoot
//!
//! Element visibility and classification heuristics for capturing web
//! content: deciding which element under the pointer is worth collecting,
//! which part of it is actually visible, and when the pointing affordance
//! must stay out of the user's way.
//!
//! ## Features
//!
//! - **Element classification**: visibility, images, media and text inputs from computed style
//! - **Clipping resolution**: ancestors clipping an element and the area they leave visible
//! - **Embed resolution**: tweets, YouTube videos and provider iframes turned into links
//! - **Capture eligibility**: meaningful content, focus and selection checks
//! - **Frame bounds**: capture rectangles and deduplicated host payloads
//!
//! The heuristics run against the [`dom`] traits, so any host able to
//! answer DOM and CSSOM questions can drive them. An in-memory DOM built
//! from JSON snapshots is included.
//!
//! ## Usage
//!
//! ```rust
//! use point_and_shoot::dom::{DomWindow, ElementNode, MemoryWindow};
//! use point_and_shoot::helpers::point_and_shoot::is_meaningful;
//!
//! # fn main() -> point_and_shoot::Result<()> {
//! let root = ElementNode::new("body").with_child(
//!     ElementNode::new("img")
//!         .with_attribute("src", "a.png")
//!         .with_bounding_box(0.0, 0.0, 120.0, 80.0),
//! );
//! let win = MemoryWindow::from_root(&root, "https://example.com/")?;
//!
//! let image = win.element_from_point(10.0, 10.0).expect("image under the point");
//! assert!(is_meaningful(&image, &win));
//! # Ok(())
//! # }
//! ```
//!
//! ### Embeds
//!
//! ```rust
//! use point_and_shoot::dom::{DomElement, ElementNode, MemoryWindow};
//! use point_and_shoot::{EmbedResolver, HelperConfig};
//!
//! # fn main() -> point_and_shoot::Result<()> {
//! let root = ElementNode::new("body").with_child(
//!     ElementNode::new("article")
//!         .with_attribute("id", "tweet")
//!         .with_attribute("data-testid", "tweet")
//!         .with_child(ElementNode::new("a").with_attribute("href", "https://twitter.com/x/status/123")),
//! );
//! let win = MemoryWindow::from_root(&root, "https://twitter.com/home")?;
//! let resolver = EmbedResolver::new(&win, &HelperConfig::default())?;
//!
//! let tweet = win.document().element_by_id("tweet").expect("tweet element");
//! let link = resolver.parse_element_based_on_styles(&tweet);
//! assert_eq!(link.href().as_deref(), Some("https://twitter.com/x/status/123"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`rect`]: rectangle math with infinite extents
//! - [`dom`]: host DOM traits and the in-memory implementation
//! - [`helpers`]: the capture heuristics
//! - [`config`]: tunables of the heuristics
//! - [`error`]: error types and result aliases

pub mod config;
pub mod dom;
pub mod error;
pub mod helpers;
pub mod rect;

pub use config::HelperConfig;
pub use dom::{DomElement, DomWindow, ElementNode, Location, MemoryWindow, PageSnapshot};
pub use error::{Result, ShootError};
pub use helpers::{EmbedResolver, FrameBounds, RangeGroup, ShootGroup};
pub use rect::Rect;
