//! Embed resolution
//!
//! Recognizes content that can be embedded in a note (tweets, YouTube
//! videos, iframes of known providers) and replaces it with a plain link to
//! that content. A resolver is bound to one window and must not be shared
//! between documents: it remembers the first location it saw and caches its
//! last URL lookups.

use super::element::has_parent_of_type;
use super::memo::Memo;
use crate::config::{DEFAULT_EMBED_PATTERN, DEFAULT_PARENT_SEARCH_DEPTH, DEFAULT_YOUTUBE_ANCHOR_DEPTH, HelperConfig};
use crate::dom::{DomElement, DomWindow, Location};
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::cell::RefCell;

static DEFAULT_EMBED_REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(DEFAULT_EMBED_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("valid default embed pattern")
});

const YOUTUBE_WATCH_PATH: &str = "/watch?v=";

pub struct EmbedResolver<'w, W: DomWindow> {
    win: &'w W,
    embed_regex: Regex,
    // Embed iframes can navigate away from the url they were loaded with
    first_location_loaded: Location,
    parent_search_depth: usize,
    youtube_anchor_depth: usize,
    url_match_cache: RefCell<Memo<Vec<Option<String>>, bool>>,
    embeddable_location_cache: RefCell<Memo<Vec<String>, Option<String>>>,
}

impl<'w, W: DomWindow> EmbedResolver<'w, W> {
    /// Create a resolver for `win` using the provider pattern and depths of `config`
    pub fn new(win: &'w W, config: &HelperConfig) -> Result<Self> {
        let resolver = Self::with_regex(win, config.embed_regex()?);
        Ok(Self {
            parent_search_depth: config.parent_search_depth,
            youtube_anchor_depth: config.youtube_anchor_depth,
            ..resolver
        })
    }

    /// Create a resolver matching embed providers with a prebuilt regex
    pub fn with_regex(win: &'w W, embed_regex: Regex) -> Self {
        Self {
            win,
            embed_regex,
            first_location_loaded: win.location(),
            parent_search_depth: DEFAULT_PARENT_SEARCH_DEPTH,
            youtube_anchor_depth: DEFAULT_YOUTUBE_ANCHOR_DEPTH,
            url_match_cache: RefCell::new(Memo::new()),
            embeddable_location_cache: RefCell::new(Memo::new()),
        }
    }

    /// Create a resolver recognizing the default providers
    pub fn with_default_pattern(win: &'w W) -> Self {
        Self::with_regex(win, DEFAULT_EMBED_REGEX.clone())
    }

    /// Builder method: override the location the window was first loaded with
    pub fn with_first_location(mut self, location: Location) -> Self {
        self.first_location_loaded = location;
        self
    }

    /// The window this resolver is bound to
    pub fn window(&self) -> &'w W {
        self.win
    }

    pub fn first_location_loaded(&self) -> &Location {
        &self.first_location_loaded
    }

    /// Closest element of the given tag, searching at most the configured
    /// `parent_search_depth` elements
    pub fn find_parent_of_type(&self, element: &W::Element, tag_type: &str) -> Option<W::Element> {
        has_parent_of_type(element, tag_type, self.parent_search_depth)
    }

    /// Returns true if the element is embeddable content.
    ///
    /// A whole page loaded from an embed provider inside an iframe is
    /// embeddable regardless of the element.
    pub fn is_embeddable_element(&self, element: &W::Element) -> bool {
        if self.is_on_full_embeddable_page() {
            return true;
        }

        let location = self.win.location();
        match location.hostname.as_str() {
            "twitter.com" => self.is_tweet(element),
            "www.youtube.com" => {
                self.is_youtube_thumbnail(element)
                    || self.is_embeddable_iframe(element)
                    || location.pathname.contains("/embed/")
            }
            _ => self.is_embeddable_iframe(element),
        }
    }

    /// Returns if the element is a tweet. Only meaningful on twitter.com
    pub fn is_tweet(&self, element: &W::Element) -> bool {
        element.attribute("data-testid").as_deref() == Some("tweet")
    }

    /// Anchor to a YouTube video: the element itself or its closest anchor
    fn youtube_watch_anchor(&self, element: &W::Element) -> Option<W::Element> {
        if is_watch_link(element) {
            return Some(element.clone());
        }
        has_parent_of_type(element, "A", self.youtube_anchor_depth).filter(|anchor| is_watch_link(anchor))
    }

    /// Returns if the element is a YouTube thumbnail. Only meaningful on youtube.com
    pub fn is_youtube_thumbnail(&self, element: &W::Element) -> bool {
        self.youtube_watch_anchor(element).is_some()
    }

    pub fn is_embeddable_iframe(&self, element: &W::Element) -> bool {
        element.is_tag("iframe") && self.url_matches_embed_provider(&[element.src().as_deref()])
    }

    /// Check if any of the urls belongs to an embed provider. Missing and
    /// empty urls are skipped.
    pub fn url_matches_embed_provider(&self, urls: &[Option<&str>]) -> bool {
        let urls: Vec<Option<String>> = urls.iter().map(|url| url.map(str::to_string)).collect();
        self.url_match_cache.borrow_mut().get_or_compute(urls, |urls| {
            urls.iter()
                .flatten()
                .filter(|url| !url.is_empty())
                .any(|url| self.embed_regex.is_match(url) || url.contains("youtube.com/embed"))
        })
    }

    /// True when the current or first loaded url is an embed provider's,
    /// inside an iframe
    pub fn is_on_full_embeddable_page(&self) -> bool {
        let href = self.win.location().href;
        self.url_matches_embed_provider(&[Some(href.as_str()), Some(self.first_location_loaded.href.as_str())])
            && self.is_inside_iframe()
    }

    /// Returns true if the window isn't the top level browsing context.
    /// Denied access to the top level window means we're in a cross-origin iframe.
    pub fn is_inside_iframe(&self) -> bool {
        match self.win.is_top_level() {
            Ok(top_level) => !top_level,
            Err(e) => {
                log::debug!("Assuming iframe context: {}", e);
                true
            }
        }
    }

    /// The current or first loaded url when it matches the embed pattern
    pub fn get_embeddable_window_location(&self) -> Option<String> {
        let urls = vec![self.win.location().href, self.first_location_loaded.href.clone()];
        self.embeddable_location_cache
            .borrow_mut()
            .get_or_compute(urls, |urls| urls.iter().find(|url| self.embed_regex.is_match(url)).cloned())
    }

    /// Returns a link to the content to insert as embed, if the element has any
    pub fn parse_element_for_embed(&self, element: &W::Element) -> Option<W::Element> {
        let location = self.win.location();

        match location.hostname.as_str() {
            "twitter.com" => self.parse_twitter_element_for_embed(element),
            "www.youtube.com" => {
                if location.pathname.contains("/embed/") {
                    let video_id = location.pathname.rsplit('/').next().unwrap_or_default();
                    return Some(self.create_link_element(&format!("https://www.youtube.com/watch?v={}", video_id)));
                }
                self.parse_youtube_thumbnail_for_embed(element)
            }
            _ => element
                .src()
                .filter(|src| !src.is_empty() && self.url_matches_embed_provider(&[Some(src.as_str())]))
                .map(|src| self.create_link_element(&src)),
        }
    }

    /// Convert a tweet into a link to its status url, like
    /// `<username>/status/1318584149247168513`
    pub fn parse_twitter_element_for_embed(&self, element: &W::Element) -> Option<W::Element> {
        if !self.is_tweet(element) {
            return None;
        }

        let href = element
            .query_selector_all_by_tag("a")
            .into_iter()
            .filter_map(|anchor| anchor.href())
            .find(|href| href.contains("/status/"))?;

        Some(self.create_link_element(&href))
    }

    /// Convert a YouTube thumbnail into a link to the video
    pub fn parse_youtube_thumbnail_for_embed(&self, element: &W::Element) -> Option<W::Element> {
        let href = self.youtube_watch_anchor(element)?.href()?;
        Some(self.create_link_element(&href))
    }

    /// Anchor element pointing at `href`, showing the href as its text
    pub fn create_link_element(&self, href: &str) -> W::Element {
        let anchor = self.win.create_element("a");
        anchor.set_attribute("href", href);
        anchor.set_inner_text(href);
        anchor
    }

    /// Substitute embeddable elements with the link to their content.
    /// Other elements, and embeds without a link, are returned as is.
    pub fn parse_element_based_on_styles(&self, element: &W::Element) -> W::Element {
        if !self.is_embeddable_element(element) {
            return element.clone();
        }

        match self.parse_element_for_embed(element) {
            Some(link) => {
                log::debug!("Substituting embeddable {:?} with link {:?}", element, link.href());
                link
            }
            None => element.clone(),
        }
    }
}

fn is_watch_link<E: DomElement>(element: &E) -> bool {
    element.href().is_some_and(|href| href.contains(YOUTUBE_WATCH_PATH))
}
