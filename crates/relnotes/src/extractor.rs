use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

use crate::dates::normalize_whitespace;
use crate::models::{Category, RawEntry};

const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "br", "tr", "td", "th", "dt", "dd", "section", "article",
    "blockquote", "pre", "table", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// A heading that carries a release date
#[derive(Debug, Clone)]
pub struct Anchor<'a> {
    pub heading: ElementRef<'a>,
    pub date_text: String,
}

#[derive(Debug, Clone)]
pub enum SpanPart<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

/// Content belonging to one entry under an anchor
#[derive(Debug, Clone, Default)]
pub struct BodySpan<'a> {
    pub parts: Vec<SpanPart<'a>>,
    pub hint: Option<Category>,
}

impl<'a> BodySpan<'a> {
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                SpanPart::Element(el) => push_element_text(*el, &mut out),
                SpanPart::Text(text) => out.push_str(text),
            }
            out.push(' ');
        }
        normalize_whitespace(&out)
    }

    pub fn links(&self, base: &Url) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        for part in &self.parts {
            if let SpanPart::Element(el) = part {
                for href in element_hrefs(*el) {
                    if let Some(url) = resolve_link(base, href) {
                        if !links.contains(&url) {
                            links.push(url);
                        }
                    }
                }
            }
        }
        links
    }
}

/// Structural knowledge about a documentation template
pub trait SiteProfile: Send + Sync {
    fn name(&self) -> &'static str;

    /// Selectors for the main content area, most specific first
    fn container_selectors(&self) -> &'static [&'static str];

    /// Date headings inside `scope`, in document order
    fn locate_anchors<'a>(&self, scope: ElementRef<'a>) -> Vec<Anchor<'a>>;

    /// Entry bodies following `anchor`. An empty result means the anchor has no body.
    fn locate_body_span<'a>(&self, anchor: &Anchor<'a>) -> Vec<BodySpan<'a>>;

    /// Profile to retry with when this one finds no anchors
    fn fallback(&self) -> Option<&'static dyn SiteProfile> {
        None
    }
}

pub struct EntryExtractor {
    base_url: Url,
}

impl EntryExtractor {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Finds date-anchored entries in `markup`. A page without anchors yields an empty list.
    pub fn extract(&self, markup: &str, profile: &dyn SiteProfile) -> Vec<RawEntry> {
        let document = Html::parse_document(markup);
        let mut profile = profile;

        loop {
            let entries = self.extract_with(&document, profile);
            if !entries.is_empty() {
                return entries;
            }
            match profile.fallback() {
                Some(next) => {
                    warn!(
                        profile = profile.name(),
                        fallback = next.name(),
                        "no dated headings found, retrying with fallback profile"
                    );
                    profile = next;
                }
                None => {
                    warn!(profile = profile.name(), "page contains no dated entries");
                    return entries;
                }
            }
        }
    }

    fn extract_with(&self, document: &Html, profile: &dyn SiteProfile) -> Vec<RawEntry> {
        let order: HashMap<_, usize> = document
            .root_element()
            .descendants()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();

        let scope = content_scope(document, profile);
        let mut anchors = profile.locate_anchors(scope);
        // one container per release (`<article>` each) hides the rest of the page
        if anchors.len() <= 1 {
            let body = page_body(document);
            if body.id() != scope.id() {
                let page_anchors = profile.locate_anchors(body);
                if page_anchors.len() > anchors.len() {
                    debug!(
                        container = anchors.len(),
                        page = page_anchors.len(),
                        "container holds too few anchors, scanning the whole body"
                    );
                    anchors = page_anchors;
                }
            }
        }
        debug!(profile = profile.name(), anchors = anchors.len(), "located anchors");

        let mut entries = Vec::new();
        for anchor in &anchors {
            let anchor_offset = order.get(&anchor.heading.id()).copied().unwrap_or(0);
            let spans = profile.locate_body_span(anchor);

            if spans.is_empty() {
                entries.push(RawEntry {
                    anchor_date_text: anchor.date_text.clone(),
                    body_text: String::new(),
                    links: Vec::new(),
                    source_offset: anchor_offset,
                    category_hint: None,
                });
                continue;
            }

            for span in spans {
                let source_offset = span
                    .parts
                    .iter()
                    .find_map(|part| match part {
                        SpanPart::Element(el) => order.get(&el.id()).copied(),
                        SpanPart::Text(_) => None,
                    })
                    .unwrap_or(anchor_offset + 1);

                entries.push(RawEntry {
                    anchor_date_text: anchor.date_text.clone(),
                    body_text: span.text(),
                    links: span.links(&self.base_url),
                    source_offset,
                    category_hint: span.hint,
                });
            }
        }

        entries.sort_by_key(|entry| entry.source_offset);
        entries
    }
}

fn content_scope<'a>(document: &'a Html, profile: &dyn SiteProfile) -> ElementRef<'a> {
    for selector in profile.container_selectors() {
        match Selector::parse(selector) {
            Ok(sel) => {
                if let Some(el) = document.select(&sel).next() {
                    debug!(selector, "using content container");
                    return el;
                }
            }
            Err(e) => debug!(selector, error = %e, "skipping invalid container selector"),
        }
    }

    page_body(document)
}

fn page_body(document: &Html) -> ElementRef<'_> {
    Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element())
}

/// `h1`-`h6`, or an element with `role="heading"` (level from `aria-level`, default 2)
pub fn heading_level(el: &ElementRef) -> Option<u8> {
    let element = el.value();
    let name = element.name();
    if name.len() == 2 && name.starts_with('h') {
        if let Ok(level) = name[1..].parse::<u8>() {
            if (1..=6).contains(&level) {
                return Some(level);
            }
        }
    }
    if element.attr("role") == Some("heading") {
        return Some(
            element
                .attr("aria-level")
                .and_then(|l| l.parse().ok())
                .unwrap_or(2),
        );
    }
    None
}

/// Visible text of an element, with block boundaries turned into spaces
pub fn element_text(el: ElementRef) -> String {
    let mut out = String::new();
    push_element_text(el, &mut out);
    normalize_whitespace(&out)
}

fn push_element_text(el: ElementRef, out: &mut String) {
    if is_ignored(&el) {
        return;
    }
    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|a| is_ignored(&a));
                if !hidden {
                    out.push_str(text);
                }
            }
            Node::Element(element) if BLOCK_TAGS.contains(&element.name()) => out.push(' '),
            _ => {}
        }
    }
}

pub(crate) fn is_ignored(el: &ElementRef) -> bool {
    IGNORED_TAGS.contains(&el.value().name())
}

fn element_hrefs(el: ElementRef<'_>) -> Vec<&str> {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|a| a.value().name() == "a")
        .filter_map(|a| a.value().attr("href"))
        .collect()
}

/// Absolute http(s) URL for `href`, or `None` for fragments-only, mailto, javascript, etc.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}
