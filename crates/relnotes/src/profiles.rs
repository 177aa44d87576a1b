use scraper::{ElementRef, Node};
use std::collections::HashSet;
use std::str::FromStr;
use url::Url;

use crate::dates::{find_date, DatePattern};
use crate::error::ConfigError;
use crate::extractor::{
    element_text, heading_level, is_ignored, Anchor, BodySpan, SiteProfile, SpanPart,
};
use crate::models::Category;

const GENERIC_PATTERNS: &[DatePattern] = &[
    DatePattern::Iso,
    DatePattern::MonthDayYear,
    DatePattern::DayMonthYear,
    DatePattern::MonthYear,
    DatePattern::UsNumeric,
];

const GOOGLE_CLOUD_PATTERNS: &[DatePattern] = &[
    DatePattern::Iso,
    DatePattern::MonthDayYear,
    DatePattern::UsNumeric,
];

/// Shorter blocks are labels ("Feature", "Changed"), not release notes
const MIN_ITEM_CHARS: usize = 10;

const WRAPPER_TAGS: &[&str] = &["div", "header", "hgroup"];

/// Which profile to extract with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileChoice {
    #[default]
    Auto,
    Known,
    Generic,
}

impl ProfileChoice {
    pub fn resolve(self, url: &Url) -> &'static dyn SiteProfile {
        match self {
            ProfileChoice::Known => &GoogleCloudProfile,
            ProfileChoice::Generic => &GenericProfile,
            ProfileChoice::Auto => {
                if GoogleCloudProfile::matches_url(url) {
                    &GoogleCloudProfile
                } else {
                    &GenericProfile
                }
            }
        }
    }
}

impl FromStr for ProfileChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ProfileChoice::Auto),
            "known" => Ok(ProfileChoice::Known),
            "generic" => Ok(ProfileChoice::Generic),
            _ => Err(ConfigError::UnknownVariant {
                kind: "site profile",
                value: s.to_string(),
                expected: "auto, known, generic",
            }),
        }
    }
}

/// Google Cloud release-notes template: `h2` date headers followed by
/// `release-*` blocks, lists and paragraphs.
pub struct GoogleCloudProfile;

impl GoogleCloudProfile {
    pub fn matches_url(url: &Url) -> bool {
        url.host_str()
            .map(|host| host == "cloud.google.com" || host.ends_with(".cloud.google.com"))
            .unwrap_or(false)
    }

    fn is_date_header(el: &ElementRef) -> bool {
        matches!(el.value().name(), "h2" | "h3")
            && find_date(&element_text(*el), GOOGLE_CLOUD_PATTERNS).is_some()
    }
}

impl SiteProfile for GoogleCloudProfile {
    fn name(&self) -> &'static str {
        "google_cloud"
    }

    fn container_selectors(&self) -> &'static [&'static str] {
        &[
            "main",
            "article",
            "[role=\"main\"]",
            ".devsite-article-body",
            "div.release-notes-container",
        ]
    }

    fn locate_anchors<'a>(&self, scope: ElementRef<'a>) -> Vec<Anchor<'a>> {
        scope
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "h2" | "h3"))
            .filter_map(|heading| {
                find_date(&element_text(heading), GOOGLE_CLOUD_PATTERNS)
                    .map(|date_text| Anchor { heading, date_text })
            })
            .collect()
    }

    fn locate_body_span<'a>(&self, anchor: &Anchor<'a>) -> Vec<BodySpan<'a>> {
        let level = heading_level(&anchor.heading).unwrap_or(2);
        let mut spans = Vec::new();

        for el in anchor.heading.next_siblings().filter_map(ElementRef::wrap) {
            if is_ignored(&el) {
                continue;
            }

            if let Some(sub_level) = heading_level(&el) {
                if sub_level <= level || Self::is_date_header(&el) {
                    break;
                }
                // product sub-headings inside one date
                continue;
            }

            if let Some(class) = release_class(&el) {
                let text = element_text(el);
                if text.chars().count() > MIN_ITEM_CHARS {
                    spans.push(BodySpan {
                        parts: vec![SpanPart::Element(el)],
                        hint: release_hint(class, &text),
                    });
                }
                continue;
            }

            match el.value().name() {
                "ul" | "ol" => {
                    for li in el
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|child| child.value().name() == "li")
                    {
                        if !element_text(li).is_empty() {
                            spans.push(BodySpan {
                                parts: vec![SpanPart::Element(li)],
                                hint: None,
                            });
                        }
                    }
                }
                "p" | "div" | "li" => {
                    if element_text(el).chars().count() > MIN_ITEM_CHARS {
                        spans.push(BodySpan {
                            parts: vec![SpanPart::Element(el)],
                            hint: None,
                        });
                    }
                }
                _ => {}
            }
        }

        spans
    }

    fn fallback(&self) -> Option<&'static dyn SiteProfile> {
        Some(&GenericProfile)
    }
}

fn release_class<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.value().classes().find(|class| class.starts_with("release-"))
}

fn release_hint(class: &str, text: &str) -> Option<Category> {
    match class {
        "release-feature" => {
            if text.to_lowercase().contains("preview") {
                Some(Category::Preview)
            } else {
                Some(Category::NewFeature)
            }
        }
        "release-fixed" => Some(Category::BugFix),
        "release-issue" => Some(Category::KnownIssue),
        "release-deprecated" => Some(Category::Deprecation),
        "release-breaking" => Some(Category::BreakingChange),
        "release-security" => Some(Category::Security),
        _ => None,
    }
}

/// Best-effort profile for unknown templates: any heading containing a date
/// anchors the content that follows it.
pub struct GenericProfile;

impl GenericProfile {
    fn ends_section(el: &ElementRef, level: u8) -> bool {
        if el.value().name() == "hr" {
            return true;
        }
        if matches!(heading_level(el), Some(l) if l <= level) {
            return true;
        }
        let mut headings = el
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter_map(|d| heading_level(&d).map(|l| (d, l)))
            .peekable();
        // wrapped section heading: `<div class="heading"><h2>Known issues</h2></div>`
        if WRAPPER_TAGS.contains(&el.value().name()) {
            if let Some((_, first)) = headings.peek() {
                if *first <= level {
                    return true;
                }
            }
        }
        headings.any(|(d, _)| find_date(&element_text(d), GENERIC_PATTERNS).is_some())
    }
}

impl SiteProfile for GenericProfile {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn container_selectors(&self) -> &'static [&'static str] {
        &["main", "article", ".content", "#content", ".release-notes"]
    }

    fn locate_anchors<'a>(&self, scope: ElementRef<'a>) -> Vec<Anchor<'a>> {
        let mut seen = HashSet::new();
        let mut anchors = Vec::new();

        for node in scope.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }
            let Some(heading) = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| heading_level(el).is_some())
            else {
                continue;
            };
            if !seen.insert(heading.id()) {
                continue;
            }
            if let Some(date_text) = find_date(&element_text(heading), GENERIC_PATTERNS) {
                anchors.push(Anchor { heading, date_text });
            }
        }

        anchors
    }

    fn locate_body_span<'a>(&self, anchor: &Anchor<'a>) -> Vec<BodySpan<'a>> {
        let level = heading_level(&anchor.heading).unwrap_or(6);
        let mut parts = Vec::new();

        for node in span_start(anchor.heading).next_siblings() {
            if let Some(text) = node.value().as_text() {
                let text: &'a str = text;
                if !text.trim().is_empty() {
                    parts.push(SpanPart::Text(text));
                }
                continue;
            }
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            if is_ignored(&el) {
                continue;
            }
            if Self::ends_section(&el, level) {
                break;
            }
            parts.push(SpanPart::Element(el));
        }

        if parts.is_empty() {
            Vec::new()
        } else {
            vec![BodySpan { parts, hint: None }]
        }
    }
}

/// A heading alone in a wrapper (`<div class="heading"><h2>..</h2></div>`)
/// continues at the wrapper's siblings.
fn span_start(heading: ElementRef<'_>) -> ElementRef<'_> {
    let has_following = heading.next_siblings().any(|node| match node.value() {
        Node::Text(text) => !text.trim().is_empty(),
        Node::Element(_) => true,
        _ => false,
    });
    if has_following {
        return heading;
    }
    heading
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|parent| WRAPPER_TAGS.contains(&parent.value().name()))
        .unwrap_or(heading)
}
