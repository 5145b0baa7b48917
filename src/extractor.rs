use crate::content::is_meaningful;
use crate::heading::{is_author_heading, is_heading_tag, is_quest_heading};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;

const MAX_AUTHORS: usize = 10;
const MAX_AUTHOR_LEN: usize = 100;
const MAX_MARKER_LEN: usize = 50;
const MAX_LINE_ITEMS: usize = 10;
const DEFAULT_IMAGE_ALT: &str = "Quest image";

static HEADINGS: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));
static EVERY_ELEMENT: Lazy<Selector> = Lazy::new(|| selector("*"));
static NEARBY_BLOCKS: Lazy<Selector> = Lazy::new(|| selector("ul, ol, p, div"));
static LIST_ITEMS: Lazy<Selector> = Lazy::new(|| selector("li"));
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| selector("p"));
static IMAGES: Lazy<Selector> = Lazy::new(|| selector("img"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Structured summary of a tutorial page's quest and author sections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub items: Vec<String>,
    pub images: Vec<QuestImage>,
    pub authors: Vec<String>,
    /// A quest heading exists somewhere in the page, with or without usable content.
    pub found: bool,
    pub has_content: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QuestImage {
    pub src: String,
    pub alt: String,
    pub title: String,
}

/// The part of the document judged to hold the quest section.
enum Container<'a> {
    Element(ElementRef<'a>),
    /// Meaningful siblings gathered under a heading, treated as children of
    /// one synthetic wrapper.
    Collected(Vec<ElementRef<'a>>),
}

impl<'a> Container<'a> {
    fn select(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        match self {
            Container::Element(element) => element.select(selector).collect(),
            Container::Collected(elements) => elements
                .iter()
                .flat_map(|element| {
                    let own = selector.matches(element).then_some(*element);
                    own.into_iter().chain(element.select(selector))
                })
                .collect(),
        }
    }

    fn text(&self) -> String {
        match self {
            Container::Element(element) => text_of(*element),
            Container::Collected(elements) => elements.iter().map(|e| text_of(*e)).collect(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Container::Element(element) => element.value().name().to_string(),
            Container::Collected(elements) => format!("{} collected elements", elements.len()),
        }
    }
}

/// Extract the quest preview from a page's full markup.
///
/// Never fails: markup without a usable quest section yields `found = false`
/// or `has_content = false` with empty collections.
pub fn extract(html: &str) -> ExtractionResult {
    extract_labeled(html, "")
}

/// Same as [`extract`], tagging log events with `label` (usually the page name).
pub fn extract_labeled(html: &str, label: &str) -> ExtractionResult {
    let span = tracing::debug_span!("extract", page = label);
    let _entered = span.enter();

    let document = Html::parse_document(html);
    let (container, found) = locate_quest_container(&document);

    let mut result = ExtractionResult {
        found,
        authors: extract_authors(&document),
        ..ExtractionResult::default()
    };

    match container {
        Some(container) => {
            debug!(container = %container.describe(), "processing quest container");
            result.items = extract_items(&container);
            result.images = extract_images(&container);
            debug!(
                items = result.items.len(),
                images = result.images.len(),
                "extracted quest content"
            );
        }
        None if found => debug!("found quest heading but no meaningful content"),
        None => debug!("no quest container or heading found"),
    }

    result.has_content = !result.items.is_empty() || !result.images.is_empty();
    result
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn following_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

fn next_element<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    following_elements(element).next()
}

fn is_heading(element: ElementRef<'_>) -> bool {
    is_heading_tag(element.value().name())
}

/// Returns the container, if any, and whether a quest heading was seen.
fn locate_quest_container(document: &Html) -> (Option<Container<'_>>, bool) {
    let mut found = false;

    for heading in document.select(&HEADINGS) {
        let heading_text = text_of(heading);
        if !is_quest_heading(&heading_text) {
            continue;
        }

        found = true;
        debug!(heading = heading_text.trim(), "found quest heading");

        if let Some(sibling) = first_meaningful_sibling(heading) {
            return (Some(Container::Element(sibling)), true);
        }
        if let Some(collected) = collect_section(heading) {
            return (Some(collected), true);
        }
    }

    if found {
        return (None, true);
    }

    debug!("no quest heading found, trying text-based search");

    for element in document.select(&EVERY_ELEMENT) {
        let text = text_of(element);
        if text.chars().count() >= MAX_MARKER_LEN || !is_quest_heading(&text) {
            continue;
        }

        found = true;
        if let Some(nearby) = content_near_marker(element) {
            if is_meaningful(&text_of(nearby)) {
                return (Some(Container::Element(nearby)), true);
            }
        }
    }

    (None, found)
}

/// Walks the heading's following siblings, skipping empty ones and stopping at
/// the next heading.
fn first_meaningful_sibling(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    for sibling in following_elements(heading) {
        let text = text_of(sibling);
        let text = text.trim();

        if text.is_empty() {
            continue;
        }
        if is_heading(sibling) {
            break;
        }
        if is_meaningful(text) {
            return Some(sibling);
        }
    }
    None
}

/// Gathers every meaningful child of the heading's parent between the heading
/// and the next heading.
fn collect_section(heading: ElementRef<'_>) -> Option<Container<'_>> {
    let parent = heading.parent().and_then(ElementRef::wrap)?;

    let collected: Vec<_> = parent
        .children()
        .filter_map(ElementRef::wrap)
        .skip_while(|child| child.id() != heading.id())
        .skip(1)
        .take_while(|child| !is_heading(*child))
        .filter(|child| {
            let text = text_of(*child);
            !text.trim().is_empty() && is_meaningful(&text)
        })
        .collect();

    if collected.is_empty() {
        None
    } else {
        Some(Container::Collected(collected))
    }
}

/// Content next to a quest marker found outside any heading: the parent's next
/// sibling, the marker's own next sibling, or the first block inside the parent.
fn content_near_marker(marker: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let scope = marker.parent().and_then(ElementRef::wrap).unwrap_or(marker);

    next_element(scope)
        .or_else(|| next_element(marker))
        .or_else(|| scope.select(&NEARBY_BLOCKS).next())
}

fn extract_items(container: &Container<'_>) -> Vec<String> {
    let list_items: Vec<String> = container
        .select(&LIST_ITEMS)
        .into_iter()
        .map(|item| text_of(item).trim().to_string())
        .filter(|text| text.chars().count() > 3 && is_meaningful(text))
        .collect();
    if !list_items.is_empty() {
        debug!(count = list_items.len(), "using list items");
        return list_items;
    }

    let paragraphs: Vec<String> = container
        .select(&PARAGRAPHS)
        .into_iter()
        .map(|p| text_of(p).trim().to_string())
        .filter(|text| {
            let len = text.chars().count();
            len > 10 && len < 1000 && is_meaningful(text)
        })
        .collect();
    if !paragraphs.is_empty() {
        debug!(count = paragraphs.len(), "using paragraphs");
        return paragraphs;
    }

    let all_text = container.text();
    debug!(len = all_text.chars().count(), "extracting from raw text");
    items_from_text(&all_text)
}

/// Last-resort item detection over a container's raw text: numbered segments,
/// then bullet segments, then individual lines.
fn items_from_text(text: &str) -> Vec<String> {
    if !is_meaningful(text) {
        return Vec::new();
    }

    let numbered = clean_segments(numbered_segments(text), strip_number_marker);
    if !numbered.is_empty() {
        debug!(count = numbered.len(), "found numbered items");
        return numbered;
    }

    let bullets = clean_segments(bullet_segments(text), strip_bullet_marker);
    if !bullets.is_empty() {
        debug!(count = bullets.len(), "found bullet items");
        return bullets;
    }

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 10 && is_meaningful(line))
        .map(String::from)
        .collect();

    // A long run of bare lines is page noise, not a task list.
    if (1..=MAX_LINE_ITEMS).contains(&lines.len()) {
        debug!(count = lines.len(), "found meaningful text lines");
        lines
    } else {
        Vec::new()
    }
}

fn clean_segments(segments: Vec<&str>, strip: fn(&str) -> &str) -> Vec<String> {
    segments
        .into_iter()
        .map(|segment| strip(segment).trim())
        .filter(|item| item.chars().count() > 5 && is_meaningful(item))
        .map(String::from)
        .collect()
}

fn strip_number_marker(segment: &str) -> &str {
    let rest = segment.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.strip_prefix('.').unwrap_or(rest)
}

fn strip_bullet_marker(segment: &str) -> &str {
    segment.strip_prefix(is_bullet).unwrap_or(segment)
}

fn is_bullet(c: char) -> bool {
    matches!(c, '-' | '•' | '*')
}

fn starts_with_number_marker(text: &str) -> bool {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < text.len() && rest.starts_with('.')
}

/// Segments of the form `<digits>. <text>`, where the text runs up to the next
/// `<digits>.` or the end of input and may not contain a period of its own.
pub(crate) fn numbered_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;

    while let Some(ch) = text[start..].chars().next() {
        match numbered_segment_end(text, start) {
            Some(end) => {
                segments.push(&text[start..end]);
                start = end;
            }
            None => start += ch.len_utf8(),
        }
    }

    segments
}

fn numbered_segment_end(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    let after_digits = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == rest.len() {
        return None;
    }

    let after_dot = after_digits.strip_prefix('.')?;
    let body = after_dot.trim_start();
    if body.len() == after_dot.len() {
        return None;
    }

    let mut pos = text.len() - body.len();
    loop {
        if pos == text.len() || starts_with_number_marker(&text[pos..]) {
            return Some(pos);
        }
        let ch = text[pos..].chars().next()?;
        if ch == '.' {
            return None;
        }
        pos += ch.len_utf8();
    }
}

/// Segments starting at a bullet marker followed by whitespace. A segment
/// continues across newlines until a line begins with another marker.
pub(crate) fn bullet_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(ch) = text[pos..].chars().next() {
        if is_bullet(ch) {
            if let Some(end) = bullet_segment_end(text, pos + ch.len_utf8()) {
                segments.push(&text[pos..end]);
                pos = end;
                continue;
            }
        }
        pos += ch.len_utf8();
    }

    segments
}

fn bullet_segment_end(text: &str, after_marker: usize) -> Option<usize> {
    let rest = &text[after_marker..];
    let body = rest.trim_start();
    if body.len() == rest.len() {
        return None;
    }

    let mut pos = line_end(text, text.len() - body.len());
    while text[pos..].starts_with('\n') && !text[pos + 1..].trim_start().starts_with(is_bullet) {
        pos = line_end(text, pos + 1);
    }
    Some(pos)
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..]
        .find(|c: char| matches!(c, '\n' | '\r'))
        .map_or(text.len(), |offset| from + offset)
}

fn extract_images(container: &Container<'_>) -> Vec<QuestImage> {
    container
        .select(&IMAGES)
        .into_iter()
        .filter_map(|img| {
            let element = img.value();
            let src = element.attr("src").filter(|src| !src.is_empty())?;

            Some(QuestImage {
                src: src.strip_prefix("../").unwrap_or(src).to_string(),
                alt: element
                    .attr("alt")
                    .filter(|alt| !alt.is_empty())
                    .unwrap_or(DEFAULT_IMAGE_ALT)
                    .to_string(),
                title: element.attr("title").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

fn extract_authors(document: &Html) -> Vec<String> {
    let section = document
        .select(&HEADINGS)
        .filter(|heading| is_author_heading(&text_of(*heading)))
        .find_map(first_section_text);

    match section {
        Some(text) => {
            debug!(text = text.trim(), "processing author text");
            split_authors(&text)
        }
        None => Vec::new(),
    }
}

/// Text of the first non-empty, non-heading sibling after `heading`.
fn first_section_text(heading: ElementRef<'_>) -> Option<String> {
    for sibling in following_elements(heading) {
        let text = text_of(sibling);
        if text.trim().is_empty() {
            continue;
        }
        if is_heading(sibling) {
            return None;
        }
        return Some(text);
    }
    None
}

/// Comma-separated author names, trimmed, with empty and overlong entries
/// dropped and at most ten kept.
pub fn split_authors(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && name.chars().count() < MAX_AUTHOR_LEN)
        .take(MAX_AUTHORS)
        .map(String::from)
        .collect()
}
