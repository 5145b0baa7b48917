use crate::extractor::{extract_labeled, ExtractionResult};
use crate::render::PreviewState;
use std::collections::HashMap;
use tracing::debug;

/// Handle for one preview request. Only the most recently shown ticket is
/// current; completing any other ticket is a no-op for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    key: String,
    generation: u64,
}

impl PreviewTicket {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Caller-side preview state: one cached result per page key plus the page
/// currently being displayed.
#[derive(Debug, Default)]
pub struct Previewer {
    cache: HashMap<String, ExtractionResult>,
    current: Option<PreviewTicket>,
    generation: u64,
}

impl Previewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for `key`, extracting from `html` only on the
    /// first request for that key.
    pub fn preview(&mut self, key: &str, html: &str) -> &ExtractionResult {
        if self.cache.contains_key(key) {
            debug!(page = key, "preview cache hit");
        }
        self.cache
            .entry(key.to_string())
            .or_insert_with(|| extract_labeled(html, key))
    }

    pub fn cached(&self, key: &str) -> Option<&ExtractionResult> {
        self.cache.get(key)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Makes `key` the display target and returns the ticket for this request.
    pub fn show(&mut self, key: &str) -> PreviewTicket {
        self.generation += 1;
        let ticket = PreviewTicket {
            key: key.to_string(),
            generation: self.generation,
        };
        self.current = Some(ticket.clone());
        ticket
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    pub fn is_current(&self, ticket: &PreviewTicket) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    /// Finishes a request once its page has loaded. The result is cached
    /// either way but only handed back while the ticket is still current.
    pub fn complete(&mut self, ticket: &PreviewTicket, html: &str) -> Option<ExtractionResult> {
        let current = self.is_current(ticket);
        let result = self.preview(&ticket.key, html);

        if current {
            Some(result.clone())
        } else {
            debug!(page = ticket.key.as_str(), "discarding stale preview");
            None
        }
    }

    /// Reports a failed page load, yielding the state to display if the
    /// ticket is still current.
    pub fn fail(&self, ticket: &PreviewTicket) -> Option<PreviewState> {
        self.is_current(ticket).then_some(PreviewState::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<h2>Quest</h2><p>Sort the list of names and print the result.</p>";
    const OTHER: &str = "<h1>Intro</h1><p>Nothing to do here.</p>";

    #[test]
    fn repeated_key_reuses_cached_result() {
        let mut previewer = Previewer::new();
        let first = previewer.preview("loops.html", PAGE).clone();
        assert!(first.has_content);

        // Different markup under the same key is ignored.
        let second = previewer.preview("loops.html", OTHER).clone();
        assert_eq!(first, second);
        assert_eq!(previewer.len(), 1);
    }

    #[test]
    fn clear_forgets_results() {
        let mut previewer = Previewer::new();
        previewer.preview("loops.html", PAGE);
        previewer.clear();
        assert!(previewer.is_empty());
        assert!(previewer.cached("loops.html").is_none());
    }

    #[test]
    fn current_ticket_receives_result() {
        let mut previewer = Previewer::new();
        let ticket = previewer.show("loops.html");
        assert_eq!(ticket.key(), "loops.html");

        let result = previewer.complete(&ticket, PAGE).expect("current ticket");
        assert!(result.found);
    }

    #[test]
    fn stale_ticket_is_dropped_but_cached() {
        let mut previewer = Previewer::new();
        let stale = previewer.show("loops.html");
        let _fresh = previewer.show("arrays.html");

        assert!(!previewer.is_current(&stale));
        assert!(previewer.complete(&stale, PAGE).is_none());
        assert!(previewer.cached("loops.html").is_some());
    }

    #[test]
    fn reshowing_same_key_invalidates_older_ticket() {
        let mut previewer = Previewer::new();
        let older = previewer.show("loops.html");
        let newer = previewer.show("loops.html");

        assert!(!previewer.is_current(&older));
        assert!(previewer.is_current(&newer));
    }

    #[test]
    fn hide_clears_target() {
        let mut previewer = Previewer::new();
        let ticket = previewer.show("loops.html");
        previewer.hide();

        assert!(previewer.fail(&ticket).is_none());
        assert!(previewer.complete(&ticket, PAGE).is_none());
    }

    #[test]
    fn failure_maps_to_unavailable_for_current_ticket() {
        let mut previewer = Previewer::new();
        let ticket = previewer.show("missing.html");
        assert_eq!(previewer.fail(&ticket), Some(PreviewState::Unavailable));
    }
}
