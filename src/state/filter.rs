/// Filter and search state
///
/// The gallery always has exactly one active filter; changing it resets
/// the collection. Search text is debounced so that a keystroke burst
/// produces a single reset instead of one per character.

use std::time::Duration;

/// How long search input must be quiet before the filter commits
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// The predicate the server applies to a page listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    /// Free-text search over names and tags, empty = no search
    pub search_text: String,
    /// Restrict the listing to favorites
    pub favorites_only: bool,
}

/// Tracks the committed filter plus the in-flight search draft
///
/// Every edit to the search box bumps `debounce_seq`; only the timer
/// carrying the latest sequence number is allowed to commit, so
/// superseded timers fall through without touching the collection.
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    active: FilterState,
    draft_search: String,
    debounce_seq: u64,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The filter the collection is currently loaded under
    pub fn active(&self) -> &FilterState {
        &self.active
    }

    /// Current contents of the search box (may not be committed yet)
    pub fn draft_search(&self) -> &str {
        &self.draft_search
    }

    /// Record a search box edit and return the sequence number the
    /// caller should hand back after the debounce delay
    pub fn set_search_draft(&mut self, text: String) -> u64 {
        self.draft_search = text;
        self.debounce_seq += 1;
        self.debounce_seq
    }

    /// A debounce timer fired; commit the draft if this timer is still
    /// the latest one and the draft actually changed the filter.
    /// Returns the new filter to reset the collection with.
    pub fn debounce_elapsed(&mut self, seq: u64) -> Option<FilterState> {
        if seq != self.debounce_seq {
            return None;
        }
        if self.draft_search == self.active.search_text {
            return None;
        }
        self.active.search_text = self.draft_search.clone();
        Some(self.active.clone())
    }

    /// Flip the favorites-only predicate; takes effect immediately
    pub fn toggle_favorites(&mut self) -> FilterState {
        self.active.favorites_only = !self.active.favorites_only;
        self.active.clone()
    }

    pub fn favorites_only(&self) -> bool {
        self.active.favorites_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_drops_superseded_sequences() {
        let mut filter = FilterController::new();
        let first = filter.set_search_draft("be".to_string());
        let second = filter.set_search_draft("beach".to_string());

        // The older timer fires first and must be ignored
        assert_eq!(filter.debounce_elapsed(first), None);

        let committed = filter.debounce_elapsed(second).unwrap();
        assert_eq!(committed.search_text, "beach");
        assert_eq!(filter.active().search_text, "beach");
    }

    #[test]
    fn test_debounce_noop_when_text_unchanged() {
        let mut filter = FilterController::new();
        let seq = filter.set_search_draft(String::new());
        assert_eq!(filter.debounce_elapsed(seq), None);
    }

    #[test]
    fn test_toggle_favorites_is_immediate() {
        let mut filter = FilterController::new();
        let state = filter.toggle_favorites();
        assert!(state.favorites_only);
        let state = filter.toggle_favorites();
        assert!(!state.favorites_only);
    }

    #[test]
    fn test_favorites_toggle_keeps_committed_search() {
        let mut filter = FilterController::new();
        let seq = filter.set_search_draft("sunset".to_string());
        filter.debounce_elapsed(seq).unwrap();

        let state = filter.toggle_favorites();
        assert_eq!(state.search_text, "sunset");
        assert!(state.favorites_only);
    }
}
