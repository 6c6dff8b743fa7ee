/// Full-screen viewer navigation
///
/// The viewer is a state machine over {Closed, Open(position)} where
/// the position indexes into the collection store. Navigation wraps
/// around at both ends so a slideshow can loop; stepping past the
/// loaded end of a non-exhausted collection first backfills a page.
///
/// The slideshow itself is only *state* here (playing flag plus
/// interval); the actual timer is an iced subscription derived from
/// that state, so closing the viewer ends the timer on every path
/// instead of leaking a handle that keeps mutating the position.

use std::time::Duration;

use crate::state::collection::CollectionStore;

/// Default seconds between slideshow advances
pub const DEFAULT_SLIDESHOW_SECS: u64 = 3;

/// Result of asking the viewer to open a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The record was loaded; the viewer is now open on it
    Opened,
    /// Not loaded yet; fetch a page and call `page_applied`
    NeedsPage,
    /// Not present and the server has nothing more; stays closed
    Unavailable,
}

/// Result of a `next()` step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    /// Moved to the following record
    Advanced,
    /// At the loaded end of a non-exhausted collection; fetch a page,
    /// the step resolves when `page_applied` runs
    NeedsPage,
    /// Reached the true end and wrapped to the first record
    Wrapped,
    /// Viewer is closed or the collection is empty
    Ignored,
}

pub struct Viewer {
    /// Current index into the collection; `None` = closed
    position: Option<usize>,
    /// A `next()` is parked waiting for a backfill page
    pending_advance: bool,
    /// An `open()` for a not-yet-loaded id is parked waiting for a page
    pending_open: Option<i64>,
    playing: bool,
    interval: Duration,
}

impl Viewer {
    pub fn new(slideshow_secs: u64) -> Self {
        Viewer {
            position: None,
            pending_advance: false,
            pending_open: None,
            playing: false,
            interval: Duration::from_secs(slideshow_secs.max(1)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Open the viewer on the record with the given id
    ///
    /// When the id is not loaded and the server may still have it on a
    /// later page (deep link into unloaded history), the wish is parked
    /// and retried once after the next page lands.
    pub fn open(&mut self, store: &CollectionStore, id: i64) -> OpenOutcome {
        if let Some(index) = store.index_of(id) {
            self.position = Some(index);
            self.pending_open = None;
            OpenOutcome::Opened
        } else if !store.exhausted() {
            self.pending_open = Some(id);
            OpenOutcome::NeedsPage
        } else {
            OpenOutcome::Unavailable
        }
    }

    /// Step forward, wrapping at the true end of the collection
    pub fn next(&mut self, store: &CollectionStore) -> NextOutcome {
        let Some(position) = self.position else {
            return NextOutcome::Ignored;
        };
        if store.is_empty() {
            return NextOutcome::Ignored;
        }

        if position + 1 < store.len() {
            self.position = Some(position + 1);
            NextOutcome::Advanced
        } else if !store.exhausted() {
            // More pages may exist; park the step until one lands
            self.pending_advance = true;
            NextOutcome::NeedsPage
        } else {
            self.position = Some(0);
            NextOutcome::Wrapped
        }
    }

    /// Step backward, wrapping to the last loaded record
    pub fn prev(&mut self, store: &CollectionStore) -> bool {
        let Some(position) = self.position else {
            return false;
        };
        if store.is_empty() {
            return false;
        }

        self.position = Some(if position > 0 {
            position - 1
        } else {
            store.len() - 1
        });
        true
    }

    /// Jump to an index directly; out-of-range is a no-op
    pub fn jump_to(&mut self, store: &CollectionStore, index: usize) -> bool {
        if !self.is_open() || index >= store.len() {
            return false;
        }
        self.position = Some(index);
        true
    }

    /// A page fetch completed; resolve parked open/advance wishes.
    /// Returns true when the position changed (or the viewer opened),
    /// so the caller knows to kick off preloading.
    pub fn page_applied(&mut self, store: &CollectionStore) -> bool {
        if let Some(id) = self.pending_open.take() {
            // One retry only: if the page did not bring the record,
            // the deep link is treated as unavailable.
            return matches!(self.open(store, id), OpenOutcome::Opened);
        }

        if self.pending_advance {
            self.pending_advance = false;
            if let Some(position) = self.position {
                if position + 1 < store.len() {
                    self.position = Some(position + 1);
                } else {
                    // The fetch brought nothing new: this was the true
                    // end, wrap to the start for slideshow looping.
                    self.position = Some(0);
                }
                return true;
            }
        }

        false
    }

    /// Indices whose display assets should be warmed after a move:
    /// one behind, two ahead, clamped to what is loaded
    pub fn preload_targets(&self, store: &CollectionStore) -> Vec<usize> {
        let Some(position) = self.position else {
            return Vec::new();
        };

        let mut targets = Vec::with_capacity(3);
        if position > 0 {
            targets.push(position - 1);
        }
        for ahead in [position + 1, position + 2] {
            if ahead < store.len() {
                targets.push(ahead);
            }
        }
        targets
    }

    /// Close the viewer; always stops the slideshow
    pub fn close(&mut self) {
        self.position = None;
        self.pending_advance = false;
        self.pending_open = None;
        self.playing = false;
    }

    // --- Slideshow ---

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn slideshow_interval(&self) -> Duration {
        self.interval
    }

    /// Start/stop the auto-advance; only meaningful while open
    pub fn toggle_slideshow(&mut self) {
        if self.is_open() {
            self.playing = !self.playing;
        }
    }

    pub fn stop_slideshow(&mut self) {
        self.playing = false;
    }

    /// Change the cadence; the timer subscription follows the new value
    pub fn set_slideshow_interval(&mut self, secs: u64) {
        self.interval = Duration::from_secs(secs.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ids: &[i64], exhausted: bool) -> CollectionStore {
        // Build through the public fetch path so the store state is real
        let page_size = if exhausted { ids.len() + 1 } else { ids.len().max(1) };
        let mut store = CollectionStore::new(page_size);
        let req = store.next_page_request().unwrap();
        let records = ids
            .iter()
            .map(|&id| {
                serde_json::from_str(&format!(
                    r#"{{"id": {id}, "filename": "f{id}", "original_name": "n{id}"}}"#
                ))
                .unwrap()
            })
            .collect();
        store.apply_page(req.generation, Ok(records));
        assert_eq!(store.exhausted(), exhausted);
        store
    }

    #[test]
    fn test_open_known_id() {
        let store = store_with(&[10, 20, 30], true);
        let mut viewer = Viewer::new(3);

        assert_eq!(viewer.open(&store, 20), OpenOutcome::Opened);
        assert_eq!(viewer.position(), Some(1));
    }

    #[test]
    fn test_open_unknown_id_exhausted_stays_closed() {
        let store = store_with(&[10], true);
        let mut viewer = Viewer::new(3);

        assert_eq!(viewer.open(&store, 999), OpenOutcome::Unavailable);
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_deep_link_open_retries_once_after_fetch() {
        let mut store = store_with(&[1, 2], false);
        let mut viewer = Viewer::new(3);

        assert_eq!(viewer.open(&store, 3), OpenOutcome::NeedsPage);

        // The backfill page brings the record
        let req = store.next_page_request().unwrap();
        store.apply_page(
            req.generation,
            Ok(vec![serde_json::from_str(
                r#"{"id": 3, "filename": "f3", "original_name": "n3"}"#,
            )
            .unwrap()]),
        );
        assert!(viewer.page_applied(&store));
        assert_eq!(viewer.position(), Some(2));

        // The wish is consumed; further pages do not reopen
        assert!(!viewer.page_applied(&store));
    }

    #[test]
    fn test_wraparound_at_exhausted_end() {
        let store = store_with(&[1, 2, 3], true);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 3);
        assert_eq!(viewer.position(), Some(2));

        assert_eq!(viewer.next(&store), NextOutcome::Wrapped);
        assert_eq!(viewer.position(), Some(0));
    }

    #[test]
    fn test_next_backfills_then_advances() {
        let mut store = store_with(&[1, 2], false);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 2);

        assert_eq!(viewer.next(&store), NextOutcome::NeedsPage);
        // Position is untouched while the page is in flight
        assert_eq!(viewer.position(), Some(1));

        let req = store.next_page_request().unwrap();
        store.apply_page(
            req.generation,
            Ok(vec![serde_json::from_str(
                r#"{"id": 3, "filename": "f3", "original_name": "n3"}"#,
            )
            .unwrap()]),
        );
        assert!(viewer.page_applied(&store));
        assert_eq!(viewer.position(), Some(2));
    }

    #[test]
    fn test_next_wraps_when_backfill_is_empty() {
        let mut store = store_with(&[1, 2], false);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 2);

        assert_eq!(viewer.next(&store), NextOutcome::NeedsPage);

        // The server has nothing more after all
        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(Vec::new()));
        assert!(viewer.page_applied(&store));
        assert_eq!(viewer.position(), Some(0));
        assert!(store.exhausted());
    }

    #[test]
    fn test_prev_wraps_to_tail() {
        let store = store_with(&[1, 2, 3], true);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 1);

        assert!(viewer.prev(&store));
        assert_eq!(viewer.position(), Some(2));
        assert!(viewer.prev(&store));
        assert_eq!(viewer.position(), Some(1));
    }

    #[test]
    fn test_jump_to_bounds_checked() {
        let store = store_with(&[1, 2, 3], true);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 1);

        assert!(viewer.jump_to(&store, 2));
        assert_eq!(viewer.position(), Some(2));
        assert!(!viewer.jump_to(&store, 3));
        assert_eq!(viewer.position(), Some(2));
    }

    #[test]
    fn test_preload_targets_clamped() {
        let store = store_with(&[1, 2, 3, 4, 5], true);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 1);
        assert_eq!(viewer.preload_targets(&store), vec![1, 2]);

        viewer.jump_to(&store, 2);
        assert_eq!(viewer.preload_targets(&store), vec![1, 3, 4]);

        viewer.jump_to(&store, 4);
        assert_eq!(viewer.preload_targets(&store), vec![3]);
    }

    #[test]
    fn test_close_stops_slideshow_and_clears_wishes() {
        let store = store_with(&[1, 2], false);
        let mut viewer = Viewer::new(3);
        viewer.open(&store, 2);
        viewer.toggle_slideshow();
        assert!(viewer.is_playing());
        viewer.next(&store); // parks an advance

        viewer.close();
        assert!(!viewer.is_open());
        assert!(!viewer.is_playing());
        // A page landing after close must not resurrect the viewer
        assert!(!viewer.page_applied(&store));
    }

    #[test]
    fn test_slideshow_requires_open_viewer() {
        let mut viewer = Viewer::new(3);
        viewer.toggle_slideshow();
        assert!(!viewer.is_playing());
    }

    #[test]
    fn test_slideshow_interval_floor() {
        let mut viewer = Viewer::new(0);
        assert_eq!(viewer.slideshow_interval(), Duration::from_secs(1));
        viewer.set_slideshow_interval(5);
        assert_eq!(viewer.slideshow_interval(), Duration::from_secs(5));
    }
}
