/// The collection store
///
/// Owns the ordered, deduplicated sequence of media records together
/// with all pagination state. The store performs no I/O itself: it
/// hands out page-request tickets and consumes their responses, which
/// keeps every pagination invariant testable without a server.
///
/// Invariants:
/// - each record id appears at most once, in first-seen order
/// - at most one page fetch is outstanding at any time
/// - a response issued under an old filter generation never lands

use std::collections::HashSet;

use crate::api::ApiError;
use crate::state::data::MediaRecord;
use crate::state::filter::FilterState;

/// Default number of records per page request
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A ticket for one page fetch
///
/// Stamped with the filter generation it was issued under; the stamp
/// decides on arrival whether the response is still relevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
    pub filter: FilterState,
    pub generation: u64,
}

/// What happened when a page response was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page merged; `appended` of the `returned` records were new
    Applied { returned: usize, appended: usize },
    /// The fetch failed; state untouched apart from clearing `pending`
    Failed,
    /// The response was issued under a previous filter and was discarded
    Stale,
}

pub struct CollectionStore {
    records: Vec<MediaRecord>,
    /// Ids currently in `records`, for O(1) merge dedup
    known_ids: HashSet<i64>,
    /// Next offset to request from the server
    cursor: usize,
    page_size: usize,
    /// Server has no more pages for the current filter
    exhausted: bool,
    /// A page fetch is in flight
    pending: bool,
    filter: FilterState,
    /// Bumped on every reset; stale responses fail the stamp check
    generation: u64,
}

impl CollectionStore {
    pub fn new(page_size: usize) -> Self {
        CollectionStore {
            records: Vec::new(),
            known_ids: HashSet::new(),
            cursor: 0,
            page_size: page_size.max(1),
            exhausted: false,
            pending: false,
            filter: FilterState::default(),
            generation: 0,
        }
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaRecord> {
        self.records.get(index)
    }

    pub fn index_of(&self, id: i64) -> Option<usize> {
        if !self.known_ids.contains(&id) {
            return None;
        }
        self.records.iter().position(|r| r.id == id)
    }

    pub fn by_id(&self, id: i64) -> Option<&MediaRecord> {
        self.index_of(id).and_then(|i| self.records.get(i))
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Ask for the next page
    ///
    /// Returns `None` when a fetch is already in flight or the server
    /// is exhausted for the current filter, so concurrent triggers
    /// (scroll plus viewer backfill) collapse into a single request.
    pub fn next_page_request(&mut self) -> Option<PageRequest> {
        if self.pending || self.exhausted {
            return None;
        }
        self.pending = true;
        Some(PageRequest {
            offset: self.cursor,
            limit: self.page_size,
            filter: self.filter.clone(),
            generation: self.generation,
        })
    }

    /// Apply the response of a page request
    ///
    /// A stale generation is discarded wholesale: it neither merges
    /// records nor clears `pending`, since `pending` now belongs to a
    /// request issued under the new filter. For the current generation
    /// `pending` clears on every path, success or failure, so the
    /// store can never get stuck.
    pub fn apply_page(
        &mut self,
        generation: u64,
        result: Result<Vec<MediaRecord>, ApiError>,
    ) -> PageOutcome {
        if generation != self.generation {
            return PageOutcome::Stale;
        }

        self.pending = false;

        let page = match result {
            Ok(page) => page,
            Err(_) => return PageOutcome::Failed,
        };

        let returned = page.len();
        let mut appended = 0;
        for record in page {
            // Duplicate arrival is expected at page boundaries
            if self.known_ids.insert(record.id) {
                self.records.push(record);
                appended += 1;
            }
        }

        self.exhausted = returned < self.page_size;
        // Advance by what the server returned, not what we kept, so the
        // cursor tracks the server's pagination window without drift.
        self.cursor += returned;

        PageOutcome::Applied { returned, appended }
    }

    /// Clear everything and adopt a new filter
    ///
    /// Bumps the generation so a response still in flight for the old
    /// filter can never contaminate the new listing. The caller issues
    /// the first page request for the new filter right after.
    pub fn reset(&mut self, filter: FilterState) {
        self.generation += 1;
        self.records.clear();
        self.known_ids.clear();
        self.cursor = 0;
        self.exhausted = false;
        self.pending = false;
        self.filter = filter;
    }

    /// Prepend a freshly created record (new uploads are known-newest)
    ///
    /// No-op when the id is already present, which absorbs the echo of
    /// an upload that a concurrent page fetch already delivered.
    /// Cursor and exhaustion are untouched: the server's pagination
    /// window does not move for records we learned about out of band.
    pub fn insert_at_head(&mut self, record: MediaRecord) {
        if !self.known_ids.insert(record.id) {
            return;
        }
        self.records.insert(0, record);
    }

    /// Remove a record; no-op when absent (tolerates double-delete)
    pub fn remove_by_id(&mut self, id: i64) -> bool {
        if !self.known_ids.remove(&id) {
            return false;
        }
        self.records.retain(|r| r.id != id);
        true
    }

    /// Current favorite flag of a record
    pub fn favorite(&self, id: i64) -> Option<bool> {
        self.by_id(id).map(|r| r.is_favorite)
    }

    /// Overwrite a record's favorite flag, returning the prior value
    pub fn set_favorite(&mut self, id: i64, value: bool) -> Option<bool> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        let prior = record.is_favorite;
        record.is_favorite = value;
        Some(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> MediaRecord {
        serde_json::from_str(&format!(
            r#"{{"id": {id}, "filename": "file-{id}", "original_name": "photo-{id}.jpg"}}"#
        ))
        .unwrap()
    }

    fn page(ids: &[i64]) -> Vec<MediaRecord> {
        ids.iter().map(|&id| record(id)).collect()
    }

    #[test]
    fn test_merge_dedup_keeps_first_seen_order() {
        let mut store = CollectionStore::new(3);

        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1, 2, 3])));

        // The second page overlaps the first at the boundary
        let req = store.next_page_request().unwrap();
        let outcome = store.apply_page(req.generation, Ok(page(&[3, 4])));

        assert_eq!(
            outcome,
            PageOutcome::Applied {
                returned: 2,
                appended: 1
            }
        );
        let ids: Vec<i64> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cursor_advances_by_returned_count() {
        let mut store = CollectionStore::new(3);

        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1, 2, 3])));
        assert_eq!(store.cursor(), 3);

        // All three returned records are already known; the cursor must
        // still move by three or the next request would repeat the page.
        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1, 2, 3])));
        assert_eq!(store.cursor(), 6);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_single_flight() {
        let mut store = CollectionStore::new(10);

        let first = store.next_page_request();
        assert!(first.is_some());
        // A second trigger while the first is in flight is a no-op
        assert!(store.next_page_request().is_none());

        store.apply_page(first.unwrap().generation, Ok(page(&[1])));
        // Short page => exhausted, still no further request
        assert!(store.next_page_request().is_none());
    }

    #[test]
    fn test_pagination_termination() {
        let mut store = CollectionStore::new(3);

        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1, 2])));

        assert!(store.exhausted());
        assert!(store.next_page_request().is_none());

        // A reset re-arms pagination
        store.reset(FilterState::default());
        assert!(!store.exhausted());
        assert!(store.next_page_request().is_some());
    }

    #[test]
    fn test_failed_fetch_clears_pending_and_allows_retry() {
        let mut store = CollectionStore::new(3);

        let req = store.next_page_request().unwrap();
        let outcome = store.apply_page(
            req.generation,
            Err(ApiError::Server { status: 500 }),
        );

        assert_eq!(outcome, PageOutcome::Failed);
        assert!(!store.pending());
        assert!(!store.exhausted());
        assert_eq!(store.cursor(), 0);

        // Retry goes out with the same window
        let retry = store.next_page_request().unwrap();
        assert_eq!(retry.offset, 0);
    }

    #[test]
    fn test_stale_response_discarded_after_reset() {
        let mut store = CollectionStore::new(3);

        // Fetch under filter A
        let stale_req = store.next_page_request().unwrap();

        // Filter changes to B while A's response is in flight
        let filter_b = FilterState {
            search_text: String::new(),
            favorites_only: true,
        };
        store.reset(filter_b.clone());
        let fresh_req = store.next_page_request().unwrap();
        assert_eq!(fresh_req.filter, filter_b);

        // A's response arrives late and must not land
        let outcome = store.apply_page(stale_req.generation, Ok(page(&[1, 2, 3])));
        assert_eq!(outcome, PageOutcome::Stale);
        assert!(store.is_empty());
        // The fresh request is still the pending one
        assert!(store.pending());

        // B's response lands normally
        let outcome = store.apply_page(fresh_req.generation, Ok(page(&[7])));
        assert_eq!(
            outcome,
            PageOutcome::Applied {
                returned: 1,
                appended: 1
            }
        );
        assert_eq!(store.records()[0].id, 7);
    }

    #[test]
    fn test_insert_at_head() {
        let mut store = CollectionStore::new(3);
        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1, 2, 3])));
        let cursor = store.cursor();

        store.insert_at_head(record(99));
        let ids: Vec<i64> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![99, 1, 2, 3]);
        assert_eq!(store.cursor(), cursor);

        // Upload echo: the same record arriving again is ignored
        store.insert_at_head(record(99));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_remove_by_id_tolerates_absent() {
        let mut store = CollectionStore::new(3);
        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1, 2])));

        assert!(store.remove_by_id(1));
        assert!(!store.remove_by_id(1));
        assert_eq!(store.len(), 1);

        // A removed id may legitimately come back on a later page
        let req = store.next_page_request();
        assert!(req.is_none()); // exhausted by the short first page
        store.reset(FilterState::default());
        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1])));
        assert_eq!(store.records()[0].id, 1);
    }

    #[test]
    fn test_set_favorite_returns_prior() {
        let mut store = CollectionStore::new(3);
        let req = store.next_page_request().unwrap();
        store.apply_page(req.generation, Ok(page(&[1])));

        assert_eq!(store.set_favorite(1, true), Some(false));
        assert_eq!(store.favorite(1), Some(true));
        assert_eq!(store.set_favorite(404, true), None);
    }
}
