/// Optimistic mutation coordination
///
/// Favorite toggles flip the visible flag before the server answers
/// and reconcile with the confirmed value afterwards; deletes remove
/// the record only after the server confirms, then fix up the viewer
/// position. The rules live here, between the store and the viewer,
/// so both halves of each mutation stay in one place.

use crate::api::ApiError;
use crate::state::collection::CollectionStore;
use crate::state::viewer::Viewer;

/// Phase one of a favorite toggle: flip optimistically.
///
/// Returns the pre-toggle value to reconcile with later, or `None`
/// when the record is not loaded (nothing to toggle).
pub fn begin_favorite_toggle(store: &mut CollectionStore, id: i64) -> Option<bool> {
    let prior = store.favorite(id)?;
    store.set_favorite(id, !prior);
    Some(prior)
}

/// Phase two: reconcile with the server response.
///
/// On success the server-confirmed value wins outright, not the
/// optimistic guess, so two rapid toggles whose responses land out
/// of order settle on whatever the server answered last. On failure
/// the flag reverts to its pre-toggle value and the error is handed
/// back for the status line.
pub fn finish_favorite_toggle(
    store: &mut CollectionStore,
    id: i64,
    prior: bool,
    result: Result<bool, ApiError>,
) -> Result<bool, ApiError> {
    match result {
        Ok(confirmed) => {
            store.set_favorite(id, confirmed);
            Ok(confirmed)
        }
        Err(err) => {
            store.set_favorite(id, prior);
            Err(err)
        }
    }
}

/// Apply a server-confirmed delete to the store and the viewer.
///
/// The viewer position re-resolves so it keeps indexing a real
/// record: removal before the position shifts it down by one, removal
/// of the tail clamps to the new last index, and an emptied store
/// closes the viewer entirely.
pub fn apply_delete(store: &mut CollectionStore, viewer: &mut Viewer, id: i64) {
    let removed_index = store.index_of(id);
    if !store.remove_by_id(id) {
        return;
    }

    let Some(position) = viewer.position() else {
        return;
    };

    if store.is_empty() {
        viewer.close();
        return;
    }

    let new_position = match removed_index {
        Some(removed) if removed < position => position - 1,
        _ => position.min(store.len() - 1),
    };
    viewer.jump_to(store, new_position);
}
