/// State management module
///
/// This module is the gallery state engine, kept free of any
/// networking or rendering so every invariant is unit-testable:
/// - Shared data structures (data.rs)
/// - Paginated, deduplicated record collection (collection.rs)
/// - Full-screen viewer navigation and slideshow state (viewer.rs)
/// - Optimistic favorite/delete coordination (mutate.rs)
/// - Upload admission queue (upload.rs)
/// - Filter/search state with debounce (filter.rs)

pub mod collection;
pub mod data;
pub mod filter;
pub mod mutate;
pub mod upload;
pub mod viewer;
