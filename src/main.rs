use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use iced::keyboard::{self, key};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Stack};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;

mod api;
mod config;
mod state;
mod ui;

use api::{ApiClient, ApiError};
use config::Config;
use state::collection::{CollectionStore, PageOutcome};
use state::data::MediaRecord;
use state::filter::{FilterController, FilterState, SEARCH_DEBOUNCE};
use state::mutate;
use state::upload::UploadQueue;
use state::viewer::{NextOutcome, OpenOutcome, Viewer};

/// Grid scroll position (0..1) past which the next page is requested
const SCROLL_FETCH_THRESHOLD: f32 = 0.8;
/// How many decoded thumbnails / previews to keep in memory
const THUMBNAIL_CACHE_CAP: usize = 512;
const PREVIEW_CACHE_CAP: usize = 16;

/// Main application state
struct Gallery {
    config: Config,
    /// Client for the remote gallery server
    api: ApiClient,
    /// The paginated record collection
    collection: CollectionStore,
    /// Full-screen viewer state
    viewer: Viewer,
    /// Search / favorites filter state
    filter: FilterController,
    /// Upload admission queue
    uploads: UploadQueue,
    /// Decoded grid thumbnails by record id
    thumbnails: HashMap<i64, Handle>,
    thumbnail_order: VecDeque<i64>,
    thumbnail_pending: HashSet<i64>,
    /// Decoded viewer previews by record id
    previews: HashMap<i64, Handle>,
    preview_order: VecDeque<i64>,
    preview_pending: HashSet<i64>,
    /// Record awaiting delete confirmation, if any
    pending_delete: Option<i64>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// A page fetch finished (stamped with its filter generation)
    PageLoaded(u64, Result<Vec<MediaRecord>, ApiError>),
    /// The grid was scrolled
    GridScrolled(scrollable::Viewport),
    /// Search box edited
    SearchChanged(String),
    /// A search debounce timer fired
    SearchDebounced(u64),
    /// Favorites-only filter toggled
    FavoritesFilterToggled,
    /// A grid card was clicked
    CardPressed(i64),
    /// Thumbnail bytes arrived for a record
    ThumbnailLoaded(i64, Result<Vec<u8>, ApiError>),
    /// Preview bytes arrived for a record
    PreviewLoaded(i64, Result<Vec<u8>, ApiError>),
    /// Viewer navigation
    ViewerNext,
    ViewerPrev,
    ViewerClosed,
    /// Favorite toggle requested for a record
    FavoritePressed(i64),
    /// Server answered a favorite toggle (id, pre-toggle value, result)
    FavoriteConfirmed(i64, bool, Result<bool, ApiError>),
    /// Delete flow: ask, confirm/cancel, server answered
    DeletePressed(i64),
    DeleteConfirmed(i64),
    DeleteCancelled,
    DeleteFinished(i64, Result<(), ApiError>),
    /// Save the original of a record to the downloads folder
    DownloadPressed(i64),
    DownloadFinished(Result<PathBuf, String>),
    /// Upload flow
    UploadPressed,
    UploadFinished(PathBuf, Result<Vec<MediaRecord>, ApiError>),
    /// Slideshow
    SlideshowToggled,
    SlideshowTick,
    SlideshowIntervalChanged(f64),
    SlideshowIntervalCommitted,
}

impl Gallery {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = Config::load_or_default();
        let api = ApiClient::new(config.server_url.clone());

        println!("🖼️  Aura connecting to {}", api.base_url());

        let collection = CollectionStore::new(config.page_size);
        let viewer = Viewer::new(config.slideshow_secs);

        let mut gallery = Gallery {
            config,
            api,
            collection,
            viewer,
            filter: FilterController::new(),
            uploads: UploadQueue::new(),
            thumbnails: HashMap::new(),
            thumbnail_order: VecDeque::new(),
            thumbnail_pending: HashSet::new(),
            previews: HashMap::new(),
            preview_order: VecDeque::new(),
            preview_pending: HashSet::new(),
            pending_delete: None,
            status: "Loading gallery…".to_string(),
        };

        let task = gallery.request_next_page();
        (gallery, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PageLoaded(generation, result) => {
                let error_text = result.as_ref().err().map(ApiError::to_string);

                match self.collection.apply_page(generation, result) {
                    PageOutcome::Applied { returned, appended } => {
                        println!(
                            "📥 Page applied: {} returned, {} new ({} total)",
                            returned,
                            appended,
                            self.collection.len()
                        );
                        self.status = format!("{} moments", self.collection.len());

                        let mut tasks = vec![self.load_missing_thumbnails()];
                        if self.viewer.page_applied(&self.collection) {
                            tasks.push(self.preload_display_assets());
                        }
                        Task::batch(tasks)
                    }
                    PageOutcome::Failed => {
                        let reason = error_text.unwrap_or_default();
                        eprintln!("⚠️  Page fetch failed: {}", reason);
                        self.status = format!("Couldn't reach the gallery: {}", reason);
                        Task::none()
                    }
                    PageOutcome::Stale => {
                        println!("🔄 Discarded a page from a previous filter");
                        Task::none()
                    }
                }
            }

            Message::GridScrolled(viewport) => {
                if viewport.relative_offset().y >= SCROLL_FETCH_THRESHOLD {
                    self.request_next_page()
                } else {
                    Task::none()
                }
            }

            Message::SearchChanged(input) => {
                let seq = self.filter.set_search_draft(input);
                Task::perform(tokio::time::sleep(SEARCH_DEBOUNCE), move |_| {
                    Message::SearchDebounced(seq)
                })
            }

            Message::SearchDebounced(seq) => match self.filter.debounce_elapsed(seq) {
                Some(filter) => self.apply_filter(filter),
                None => Task::none(),
            },

            Message::FavoritesFilterToggled => {
                let filter = self.filter.toggle_favorites();
                self.apply_filter(filter)
            }

            Message::CardPressed(id) => match self.viewer.open(&self.collection, id) {
                OpenOutcome::Opened => self.preload_display_assets(),
                OpenOutcome::NeedsPage => self.request_next_page(),
                OpenOutcome::Unavailable => Task::none(),
            },

            Message::ThumbnailLoaded(id, result) => {
                self.thumbnail_pending.remove(&id);
                match result {
                    Ok(bytes) => cache_insert(
                        &mut self.thumbnails,
                        &mut self.thumbnail_order,
                        THUMBNAIL_CACHE_CAP,
                        id,
                        Handle::from_bytes(bytes),
                    ),
                    Err(e) => eprintln!("⚠️  Thumbnail {} failed: {}", id, e),
                }
                Task::none()
            }

            Message::PreviewLoaded(id, result) => {
                self.preview_pending.remove(&id);
                match result {
                    Ok(bytes) => cache_insert(
                        &mut self.previews,
                        &mut self.preview_order,
                        PREVIEW_CACHE_CAP,
                        id,
                        Handle::from_bytes(bytes),
                    ),
                    Err(e) => eprintln!("⚠️  Preview {} failed: {}", id, e),
                }
                Task::none()
            }

            Message::ViewerNext | Message::SlideshowTick => {
                match self.viewer.next(&self.collection) {
                    NextOutcome::Advanced | NextOutcome::Wrapped => {
                        self.preload_display_assets()
                    }
                    NextOutcome::NeedsPage => self.request_next_page(),
                    NextOutcome::Ignored => Task::none(),
                }
            }

            Message::ViewerPrev => {
                if self.viewer.prev(&self.collection) {
                    self.preload_display_assets()
                } else {
                    Task::none()
                }
            }

            Message::ViewerClosed => {
                self.viewer.close();
                Task::none()
            }

            Message::FavoritePressed(id) => {
                match mutate::begin_favorite_toggle(&mut self.collection, id) {
                    Some(prior) => {
                        let api = self.api.clone();
                        Task::perform(
                            async move { api.toggle_favorite(id).await },
                            move |result| Message::FavoriteConfirmed(id, prior, result),
                        )
                    }
                    None => Task::none(),
                }
            }

            Message::FavoriteConfirmed(id, prior, result) => {
                match mutate::finish_favorite_toggle(&mut self.collection, id, prior, result) {
                    Ok(now_favorite) => {
                        self.status = if now_favorite {
                            "Added to favorites".to_string()
                        } else {
                            "Removed from favorites".to_string()
                        };
                    }
                    Err(e) => {
                        eprintln!("⚠️  Favorite toggle failed: {}", e);
                        self.status = format!("Favorite not saved: {}", e);
                    }
                }
                Task::none()
            }

            Message::DeletePressed(id) => {
                self.pending_delete = Some(id);
                Task::none()
            }

            Message::DeleteCancelled => {
                self.pending_delete = None;
                Task::none()
            }

            Message::DeleteConfirmed(id) => {
                self.pending_delete = None;
                let api = self.api.clone();
                Task::perform(async move { api.delete_media(id).await }, move |result| {
                    Message::DeleteFinished(id, result)
                })
            }

            Message::DeleteFinished(id, result) => match result {
                Ok(()) => {
                    println!("🗑️  Deleted media {}", id);
                    mutate::apply_delete(&mut self.collection, &mut self.viewer, id);
                    self.status = "Moment deleted".to_string();
                    if self.viewer.is_open() {
                        self.preload_display_assets()
                    } else {
                        Task::none()
                    }
                }
                Err(e) => {
                    eprintln!("⚠️  Delete failed: {}", e);
                    self.status = format!("Delete failed: {}", e);
                    Task::none()
                }
            },

            Message::DownloadPressed(id) => {
                let Some(record) = self.collection.by_id(id) else {
                    return Task::none();
                };
                let url = record.original_url(self.api.base_url());
                let name = record.display_name.clone();
                let api = self.api.clone();

                Task::perform(
                    async move {
                        let bytes = api.fetch_asset(url).await.map_err(|e| e.to_string())?;
                        let dir = dirs::download_dir()
                            .or_else(dirs::home_dir)
                            .ok_or_else(|| "no download directory".to_string())?;
                        let target = dir.join(&name);
                        tokio::fs::write(&target, bytes)
                            .await
                            .map_err(|e| e.to_string())?;
                        Ok(target)
                    },
                    Message::DownloadFinished,
                )
            }

            Message::DownloadFinished(result) => {
                match result {
                    Ok(path) => {
                        println!("💾 Saved original to {}", path.display());
                        self.status = format!("Saved to {}", path.display());
                    }
                    Err(e) => {
                        eprintln!("⚠️  Download failed: {}", e);
                        self.status = format!("Download failed: {}", e);
                    }
                }
                Task::none()
            }

            Message::UploadPressed => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select photos or videos to upload")
                    .add_filter(
                        "Media",
                        &["jpg", "jpeg", "png", "gif", "webp", "heic", "mp4", "mov", "webm"],
                    )
                    .pick_files();

                match picked {
                    Some(files) if !files.is_empty() => {
                        println!("📤 Queued {} files for upload", files.len());
                        self.status = format!("Uploading {} files…", files.len());
                        self.uploads.enqueue(files);
                        self.pump_uploads()
                    }
                    _ => Task::none(),
                }
            }

            Message::UploadFinished(path, result) => {
                match result {
                    Ok(records) => {
                        self.uploads.finish(true);
                        for record in records {
                            println!("✅ Uploaded {}", record.display_name);
                            // New uploads are known-newest: straight to the head
                            self.collection.insert_at_head(record);
                        }
                    }
                    Err(e) => {
                        self.uploads.finish(false);
                        eprintln!("❌ Upload failed for {}: {}", path.display(), e);
                        self.status = e.to_string();
                    }
                }

                if let Some((succeeded, failed)) = self.uploads.take_batch_summary() {
                    self.status = if failed == 0 {
                        format!("✅ Added {} new moments", succeeded)
                    } else {
                        format!("Added {} moments, {} failed", succeeded, failed)
                    };
                }

                Task::batch([self.load_missing_thumbnails(), self.pump_uploads()])
            }

            Message::SlideshowToggled => {
                self.viewer.toggle_slideshow();
                Task::none()
            }

            Message::SlideshowIntervalChanged(secs) => {
                let secs = secs.round().max(1.0) as u64;
                self.viewer.set_slideshow_interval(secs);
                self.config.slideshow_secs = secs;
                Task::none()
            }

            Message::SlideshowIntervalCommitted => {
                if let Err(e) = self.config.save() {
                    eprintln!("⚠️  Could not save settings: {}", e);
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toolbar = row![
            text("AURA").size(26),
            text_input("Search moments…", self.filter.draft_search())
                .on_input(Message::SearchChanged)
                .width(Length::Fixed(260.0)),
            button(text(if self.filter.favorites_only() {
                "♥ All moments"
            } else {
                "♡ Favorites"
            }))
            .on_press(Message::FavoritesFilterToggled),
            button("⬆ Upload").on_press(Message::UploadPressed),
        ]
        .spacing(16)
        .align_y(Alignment::Center)
        .padding(16);

        let body: Element<Message> = if self.collection.is_empty() && !self.collection.pending() {
            container(
                column![
                    text("Your gallery is empty").size(24),
                    button("Upload your first moment").on_press(Message::UploadPressed),
                ]
                .spacing(16)
                .align_x(Alignment::Center),
            )
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
        } else {
            scrollable(ui::grid::view(self.collection.records(), &self.thumbnails))
                .on_scroll(Message::GridScrolled)
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        };

        let status_bar = container(text(&self.status).size(13)).padding(8);

        let base = column![toolbar, body, status_bar];

        let mut screen = Stack::new().push(base);

        if let Some(position) = self.viewer.position() {
            if let Some(record) = self.collection.get(position) {
                // Show the grid thumbnail until the full preview lands
                let picture = self
                    .previews
                    .get(&record.id)
                    .or_else(|| self.thumbnails.get(&record.id));
                screen = screen.push(ui::viewer::view(
                    record,
                    picture,
                    position,
                    self.collection.len(),
                    self.viewer.is_playing(),
                    self.viewer.slideshow_interval().as_secs(),
                ));
            }
        }

        if let Some(id) = self.pending_delete {
            screen = screen.push(ui::confirm_delete(id));
        }

        screen.into()
    }

    /// Keyboard shortcuts plus the slideshow timer
    ///
    /// The timer is derived from viewer state: it simply does not
    /// exist unless the slideshow is playing, so closing the viewer
    /// cancels it on every path.
    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![keyboard::on_key_press(handle_hotkey)];

        if self.viewer.is_playing() {
            subscriptions.push(
                iced::time::every(self.viewer.slideshow_interval())
                    .map(|_| Message::SlideshowTick),
            );
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    // --- Task builders ---

    /// Ask the store for a page ticket and turn it into a fetch task.
    /// The store's single-flight guard makes this safe to call from
    /// scroll, viewer backfill and deep-link paths at once.
    fn request_next_page(&mut self) -> Task<Message> {
        match self.collection.next_page_request() {
            Some(request) => {
                let api = self.api.clone();
                let generation = request.generation;
                Task::perform(
                    async move {
                        api.list_page(request.offset, request.limit, &request.filter)
                            .await
                    },
                    move |result| Message::PageLoaded(generation, result),
                )
            }
            None => Task::none(),
        }
    }

    /// Adopt a new filter: reset the collection and fetch its first page
    fn apply_filter(&mut self, filter: FilterState) -> Task<Message> {
        // A filter change invalidates the viewer position and, with it,
        // any running slideshow.
        self.viewer.close();
        self.collection.reset(filter);
        self.status = "Loading…".to_string();
        self.request_next_page()
    }

    /// Fetch thumbnails for records that do not have one yet
    fn load_missing_thumbnails(&mut self) -> Task<Message> {
        let mut tasks = Vec::new();

        for record in self.collection.records() {
            let id = record.id;
            if self.thumbnails.contains_key(&id) || self.thumbnail_pending.contains(&id) {
                continue;
            }
            self.thumbnail_pending.insert(id);

            let url = record.thumbnail_url(self.api.base_url());
            let api = self.api.clone();
            tasks.push(Task::perform(
                async move { api.fetch_asset(url).await },
                move |result| Message::ThumbnailLoaded(id, result),
            ));
        }

        Task::batch(tasks)
    }

    /// Warm the viewer cache for the current record and its neighbors.
    /// Best-effort: failures only log, navigation never waits on this.
    fn preload_display_assets(&mut self) -> Task<Message> {
        let Some(position) = self.viewer.position() else {
            return Task::none();
        };

        let mut wanted = vec![position];
        wanted.extend(self.viewer.preload_targets(&self.collection));

        let mut tasks = Vec::new();
        for index in wanted {
            let Some(record) = self.collection.get(index) else {
                continue;
            };
            let id = record.id;
            if self.previews.contains_key(&id) || self.preview_pending.contains(&id) {
                continue;
            }
            self.preview_pending.insert(id);

            let url = record.display_url(self.api.base_url());
            let api = self.api.clone();
            tasks.push(Task::perform(
                async move { api.fetch_asset(url).await },
                move |result| Message::PreviewLoaded(id, result),
            ));
        }

        Task::batch(tasks)
    }

    /// Start as many queued uploads as the transfer pool allows
    fn pump_uploads(&mut self) -> Task<Message> {
        let admitted = self.uploads.admit();

        let tasks = admitted.into_iter().map(|path| {
            let api = self.api.clone();
            Task::perform(
                async move {
                    let result = api.upload_file(&path).await;
                    (path, result)
                },
                |(path, result)| Message::UploadFinished(path, result),
            )
        });

        Task::batch(tasks)
    }
}

/// Insert into a bounded id-keyed cache, evicting oldest-inserted first
fn cache_insert(
    cache: &mut HashMap<i64, Handle>,
    order: &mut VecDeque<i64>,
    cap: usize,
    id: i64,
    handle: Handle,
) {
    if cache.insert(id, handle).is_none() {
        order.push_back(id);
    }
    while order.len() > cap {
        if let Some(oldest) = order.pop_front() {
            cache.remove(&oldest);
        }
    }
}

/// Global keyboard shortcuts; navigation keys are no-ops in `update`
/// while the viewer is closed
fn handle_hotkey(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::ViewerNext),
        keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::ViewerPrev),
        keyboard::Key::Named(key::Named::Escape) => Some(Message::ViewerClosed),
        _ => None,
    }
}

fn main() -> iced::Result {
    iced::application("Aura", Gallery::update, Gallery::view)
        .subscription(Gallery::subscription)
        .theme(Gallery::theme)
        .window_size((1280.0, 860.0))
        .centered()
        .run_with(Gallery::new)
}
