use crate::config::EngineConfig;
use crate::engine::{MediaResolver, Settlement, TwoPlayerEngine};
use crate::error::FetchError;
use crate::feed::loader::{FeedFetcher, FeedLoader, FeedQuery, FeedResponse};
use crate::feed::{FeedData, FeedPage};

/// Message shown when the first page cannot be loaded.
pub const FEED_ERROR_MESSAGE: &str = "Failed to load the video feed.";

/// Things the screen reacts to after [`FeedSession::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// First page arrived; the list should be laid out, then
    /// [`FeedSession::on_content_ready`] called.
    InitialReady { start_index: usize, count: usize },
    /// A later page was appended.
    Appended { added: usize },
    LoadFailed { initial: bool, error: FetchError },
}

/// One mounted feed screen: item list, fetch worker and playback engine.
pub struct FeedSession<R>
where
    R: MediaResolver,
    R::Item: FeedPage + Send + 'static,
{
    engine: TwoPlayerEngine<R>,
    feed: FeedData<R::Item>,
    loader: FeedLoader<R::Item>,
    anchor: Option<String>,
    /// Start index waiting for the list to be laid out.
    pending_start: Option<usize>,
    loading: bool,
    error: Option<String>,
}

impl<R> FeedSession<R>
where
    R: MediaResolver,
    R::Item: FeedPage + Send + 'static,
{
    pub fn new<F>(resolver: R, fetcher: F, screen_height: f64, config: &EngineConfig) -> Self
    where
        F: FeedFetcher<Item = R::Item>,
    {
        Self {
            engine: TwoPlayerEngine::new(resolver, screen_height, config),
            feed: FeedData::new(config),
            loader: FeedLoader::spawn(fetcher),
            anchor: None,
            pending_start: None,
            loading: false,
            error: None,
        }
    }

    /// Fetch the first page around `anchor`. Any older fetch is superseded.
    pub fn load_initial(&mut self, anchor: Option<String>) {
        self.feed.reset_load_more();
        self.pending_start = None;
        self.error = None;
        self.loading = true;
        self.anchor = anchor.clone();

        if let Err(e) = self.loader.request(FeedQuery::Initial { anchor }) {
            log::error!("Failed to queue initial feed load: {e}");
            self.loading = false;
            self.error = Some(FEED_ERROR_MESSAGE.to_string());
        }
    }

    /// Apply every finished fetch without blocking.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(response) = self.loader.try_recv() {
            events.push(self.apply(response));
        }
        events
    }

    /// Block for the next finished fetch, if one is pending.
    pub fn wait(&mut self) -> Option<SessionEvent> {
        let response = self.loader.recv_blocking()?;
        Some(self.apply(response))
    }

    fn apply(&mut self, response: FeedResponse<R::Item>) -> SessionEvent {
        match (response.query, response.result) {
            (FeedQuery::Initial { .. }, Ok(items)) => {
                self.loading = false;
                self.feed.replace(items);
                let start_index = self.feed.start_index(self.anchor.as_deref());
                self.engine.prime_for_index(start_index);
                self.pending_start = Some(start_index);
                log::info!(
                    "Loaded {} feed items, starting at {start_index}",
                    self.feed.len()
                );
                SessionEvent::InitialReady {
                    start_index,
                    count: self.feed.len(),
                }
            }
            (FeedQuery::Initial { .. }, Err(error)) => {
                log::error!("Initial feed load failed: {error}");
                self.loading = false;
                self.feed.replace(Vec::new());
                self.error = Some(FEED_ERROR_MESSAGE.to_string());
                SessionEvent::LoadFailed {
                    initial: true,
                    error,
                }
            }
            (FeedQuery::After { .. }, Ok(more)) => {
                let added = self.feed.append_deduped(more);
                self.feed.finish_load_more(true);
                log::info!("Appended {added} feed items ({} total)", self.feed.len());
                SessionEvent::Appended { added }
            }
            (FeedQuery::After { cursor }, Err(error)) => {
                log::warn!("Loading more after '{cursor}' failed: {error}");
                self.feed.finish_load_more(false);
                SessionEvent::LoadFailed {
                    initial: false,
                    error,
                }
            }
        }
    }

    /// The list has been laid out. Configures the engine on the pending start
    /// index and returns the index the list must scroll to.
    pub fn on_content_ready(&mut self) -> Option<usize> {
        if self.feed.is_empty() {
            return None;
        }
        let pending = self.pending_start.take()?;

        let len = self.feed.len();
        let index = pending.min(len - 1);
        let preload = (index + 1 < len).then_some(index + 1);
        let settlement = self.engine.configure_at(self.feed.items(), index, preload);
        self.after_settle(settlement);
        Some(index)
    }

    pub fn on_scroll(&mut self, offset_y: f64) {
        self.engine.on_scroll(offset_y);
    }

    pub fn on_momentum_scroll_end(&mut self, offset_y: f64) -> Option<Settlement> {
        let settlement = self
            .engine
            .on_momentum_scroll_end(self.feed.items(), offset_y)?;
        self.after_settle(settlement);
        Some(settlement)
    }

    fn after_settle(&mut self, settlement: Settlement) {
        let Some(cursor) = self.feed.maybe_request_more(settlement.index) else {
            return;
        };
        if let Err(e) = self.loader.request(FeedQuery::After { cursor }) {
            log::warn!("Failed to queue load-more: {e}");
            self.feed.finish_load_more(false);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.engine.toggle_pause();
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.engine.set_focused(focused);
    }

    pub fn engine(&self) -> &TwoPlayerEngine<R> {
        &self.engine
    }

    /// For routing decoder callbacks.
    pub fn engine_mut(&mut self) -> &mut TwoPlayerEngine<R> {
        &mut self.engine
    }

    pub fn feed(&self) -> &FeedData<R::Item> {
        &self.feed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.feed.is_loading_more()
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.loader.has_pending()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
