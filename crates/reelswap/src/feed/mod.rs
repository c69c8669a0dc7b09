pub mod loader;
pub mod types;

use std::collections::HashSet;

use crate::config::EngineConfig;

/// What the feed supplier needs to know about an item beyond its media.
pub trait FeedPage {
    /// Identity used to drop duplicates when pages overlap.
    fn dedupe_key(&self) -> String;
    /// Cursor that fetches the page following this item, if any.
    fn page_cursor(&self) -> Option<&str>;
    /// Id the screen was opened on, used to pick the starting item.
    fn anchor_id(&self) -> String;
}

/// Append-only item list with the "near the end, load more" policy.
pub struct FeedData<T> {
    items: Vec<T>,
    keys: HashSet<String>,
    loading_more: bool,
    last_requested_cursor: Option<String>,
    load_more_threshold: usize,
    min_items_for_load_more: usize,
}

impl<T: FeedPage> FeedData<T> {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            items: Vec::new(),
            keys: HashSet::new(),
            loading_more: false,
            last_requested_cursor: None,
            load_more_threshold: config.load_more_threshold,
            min_items_for_load_more: config.min_items_for_load_more,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    /// Replace the whole list (initial load). Clears load-more locks.
    pub fn replace(&mut self, items: Vec<T>) {
        self.keys = items.iter().map(FeedPage::dedupe_key).collect();
        self.items = items;
        self.reset_load_more();
    }

    pub fn reset_load_more(&mut self) {
        self.loading_more = false;
        self.last_requested_cursor = None;
    }

    /// Append items whose key isn't already present. Returns how many were added.
    pub fn append_deduped(&mut self, more: Vec<T>) -> usize {
        let before = self.items.len();
        for item in more {
            if self.keys.insert(item.dedupe_key()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Called with each settled index. Returns the cursor to fetch when the
    /// index is close enough to the end and no equivalent request is pending.
    pub fn maybe_request_more(&mut self, index: usize) -> Option<String> {
        let len = self.items.len();
        if len < self.min_items_for_load_more {
            return None;
        }
        if index < len.saturating_sub(self.load_more_threshold) {
            return None;
        }
        if self.loading_more {
            return None;
        }

        let cursor = self.items.get(index)?.page_cursor()?;
        if cursor.is_empty() || self.last_requested_cursor.as_deref() == Some(cursor) {
            return None;
        }

        let cursor = cursor.to_string();
        self.loading_more = true;
        self.last_requested_cursor = Some(cursor.clone());
        log::info!("Requesting more items after '{cursor}' (settled {index}/{len})");
        Some(cursor)
    }

    /// A load-more finished. A failed cursor may be requested again.
    pub fn finish_load_more(&mut self, ok: bool) {
        self.loading_more = false;
        if !ok {
            self.last_requested_cursor = None;
        }
    }

    /// Index of the first item matching `anchor`, or 0.
    pub fn start_index(&self, anchor: Option<&str>) -> usize {
        anchor
            .and_then(|a| self.items.iter().position(|it| it.anchor_id() == a))
            .unwrap_or(0)
    }
}
