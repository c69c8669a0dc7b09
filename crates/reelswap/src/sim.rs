use std::time::Instant;

use reelswap::engine::slot::{SlotId, SlotTicket};
use reelswap::engine::{DecoderEvent, MediaResolver, TwoPlayerEngine};
use reelswap::error::FetchError;
use reelswap::feed::loader::{FeedFetcher, FeedQuery};
use reelswap::feed::types::VideoFeedItem;

pub const SYNTHETIC_BASE_URL: &str = "https://media.invalid/reels";

/// Serves `total` generated items, `page` at a time. The cursor is the
/// place id of the last item the caller has.
pub struct SyntheticFetcher {
    total: usize,
    page: usize,
    /// Every n-th item has no video file.
    missing_every: Option<usize>,
}

impl SyntheticFetcher {
    pub fn new(total: usize, page: usize) -> Self {
        Self {
            total,
            page: page.max(1),
            missing_every: None,
        }
    }

    pub fn with_missing_media(mut self, every: usize) -> Self {
        self.missing_every = Some(every).filter(|&n| n > 0);
        self
    }

    fn item(&self, i: usize) -> VideoFeedItem {
        let mut item = VideoFeedItem::new(i as i64, &format!("place-{i}"));
        item.title = Some(format!("Clip #{i}"));
        item.username = Some(format!("user{}", i % 7));
        let missing = self.missing_every.is_some_and(|n| (i + 1) % n == 0);
        if !missing {
            item.file_name = Some(format!("videos/{i}.mp4"));
            if i % 2 == 0 {
                item.thumbnail = Some(format!("thumbs/{i}.jpg"));
            }
        }
        item
    }
}

impl FeedFetcher for SyntheticFetcher {
    type Item = VideoFeedItem;

    fn fetch(&mut self, query: &FeedQuery) -> Result<Vec<VideoFeedItem>, FetchError> {
        let start = match query {
            FeedQuery::Initial { anchor: None } => 0,
            // Open the page that contains the anchor.
            FeedQuery::Initial { anchor: Some(anchor) } => {
                let id: usize = anchor
                    .parse()
                    .map_err(|_| FetchError::Decode(format!("bad anchor '{anchor}'")))?;
                id.min(self.total.saturating_sub(1)) / self.page * self.page
            }
            FeedQuery::After { cursor } => {
                let last: usize = cursor
                    .strip_prefix("place-")
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| FetchError::Decode(format!("bad cursor '{cursor}'")))?;
                last + 1
            }
        };
        let end = (start + self.page).min(self.total);
        Ok((start..end).map(|i| self.item(i)).collect())
    }
}

#[derive(Debug, Default)]
struct Lane {
    ticket: Option<SlotTicket>,
    elapsed_secs: f64,
}

/// Stand-in decoders: each new assignment loads instantly, and the playing
/// slot advances by a fixed step per tick.
pub struct SimDecoders {
    a: Lane,
    b: Lane,
    duration_secs: f64,
    step_secs: f64,
}

impl SimDecoders {
    pub fn new(duration_secs: f64, step_secs: f64) -> Self {
        Self {
            a: Lane::default(),
            b: Lane::default(),
            duration_secs,
            step_secs,
        }
    }

    fn lane(&mut self, id: SlotId) -> &mut Lane {
        match id {
            SlotId::A => &mut self.a,
            SlotId::B => &mut self.b,
        }
    }

    /// Feed one tick of decoder callbacks into the engine.
    pub fn step<R: MediaResolver>(&mut self, engine: &mut TwoPlayerEngine<R>, now: Instant) {
        for id in SlotId::ALL {
            let directive = engine.surface_directive(id);
            let view = engine.slot_view(id);
            let (ticket, index) = (view.ticket, view.index);

            if index.is_none() {
                continue;
            }

            let duration_secs = self.duration_secs;
            let step_secs = self.step_secs;
            let lane = self.lane(id);
            if lane.ticket != Some(ticket) {
                lane.ticket = Some(ticket);
                lane.elapsed_secs = 0.0;

                if !directive.mounted {
                    engine.dispatch(ticket, DecoderEvent::Error("no media source".into()));
                    continue;
                }
                engine.dispatch(ticket, DecoderEvent::LoadStart);
                engine.dispatch(ticket, DecoderEvent::Loaded { duration_secs });
                engine.dispatch(ticket, DecoderEvent::ReadyForDisplay);
                log::debug!("Slot {id} decoded item {index:?}");
                continue;
            }

            if directive.mounted && !directive.paused {
                lane.elapsed_secs = (lane.elapsed_secs + step_secs) % duration_secs.max(step_secs);
                let elapsed = lane.elapsed_secs;
                engine.on_progress_at(ticket, elapsed, now);
            }
        }
    }
}
