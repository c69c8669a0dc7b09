//! Read-only projections of engine state for the presentation layer.
//!
//! Nothing here is stored: pause, mute, position and overlay values are
//! recomputed from `{user_paused, focused, active, slot}` on every call, so
//! "should be playing" and "is playing" cannot drift apart.

use std::time::Duration;

use crate::config::BufferConfig;

use super::slot::{PlaybackStatus, SlotId, SlotTicket};
use super::{MediaResolver, TwoPlayerEngine};

/// Everything needed to drive one video surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView<'a> {
    pub slot: SlotId,
    pub ticket: SlotTicket,
    pub index: Option<usize>,
    pub uri: Option<&'a str>,
    pub poster: Option<&'a str>,
    /// Vertical translation relative to the viewport.
    pub translate_y: f64,
    pub paused: bool,
    pub muted: bool,
    pub status: &'a PlaybackStatus,
}

/// Concrete decoder settings for one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDirective {
    /// A decoder should be attached at all.
    pub mounted: bool,
    pub paused: bool,
    pub muted: bool,
    pub volume: f32,
    pub repeat: bool,
    /// Rewind to 0 as soon as the first frame is ready, so a prebuffered
    /// item starts from the beginning when promoted.
    pub seek_to_start_on_ready: bool,
    pub progress_update_interval: Duration,
    pub buffer: BufferConfig,
}

/// Per-item overlay signals (spinner, progress, inline error, poster mask).
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOverlay {
    pub is_active: bool,
    pub paused: bool,
    pub buffering: bool,
    pub elapsed_secs: f64,
    pub duration_secs: f64,
    pub error: Option<String>,
    pub thumbnail_opacity: f32,
}

impl<R: MediaResolver> TwoPlayerEngine<R> {
    /// Global pause: manual pause or focus loss.
    pub fn is_paused(&self) -> bool {
        self.user_paused || !self.focused
    }

    pub fn slot_paused(&self, id: SlotId) -> bool {
        self.is_paused() || self.active != id || !self.slot(id).is_loaded()
    }

    pub fn slot_muted(&self, id: SlotId) -> bool {
        self.active != id
    }

    pub fn translate_y(&self, id: SlotId) -> f64 {
        self.slot(id).base_offset - self.scroll_offset
    }

    pub fn slot_view(&self, id: SlotId) -> SlotView<'_> {
        let slot = self.slot(id);
        SlotView {
            slot: id,
            ticket: self.ticket(id),
            index: slot.index,
            uri: slot.uri.as_deref(),
            poster: slot.poster.as_deref(),
            translate_y: self.translate_y(id),
            paused: self.slot_paused(id),
            muted: self.slot_muted(id),
            status: &slot.status,
        }
    }

    /// Decoder settings including the preload policy: the inactive slot plays
    /// muted until its first frame is ready, then holds.
    pub fn surface_directive(&self, id: SlotId) -> SurfaceDirective {
        let slot = self.slot(id);
        let is_active = self.active == id;
        let prebuffer =
            self.enable_prebuffer && !self.is_paused() && !is_active && !slot.status.ready;

        SurfaceDirective {
            mounted: slot.is_loaded(),
            paused: if prebuffer { false } else { self.slot_paused(id) },
            muted: !is_active,
            volume: if is_active { 1.0 } else { 0.0 },
            repeat: is_active,
            seek_to_start_on_ready: !is_active,
            progress_update_interval: self.progress_update_interval,
            buffer: self.buffer,
        }
    }

    /// 0.0 once a slot holding `index` has rendered its first frame, else 1.0.
    pub fn thumbnail_opacity(&self, index: usize) -> f32 {
        let ready = SlotId::ALL.iter().any(|&id| {
            let slot = self.slot(id);
            slot.holds(index) && slot.status.ready
        });
        if ready { 0.0 } else { 1.0 }
    }

    pub fn active_status(&self) -> &PlaybackStatus {
        &self.slot(self.active).status
    }

    pub fn item_overlay(&self, index: usize) -> ItemOverlay {
        let thumbnail_opacity = self.thumbnail_opacity(index);
        if index != self.settled_index {
            return ItemOverlay {
                is_active: false,
                paused: true,
                buffering: false,
                elapsed_secs: 0.0,
                duration_secs: 0.0,
                error: None,
                thumbnail_opacity,
            };
        }

        let status = self.active_status();
        ItemOverlay {
            is_active: true,
            paused: self.is_paused(),
            buffering: status.buffering,
            elapsed_secs: status.elapsed_secs,
            duration_secs: status.duration_secs,
            error: status.error.clone(),
            thumbnail_opacity,
        }
    }
}
