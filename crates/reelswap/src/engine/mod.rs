pub mod decide;
pub mod slot;
pub mod throttle;
pub mod view;

use std::time::{Duration, Instant};

use crate::config::{BufferConfig, EngineConfig};
use decide::{DecisionInput, Transition, decide_transition};
use slot::{PLAYBACK_ERROR_MESSAGE, PlayerSlot, SlotId, SlotTicket};
use throttle::ProgressThrottle;

/// Turns opaque feed items into the URIs a decoder needs.
pub trait MediaResolver {
    type Item;

    fn media_uri(&self, item: &Self::Item) -> Option<String>;
    fn poster_uri(&self, item: &Self::Item) -> Option<String>;
}

/// Callback payloads emitted by a slot's decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    LoadStart,
    Loaded { duration_secs: f64 },
    Progress { elapsed_secs: f64 },
    Buffering(bool),
    ReadyForDisplay,
    Error(String),
}

/// Emitted once per completed transition, including the initial configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub index: usize,
    pub transition: Transition,
    pub preload: Option<usize>,
}

/// Two decoders, swapped and repositioned as the feed scrolls.
///
/// Slot content only changes at momentum end (or on an explicit
/// [`configure_at`](Self::configure_at)); per-frame scroll updates just move
/// the surfaces. Pause and mute are derived from engine state on demand, see
/// the `view` module.
pub struct TwoPlayerEngine<R: MediaResolver> {
    resolver: R,
    screen_height: f64,
    slots: [PlayerSlot; 2],
    active: SlotId,
    settled_index: usize,
    /// Offset the last decision was evaluated against.
    last_offset: f64,
    /// Live offset from the scroll stream.
    scroll_offset: f64,
    user_paused: bool,
    focused: bool,
    enable_prebuffer: bool,
    progress_throttle: ProgressThrottle,
    progress_update_interval: Duration,
    buffer: BufferConfig,
    generation: u64,
}

impl<R: MediaResolver> TwoPlayerEngine<R> {
    pub fn new(resolver: R, screen_height: f64, config: &EngineConfig) -> Self {
        Self {
            resolver,
            screen_height,
            slots: [PlayerSlot::idle(0.0), PlayerSlot::idle(screen_height)],
            active: SlotId::A,
            settled_index: 0,
            last_offset: 0.0,
            scroll_offset: 0.0,
            user_paused: false,
            focused: true,
            enable_prebuffer: config.enable_prebuffer,
            progress_throttle: ProgressThrottle::new(config.ui_throttle()),
            progress_update_interval: Duration::from_millis(config.progress_update_interval_ms),
            buffer: config.buffer,
            generation: 0,
        }
    }

    /// Record the target index before the list has been laid out.
    pub fn prime_for_index(&mut self, index: usize) {
        self.settled_index = index;
        self.last_offset = index as f64 * self.screen_height;
    }

    /// Full reconfiguration: A takes `current` and becomes active, B takes `preload`.
    pub fn configure_at(
        &mut self,
        items: &[R::Item],
        current: usize,
        preload: Option<usize>,
    ) -> Settlement {
        let preload = preload.filter(|&i| i < items.len());

        self.active = SlotId::A;
        self.settled_index = current;
        self.last_offset = current as f64 * self.screen_height;

        self.assign(SlotId::A, items, Some(current));
        self.assign(SlotId::B, items, preload);

        log::info!(
            "Configured at {current} (preload {:?}, {} items)",
            preload,
            items.len()
        );

        Settlement {
            index: current,
            transition: Transition::Reconfig,
            preload,
        }
    }

    /// Continuous scroll position. Moves the surfaces, never reassigns.
    pub fn on_scroll(&mut self, offset_y: f64) {
        self.scroll_offset = offset_y;
    }

    /// The scroll has come to rest: decide which item is current and reassign.
    pub fn on_momentum_scroll_end(
        &mut self,
        items: &[R::Item],
        offset_y: f64,
    ) -> Option<Settlement> {
        if !offset_y.is_finite() {
            log::debug!("Ignored momentum end at non-finite offset {offset_y}");
            return None;
        }
        self.scroll_offset = offset_y;
        if items.is_empty() {
            return None;
        }

        let decision = decide_transition(&DecisionInput {
            offset_y,
            last_offset_y: self.last_offset,
            screen_height: self.screen_height,
            list_len: items.len(),
            a_index: self.slots[SlotId::A.idx()].index,
            b_index: self.slots[SlotId::B.idx()].index,
        });

        self.last_offset = decision.next_last_offset_y;
        self.settled_index = decision.next_index;

        let front = match decision.transition {
            Transition::ACurrent => SlotId::A,
            Transition::BPromote => SlotId::B,
            Transition::Reconfig => {
                return Some(self.configure_at(
                    items,
                    decision.next_index,
                    decision.preload_index,
                ));
            }
        };

        self.active = front;
        let back = front.other();
        if self.slots[back.idx()].index == decision.preload_index {
            log::debug!(
                "Slot {back} already holds preload {:?}, keeping it",
                decision.preload_index
            );
        } else {
            self.assign(back, items, decision.preload_index);
        }

        log::info!(
            "Settled at {} via {} (down: {}, slot {front} active, preload {:?})",
            decision.next_index,
            decision.transition,
            decision.direction_down,
            decision.preload_index
        );

        Some(Settlement {
            index: decision.next_index,
            transition: decision.transition,
            preload: decision.preload_index,
        })
    }

    /// Manual play/pause. Ignored while the feed is not focused.
    pub fn toggle_pause(&mut self) {
        if !self.focused {
            return;
        }
        self.user_paused = !self.user_paused;
    }

    /// Losing focus pauses; regaining it resumes.
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused == focused {
            return;
        }
        self.focused = focused;
        self.user_paused = !focused;
    }

    fn assign(&mut self, slot: SlotId, items: &[R::Item], index: Option<usize>) {
        let item = index.and_then(|i| items.get(i));
        let uri = item.and_then(|it| self.resolver.media_uri(it));
        let poster = item.and_then(|it| self.resolver.poster_uri(it));

        self.generation += 1;
        let generation = self.generation;
        self.slots[slot.idx()].assign(index, uri, poster, self.screen_height, generation);
    }

    // --- Decoder callbacks ---

    fn is_current(&self, ticket: SlotTicket, event: &str) -> bool {
        let current = self.slots[ticket.slot.idx()].generation;
        if current != ticket.generation {
            log::debug!(
                "Discarded stale {event} for slot {} (gen {} vs current {current})",
                ticket.slot,
                ticket.generation
            );
            return false;
        }
        true
    }

    /// Progress and buffering only matter for the slot the viewer is watching.
    fn drives_viewer_ui(&self, slot: SlotId) -> bool {
        self.focused && self.active == slot
    }

    pub fn on_load_start(&mut self, ticket: SlotTicket) -> bool {
        if !self.is_current(ticket, "load start") {
            return false;
        }
        let status = &mut self.slots[ticket.slot.idx()].status;
        status.buffering = true;
        status.error = None;
        true
    }

    pub fn on_load(&mut self, ticket: SlotTicket, duration_secs: f64) -> bool {
        if !self.is_current(ticket, "load") {
            return false;
        }
        let status = &mut self.slots[ticket.slot.idx()].status;
        status.duration_secs = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };
        status.buffering = false;
        status.error = None;
        true
    }

    pub fn on_progress(&mut self, ticket: SlotTicket, elapsed_secs: f64) -> bool {
        self.on_progress_at(ticket, elapsed_secs, Instant::now())
    }

    pub fn on_progress_at(&mut self, ticket: SlotTicket, elapsed_secs: f64, now: Instant) -> bool {
        if !self.drives_viewer_ui(ticket.slot) || !self.is_current(ticket, "progress") {
            return false;
        }
        if !self.progress_throttle.accept(now) {
            return false;
        }
        self.slots[ticket.slot.idx()].status.elapsed_secs = elapsed_secs;
        true
    }

    pub fn on_buffer(&mut self, ticket: SlotTicket, buffering: bool) -> bool {
        if !self.drives_viewer_ui(ticket.slot) || !self.is_current(ticket, "buffer") {
            return false;
        }
        self.slots[ticket.slot.idx()].status.buffering = buffering;
        true
    }

    pub fn on_ready_for_display(&mut self, ticket: SlotTicket) -> bool {
        if !self.is_current(ticket, "ready") {
            return false;
        }
        self.slots[ticket.slot.idx()].status.ready = true;
        true
    }

    /// Contained to the slot: the other slot and the engine carry on.
    pub fn on_error(&mut self, ticket: SlotTicket, detail: &str) -> bool {
        if !self.is_current(ticket, "error") {
            return false;
        }
        let slot = &mut self.slots[ticket.slot.idx()];
        log::warn!(
            "Slot {} decoder error on item {:?}: {detail}",
            ticket.slot,
            slot.index
        );
        slot.status.buffering = false;
        slot.status.error = Some(PLAYBACK_ERROR_MESSAGE.to_string());
        true
    }

    /// Route a decoder event. Returns true if it changed slot state.
    pub fn dispatch(&mut self, ticket: SlotTicket, event: DecoderEvent) -> bool {
        match event {
            DecoderEvent::LoadStart => self.on_load_start(ticket),
            DecoderEvent::Loaded { duration_secs } => self.on_load(ticket, duration_secs),
            DecoderEvent::Progress { elapsed_secs } => self.on_progress(ticket, elapsed_secs),
            DecoderEvent::Buffering(buffering) => self.on_buffer(ticket, buffering),
            DecoderEvent::ReadyForDisplay => self.on_ready_for_display(ticket),
            DecoderEvent::Error(detail) => self.on_error(ticket, &detail),
        }
    }

    // --- Accessors ---

    pub fn slot(&self, id: SlotId) -> &PlayerSlot {
        &self.slots[id.idx()]
    }

    /// Ticket to hand to the decoder attached to `id`'s current assignment.
    pub fn ticket(&self, id: SlotId) -> SlotTicket {
        SlotTicket {
            slot: id,
            generation: self.slots[id.idx()].generation,
        }
    }

    pub fn active_slot(&self) -> SlotId {
        self.active
    }

    pub fn settled_index(&self) -> usize {
        self.settled_index
    }

    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn screen_height(&self) -> f64 {
        self.screen_height
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn user_paused(&self) -> bool {
        self.user_paused
    }
}
