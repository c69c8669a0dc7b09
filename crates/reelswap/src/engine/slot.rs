use std::fmt;

/// Message shown on the active item when its decoder fails.
pub const PLAYBACK_ERROR_MESSAGE: &str = "Couldn't load this video.";

/// Identity label of one of the two player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    A,
    B,
}

impl SlotId {
    pub const ALL: [SlotId; 2] = [SlotId::A, SlotId::B];

    /// The other slot.
    pub fn other(self) -> SlotId {
        match self {
            SlotId::A => SlotId::B,
            SlotId::B => SlotId::A,
        }
    }

    pub(crate) fn idx(self) -> usize {
        match self {
            SlotId::A => 0,
            SlotId::B => 1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SlotId::A => "A",
            SlotId::B => "B",
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Decode/playback status reported by a slot's decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackStatus {
    /// First frame has been rendered.
    pub ready: bool,
    pub buffering: bool,
    pub duration_secs: f64,
    pub elapsed_secs: f64,
    /// User-facing error message, if the decoder failed.
    pub error: Option<String>,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            ready: false,
            buffering: true,
            duration_secs: 0.0,
            elapsed_secs: 0.0,
            error: None,
        }
    }
}

/// Identifies one assignment of one slot.
///
/// Handed to the decoder when its source is attached and passed back with
/// every callback, so events from a replaced decoder can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotTicket {
    pub slot: SlotId,
    pub generation: u64,
}

/// What a slot currently holds.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub index: Option<usize>,
    pub uri: Option<String>,
    pub poster: Option<String>,
    /// Scroll-space position of the slot's surface.
    pub base_offset: f64,
    pub status: PlaybackStatus,
    pub generation: u64,
}

impl PlayerSlot {
    pub(crate) fn idle(base_offset: f64) -> Self {
        Self {
            index: None,
            uri: None,
            poster: None,
            base_offset,
            status: PlaybackStatus::default(),
            generation: 0,
        }
    }

    /// Point the slot at a new item. Always resets the playback status.
    pub(crate) fn assign(
        &mut self,
        index: Option<usize>,
        uri: Option<String>,
        poster: Option<String>,
        screen_height: f64,
        generation: u64,
    ) {
        self.index = index;
        self.uri = uri;
        self.poster = poster;
        self.base_offset = index.unwrap_or(0) as f64 * screen_height;
        self.status = PlaybackStatus::default();
        self.generation = generation;
    }

    /// Holds an item with playable media.
    pub fn is_loaded(&self) -> bool {
        self.index.is_some() && self.uri.is_some()
    }

    pub fn holds(&self, index: usize) -> bool {
        self.index == Some(index)
    }
}
