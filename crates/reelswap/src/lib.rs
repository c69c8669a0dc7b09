//! Two-slot seamless video playback for a vertically swiping feed.
//!
//! [`engine::TwoPlayerEngine`] keeps two decoders alive: one plays the settled
//! item, the other prebuffers the neighbour in the scroll direction. When the
//! scroll comes to rest, [`engine::decide::decide_transition`] works out
//! whether the slots can be kept, promoted or must be reconfigured.
//! [`session::FeedSession`] wires the engine to a paged feed fetched on a
//! background thread.

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod session;
