//! The frame window and the player that navigates it.

use crate::foundation::{error::FlipbookResult, observe::Listeners};

pub mod entry;
pub mod player;

pub use entry::{CacheEntry, Frame};
pub use player::{Player, PlayerStats};

/// Read access to "the frame being shown" plus change notification.
///
/// Consumers such as the display pipeline borrow a provider per call and subscribe to its
/// [`Listeners`] to learn when the current entry changed.
pub trait FrameProvider {
    fn current_entry(&self) -> FlipbookResult<&CacheEntry>;

    fn listeners(&self) -> &Listeners;
}
