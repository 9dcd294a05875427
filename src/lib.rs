//! Flipbook is a bounded frame cache and display pipeline for multi-page and animated images.
//!
//! - Open a [`FrameSource`] ([`FileSource`] for GIF/APNG/WebP/still images, [`MemorySource`]
//!   for pages decoded elsewhere)
//! - Navigate it cyclically with a [`Player`], which keeps a memory-bounded window of
//!   normalized (and, for residual sources, composited) frames
//! - Attach a [`DisplayPipeline`] to render the current frame with rotation, flips, tone
//!   mapping, gamma and channel swizzles, and to probe source pixels through those transforms
#![forbid(unsafe_code)]

pub mod animation;
pub mod cache;
pub mod display;
pub mod foundation;
pub mod pixels;
pub mod source;

pub use crate::cache::{CacheEntry, Frame, FrameProvider, Player, PlayerStats};
pub use crate::display::{
    ChannelSwizzle, DisplayPipeline, PixelProbe, Rotation, ToneMapMode, TransformState,
};
pub use crate::foundation::config::{PlayerConfig, ViewerConfig};
pub use crate::foundation::core::{AnimationMeta, Disposal, FrameFlags};
pub use crate::foundation::error::{FlipbookError, FlipbookResult};
pub use crate::foundation::observe::{InvalidationListener, Listeners, SubscriptionId};
pub use crate::pixels::buffer::{PixelBuffer, PixelFormat};
pub use crate::pixels::normalize::{Normalized, Storage, normalize};
pub use crate::pixels::raw::{RawBitmap, RawPixels};
pub use crate::source::file::FileSource;
pub use crate::source::memory::MemorySource;
pub use crate::source::{DecodedPage, FrameSource, PageArena, PageLease};
