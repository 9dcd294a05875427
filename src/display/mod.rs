//! Display transforms applied on top of the player's current frame.

pub mod pipeline;
pub mod tonemap;
pub mod transform;

pub use pipeline::{DisplayPipeline, PixelProbe, probe_entry, render};
pub use transform::{ChannelSwizzle, Rotation, ToneMapMode, TransformState};
