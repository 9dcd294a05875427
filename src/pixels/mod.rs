//! Pixel storage: raw decoder output, the canonical buffers derived from it, and the
//! normalizer that maps one onto the other.

pub mod bitmap;
pub mod buffer;
pub mod normalize;
pub mod raw;
