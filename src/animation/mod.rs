//! Disposal compositing for sources that store only the changed region of each frame.

pub mod blend;
pub mod compose;
