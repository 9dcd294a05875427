/// How the canvas is prepared before the next animation frame is drawn.
///
/// Only `Leave` produces a blended canvas; `Previous` and `Unspecified` currently behave like
/// `Background`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Disposal {
    #[default]
    Unspecified,
    Leave,
    Background,
    Previous,
}

/// Per-page animation metadata as delivered by a frame source.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct AnimationMeta {
    pub offset_x: u32,
    pub offset_y: u32,
    /// Display duration in milliseconds; passed through, never scheduled on.
    pub duration_ms: u32,
    pub disposal: Disposal,
}

impl AnimationMeta {
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub fn with_disposal(mut self, disposal: Disposal) -> Self {
        self.disposal = disposal;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Classification flags attached to a normalized frame.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameFlags {
    pub hdr: bool,
    pub color: bool,
}
