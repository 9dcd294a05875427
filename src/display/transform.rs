use std::str::FromStr;

use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Counter-clockwise rotation in quarter turns.
///
/// Serialized as the angle in degrees (`0`, `90`, `180`, `270`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> FlipbookResult<Self> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(FlipbookError::validation(format!(
                "rotation must be 0, 90, 180 or 270 degrees, got {other}"
            ))),
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// Display size of a `width` x `height` source.
    pub fn display_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Source pixel shown at display position `(x, y)` of a `width` x `height` source.
    ///
    /// `(x, y)` must lie inside [`Rotation::display_dimensions`].
    pub fn source_coords(self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Deg0 => (x, y),
            Self::Deg90 => (width - 1 - y, x),
            Self::Deg180 => (width - 1 - x, height - 1 - y),
            Self::Deg270 => (y, height - 1 - x),
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = FlipbookError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl FromStr for Rotation {
    type Err = FlipbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let degrees: u16 = s
            .trim()
            .parse()
            .map_err(|_| FlipbookError::validation(format!("rotation '{s}' is not a number")))?;
        Self::from_degrees(degrees)
    }
}

/// How HDR (floating point) frames are brought into 8-bit range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapMode {
    /// Clamp to `[0, 1]`.
    #[default]
    Clamp,
    /// Divide by the largest channel value in the frame.
    Linear,
    /// Global Reinhard with key 0.18 over the log-average luminance.
    Reinhard,
    /// Drago adaptive logarithmic mapping, bias 0.85.
    Drago,
}

impl FromStr for ToneMapMode {
    type Err = FlipbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "linear" => Ok(Self::Linear),
            "reinhard" => Ok(Self::Reinhard),
            "drago" => Ok(Self::Drago),
            other => Err(FlipbookError::validation(format!(
                "unknown tone map mode '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelSwizzle {
    #[default]
    Identity,
    SwapRedBlue,
    /// Show one channel as grayscale.
    Red,
    Green,
    Blue,
    Alpha,
}

impl FromStr for ChannelSwizzle {
    type Err = FlipbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "identity" | "rgb" => Ok(Self::Identity),
            "swap_red_blue" | "bgr" => Ok(Self::SwapRedBlue),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "alpha" => Ok(Self::Alpha),
            other => Err(FlipbookError::validation(format!(
                "unknown channel swizzle '{other}'"
            ))),
        }
    }
}

/// Display parameters applied on top of the current frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformState {
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub tone_map: ToneMapMode,
    pub gamma: f64,
    pub swizzle: ChannelSwizzle,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            rotation: Rotation::Deg0,
            flip_horizontal: false,
            flip_vertical: false,
            tone_map: ToneMapMode::Clamp,
            gamma: 1.0,
            swizzle: ChannelSwizzle::Identity,
        }
    }
}

impl TransformState {
    pub fn validate(&self) -> FlipbookResult<()> {
        validate_gamma(self.gamma)
    }

    /// True when rendering a non-HDR frame returns it unchanged.
    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation::Deg0
            && !self.flip_horizontal
            && !self.flip_vertical
            && self.gamma == 1.0
            && self.swizzle == ChannelSwizzle::Identity
    }
}

pub fn validate_gamma(gamma: f64) -> FlipbookResult<()> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(())
    } else {
        Err(FlipbookError::validation(format!(
            "gamma must be a positive finite number, got {gamma}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/transform.rs"]
mod tests;
