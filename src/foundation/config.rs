use std::path::Path;

use anyhow::Context as _;

use crate::{
    display::transform::TransformState,
    foundation::error::{FlipbookError, FlipbookResult},
};

/// Frame cache sizing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Memory budget for the frame window. The window holds
    /// `max(1, cache_budget_bytes / first_frame_bytes)` entries.
    pub cache_budget_bytes: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            cache_budget_bytes: 256 * 1024 * 1024,
        }
    }
}

impl PlayerConfig {
    pub fn with_budget(cache_budget_bytes: usize) -> Self {
        Self { cache_budget_bytes }
    }
}

/// Everything a viewer persists between sessions: cache sizing and the display transform.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub player: PlayerConfig,
    pub display: TransformState,
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> FlipbookResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| FlipbookError::validation(format!("parse viewer config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> FlipbookResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read viewer config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> FlipbookResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FlipbookError::validation(format!("serialize viewer config: {e}")))
    }

    pub fn validate(&self) -> FlipbookResult<()> {
        if self.player.cache_budget_bytes == 0 {
            return Err(FlipbookError::validation(
                "player.cache_budget_bytes must be > 0",
            ));
        }
        self.display.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
