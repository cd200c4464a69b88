use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use hexgrid::MIN_HEX_KM;

/// Tunables for the zone editor. Every field has a default, so a partial JSON
/// object (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Resolution knob; larger values give smaller hexes.
    pub grid_size: u32,
    /// Clip hexes to the county boundary.
    pub clip_edges: bool,
    /// Hexes processed per idle slot.
    pub batch_size: usize,
    /// Smallest hex edge length, in kilometres.
    pub min_hex_km: f64,
    /// Grids are hidden below this map zoom.
    pub min_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            clip_edges: true,
            batch_size: 200,
            min_hex_km: MIN_HEX_KM,
            min_zoom: 7.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Failed to parse editor config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn read_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read editor config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid editor config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.grid_size > 0, "grid_size must be positive");
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.min_hex_km.is_finite() && self.min_hex_km > 0.0,
            "min_hex_km must be positive, got {}", self.min_hex_km);
        ensure!(self.min_zoom.is_finite(), "min_zoom must be finite");
        Ok(())
    }
}
