//! Editor configuration, loaded from JSON.

use crate::color::PixelColor;
use crate::compose::PASTE_OFFSET;
use crate::contour::MAX_SAMPLE_ROWS;
use crate::edge_map::{MIN_EDGE_STRENGTH, SNAP_RADIUS};
use crate::flood_fill::ColorMetric;
use crate::quick_mask::MASK_ALPHA_THRESHOLD;
use crate::retouch::{BlurBrush, DodgeBurn};
use crate::tools::SelectionToolOptions;
use crate::tools::polygon::PolygonSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for every tool and region operation. Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Magic wand and paint bucket tolerance.
    pub wand_tolerance: u8,
    pub color_metric: ColorMetric,
    /// Screen pixels; a polygon click this close to the first vertex closes it.
    pub close_threshold: f64,
    pub snap_radius: u32,
    pub min_edge_strength: u8,
    pub auto_vertex_distance: f64,
    /// Row budget for contour tracing.
    pub contour_rows: u32,
    pub quick_mask_threshold: u8,
    pub foreground: PixelColor,
    /// Colour painted by delete.
    pub background: PixelColor,
    /// Scene units pasted pixels are nudged by.
    pub paste_offset: f64,
    pub dodge_burn: DodgeBurn,
    pub blur: BlurBrush,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            wand_tolerance: 30,
            color_metric: ColorMetric::Rgb,
            close_threshold: 10.0,
            snap_radius: SNAP_RADIUS,
            min_edge_strength: MIN_EDGE_STRENGTH,
            auto_vertex_distance: 15.0,
            contour_rows: MAX_SAMPLE_ROWS,
            quick_mask_threshold: MASK_ALPHA_THRESHOLD,
            foreground: PixelColor::BLACK,
            background: PixelColor::WHITE,
            paste_offset: PASTE_OFFSET,
            dodge_burn: DodgeBurn::default(),
            blur: BlurBrush::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Options for the selection tool manager.
    pub fn tool_options(&self) -> SelectionToolOptions {
        SelectionToolOptions {
            tolerance: self.wand_tolerance,
            metric: self.color_metric,
            polygon: PolygonSettings {
                close_threshold: self.close_threshold,
                auto_vertex_distance: self.auto_vertex_distance,
                snap_radius: self.snap_radius,
                min_edge_strength: self.min_edge_strength,
            },
            contour_rows: self.contour_rows,
        }
    }
}
