// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Viewer configuration

use crate::error::{Error, Result};
use crate::view::ViewOptions;
use crate::visualize::{GridUnit, DEFAULT_COLOR, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "scadview.toml";

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// OpenSCAD executable path, autodetected when unset
    pub openscad_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Grid cell size: 0 disables, -1 picks automatically
    pub grid_unit: f64,
    /// Mesh colour
    pub color: String,
    /// Draw the coordinate axes
    pub axes: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            openscad_path: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grid_unit: -1.0,
            color: DEFAULT_COLOR.to_string(),
            axes: true,
        }
    }
}

impl ViewConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        if !config.grid_unit.is_finite() {
            return Err(Error::Config(format!(
                "{}: grid_unit must be a finite number, got {}",
                path.display(),
                config.grid_unit
            )));
        }
        Ok(config)
    }

    /// Load `scadview.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(openscad) = var("OPENSCAD_PATH") {
            self.openscad_path = Some(PathBuf::from(openscad));
        }

        if let Some(unit) = var("SCADVIEW_GRID_UNIT") {
            self.grid_unit = parse_grid_unit(&unit)
                .map_err(|e| Error::Config(format!("SCADVIEW_GRID_UNIT: {}", e)))?;
        }

        if let Some(width) = var("SCADVIEW_WIDTH") {
            self.width = parse_var("SCADVIEW_WIDTH", &width)?;
        }

        if let Some(height) = var("SCADVIEW_HEIGHT") {
            self.height = parse_var("SCADVIEW_HEIGHT", &height)?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn to_view_options(&self) -> ViewOptions {
        ViewOptions {
            width: self.width,
            height: self.height,
            grid_unit: GridUnit::from_value(self.grid_unit),
            outfile: None,
            executable: self.openscad_path.clone(),
            color: self.color.clone(),
            axes: self.axes,
        }
    }
}

/// Parse a grid unit; NaN and infinities are rejected
pub fn parse_grid_unit(value: &str) -> Result<f64> {
    let unit: f64 = parse_var("grid unit", value)?;
    if unit.is_finite() {
        Ok(unit)
    } else {
        Err(Error::Config(format!("grid unit must be finite, got {:?}", value)))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has invalid value {:?}", key, value)))
}
