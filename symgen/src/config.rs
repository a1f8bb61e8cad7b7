//! Conversion configuration.
//!
//! Every stage of the pipeline receives a [`SymbolConfig`] by reference; nothing
//! reads ambient state. Runtime options (the ones the CLI exposes) and static
//! drawing tunables live in the same struct so a JSON file can override any of
//! them.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Highest unit index the legacy library grammar can address (units `A`..`Z`).
pub const MAX_UNITS: u32 = 26;

/// Error type for configuration problems
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("Invalid glob pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    /// Groups whose names share this many leading characters get merged.
    pub sanitize_length: usize,
    /// Spread the groups over a plane instead of building one four-sided body.
    pub flat_layout: bool,
    /// Rectangle around every group (flat layout only).
    pub draw_group_rectangles: bool,
    /// One unit per group (flat layout only).
    pub tag_units_per_group: bool,
    /// Input columns appended to each pin label, 0-based.
    pub extra_label_columns: Vec<usize>,
    /// Minimum column offset between group clusters in flat layout.
    pub min_group_separation: i64,

    pub grid_size: i64,
    pub pin_pitch: i64,
    pub group_gap: i64,
    pub pin_length: i64,
    pub pin_text_size: i64,

    pub ground_patterns: Vec<String>,
    pub supply_patterns: Vec<String>,
    pub clock_patterns: Vec<String>,
    pub no_connect_patterns: Vec<String>,
    /// Groups pinned to the right-hand body edge.
    pub left_fixed_patterns: Vec<String>,
    /// Groups pinned to the left-hand body edge.
    pub right_fixed_patterns: Vec<String>,

    pub footprint_filters: Vec<String>,
    pub reference: String,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            sanitize_length: 5,
            flat_layout: false,
            draw_group_rectangles: true,
            tag_units_per_group: true,
            extra_label_columns: vec![10],
            min_group_separation: 500,
            grid_size: 50,
            pin_pitch: 50,
            group_gap: 150,
            pin_length: 200,
            pin_text_size: 25,
            ground_patterns: strings(&["GND*", "VSS*"]),
            supply_patterns: strings(&["VDD*", "VCC*", "VR*"]),
            clock_patterns: strings(&["*CLK*", "*CK*"]),
            no_connect_patterns: strings(&["NC"]),
            left_fixed_patterns: strings(&["NC"]),
            right_fixed_patterns: Vec::new(),
            footprint_filters: strings(&["*BGA*"]),
            reference: "U".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SymbolConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: SymbolConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the layout engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("grid_size", self.grid_size)?;
        positive("pin_pitch", self.pin_pitch)?;
        positive("pin_text_size", self.pin_text_size)?;
        non_negative("group_gap", self.group_gap)?;
        non_negative("pin_length", self.pin_length)?;
        non_negative("min_group_separation", self.min_group_separation)?;
        on_grid("pin_pitch", self.pin_pitch, self.grid_size)?;
        on_grid("group_gap", self.group_gap, self.grid_size)?;
        on_grid("pin_length", self.pin_length, self.grid_size)?;
        on_grid("min_group_separation", self.min_group_separation, self.grid_size)?;
        if self.reference.trim().is_empty() || self.reference.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "reference",
                message: format!("{:?} is not a valid reference designator", self.reference),
            });
        }
        Ok(())
    }

    /// Whether groups get distinct units. Units only make sense when groups are
    /// drawn as separate clusters.
    pub fn units_enabled(&self) -> bool {
        self.flat_layout && self.tag_units_per_group
    }

    /// Outline width used for rectangles.
    pub fn rectangle_thickness(&self) -> i64 {
        self.pin_text_size / 5
    }

    /// Round a coordinate to the nearest grid multiple, ties to even.
    pub fn snap(&self, value: f64) -> i64 {
        let grid = self.grid_size as f64;
        (value / grid).round_ties_even() as i64 * self.grid_size
    }
}

fn positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!("must be greater than zero, got {}", value),
        });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!("must not be negative, got {}", value),
        });
    }
    Ok(())
}

fn on_grid(field: &'static str, value: i64, grid: i64) -> Result<(), ConfigError> {
    if value % grid != 0 {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!("{} is not a multiple of the grid size {}", value, grid),
        });
    }
    Ok(())
}
