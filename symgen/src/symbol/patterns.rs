//! Shell-style pattern lists used to recognise power, clock and fixed-edge pins.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::{ConfigError, SymbolConfig};
use crate::symbol::pin::{Orientation, PinShape};

/// A compiled list of glob patterns. Matches if any pattern matches.
#[derive(Debug, Clone)]
pub struct PatternSet {
    set: GlobSet,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| ConfigError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| ConfigError::Pattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            source,
        })?;
        Ok(Self { set })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.set.is_match(name)
    }
}

/// All pattern lists of a [`SymbolConfig`], compiled once per run.
#[derive(Debug, Clone)]
pub struct PatternBook {
    pub ground: PatternSet,
    pub supply: PatternSet,
    pub clock: PatternSet,
    pub no_connect: PatternSet,
    pub left_fixed: PatternSet,
    pub right_fixed: PatternSet,
}

impl PatternBook {
    pub fn from_config(config: &SymbolConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            ground: PatternSet::new(&config.ground_patterns)?,
            supply: PatternSet::new(&config.supply_patterns)?,
            clock: PatternSet::new(&config.clock_patterns)?,
            no_connect: PatternSet::new(&config.no_connect_patterns)?,
            left_fixed: PatternSet::new(&config.left_fixed_patterns)?,
            right_fixed: PatternSet::new(&config.right_fixed_patterns)?,
        })
    }

    /// Glyph and initial orientation for a pin, judged by its function name.
    pub fn pin_shape(&self, function: &str) -> (PinShape, Orientation) {
        if self.ground.matches(function) {
            (PinShape::Power, Orientation::Up)
        } else if self.supply.matches(function) {
            (PinShape::Power, Orientation::Down)
        } else if self.clock.matches(function) {
            (PinShape::Clock, Orientation::Unset)
        } else if self.no_connect.matches(function) {
            (PinShape::NoConnect, Orientation::Unset)
        } else {
            (PinShape::Bidirectional, Orientation::Unset)
        }
    }
}
