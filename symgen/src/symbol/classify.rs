//! Edge classifier: decides which side of the body every group is drawn on.
//!
//! Ground groups go to the bottom, supply groups to the top, and the two
//! fixed-edge pattern lists pin groups to the right or left side. Everything
//! else is split between left and right by a single greedy pass over the
//! groups, largest first, each going to the lighter side. Starting from equal
//! side loads this keeps `|left - right|` within the largest group load.

use crate::config::{ConfigError, SymbolConfig};
use crate::symbol::device::{Device, PinGroup};
use crate::symbol::patterns::PatternBook;
use crate::symbol::pin::Edge;

/// Space one group occupies along its edge, in layout units.
pub fn group_load(size: usize, config: &SymbolConfig) -> i64 {
    size as i64 * config.pin_pitch + config.group_gap
}

/// Starting value of every edge extent. Cancels the gap of the first group
/// down to one pin pitch.
pub fn edge_bias(config: &SymbolConfig) -> i64 {
    -(config.group_gap - config.pin_pitch)
}

/// Accumulated load per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeLoads {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

impl EdgeLoads {
    pub fn seeded(value: i64) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    pub fn get(&self, edge: Edge) -> i64 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn get_mut(&mut self, edge: Edge) -> &mut i64 {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
        }
    }
}

pub struct EdgeClassifier<'a> {
    config: &'a SymbolConfig,
    patterns: PatternBook,
}

impl<'a> EdgeClassifier<'a> {
    pub fn new(config: &'a SymbolConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            patterns: PatternBook::from_config(config)?,
        })
    }

    pub fn with_patterns(config: &'a SymbolConfig, patterns: PatternBook) -> Self {
        Self { config, patterns }
    }

    /// Fixed edge for a group name, if any pattern list claims it.
    pub fn fixed_edge(&self, group: &str) -> Option<Edge> {
        if self.patterns.ground.matches(group) {
            Some(Edge::Bottom)
        } else if self.patterns.supply.matches(group) {
            Some(Edge::Top)
        } else if self.patterns.left_fixed.matches(group) {
            Some(Edge::Right)
        } else if self.patterns.right_fixed.matches(group) {
            Some(Edge::Left)
        } else {
            None
        }
    }

    /// Assign an edge to every group of the device and orient its pins.
    /// Returns the pin-count based load of each edge.
    pub fn classify(&self, device: &mut Device) -> EdgeLoads {
        if self.config.flat_layout {
            return self.classify_flat(device);
        }

        let mut loads = EdgeLoads::seeded(edge_bias(self.config));
        let fixed: Vec<Option<Edge>> = device
            .groups()
            .iter()
            .map(|g| self.fixed_edge(&g.name))
            .collect();

        let mut balanced: Vec<(usize, usize)> = Vec::new();
        for (index, (group, edge)) in device.groups_mut().iter_mut().zip(fixed).enumerate() {
            match edge {
                Some(edge) => {
                    *loads.get_mut(edge) += group_load(group.size(), self.config);
                    assign(group, edge);
                }
                None => balanced.push((index, group.size())),
            }
        }

        // Stable sort keeps first-seen order among equal sizes.
        balanced.sort_by(|a, b| b.1.cmp(&a.1));

        for (index, size) in balanced {
            let load = group_load(size, self.config);
            // Ties go left.
            let edge = if loads.left <= loads.right {
                Edge::Left
            } else {
                Edge::Right
            };
            *loads.get_mut(edge) += load;
            assign(&mut device.groups_mut()[index], edge);
        }

        loads
    }

    fn classify_flat(&self, device: &mut Device) -> EdgeLoads {
        let mut loads = EdgeLoads::seeded(edge_bias(self.config));
        for group in device.groups_mut() {
            loads.left += group_load(group.size(), self.config);
            assign(group, Edge::Left);
        }
        loads
    }
}

fn assign(group: &mut PinGroup, edge: Edge) {
    group.edge = Some(edge);
    let orientation = edge.orientation();
    for pin in &mut group.pins {
        pin.orientation = orientation;
    }
}
