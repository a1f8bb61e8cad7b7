//! Devices and the group resolver.
//!
//! A [`Device`] collects the pins of one part. As pins arrive their raw group
//! tags are folded into canonical groups: short tags are kept verbatim, longer
//! tags (or the pin function when the tag is empty) are merged with existing
//! groups that only differ after the first `sanitize_length` characters. The
//! merged group is named by the shared prefix followed by `*`.

use crate::config::MAX_UNITS;
use crate::diagnostics::Diagnostic;
use crate::symbol::pin::{Edge, PinRecord};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Pin {pin_id:?} has neither a group tag nor a function name")]
    UnnamedPin { pin_id: String },
}

/// A canonical group and the pins that belong to it, in encounter order.
#[derive(Debug, Clone, PartialEq)]
pub struct PinGroup {
    pub name: String,
    pub pins: Vec<PinRecord>,
    /// Display unit, 1-based. Assigned by `Device::seal`.
    pub unit: u32,
    /// Body edge. Assigned by the edge classifier.
    pub edge: Option<Edge>,
}

impl PinGroup {
    fn new(name: String) -> Self {
        Self {
            name,
            pins: Vec::new(),
            unit: 1,
            edge: None,
        }
    }

    pub fn size(&self) -> usize {
        self.pins.len()
    }

    /// Longest pin label in the group, in characters.
    pub fn max_label_len(&self) -> usize {
        self.pins.iter().map(PinRecord::label_len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    sanitize_length: usize,
    groups: Vec<PinGroup>,
    merges: Vec<(Vec<String>, String)>,
}

impl Device {
    pub fn new(name: impl Into<String>, sanitize_length: usize) -> Self {
        Self {
            name: name.into(),
            sanitize_length,
            groups: Vec::new(),
            merges: Vec::new(),
        }
    }

    pub fn groups(&self) -> &[PinGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [PinGroup] {
        &mut self.groups
    }

    pub fn group(&self, name: &str) -> Option<&PinGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group_size(&self, name: &str) -> usize {
        self.group(name).map(PinGroup::size).unwrap_or(0)
    }

    pub fn max_label_len(&self, name: &str) -> usize {
        self.group(name).map(PinGroup::max_label_len).unwrap_or(0)
    }

    pub fn unit_of(&self, name: &str) -> Option<u32> {
        self.group(name).map(|g| g.unit)
    }

    /// Pins flattened in group order.
    pub fn pins(&self) -> impl Iterator<Item = &PinRecord> {
        self.groups.iter().flat_map(|g| g.pins.iter())
    }

    pub fn pin_count(&self) -> usize {
        self.groups.iter().map(PinGroup::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pin_count() == 0
    }

    /// Group renames performed so far, as (old names, new name).
    pub fn merges(&self) -> &[(Vec<String>, String)] {
        &self.merges
    }

    /// Resolve the pin's canonical group and file it under that group.
    pub fn add_pin(&mut self, mut pin: PinRecord) -> Result<(), DeviceError> {
        if pin.raw_group.is_empty() && pin.function.is_empty() {
            return Err(DeviceError::UnnamedPin { pin_id: pin.id });
        }
        let group = self.resolve_group(&pin);
        pin.canonical_group = group.clone();
        match self.groups.iter_mut().find(|g| g.name == group) {
            Some(existing) => existing.pins.push(pin),
            None => {
                let mut new_group = PinGroup::new(group);
                new_group.pins.push(pin);
                self.groups.push(new_group);
            }
        }
        Ok(())
    }

    fn is_registered(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    fn resolve_group(&mut self, pin: &PinRecord) -> String {
        let san = self.sanitize_length;
        if !pin.raw_group.is_empty() && pin.raw_group.chars().count() <= san {
            return pin.raw_group.clone();
        }

        let reference = if pin.raw_group.is_empty() {
            &pin.function
        } else {
            &pin.raw_group
        };
        if self.is_registered(reference) {
            return reference.clone();
        }

        let prefix: String = reference.chars().take(san).collect();
        let wildcard = format!("{}*", prefix);
        if self.is_registered(&wildcard) {
            return wildcard;
        }

        // A wildcard shorter than san + 1 means the reference itself is shorter
        // than the prefix length; such names never merge.
        if wildcard.chars().count() == san + 1 {
            let candidates: Vec<String> = self
                .groups
                .iter()
                .filter(|g| g.name.starts_with(&prefix) && g.name.chars().count() > san)
                .map(|g| g.name.clone())
                .collect();
            if !candidates.is_empty() {
                self.rename_groups(&candidates, &wildcard);
                return wildcard;
            }
        }

        reference.clone()
    }

    /// Fold all `from` groups into one group called `to`, placed where the first
    /// of them was.
    fn rename_groups(&mut self, from: &[String], to: &str) {
        tracing::debug!("{}: merging groups {:?} into {}", self.name, from, to);

        let mut merged = PinGroup::new(to.to_string());
        let mut merged_at = None;
        let mut kept = Vec::with_capacity(self.groups.len());
        for group in std::mem::take(&mut self.groups) {
            if from.contains(&group.name) {
                merged_at.get_or_insert(kept.len());
                merged.pins.extend(group.pins.into_iter().map(|mut pin| {
                    pin.canonical_group = to.to_string();
                    pin
                }));
            } else {
                kept.push(group);
            }
        }
        let position = merged_at.unwrap_or(kept.len());
        kept.insert(position, merged);
        self.groups = kept;
        self.merges.push((from.to_vec(), to.to_string()));
    }

    /// Finish the device: assign display units and report capacity problems.
    ///
    /// With `tag_units` every group gets its own unit (1-based), clamped at
    /// [`MAX_UNITS`]; otherwise everything lives in unit 1.
    pub fn seal(&mut self, tag_units: bool) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = self
            .merges
            .iter()
            .map(|(from, to)| {
                Diagnostic::info(&self.name, format!("merged groups {} into {}", from.join(", "), to))
            })
            .collect();

        let overflow = tag_units && self.groups.len() > MAX_UNITS as usize;
        let mut unit = 1;
        for group in &mut self.groups {
            group.unit = unit;
            if tag_units && unit < MAX_UNITS {
                unit += 1;
            }
        }

        if overflow {
            let table = self
                .groups
                .iter()
                .map(|g| format!("{}\t{}\t{}", g.name, g.size(), unit_letter(g.unit)))
                .collect::<Vec<_>>()
                .join("\n");
            tracing::warn!(
                "{}: {} pin groups but only {} units available; consider a smaller sanitize length\n{}",
                self.name,
                self.groups.len(),
                MAX_UNITS,
                table
            );
            diagnostics.push(Diagnostic::warning(
                &self.name,
                format!(
                    "{} pin groups exceed the {} addressable units; groups past {} share unit {}",
                    self.groups.len(),
                    MAX_UNITS,
                    unit_letter(MAX_UNITS),
                    MAX_UNITS
                ),
            ));
        }

        diagnostics
    }

    /// Unit count written in the symbol header.
    pub fn unit_count(&self) -> u32 {
        self.groups.last().map(|g| g.unit).unwrap_or(1)
    }
}

/// `1` -> `A`, `26` -> `Z`.
pub fn unit_letter(unit: u32) -> char {
    char::from_u32(unit.clamp(1, MAX_UNITS) + 64).unwrap_or('?')
}
