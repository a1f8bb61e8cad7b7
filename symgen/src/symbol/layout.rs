//! Layout engine: edge extents and absolute coordinates.
//!
//! Sizing runs in two passes. The first sums group loads per edge (the same
//! numbers the classifier balanced on). The second widens the longer of the
//! top/bottom edges so the left and right pin labels fit next to each other,
//! and the longer of left/right by the stub length on both ends. The
//! resulting extents give the starting anchor of every edge; groups are then
//! placed one after the other, each starting one group gap past the point
//! where the previous group on the same edge ended.
//!
//! All emitted coordinates are multiples of the configured grid. Pin pitch,
//! group gap and stub length are validated to be grid multiples, so snapping
//! only ever happens on the anchors and on text-derived positions.

use serde::Serialize;

use crate::config::SymbolConfig;
use crate::symbol::classify::{edge_bias, group_load, EdgeLoads};
use crate::symbol::device::{Device, PinGroup};
use crate::symbol::pin::{Edge, Orientation, PinRecord, PinShape};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Device {0} has no pins")]
    EmptyDevice(String),
    #[error("Group {group} of device {device} was never assigned an edge")]
    Unclassified { device: String, group: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPin {
    pub label: String,
    pub id: String,
    pub position: Point,
    pub length: i64,
    pub orientation: Orientation,
    pub text_size: i64,
    pub unit: u32,
    pub shape: PinShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupLabel {
    pub text: String,
    pub position: Point,
    /// Tenths of a degree, `0` or `900`.
    pub angle: u16,
    pub size: i64,
    pub unit: u32,
    pub h_justify: char,
    pub v_justify: char,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub start: Point,
    pub end: Point,
    pub unit: u32,
    pub thickness: i64,
}

/// One drawable element, in output order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Pin(PlacedPin),
    Label(GroupLabel),
    Rect(Rectangle),
}

/// Edge sizes after both passes, plus the text offsets of the second pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeExtents {
    pub size: EdgeLoads,
    pub offset: EdgeLoads,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub items: Vec<DrawItem>,
    /// `None` for flat layouts, which have no body.
    pub extents: Option<EdgeExtents>,
    pub units: u32,
    pub flat: bool,
}

impl Layout {
    pub fn pins(&self) -> impl Iterator<Item = &PlacedPin> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Pin(pin) => Some(pin),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &GroupLabel> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Label(label) => Some(label),
            _ => None,
        })
    }

    pub fn rectangles(&self) -> impl Iterator<Item = &Rectangle> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Rect(rect) => Some(rect),
            _ => None,
        })
    }

    /// Every coordinate the emitter will write.
    #[cfg(test)]
    pub fn coordinates(&self) -> Vec<i64> {
        let mut coords = Vec::new();
        for item in &self.items {
            match item {
                DrawItem::Pin(pin) => coords.extend([pin.position.x, pin.position.y]),
                DrawItem::Label(label) => coords.extend([label.position.x, label.position.y]),
                DrawItem::Rect(rect) => {
                    coords.extend([rect.start.x, rect.start.y, rect.end.x, rect.end.y])
                }
            }
        }
        coords
    }
}

/// Current drawing position of each edge.
#[derive(Debug, Clone, Copy)]
struct Anchors {
    top: Point,
    bottom: Point,
    left: Point,
    right: Point,
}

impl Anchors {
    fn get(&self, edge: Edge) -> Point {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    fn set(&mut self, edge: Edge, point: Point) {
        match edge {
            Edge::Top => self.top = point,
            Edge::Bottom => self.bottom = point,
            Edge::Left => self.left = point,
            Edge::Right => self.right = point,
        }
    }
}

pub struct LayoutEngine<'a> {
    config: &'a SymbolConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a SymbolConfig) -> Self {
        Self { config }
    }

    /// Lay out a classified device.
    pub fn layout(&self, device: &Device) -> Result<Layout, LayoutError> {
        if device.is_empty() {
            return Err(LayoutError::EmptyDevice(device.name.clone()));
        }
        if let Some(group) = device.groups().iter().find(|g| g.edge.is_none()) {
            return Err(LayoutError::Unclassified {
                device: device.name.clone(),
                group: group.name.clone(),
            });
        }

        if self.config.flat_layout {
            Ok(self.layout_flat(device))
        } else {
            Ok(self.layout_grouped(device))
        }
    }

    /// Pass one: pin count and group gaps per edge.
    pub fn pin_extents(&self, device: &Device) -> EdgeLoads {
        let mut size = EdgeLoads::seeded(edge_bias(self.config));
        for group in device.groups() {
            if let Some(edge) = group.edge {
                *size.get_mut(edge) += group_load(group.size(), self.config);
            }
        }
        size
    }

    /// Both passes: pin extents grown by label text and stub lengths.
    pub fn extents(&self, device: &Device) -> EdgeExtents {
        let c = self.config;
        let mut size = self.pin_extents(device);
        let mut offset = EdgeLoads::default();

        let text_len = |edge: Edge| -> i64 {
            device
                .groups()
                .iter()
                .filter(|g| g.edge == Some(edge))
                .map(PinGroup::max_label_len)
                .max()
                .unwrap_or(0) as i64
        };
        let left_txt = text_len(Edge::Left);
        let right_txt = text_len(Edge::Right);

        let (wide, narrow) = if size.top >= size.bottom {
            (Edge::Top, Edge::Bottom)
        } else {
            (Edge::Bottom, Edge::Top)
        };
        *size.get_mut(wide) += (left_txt + right_txt) * c.pin_text_size + 2 * c.pin_length;
        *offset.get_mut(wide) = left_txt * c.pin_text_size + c.pin_length;
        *offset.get_mut(narrow) = 0;

        let (tall, short) = if size.right >= size.left {
            (Edge::Right, Edge::Left)
        } else {
            (Edge::Left, Edge::Right)
        };
        *size.get_mut(tall) += 2 * c.pin_length + c.group_gap;
        *offset.get_mut(tall) = c.group_gap;
        *offset.get_mut(short) = 0;

        EdgeExtents { size, offset }
    }

    fn initial_anchors(&self, extents: &EdgeExtents) -> Anchors {
        let c = self.config;
        let size = |edge: Edge| extents.size.get(edge) as f64;
        let offset = |edge: Edge| c.snap(extents.offset.get(edge) as f64);
        let sx = size(Edge::Top).max(size(Edge::Bottom));
        let sy = size(Edge::Left).max(size(Edge::Right));

        Anchors {
            top: Point::new(
                c.snap((sx - size(Edge::Top)) / 2.0 - sx / 2.0) + offset(Edge::Top),
                c.snap(sy / 2.0),
            ),
            bottom: Point::new(
                c.snap((sx - size(Edge::Bottom)) / 2.0 - sx / 2.0) + offset(Edge::Bottom),
                c.snap(-sy / 2.0),
            ),
            left: Point::new(
                c.snap(-sx / 2.0),
                c.snap(-(sy - size(Edge::Left)) / 2.0 + sy / 2.0) - offset(Edge::Left),
            ),
            right: Point::new(
                c.snap(sx / 2.0),
                c.snap(-(sy - size(Edge::Right)) / 2.0 + sy / 2.0) - offset(Edge::Right),
            ),
        }
    }

    fn layout_grouped(&self, device: &Device) -> Layout {
        let c = self.config;
        let extents = self.extents(device);
        let mut anchors = self.initial_anchors(&extents);
        let mut items = Vec::with_capacity(device.pin_count() + device.group_count() + 1);

        for group in device.groups() {
            let Some(edge) = group.edge else { continue };
            let anchor = anchors.get(edge);
            let (start, step) = if edge.is_horizontal() {
                (anchor.offset(c.group_gap, 0), Point::new(c.pin_pitch, 0))
            } else {
                (anchor.offset(0, -c.group_gap), Point::new(0, -c.pin_pitch))
            };

            let mut cursor = start;
            for pin in &group.pins {
                items.push(DrawItem::Pin(self.place_pin(pin, cursor, group.unit)));
                cursor = cursor.offset(step.x, step.y);
            }
            if group.size() > 1 {
                items.push(DrawItem::Label(self.edge_label(group, edge, cursor)));
            }
            anchors.set(edge, cursor);
        }

        items.push(DrawItem::Rect(Rectangle {
            start: Point::new(anchors.left.x + c.pin_length, anchors.top.y - c.pin_length),
            end: Point::new(anchors.right.x - c.pin_length, anchors.bottom.y + c.pin_length),
            unit: 1,
            thickness: c.rectangle_thickness(),
        }));

        Layout {
            items,
            extents: Some(extents),
            units: device.unit_count(),
            flat: false,
        }
    }

    /// Label for a group on the body, placed from the position after its last pin.
    fn edge_label(&self, group: &PinGroup, edge: Edge, end: Point) -> GroupLabel {
        let c = self.config;
        let span = (group.size() as i64 + 1) * c.grid_size;
        let (position, angle, h_justify) = match edge {
            Edge::Bottom => (
                Point::new(end.x - span, end.y + c.pin_length + c.grid_size),
                900,
                'L',
            ),
            Edge::Top => (
                Point::new(end.x - span, end.y - c.pin_length - c.grid_size),
                900,
                'R',
            ),
            Edge::Right => (
                Point::new(end.x - c.pin_length - c.grid_size, end.y + span),
                0,
                'R',
            ),
            Edge::Left => (
                Point::new(end.x + c.pin_length + c.grid_size, end.y + span),
                0,
                'L',
            ),
        };
        GroupLabel {
            text: group.name.clone(),
            position,
            angle,
            size: c.pin_text_size,
            unit: 1,
            h_justify,
            v_justify: 'C',
        }
    }

    fn layout_flat(&self, device: &Device) -> Layout {
        let c = self.config;
        let units = c.units_enabled();
        let mut items = Vec::with_capacity(device.pin_count() + 2 * device.group_count());
        let mut cursor = Point::default();
        let mut separation = c.min_group_separation;
        let mut previous: Option<(&PinGroup, Point)> = None;

        for group in device.groups() {
            if let Some((prev, prev_start)) = previous {
                if c.draw_group_rectangles {
                    items.push(DrawItem::Rect(self.group_rectangle(prev, prev_start, cursor)));
                }
            }

            if units {
                cursor = Point::default();
            } else {
                let prev_txt = previous.map(|(g, _)| g.max_label_len()).unwrap_or(0) as i64;
                let needed = c.snap(
                    (c.pin_length + prev_txt * c.pin_text_size + 2 * c.grid_size) as f64,
                );
                separation = separation.max(needed);
                if cursor.x.abs() + c.min_group_separation > cursor.y.abs() {
                    cursor.y -= c.group_gap;
                } else {
                    cursor.x += separation;
                    separation = c.min_group_separation;
                    cursor.y = 0;
                }
            }

            items.push(DrawItem::Label(GroupLabel {
                text: group.name.clone(),
                position: Point::new(
                    cursor.x + c.pin_length,
                    c.snap(cursor.y as f64 + 1.5 * c.pin_pitch as f64),
                ),
                angle: 0,
                size: c.pin_text_size,
                unit: group.unit,
                h_justify: 'L',
                v_justify: 'B',
            }));

            let start = cursor;
            for pin in &group.pins {
                items.push(DrawItem::Pin(self.place_pin(pin, cursor, group.unit)));
                cursor.y -= c.pin_pitch;
            }
            previous = Some((group, start));
        }

        if let Some((prev, prev_start)) = previous {
            if c.draw_group_rectangles {
                items.push(DrawItem::Rect(self.group_rectangle(prev, prev_start, cursor)));
            }
        }

        Layout {
            items,
            extents: None,
            units: device.unit_count(),
            flat: true,
        }
    }

    /// Outline around a flat group: from one grid above its first pin's stub end
    /// to its last pin, wide enough for the longest label.
    fn group_rectangle(&self, group: &PinGroup, start: Point, end: Point) -> Rectangle {
        let c = self.config;
        let txt = group.max_label_len() as i64;
        Rectangle {
            start: Point::new(start.x + c.pin_length, start.y + c.grid_size),
            end: Point::new(
                c.snap((start.x + c.pin_length + txt * c.pin_text_size + c.grid_size) as f64),
                end.y,
            ),
            unit: group.unit,
            thickness: c.rectangle_thickness(),
        }
    }

    fn place_pin(&self, pin: &PinRecord, at: Point, unit: u32) -> PlacedPin {
        PlacedPin {
            label: pin.label(),
            id: pin.id.clone(),
            position: at,
            length: self.config.pin_length,
            orientation: pin.orientation,
            text_size: self.config.pin_text_size,
            unit,
            shape: pin.shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::classify::EdgeClassifier;

    fn device_from(config: &SymbolConfig, pins: &[(&str, &str, &str)]) -> Device {
        let mut device = Device::new("TEST", config.sanitize_length);
        for (id, function, group) in pins {
            device
                .add_pin(PinRecord::new(
                    *id,
                    *function,
                    *group,
                    PinShape::Bidirectional,
                    Orientation::Unset,
                    "",
                ))
                .unwrap();
        }
        device.seal(config.units_enabled());
        EdgeClassifier::new(config).unwrap().classify(&mut device);
        device
    }

    fn small_device(config: &SymbolConfig) -> Device {
        device_from(
            config,
            &[
                ("1", "IO1", "B1"),
                ("2", "IO2", "B1"),
                ("3", "VCC", "VCC"),
                ("4", "GND", "GND"),
            ],
        )
    }

    fn pin_at<'l>(layout: &'l Layout, id: &str) -> &'l PlacedPin {
        layout.pins().find(|p| p.id == id).expect("pin should be placed")
    }

    #[test]
    fn test_extents_two_passes() {
        let config = SymbolConfig::default();
        let device = small_device(&config);
        let engine = LayoutEngine::new(&config);

        let pass_one = engine.pin_extents(&device);
        assert_eq!(pass_one.top, 100);
        assert_eq!(pass_one.bottom, 100);
        assert_eq!(pass_one.left, 150);
        assert_eq!(pass_one.right, -100);

        let extents = engine.extents(&device);
        // Top wins the tie and grows by the left labels ("IO1") plus two stubs.
        assert_eq!(extents.size.top, 100 + 3 * 25 + 400);
        assert_eq!(extents.offset.top, 3 * 25 + 200);
        assert_eq!(extents.offset.bottom, 0);
        assert_eq!(extents.size.left, 150 + 400 + 150);
        assert_eq!(extents.offset.left, 150);
        assert_eq!(extents.offset.right, 0);
    }

    #[test]
    fn test_extents_with_labels_on_both_sides() {
        let config = SymbolConfig::default();
        let engine = LayoutEngine::new(&config);
        let mut pins = vec![
            ("1", "IO1", "B1"),
            ("2", "IO2", "B1"),
            ("3", "IO3", "B1"),
            ("4", "DQS10", "B2"),
            ("5", "DQS11", "B2"),
            ("6", "VCC", "VCC"),
            ("7", "GND", "GND"),
        ];

        let device = device_from(&config, &pins);
        assert_eq!(device.group("B1").and_then(|g| g.edge), Some(Edge::Left));
        assert_eq!(device.group("B2").and_then(|g| g.edge), Some(Edge::Right));
        let extents = engine.extents(&device);
        // Top grows by both label widths ("IO1" left, "DQS10" right) and two stubs.
        assert_eq!(extents.size.top, 100 + (3 + 5) * 25 + 400);
        assert_eq!(extents.offset.top, 3 * 25 + 200);
        assert_eq!(extents.size.bottom, 100);
        // Left is the taller side.
        assert_eq!(extents.size.left, 200 + 400 + 150);
        assert_eq!(extents.size.right, 150);
        assert_eq!(extents.offset.left, 150);
        assert_eq!(extents.offset.right, 0);

        // Two NC pins fixed on the right make it the taller side.
        pins.extend([("8", "NC", "NC"), ("9", "NC", "NC")]);
        let device = device_from(&config, &pins);
        assert_eq!(device.group("B2").and_then(|g| g.edge), Some(Edge::Right));
        let extents = engine.extents(&device);
        assert_eq!(extents.size.top, 100 + (3 + 5) * 25 + 400);
        assert_eq!(extents.size.left, 200);
        assert_eq!(extents.size.right, 400 + 400 + 150);
        assert_eq!(extents.offset.right, 150);
        assert_eq!(extents.offset.left, 0);
    }

    #[test]
    fn test_grouped_coordinates() {
        let config = SymbolConfig::default();
        let device = small_device(&config);
        let layout = LayoutEngine::new(&config).layout(&device).unwrap();

        assert_eq!(pin_at(&layout, "1").position, Point::new(-300, 50));
        assert_eq!(pin_at(&layout, "2").position, Point::new(-300, 0));
        assert_eq!(pin_at(&layout, "1").orientation, Orientation::Right);
        assert_eq!(pin_at(&layout, "3").position, Point::new(150, 350));
        assert_eq!(pin_at(&layout, "3").orientation, Orientation::Down);
        assert_eq!(pin_at(&layout, "4").position, Point::new(100, -350));
        assert_eq!(pin_at(&layout, "4").orientation, Orientation::Up);

        let labels: Vec<_> = layout.labels().collect();
        assert_eq!(labels.len(), 1, "only multi-pin groups get a label");
        assert_eq!(labels[0].text, "B1");
        assert_eq!(labels[0].position, Point::new(-50, 100));
        assert_eq!(labels[0].h_justify, 'L');

        let rects: Vec<_> = layout.rectangles().collect();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].start, Point::new(-100, 150));
        assert_eq!(rects[0].end, Point::new(100, -150));
        assert_eq!(rects[0].unit, 1);
    }

    #[test]
    fn test_pins_advance_one_pitch_per_pin() {
        let config = SymbolConfig::default();
        let pins: Vec<(String, String)> = (0..12).map(|i| (i.to_string(), format!("IO{}", i))).collect();
        let rows: Vec<(&str, &str, &str)> = pins
            .iter()
            .map(|(id, f)| (id.as_str(), f.as_str(), "B1"))
            .collect();
        let device = device_from(&config, &rows);
        let layout = LayoutEngine::new(&config).layout(&device).unwrap();

        let placed: Vec<_> = layout.pins().collect();
        let first = placed.first().unwrap().position;
        let last = placed.last().unwrap().position;
        assert_eq!(first.x, last.x);
        assert_eq!(first.y - last.y, 11 * config.pin_pitch);
    }

    #[test]
    fn test_every_coordinate_is_on_grid() {
        let config = SymbolConfig::default();
        let device = device_from(
            &config,
            &[
                ("1", "DIFFIO_L1p", "B1"),
                ("2", "DIFFIO_L1n", "B1"),
                ("3", "IO", "B2"),
                ("4", "VCCINT", "VCC"),
                ("5", "VCCIO1", "VCC"),
                ("6", "GND", "GND"),
                ("7", "NC", "NC"),
                ("8", "NC", "NC"),
                ("9", "CONF_DONE", "B3"),
                ("10", "nCONFIG", "B3"),
                ("11", "TDI", "B4"),
            ],
        );
        let layout = LayoutEngine::new(&config).layout(&device).unwrap();
        for coord in layout.coordinates() {
            assert_eq!(coord % config.grid_size, 0, "coordinate {} is off grid", coord);
        }
    }

    #[test]
    fn test_flat_layout_with_units_restarts_at_origin() {
        let config = SymbolConfig {
            flat_layout: true,
            ..Default::default()
        };
        let device = device_from(
            &config,
            &[("1", "IO1", "B1"), ("2", "IO2", "B1"), ("3", "IO3", "B2")],
        );
        let layout = LayoutEngine::new(&config).layout(&device).unwrap();
        assert!(layout.flat);
        assert!(layout.extents.is_none());
        assert_eq!(layout.units, 2);

        assert_eq!(pin_at(&layout, "1").position, Point::new(0, 0));
        assert_eq!(pin_at(&layout, "2").position, Point::new(0, -50));
        assert_eq!(pin_at(&layout, "3").position, Point::new(0, 0));
        assert_eq!(pin_at(&layout, "3").unit, 2);
        assert!(layout.pins().all(|p| p.orientation == Orientation::Right));

        let labels: Vec<_> = layout.labels().collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].position, Point::new(200, 100));
        assert_eq!(labels[1].unit, 2);

        let rects: Vec<_> = layout.rectangles().collect();
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].start, Point::new(200, 50));
        assert_eq!(rects[0].end, Point::new(300, -100));
        assert_eq!(rects[1].unit, 2);
    }

    #[test]
    fn test_flat_layout_without_units_stacks_groups() {
        let config = SymbolConfig {
            flat_layout: true,
            tag_units_per_group: false,
            draw_group_rectangles: false,
            ..Default::default()
        };
        let device = device_from(
            &config,
            &[("1", "IO1", "B1"), ("2", "IO2", "B1"), ("3", "IO3", "B2")],
        );
        let layout = LayoutEngine::new(&config).layout(&device).unwrap();
        assert_eq!(layout.units, 1);
        assert_eq!(layout.rectangles().count(), 0);
        assert_eq!(pin_at(&layout, "1").position, Point::new(0, -150));
        assert_eq!(pin_at(&layout, "2").position, Point::new(0, -200));
        assert_eq!(pin_at(&layout, "3").position, Point::new(0, -400));
    }

    #[test]
    fn test_flat_layout_starts_new_column() {
        let config = SymbolConfig {
            flat_layout: true,
            tag_units_per_group: false,
            draw_group_rectangles: false,
            ..Default::default()
        };
        // One 12-pin group pushes the cursor below -500, so the next group moves right.
        let pins: Vec<(String, String)> = (0..12).map(|i| (i.to_string(), format!("IO{}", i))).collect();
        let mut rows: Vec<(&str, &str, &str)> = pins
            .iter()
            .map(|(id, f)| (id.as_str(), f.as_str(), "B1"))
            .collect();
        rows.push(("X", "IO", "B2"));
        let device = device_from(&config, &rows);
        let layout = LayoutEngine::new(&config).layout(&device).unwrap();
        assert_eq!(pin_at(&layout, "X").position, Point::new(500, 0));
    }

    #[test]
    fn test_empty_device_is_an_error() {
        let config = SymbolConfig::default();
        let device = Device::new("EMPTY", 5);
        let result = LayoutEngine::new(&config).layout(&device);
        assert!(matches!(result, Err(LayoutError::EmptyDevice(name)) if name == "EMPTY"));
    }

    #[test]
    fn test_unclassified_device_is_an_error() {
        let config = SymbolConfig::default();
        let mut device = Device::new("RAW", 5);
        device
            .add_pin(PinRecord::new("1", "IO", "B1", PinShape::Bidirectional, Orientation::Unset, ""))
            .unwrap();
        let result = LayoutEngine::new(&config).layout(&device);
        assert!(matches!(result, Err(LayoutError::Unclassified { .. })));
    }
}
