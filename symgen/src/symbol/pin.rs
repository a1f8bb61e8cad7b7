//! Pin records and the enums that describe how a pin is drawn.

use serde::Serialize;

/// Electrical glyph drawn for a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinShape {
    Input,
    Output,
    Bidirectional,
    Power,
    Clock,
    NoConnect,
}

impl PinShape {
    /// Electrical type (and optional graphic shape) as written at the end of an `X` line.
    pub fn code(self) -> &'static str {
        match self {
            PinShape::Input => "I",
            PinShape::Output => "O",
            PinShape::Bidirectional => "B",
            PinShape::Power => "W",
            PinShape::Clock => "C C",
            PinShape::NoConnect => "N",
        }
    }
}

/// Direction a pin points, from its connection point towards the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Up,
    Down,
    Left,
    Right,
    Unset,
}

impl Orientation {
    pub fn code(self) -> Option<char> {
        match self {
            Orientation::Up => Some('U'),
            Orientation::Down => Some('D'),
            Orientation::Left => Some('L'),
            Orientation::Right => Some('R'),
            Orientation::Unset => None,
        }
    }
}

/// Side of the symbol body a group is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Pins on the bottom edge point up into the body, and so on.
    pub fn orientation(self) -> Orientation {
        match self {
            Edge::Top => Orientation::Down,
            Edge::Bottom => Orientation::Up,
            Edge::Left => Orientation::Right,
            Edge::Right => Orientation::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        };
        f.write_str(name)
    }
}

/// One physical pin of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct PinRecord {
    pub id: String,
    pub function: String,
    pub raw_group: String,
    pub shape: PinShape,
    pub orientation: Orientation,
    pub extra_text: String,
    pub canonical_group: String,
}

impl PinRecord {
    pub fn new(
        id: impl Into<String>,
        function: impl Into<String>,
        raw_group: impl Into<String>,
        shape: PinShape,
        orientation: Orientation,
        extra_text: impl Into<String>,
    ) -> Self {
        let raw_group = raw_group.into();
        Self {
            id: id.into(),
            function: function.into(),
            canonical_group: raw_group.clone(),
            raw_group,
            shape,
            orientation,
            extra_text: extra_text.into(),
        }
    }

    /// Text drawn next to the pin.
    pub fn label(&self) -> String {
        format!("{}{}", self.function, self.extra_text)
    }

    /// Label length in characters, used for text extent calculations.
    pub fn label_len(&self) -> usize {
        self.function.chars().count() + self.extra_text.chars().count()
    }
}
