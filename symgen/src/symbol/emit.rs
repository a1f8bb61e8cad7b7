//! Serialization of a laid-out device into a legacy library `DEF` block.

use std::borrow::Cow;
use std::fmt;

use crate::config::SymbolConfig;
use crate::symbol::layout::{DrawItem, GroupLabel, Layout, PlacedPin, Point, Rectangle};

/// Field origin of grouped symbols (centered above the body).
const GROUPED_FIELD_ORIGIN: Point = Point { x: 0, y: 100 };
/// Field origin of flat symbols (left-aligned above the first group).
const FLAT_FIELD_ORIGIN: Point = Point { x: 0, y: 400 };
const FIELD_TEXT_SIZE: i64 = 60;
const FIELD_LINE_SPACING: i64 = 100;

/// Pin names and numbers are space-delimited fields; empty ones are written as `~`.
fn token(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        Cow::Borrowed("~")
    } else if text.contains(char::is_whitespace) {
        Cow::Owned(text.split_whitespace().collect::<Vec<_>>().join("_"))
    } else {
        Cow::Borrowed(text)
    }
}

impl fmt::Display for PlacedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Orientation is always set once the classifier ran.
        let orientation = self.orientation.code().unwrap_or('R');
        write!(
            f,
            "X {} {} {} {} {} {} {} {} {} 1 {}",
            token(&self.label),
            token(&self.id),
            self.position.x,
            self.position.y,
            self.length,
            orientation,
            self.text_size,
            self.text_size,
            self.unit,
            self.shape.code()
        )
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T {} {} {} {} 0 {} 0 {} Normal 0 {} {}",
            self.angle,
            self.position.x,
            self.position.y,
            self.size,
            self.unit,
            token(&self.text),
            self.h_justify,
            self.v_justify
        )
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S {} {} {} {} {} 1 {} N",
            self.start.x, self.start.y, self.end.x, self.end.y, self.unit, self.thickness
        )
    }
}

impl fmt::Display for DrawItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawItem::Pin(pin) => pin.fmt(f),
            DrawItem::Label(label) => label.fmt(f),
            DrawItem::Rect(rect) => rect.fmt(f),
        }
    }
}

/// Library symbol name: `<family>_<part>`, or the bare part name.
pub fn symbol_name(family: Option<&str>, part: &str) -> String {
    match family {
        Some(family) if !family.is_empty() => format!("{}_{}", family, part),
        _ => part.to_string(),
    }
}

pub struct SymbolEmitter<'a> {
    config: &'a SymbolConfig,
}

impl<'a> SymbolEmitter<'a> {
    pub fn new(config: &'a SymbolConfig) -> Self {
        Self { config }
    }

    /// Render one complete `DEF`..`ENDDEF` block, comment banner included.
    pub fn emit(&self, name: &str, part: &str, layout: &Layout) -> String {
        let reference = &self.config.reference;
        let (origin, align) = if layout.flat {
            (FLAT_FIELD_ORIGIN, 'L')
        } else {
            (GROUPED_FIELD_ORIGIN, 'C')
        };

        let mut out = String::new();
        out.push_str(&format!("#\n# {}\n#\n", name));
        out.push_str(&format!(
            "DEF {} {} 0 40 Y Y {} L N\n",
            name, reference, layout.units
        ));

        let fields = [
            (format!("\"{}\"", reference), "CNN"),
            (format!("\"{}\"", name), "CNN"),
            (format!("\"{}\"", part), "CIN"),
            ("\"~\"".to_string(), "CNN"),
        ];
        for (index, (value, style)) in fields.iter().enumerate() {
            out.push_str(&format!(
                "F{} {} {} {} {} H V {} {}\n",
                index,
                value,
                origin.x,
                origin.y - index as i64 * FIELD_LINE_SPACING,
                FIELD_TEXT_SIZE,
                align,
                style
            ));
        }

        if !self.config.footprint_filters.is_empty() {
            out.push_str("$FPLIST\n");
            for filter in &self.config.footprint_filters {
                out.push_str(&format!(" {}\n", filter));
            }
            out.push_str("$ENDFPLIST\n");
        }

        out.push_str("DRAW\n");
        for item in &layout.items {
            out.push_str(&item.to_string());
            out.push('\n');
        }
        out.push_str("ENDDRAW\nENDDEF\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::pin::{Orientation, PinShape};

    fn single_pin_layout(flat: bool) -> Layout {
        Layout {
            items: vec![
                DrawItem::Pin(PlacedPin {
                    label: "IO1".to_string(),
                    id: "1".to_string(),
                    position: Point::new(-300, 50),
                    length: 200,
                    orientation: Orientation::Right,
                    text_size: 25,
                    unit: 1,
                    shape: PinShape::Bidirectional,
                }),
                DrawItem::Rect(Rectangle {
                    start: Point::new(-100, 150),
                    end: Point::new(100, -150),
                    unit: 1,
                    thickness: 5,
                }),
            ],
            extents: None,
            units: 1,
            flat,
        }
    }

    #[test]
    fn test_pin_line() {
        let pin = PlacedPin {
            label: "CLK0,A1".to_string(),
            id: "A7".to_string(),
            position: Point::new(150, 350),
            length: 200,
            orientation: Orientation::Down,
            text_size: 25,
            unit: 3,
            shape: PinShape::Clock,
        };
        assert_eq!(pin.to_string(), "X CLK0,A1 A7 150 350 200 D 25 25 3 1 C C");
    }

    #[test]
    fn test_whitespace_in_fields_is_replaced() {
        assert_eq!(token("DQS for X8"), "DQS_for_X8");
        assert_eq!(token(""), "~");
        assert_eq!(token("IO"), "IO");
    }

    #[test]
    fn test_label_line() {
        let label = GroupLabel {
            text: "B1".to_string(),
            position: Point::new(-50, 100),
            angle: 0,
            size: 25,
            unit: 1,
            h_justify: 'L',
            v_justify: 'C',
        };
        assert_eq!(label.to_string(), "T 0 -50 100 25 0 1 0 B1 Normal 0 L C");
    }

    #[test]
    fn test_grouped_block() {
        let config = SymbolConfig::default();
        let block = SymbolEmitter::new(&config).emit("EP4CE6_EP4CE6E22", "EP4CE6E22", &single_pin_layout(false));
        let expected = "#\n# EP4CE6_EP4CE6E22\n#\n\
            DEF EP4CE6_EP4CE6E22 U 0 40 Y Y 1 L N\n\
            F0 \"U\" 0 100 60 H V C CNN\n\
            F1 \"EP4CE6_EP4CE6E22\" 0 0 60 H V C CNN\n\
            F2 \"EP4CE6E22\" 0 -100 60 H V C CIN\n\
            F3 \"~\" 0 -200 60 H V C CNN\n\
            $FPLIST\n *BGA*\n$ENDFPLIST\n\
            DRAW\n\
            X IO1 1 -300 50 200 R 25 25 1 1 B\n\
            S -100 150 100 -150 1 1 5 N\n\
            ENDDRAW\nENDDEF\n";
        assert_eq!(block, expected);
    }

    #[test]
    fn test_flat_block_fields_are_left_aligned() {
        let config = SymbolConfig {
            footprint_filters: Vec::new(),
            reference: "IC".to_string(),
            ..Default::default()
        };
        let block = SymbolEmitter::new(&config).emit("PART", "PART", &single_pin_layout(true));
        assert!(block.contains("DEF PART IC 0 40 Y Y 1 L N\n"));
        assert!(block.contains("F0 \"IC\" 0 400 60 H V L CNN\n"));
        assert!(block.contains("F3 \"~\" 0 100 60 H V L CNN\n"));
        assert!(!block.contains("$FPLIST"));
    }

    #[test]
    fn test_symbol_name() {
        assert_eq!(symbol_name(Some("EP4CE6"), "EP4CE6E22"), "EP4CE6_EP4CE6E22");
        assert_eq!(symbol_name(None, "EP4CE6E22"), "EP4CE6E22");
        assert_eq!(symbol_name(Some(""), "X"), "X");
    }
}
