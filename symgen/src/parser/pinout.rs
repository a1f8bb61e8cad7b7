//! Vendor pin-out table reader.
//!
//! The input is the tab-delimited text export of an FPGA pin-out sheet:
//!
//! ```text
//! "Pin Information for the Cyclone IV EP4CE6 Device Version 1.4"
//! Bank Number<TAB>VREF Group<TAB>Pin Name/Function<TAB>...<TAB>EP4CE6E22
//! B1<TAB>VREFB1N0<TAB>IO<TAB>...<TAB>"1"<TAB>...
//! ...
//! Notes:
//! ```
//!
//! A `Bank Number` line opens a device section named by its 8th field. Rows
//! up to the next blank or `Note` line are pins of that device.

use std::path::Path;

const FAMILY_MARKER: &str = "\"Pin Information";
const SECTION_MARKER: &str = "Bank Number";
const NOTE_MARKER: &str = "Note";

const FAMILY_TOKEN: usize = 6;
const NAME_FIELD: usize = 7;
const GROUP_COLUMN: usize = 0;
const FUNCTION_COLUMN: usize = 2;
const ID_COLUMN: usize = 7;

/// Error type for pin-out parsing
#[derive(Debug, thiserror::Error)]
pub enum PinoutParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: expected at least {expected} tab-separated columns, found {found}")]
    MissingColumn {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: section header has no part name")]
    MissingPartName { line: usize },
    #[error("No device sections found (expected a line starting with \"Bank Number\")")]
    NoDevices,
}

/// One pin row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRow {
    /// 1-based source line.
    pub line: usize,
    pub group: String,
    pub function: String,
    pub id: String,
    /// Extra columns, each as `,<value>`.
    pub extra_text: String,
}

/// Rows of one device section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTable {
    pub name: String,
    pub line: usize,
    pub rows: Vec<PinRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pinout {
    pub family: Option<String>,
    pub devices: Vec<DeviceTable>,
}

/// Parser for tab-delimited pin-out exports
pub struct PinoutParser;

impl PinoutParser {
    pub fn parse_file(path: &Path, extra_columns: &[usize]) -> Result<Pinout, PinoutParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, extra_columns)
    }

    pub fn parse(content: &str, extra_columns: &[usize]) -> Result<Pinout, PinoutParseError> {
        let mut pinout = Pinout::default();
        let mut in_section = false;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end_matches(['\r', '\n']);

            if line.starts_with(FAMILY_MARKER) {
                if let Some(token) = line.split_whitespace().nth(FAMILY_TOKEN) {
                    pinout.family = Some(unquote(token).to_string());
                }
                continue;
            }

            if line.starts_with(SECTION_MARKER) {
                let name = line
                    .split('\t')
                    .nth(NAME_FIELD)
                    .map(unquote)
                    .filter(|name| !name.is_empty())
                    .ok_or(PinoutParseError::MissingPartName { line: line_no })?;
                tracing::debug!("Line {}: device section {}", line_no, name);
                pinout.devices.push(DeviceTable {
                    name: name.to_string(),
                    line: line_no,
                    rows: Vec::new(),
                });
                in_section = true;
                continue;
            }

            if line.starts_with(NOTE_MARKER) || line.trim().is_empty() {
                in_section = false;
                continue;
            }

            if !in_section {
                continue;
            }

            let row = Self::parse_row(line, line_no, extra_columns)?;
            if let Some(device) = pinout.devices.last_mut() {
                device.rows.push(row);
            }
        }

        if pinout.devices.is_empty() {
            return Err(PinoutParseError::NoDevices);
        }
        Ok(pinout)
    }

    fn parse_row(line: &str, line_no: usize, extra_columns: &[usize]) -> Result<PinRow, PinoutParseError> {
        let columns: Vec<&str> = line.split('\t').collect();
        let required = extra_columns
            .iter()
            .copied()
            .chain([GROUP_COLUMN, FUNCTION_COLUMN, ID_COLUMN])
            .max()
            .unwrap_or(ID_COLUMN);
        if columns.len() <= required {
            return Err(PinoutParseError::MissingColumn {
                line: line_no,
                expected: required + 1,
                found: columns.len(),
            });
        }

        let extra_text = extra_columns
            .iter()
            .map(|&col| columns[col])
            .filter(|value| !value.is_empty())
            .map(|value| format!(",{}", value))
            .collect::<String>();

        Ok(PinRow {
            line: line_no,
            group: columns[GROUP_COLUMN].trim().to_string(),
            function: unquote(columns[FUNCTION_COLUMN]).to_string(),
            id: unquote(columns[ID_COLUMN]).to_string(),
            extra_text,
        })
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(group: &str, function: &str, id: &str, col10: &str) -> String {
        format!(
            "{}\tVREF\t{}\t\t\t\t\t\"{}\"\t\t\t{}\n",
            group, function, id, col10
        )
    }

    #[test]
    fn test_family_and_sections() {
        let mut text = String::from("\"Pin Information for the Cyclone IV EP4CE6 Device Version 1.4\"\n");
        text.push_str("Bank Number\tVREF Group\tPin Name/Function\t\t\t\t\tEP4CE6E22\t\t\t\n");
        text.push_str(&row("B1", "IO", "1", ""));
        text.push_str(&row("B1", "\"IO\"", "2", "DIFFIO_L1n"));
        text.push('\n');
        text.push_str("Bank Number\tVREF Group\tPin Name/Function\t\t\t\t\tEP4CE6F17\t\t\t\n");
        text.push_str(&row("", "GND", "A1", ""));
        text.push_str("Notes:\n");

        let pinout = PinoutParser::parse(&text, &[10]).unwrap();
        assert_eq!(pinout.family.as_deref(), Some("EP4CE6"));
        assert_eq!(pinout.devices.len(), 2);

        let first = &pinout.devices[0];
        assert_eq!(first.name, "EP4CE6E22");
        assert_eq!(first.line, 2);
        assert_eq!(first.rows.len(), 2);
        assert_eq!(first.rows[0].id, "1");
        assert_eq!(first.rows[0].extra_text, "");
        assert_eq!(first.rows[1].function, "IO");
        assert_eq!(first.rows[1].extra_text, ",DIFFIO_L1n");

        let second = &pinout.devices[1];
        assert_eq!(second.rows[0].group, "");
        assert_eq!(second.rows[0].function, "GND");
        assert_eq!(second.rows[0].line, 7);
    }

    #[test]
    fn test_rows_outside_sections_are_ignored() {
        let mut text = String::from("Bank Number\t\t\t\t\t\t\tPART\n");
        text.push_str(&row("B1", "IO", "1", ""));
        text.push_str("Note: something\n");
        text.push_str(&row("B1", "IO", "2", ""));
        let pinout = PinoutParser::parse(&text, &[]).unwrap();
        assert_eq!(pinout.family, None);
        assert_eq!(pinout.devices[0].rows.len(), 1);
    }

    #[test]
    fn test_crlf_input() {
        let text = "Bank Number\t\t\t\t\t\t\tPART\r\nB1\t\tIO\t\t\t\t\t\"9\"\r\n\r\n";
        let pinout = PinoutParser::parse(text, &[]).unwrap();
        assert_eq!(pinout.devices[0].name, "PART");
        assert_eq!(pinout.devices[0].rows[0].id, "9");
    }

    #[test]
    fn test_short_row_reports_line() {
        let text = "Bank Number\t\t\t\t\t\t\tPART\nB1\tVREF\tIO\n";
        let err = PinoutParser::parse(text, &[]).unwrap_err();
        assert!(matches!(
            err,
            PinoutParseError::MissingColumn { line: 2, expected: 8, found: 3 }
        ));
    }

    #[test]
    fn test_extra_column_beyond_row_is_an_error() {
        let text = "Bank Number\t\t\t\t\t\t\tPART\nB1\t\tIO\t\t\t\t\t1\n";
        let err = PinoutParser::parse(text, &[10]).unwrap_err();
        assert!(matches!(err, PinoutParseError::MissingColumn { expected: 11, .. }));
    }

    #[test]
    fn test_missing_part_name() {
        let text = "Bank Number\tVREF Group\n";
        let err = PinoutParser::parse(text, &[]).unwrap_err();
        assert!(matches!(err, PinoutParseError::MissingPartName { line: 1 }));
    }

    #[test]
    fn test_no_sections() {
        let err = PinoutParser::parse("just some text\n", &[]).unwrap_err();
        assert!(matches!(err, PinoutParseError::NoDevices));
    }
}
