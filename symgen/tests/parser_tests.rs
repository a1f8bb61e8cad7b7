//! Tests for pin-out file parsing

use symgen::{PinoutParseError, PinoutParser};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_parse_fixture_devices() {
    let pinout = PinoutParser::parse_file(&fixture_path("EP4CE6.txt"), &[10]).expect("Should parse");

    assert_eq!(pinout.family.as_deref(), Some("EP4CE6"));
    let names: Vec<_> = pinout.devices.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["EP4CE6E22", "EP4CE6F17"]);
    assert_eq!(pinout.devices[0].rows.len(), 18);
    assert_eq!(pinout.devices[1].rows.len(), 5);
}

#[test]
fn test_parse_row_columns() {
    let pinout = PinoutParser::parse_file(&fixture_path("EP4CE6.txt"), &[10]).expect("Should parse");
    let first = &pinout.devices[0].rows[0];

    assert_eq!(first.group, "B1");
    assert_eq!(first.function, "IO");
    assert_eq!(first.id, "1");
    assert_eq!(first.extra_text, ",DQ1L");
    assert_eq!(first.line, 5);

    let power = pinout.devices[0]
        .rows
        .iter()
        .find(|r| r.id == "13")
        .expect("Should find GND pin");
    assert_eq!(power.group, "");
    assert_eq!(power.function, "GND");
}

#[test]
fn test_parse_multiple_extra_columns() {
    let pinout = PinoutParser::parse_file(&fixture_path("EP4CE6.txt"), &[3, 10]).expect("Should parse");
    let first = &pinout.devices[0].rows[0];
    assert_eq!(first.extra_text, ",DIFFIO_L1n,DQ1L");
}

#[test]
fn test_parse_malformed_row() {
    let result = PinoutParser::parse_file(&fixture_path("malformed.txt"), &[]);
    match result {
        Err(PinoutParseError::MissingColumn { line, .. }) => assert_eq!(line, 2),
        other => panic!("Expected a missing column error, got {:?}", other),
    }
}

#[test]
fn test_parse_invalid_file() {
    let result = PinoutParser::parse_file(&PathBuf::from("not_a_real_file.txt"), &[]);
    assert!(matches!(result, Err(PinoutParseError::Io(_))), "Should fail on nonexistent file");
}
