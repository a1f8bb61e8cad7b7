//! symgen - schematic symbol generator for FPGA pin-out tables
//!
//! This library turns the tab-delimited pin-out exports published by FPGA
//! vendors into KiCad legacy (`EESchema-LIBRARY Version 2.3`) symbols. Pins
//! are folded into groups, groups are assigned to the edges of the symbol
//! body, and every pin, label and outline is placed on the drawing grid.
//!
//! # Quick Start
//!
//! ```no_run
//! use symgen::{SymbolConfig, SymgenCore};
//! use std::path::Path;
//!
//! let config = SymbolConfig::default();
//! let result = SymgenCore::convert_file(
//!     Path::new("EP4CE6.txt"),
//!     None,
//!     &config,
//! ).unwrap();
//!
//! for device in &result.devices {
//!     println!("{}: {} pins", device.symbol, device.pins);
//! }
//! ```
//!
//! # Features
//!
//! - **Group resolution**: similar bank names merge into wildcard groups
//! - **Edge classification**: power on top and bottom, the rest balanced left and right
//! - **Flat layout**: one unit per group for very large parts
//! - **Library merge**: new symbols are spliced into existing libraries untouched

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod library;
pub mod parser;
pub mod symbol;

// Re-export main types
pub use crate::core::{
    backup_path, BuiltSymbol, Conversion, ConversionResult, DeviceSummary, GroupSummary,
    SymbolBlock, SymbolBuilder, SymgenCore, SymgenError,
};
pub use config::{ConfigError, SymbolConfig, MAX_UNITS};
pub use diagnostics::{Diagnostic, Severity};
pub use library::LibraryBlob;
pub use parser::{Pinout, PinoutParseError, PinoutParser};
pub use symbol::{Device, Edge, LayoutEngine, Orientation, PinRecord, PinShape, SymbolEmitter};

/// Convert a pin-out file (convenience wrapper).
pub fn convert_file(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<ConversionResult, SymgenError> {
    SymgenCore::convert_file(input, output, &SymbolConfig::default())
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ConversionResult, Diagnostic, Severity, SymbolConfig, SymgenCore, SymgenError,
    };
}
