//! Conversion driver shared by the CLI and the library API.
//! Reads a pin-out, builds one symbol per device and writes the library.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{ConfigError, SymbolConfig};
use crate::diagnostics::Diagnostic;
use crate::library::LibraryBlob;
use crate::parser::pinout::{DeviceTable, PinRow, PinoutParseError, PinoutParser};
use crate::symbol::classify::EdgeClassifier;
use crate::symbol::device::{unit_letter, Device, DeviceError};
use crate::symbol::emit::{symbol_name, SymbolEmitter};
use crate::symbol::layout::{LayoutEngine, LayoutError};
use crate::symbol::patterns::PatternBook;
use crate::symbol::pin::{Edge, PinRecord};

#[derive(Debug, thiserror::Error)]
pub enum SymgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] PinoutParseError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Device {device}: {source}")]
    Device {
        device: String,
        #[source]
        source: DeviceError,
    },
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// One rendered `DEF` block.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBlock {
    pub name: String,
    pub part: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub size: usize,
    pub edge: Option<Edge>,
    pub unit: u32,
    pub unit_letter: char,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceSummary {
    pub part: String,
    pub symbol: String,
    pub pins: usize,
    pub units: u32,
    pub groups: Vec<GroupSummary>,
}

impl DeviceSummary {
    fn from_device(device: &Device, symbol: &str) -> Self {
        Self {
            part: device.name.clone(),
            symbol: symbol.to_string(),
            pins: device.pin_count(),
            units: device.unit_count(),
            groups: device
                .groups()
                .iter()
                .map(|g| GroupSummary {
                    name: g.name.clone(),
                    size: g.size(),
                    edge: g.edge,
                    unit: g.unit,
                    unit_letter: unit_letter(g.unit),
                })
                .collect(),
        }
    }
}

/// Output of [`SymbolBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuiltSymbol {
    pub block: SymbolBlock,
    pub summary: DeviceSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// In-memory result of converting a whole pin-out.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub family: Option<String>,
    pub symbols: Vec<SymbolBlock>,
    pub devices: Vec<DeviceSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of [`SymgenCore::convert_file`].
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Whether the blocks were spliced into an existing library.
    pub merged: bool,
    /// Backup written by this run, if any.
    pub backup: Option<PathBuf>,
    pub family: Option<String>,
    pub devices: Vec<DeviceSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionResult {
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == crate::diagnostics::Severity::Warning)
            .count()
    }
}

/// Turns the pin records of one device into a symbol block.
pub struct SymbolBuilder<'a> {
    config: &'a SymbolConfig,
    patterns: PatternBook,
}

impl<'a> SymbolBuilder<'a> {
    pub fn new(config: &'a SymbolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            patterns: PatternBook::from_config(config)?,
        })
    }

    /// Pin record for a parsed row, with its glyph chosen from the function name.
    pub fn pin(&self, row: &PinRow) -> PinRecord {
        let (shape, orientation) = self.patterns.pin_shape(&row.function);
        PinRecord::new(
            row.id.clone(),
            row.function.clone(),
            row.group.clone(),
            shape,
            orientation,
            row.extra_text.clone(),
        )
    }

    /// Resolve groups, classify, lay out and emit one device.
    pub fn build(
        &self,
        family: Option<&str>,
        part: &str,
        pins: impl IntoIterator<Item = PinRecord>,
    ) -> Result<BuiltSymbol, SymgenError> {
        let mut device = Device::new(part, self.config.sanitize_length);
        for pin in pins {
            device.add_pin(pin).map_err(|source| SymgenError::Device {
                device: part.to_string(),
                source,
            })?;
        }
        if device.is_empty() {
            return Err(LayoutError::EmptyDevice(part.to_string()).into());
        }

        let diagnostics = device.seal(self.config.units_enabled());
        EdgeClassifier::with_patterns(self.config, self.patterns.clone()).classify(&mut device);
        let layout = LayoutEngine::new(self.config).layout(&device)?;

        let name = symbol_name(family, part);
        let text = SymbolEmitter::new(self.config).emit(&name, part, &layout);
        tracing::debug!(
            "{}: {} pins in {} groups, {} unit(s)",
            name,
            device.pin_count(),
            device.group_count(),
            layout.units
        );

        Ok(BuiltSymbol {
            summary: DeviceSummary::from_device(&device, &name),
            block: SymbolBlock {
                name,
                part: part.to_string(),
                text,
            },
            diagnostics,
        })
    }

    fn build_table(&self, family: Option<&str>, table: &DeviceTable) -> Result<BuiltSymbol, SymgenError> {
        self.build(family, &table.name, table.rows.iter().map(|row| self.pin(row)))
    }
}

/// Conversion API used by the CLI.
pub struct SymgenCore;

impl SymgenCore {
    /// Convert pin-out text into symbol blocks. Any error aborts the whole
    /// conversion.
    pub fn convert_str(content: &str, config: &SymbolConfig) -> Result<Conversion, SymgenError> {
        let builder = SymbolBuilder::new(config)?;
        let pinout = PinoutParser::parse(content, &config.extra_label_columns)?;
        let family = pinout.family.as_deref();

        let mut conversion = Conversion {
            family: pinout.family.clone(),
            symbols: Vec::with_capacity(pinout.devices.len()),
            devices: Vec::with_capacity(pinout.devices.len()),
            diagnostics: Vec::new(),
        };
        for table in &pinout.devices {
            let built = builder.build_table(family, table)?;
            conversion.symbols.push(built.block);
            conversion.devices.push(built.summary);
            conversion.diagnostics.extend(built.diagnostics);
        }

        tracing::info!(
            "Imported {} with {} device(s)",
            family.unwrap_or("<unnamed family>"),
            conversion.symbols.len()
        );
        Ok(conversion)
    }

    /// Splice blocks into library text. `None` or blank text starts a new library.
    pub fn merge_library(existing: Option<&str>, blocks: &[SymbolBlock]) -> String {
        let mut library = match existing {
            Some(text) => LibraryBlob::from_existing(text),
            None => LibraryBlob::new(),
        };
        tracing::debug!(
            "Inserting {} block(s) into {} library",
            blocks.len(),
            if library.is_fresh() { "a new" } else { "an existing" }
        );
        for block in blocks {
            library.insert(&block.text);
        }
        library.into_string()
    }

    /// Convert a pin-out file and write the library.
    ///
    /// Without an explicit output the library goes next to the input with a
    /// `.lib` extension and is always written fresh. An explicit output that
    /// already exists is merged into, after a one-time `<stem>_old.lib`
    /// backup. Nothing is written if any device fails.
    pub fn convert_file(
        input: &Path,
        output: Option<&Path>,
        config: &SymbolConfig,
    ) -> Result<ConversionResult, SymgenError> {
        let content = std::fs::read_to_string(input)?;
        let conversion = Self::convert_str(&content, config)?;

        let (output, overwrite) = match output {
            Some(path) => (path.to_path_buf(), false),
            None => (input.with_extension("lib"), true),
        };

        let mut backup = None;
        let existing = if !overwrite && output.is_file() {
            let text = std::fs::read_to_string(&output)?;
            let backup_path = backup_path(&output);
            if !backup_path.exists() {
                std::fs::write(&backup_path, &text)?;
                tracing::info!("Backed up {} to {}", output.display(), backup_path.display());
                backup = Some(backup_path);
            }
            Some(text)
        } else {
            None
        };

        let merged = existing.as_deref().is_some_and(|t| !t.trim().is_empty());
        let library = Self::merge_library(existing.as_deref(), &conversion.symbols);
        write_atomic(&output, &library)?;
        tracing::info!(
            "Wrote {} symbol(s) to {}",
            conversion.symbols.len(),
            output.display()
        );

        Ok(ConversionResult {
            input: input.to_path_buf(),
            output,
            merged,
            backup,
            family: conversion.family,
            devices: conversion.devices,
            diagnostics: conversion.diagnostics,
        })
    }

    /// Parse and resolve groups without writing anything.
    pub fn inspect_file(path: &Path, config: &SymbolConfig) -> Result<Conversion, SymgenError> {
        let content = std::fs::read_to_string(path)?;
        Self::convert_str(&content, config)
    }
}

/// `<stem>_old.lib` next to the library.
pub fn backup_path(library: &Path) -> PathBuf {
    let stem = library
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    library.with_file_name(format!("{}_old.lib", stem))
}

/// Write through a sibling temp file renamed over `path`. An existing
/// library keeps its permissions; a new one gets what `File::create` gives.
fn write_atomic(path: &Path, content: &str) -> Result<(), SymgenError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = std::fs::metadata(path).ok().map(|m| m.permissions());
    let mut file = library_tempfile(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    if let Some(permissions) = existing {
        file.as_file().set_permissions(permissions)?;
    }
    file.persist(path).map_err(|e| SymgenError::Io(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn library_tempfile(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    // 0o666 before the umask, same as a plain create.
    tempfile::Builder::new()
        .prefix(".symgen")
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn library_tempfile(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::Builder::new().prefix(".symgen").tempfile_in(dir)
}
