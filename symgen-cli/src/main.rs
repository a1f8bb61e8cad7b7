//! symgen CLI - convert FPGA pin-out tables into KiCad symbol libraries.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use symgen::{Conversion, ConversionResult, DeviceSummary, Severity, SymbolConfig, SymgenCore};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "symgen-cli")]
#[command(about = "Pin-out table to KiCad symbol library converter", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a pin-out file into a symbol library
    Convert {
        /// Tab-delimited pin-out export
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Library to write or merge into (default: INPUT with .lib extension, always rewritten)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Show the resolved pin groups of every device without writing anything
    Groups {
        /// Tab-delimited pin-out export
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Input columns appended to pin labels, 0-based (e.g. 8,10)
    #[arg(short = 'a', long = "add-columns", value_delimiter = ',', value_name = "COLS")]
    add_columns: Option<Vec<usize>>,

    /// Merge groups whose names share this many leading characters
    #[arg(short = 's', long = "sanitize", value_name = "N")]
    sanitize: Option<usize>,

    /// Spread the groups over a plane instead of one four-sided body
    #[arg(long)]
    flat: bool,

    /// Do not draw rectangles around groups (flat layout)
    #[arg(long)]
    no_rectangles: bool,

    /// Keep every group in one unit (flat layout)
    #[arg(long)]
    no_units: bool,

    /// Minimum column offset between group clusters (flat layout)
    #[arg(long, value_name = "N")]
    min_group_separation: Option<i64>,

    /// JSON file overriding the drawing configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            format,
        } => handle_convert(&input, output.as_deref(), &config, &format),
        Commands::Groups {
            input,
            config,
            format,
        } => handle_groups(&input, &config, &format),
    };

    let exit_code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            1
        }
    };
    process::exit(exit_code);
}

/// Error message with its causes, skipping causes already quoted by the outer message.
fn describe(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    for cause in error.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message.push_str(": ");
            message.push_str(&cause);
        }
    }
    message
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// File config first, command-line flags on top.
fn build_config(args: &ConfigArgs) -> anyhow::Result<SymbolConfig> {
    let mut config = match &args.config {
        Some(path) => SymbolConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SymbolConfig::default(),
    };

    if let Some(columns) = &args.add_columns {
        config.extra_label_columns = columns.clone();
    }
    if let Some(sanitize) = args.sanitize {
        config.sanitize_length = sanitize;
    }
    if args.flat {
        config.flat_layout = true;
    }
    if args.no_rectangles {
        config.draw_group_rectangles = false;
    }
    if args.no_units {
        config.tag_units_per_group = false;
    }
    if let Some(separation) = args.min_group_separation {
        config.min_group_separation = separation;
    }

    config.validate().context("Invalid configuration")?;
    tracing::debug!("Using configuration: {:?}", config);
    Ok(config)
}

fn handle_convert(
    input: &Path,
    output: Option<&Path>,
    args: &ConfigArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let config = build_config(args)?;
    let result = SymgenCore::convert_file(input, output, &config)?;
    match format {
        OutputFormat::Human => output_convert_human(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn handle_groups(input: &Path, args: &ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = build_config(args)?;
    let conversion = SymgenCore::inspect_file(input, &config)?;
    match format {
        OutputFormat::Human => output_groups_human(&conversion),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "family": conversion.family,
                "devices": conversion.devices,
                "diagnostics": conversion.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn output_convert_human(result: &ConversionResult) {
    println!(
        "Imported {} with {} device(s)",
        result.family.as_deref().unwrap_or("(unnamed family)"),
        result.devices.len()
    );
    let mode = if result.merged {
        "merged into"
    } else {
        "written to"
    };
    println!("Library {} {}", mode, result.output.display());
    if let Some(backup) = &result.backup {
        println!("Backup saved as {}", backup.display());
    }
    for device in &result.devices {
        println!(
            "  {}: {} pins, {} groups, {} unit(s)",
            device.symbol,
            device.pins,
            device.groups.len(),
            device.units
        );
    }
    print_diagnostics(&result.diagnostics);
}

fn output_groups_human(conversion: &Conversion) {
    println!(
        "Family: {}",
        conversion.family.as_deref().unwrap_or("(unnamed family)")
    );
    for device in &conversion.devices {
        print_group_table(device);
    }
    print_diagnostics(&conversion.diagnostics);
}

fn print_group_table(device: &DeviceSummary) {
    println!(
        "\n{} ({} pins, {} unit(s))",
        device.symbol, device.pins, device.units
    );
    println!("{}", "─".repeat(40));
    println!("  {:<16} {:>5}  {:<7} {}", "GROUP", "PINS", "EDGE", "UNIT");
    for group in &device.groups {
        let edge = group
            .edge
            .map(|e| e.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<16} {:>5}  {:<7} {}",
            group.name, group.size, edge, group.unit_letter
        );
    }
}

fn print_diagnostics(diagnostics: &[symgen::Diagnostic]) {
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if diagnostics.is_empty() {
        return;
    }
    println!();
    for diagnostic in diagnostics {
        println!("  {}", diagnostic);
    }
    if warnings > 0 {
        println!("\n  {} warning(s)", warnings);
    }
}
