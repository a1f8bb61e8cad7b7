//! Convert a pin-out file and print the resolved groups of every device.

use symgen::prelude::*;
use std::path::Path;

fn main() -> Result<(), SymgenError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/EP4CE6.txt".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example convert_pinout [path/to/pinout.txt]");
        std::process::exit(1);
    }

    let config = SymbolConfig::default();
    let conversion = SymgenCore::inspect_file(path, &config)?;

    println!(
        "Family: {}",
        conversion.family.as_deref().unwrap_or("(unnamed)")
    );
    for device in &conversion.devices {
        println!();
        println!("{} ({} pins, {} unit(s))", device.symbol, device.pins, device.units);
        for group in &device.groups {
            let edge = group
                .edge
                .map(|e| e.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<12} {:>4}  {:<6} {}", group.name, group.size, edge, group.unit_letter);
        }
    }

    for diagnostic in &conversion.diagnostics {
        println!("{}", diagnostic);
    }
    Ok(())
}
