//! Formats listing command.

use anyhow::Result;

use crate::formats::RouteFormat;

/// Run the formats command
pub async fn run() -> Result<()> {
    println!("Supported formats:");
    println!("──────────────────\n");
    print!("{}", format_table());
    Ok(())
}

/// One line per format: identifier and description
fn format_table() -> String {
    let width = RouteFormat::ALL
        .iter()
        .map(|f| f.id().len())
        .max()
        .unwrap_or(0);

    RouteFormat::ALL
        .iter()
        .map(|f| format!("  {:<width$}  {}\n", f.id(), f.summary(), width = width))
        .collect()
}
