//! `tara scan`: snapshot a page fixture.

use std::path::Path;

use anyhow::Context;
use tara_config::Config;
use tara_dom::{DomScanner, DomSnapshot, MemoryPage};
use tara_protocols::ClientMessage;

use crate::cli::OutputFormat;

/// Load a page fixture from disk.
pub(crate) fn load_page(path: &Path) -> anyhow::Result<MemoryPage> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading page fixture {}", path.display()))?;
    MemoryPage::from_json(&json).with_context(|| format!("parsing page fixture {}", path.display()))
}

pub(crate) fn handle_scan(config: &Config, page: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let page = load_page(page)?;
    let snapshot = DomScanner::new(config.scanner.clone()).scan(&page);

    match format {
        OutputFormat::Json => {
            let update = ClientMessage::dom_update(snapshot.elements, Some(snapshot.url));
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
        OutputFormat::Table => print_table(&snapshot),
    }
    Ok(())
}

fn print_table(snapshot: &DomSnapshot) {
    println!("{} ({} elements, hash {:08x})", snapshot.url, snapshot.len(), snapshot.hash);
    println!();
    println!("{:<16} {:<10} {:<32} RECT", "ID", "TYPE", "TEXT");
    println!("{}", "-".repeat(80));
    for element in &snapshot.elements {
        println!(
            "{:<16} {:<10} {:<32} {:.0},{:.0} {:.0}x{:.0}",
            element.id.as_deref().unwrap_or("-"),
            element.tag_type,
            element.text,
            element.rect.x,
            element.rect.y,
            element.rect.width,
            element.rect.height,
        );
    }
}
