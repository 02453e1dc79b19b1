use ainpc_store::indexer::JsonCatalog;
use ainpc_store::NpcMemory;
use anyhow::Result;
use std::path::Path;

pub fn execute(memory: &NpcMemory, catalog: &Path, json: bool) -> Result<()> {
    let report = memory.index_requirements(&JsonCatalog::new(catalog))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Indexed {} of {} recipes", report.indexed, report.scanned);
    if report.skipped_shape > 0 {
        println!("  skipped (grid too large): {}", report.skipped_shape);
    }
    if report.skipped_invalid > 0 {
        println!("  skipped (invalid ingredients): {}", report.skipped_invalid);
    }
    if report.duplicates > 0 {
        println!("  duplicate names: {}", report.duplicates);
    }
    Ok(())
}
