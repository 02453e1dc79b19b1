use ainpc_store::NpcMemory;
use ainpc_store::Repository;
use anyhow::Result;

pub fn execute(memory: &NpcMemory) -> Result<()> {
    println!("Database: {}", memory.client().location());
    println!("  conversations: {}", memory.conversations().count()?);
    println!("  requirements:  {}", memory.requirements().count()?);
    println!("  actions:       {}", memory.actions().count()?);

    let embedder = memory.embedder();
    match embedder.check_reachable() {
        Ok(()) => println!("✓ Embedding model {} reachable", embedder.model_name()),
        Err(e) => println!("✗ Embedding model {} unavailable: {}", embedder.model_name(), e),
    }
    Ok(())
}
