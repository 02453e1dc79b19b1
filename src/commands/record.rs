//! Commands that append rows

use ainpc_store::NpcMemory;
use anyhow::Result;

pub fn remember(memory: &NpcMemory, npc: &str, message: &str) -> Result<()> {
    memory.conversations().insert(npc, message)?;
    println!("✓ Remembered message from {npc}");
    Ok(())
}

pub fn add_action(memory: &NpcMemory, name: &str, description: &str, example: &str) -> Result<()> {
    memory.actions().insert(name, description, example)?;
    println!("✓ Registered action '{name}'");
    Ok(())
}
