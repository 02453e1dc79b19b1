//! Similarity lookups and listings, printed for humans or as JSON

use crate::ResourceKind;
use ainpc_store::retrieval::{Scored, SimilarityRetriever};
use ainpc_store::storage::{Action, Conversation, Requirement};
use ainpc_store::{NpcMemory, Repository};
use anyhow::Result;
use serde::Serialize;

pub fn execute(
    memory: &NpcMemory,
    kind: ResourceKind,
    prompt: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let retriever = match limit {
        Some(k) => memory.retriever().clone().with_top_k(k),
        None => memory.retriever().clone(),
    };

    match kind {
        ResourceKind::Conversations => {
            print_scored(search(&retriever, memory.conversations(), prompt)?, json, describe_conversation)
        }
        ResourceKind::Requirements => {
            print_scored(search(&retriever, memory.requirements(), prompt)?, json, describe_requirement)
        }
        ResourceKind::Actions => {
            print_scored(search(&retriever, memory.actions(), prompt)?, json, describe_action)
        }
    }
}

pub fn list(memory: &NpcMemory, kind: ResourceKind, json: bool) -> Result<()> {
    match kind {
        ResourceKind::Conversations => {
            print_all(memory.conversations().select_all()?, json, describe_conversation)
        }
        ResourceKind::Requirements => {
            print_all(memory.requirements().select_all()?, json, describe_requirement)
        }
        ResourceKind::Actions => print_all(memory.actions().select_all()?, json, describe_action),
    }
}

fn search<R: Repository>(
    retriever: &SimilarityRetriever,
    repository: &R,
    prompt: &str,
) -> Result<Vec<Scored<R::Record>>> {
    Ok(retriever.search_with_scores(repository, prompt)?)
}

fn print_scored<R: Serialize>(results: Vec<Scored<R>>, json: bool, describe: fn(&R) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    for (rank, scored) in results.iter().enumerate() {
        println!("{:>2}. [{:.3}] {}", rank + 1, scored.score, describe(&scored.resource));
    }
    Ok(())
}

fn print_all<R: Serialize>(records: Vec<R>, json: bool, describe: fn(&R) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{} record(s)", records.len());
    for record in &records {
        println!("  {}", describe(record));
    }
    Ok(())
}

fn describe_conversation(c: &Conversation) -> String {
    format!("#{} {} <{}> {}", c.id, c.created_at, c.npc_name, c.message)
}

fn describe_requirement(r: &Requirement) -> String {
    let table = if r.crafting_table_needed { "table" } else { "inventory" };
    format!("#{} {} ({}) needs {}", r.id, r.name, table, r.blocks_needed)
}

fn describe_action(a: &Action) -> String {
    format!("#{} {}: {} (e.g. {})", a.id, a.name, a.description, a.example)
}
