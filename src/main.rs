use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Embedded memory for AI-driven NPCs", long_about = None)]
struct Cli {
    /// Path to the configuration file (created with defaults if missing)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Table a command works on
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResourceKind {
    Conversations,
    Requirements,
    Actions,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its tables, then show row counts
    Init,

    /// Log a dialogue turn of an NPC
    Remember {
        /// Name of the NPC that spoke
        #[arg(long)]
        npc: String,

        /// Message text
        message: String,
    },

    /// Register an action the NPC can perform
    ActionAdd {
        #[arg(long)]
        name: String,

        /// What the action does; this text is embedded
        #[arg(long)]
        description: String,

        /// Example invocation
        #[arg(long)]
        example: String,
    },

    /// Index crafting requirements from a JSON recipe catalog; stored recipes are skipped
    Index {
        /// JSON file holding an array of crafting definitions
        #[arg(long)]
        catalog: PathBuf,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Find the stored resources most relevant to a prompt
    Recall {
        #[arg(value_enum)]
        kind: ResourceKind,

        prompt: String,

        /// Number of results (defaults to the configured top_k)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List every stored resource of a kind
    List {
        #[arg(value_enum)]
        kind: ResourceKind,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ainpc_store::logging::init(cli.verbose);

    let memory = commands::open_memory(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Init => commands::status::execute(&memory),
        Commands::Remember { npc, message } => commands::record::remember(&memory, &npc, &message),
        Commands::ActionAdd {
            name,
            description,
            example,
        } => commands::record::add_action(&memory, &name, &description, &example),
        Commands::Index { catalog, json } => commands::index::execute(&memory, &catalog, json),
        Commands::Recall {
            kind,
            prompt,
            limit,
            json,
        } => commands::recall::execute(&memory, kind, &prompt, limit, json),
        Commands::List { kind, json } => commands::recall::list(&memory, kind, json),
    };

    let shutdown = memory.shutdown();
    commands::finish(result, shutdown)
}
