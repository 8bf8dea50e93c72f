//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::application::services::TiePolicy;
use crate::application::CollisionPolicy;

/// Cheapest anvil merge order for enchanted items and books
#[derive(Parser, Debug)]
#[command(name = "anvilcalc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the cheapest merge order for the items in a file
    Plan {
        /// Item file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        items: PathBuf,

        #[command(flatten)]
        overrides: SearchOverrides,
    },

    /// Count shapes and candidates for n items
    ///
    /// Pure arithmetic, so `max_items` does not apply; only counts that
    /// overflow 128 bits are rejected.
    Count {
        /// Number of items
        n: usize,
    },

    /// Draw every tree shape for n items
    Shapes {
        /// Number of items
        n: usize,
    },

    /// List the enchantment table
    Enchantments,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Command-line overrides for `[search]` settings.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SearchOverrides {
    /// Merge cost treated as too expensive
    #[arg(long)]
    pub ceiling: Option<u32>,

    /// Which equally cheap candidates to report: first, all
    #[arg(long)]
    pub ties: Option<TiePolicy>,

    /// Shared enchantments: combine, target-wins, reject
    #[arg(long)]
    pub collision: Option<CollisionPolicy>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Evaluate at most this many candidates
    #[arg(long)]
    pub max_candidates: Option<u64>,

    /// Stop after this many milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Stop once a candidate at or below this cost is found
    #[arg(long)]
    pub target_cost: Option<u32>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Write to this path instead of the global location
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
    },

    /// Show config paths
    Path,
}
