//! # cwstore CLI Module
//!
//! This module implements the CLI interface for cwstore.
//!
//! ## Available Commands
//!
//! - `status` - Show store status
//! - `infer` - Truth value of "subject is predicate"
//! - `resolve` - Boundary query with duplicate-evidence resolution
//! - `rewrite` - Apply the transitive rule to a chain of three points

mod commands;

use crate::config::Config;
use crate::error::AppResult;
use crate::knowledge::{DEFAULT_LINK_LABEL, Knowledge};
use clap::{Parser, Subcommand};
use cwstore_core::PolicyKind;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// cwstore - cell-complex knowledge store
///
/// Loads a knowledge file into an in-memory cell complex and runs
/// inference, resolution and rewrite commands against it.
#[derive(Parser, Debug)]
#[command(name = "cwstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the knowledge file (TOML)
    #[arg(short = 'k', long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// Path to the configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long = "json", global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show store status
    Status,

    /// Infer the truth value of "subject is predicate"
    Infer {
        /// Subject point label
        #[arg(short, long)]
        subject: String,

        /// Predicate point label
        #[arg(short, long)]
        predicate: String,

        /// Evidential horizon (overrides the configuration)
        #[arg(short = 'H', long)]
        horizon: Option<f64>,
    },

    /// Query the evidence on an edge, resolving duplicates
    Resolve {
        /// Edge label
        #[arg(short, long, default_value = DEFAULT_LINK_LABEL)]
        label: String,

        /// Source point label
        #[arg(short = 'x', long)]
        from: String,

        /// Target point label
        #[arg(short = 'y', long)]
        to: String,

        /// Resolution policy (overrides the configuration)
        #[arg(short = 'P', long)]
        policy: Option<PolicyKind>,

        /// Seed for the random policy (overrides the configuration)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Apply "A label B, B label C => A label C" to three points
    Rewrite {
        /// Edge label
        #[arg(short, long, default_value = DEFAULT_LINK_LABEL)]
        label: String,

        /// The three point labels A, B and C
        #[arg(num_args = 3, required = true)]
        points: Vec<String>,
    },
}

// =============================================================================
// CLI EXECUTION
// =============================================================================

/// Execute the CLI command.
pub fn execute(cli: Cli) -> AppResult<()> {
    let config = Config::load(cli.config.as_deref())?;
    let mut knowledge = match &cli.knowledge {
        Some(path) => Knowledge::load(path)?,
        None => Knowledge::new(),
    };
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Status) | None => {
            cmd_status(&knowledge, &config, cli.knowledge.as_deref(), json_mode)
        }
        Some(Commands::Infer {
            subject,
            predicate,
            horizon,
        }) => {
            let horizon = horizon.unwrap_or(config.horizon);
            cmd_infer(
                &knowledge,
                &subject,
                &predicate,
                horizon,
                json_mode,
                cli.verbose,
            )
        }
        Some(Commands::Resolve {
            label,
            from,
            to,
            policy,
            seed,
        }) => {
            let policy = policy.unwrap_or(config.policy);
            let seed = seed.or(config.seed);
            cmd_resolve(
                &mut knowledge,
                &label,
                &from,
                &to,
                policy,
                seed,
                json_mode,
            )
        }
        Some(Commands::Rewrite { label, points }) => {
            cmd_rewrite(&mut knowledge, &label, &points, json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
