//! # cwstore - Cell-Complex Knowledge Store
//!
//! The command line binary for the cwstore engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/cwstore (THE BINARY)         │
//! │                                              │
//! │  ┌─────────────┐        ┌────────────────┐   │
//! │  │    CLI      │        │ Knowledge/TOML │   │
//! │  │   (clap)    │        │    loaders     │   │
//! │  └──────┬──────┘        └───────┬────────┘   │
//! │         └───────────┬───────────┘            │
//! │                     ▼                        │
//! │             ┌───────────────┐                │
//! │             │ cwstore-core  │                │
//! │             │ (THE ENGINE)  │                │
//! │             └───────────────┘                │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cwstore -k animals.toml status
//! cwstore -k animals.toml infer -s robin -p animal
//! cwstore -k animals.toml resolve -x robin -y animal -P choice
//! cwstore -k animals.toml rewrite robin bird animal
//! ```

use clap::Parser;
use cwstore::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // CWSTORE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CWSTORE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cwstore=info,cwstore_core=warn".into());

    // Logs go to stderr so --json output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the cwstore startup banner.
fn print_banner() {
    println!(
        r#"
  cwstore v{}
  in-memory cell-complex knowledge store
"#,
        env!("CARGO_PKG_VERSION")
    );
}
