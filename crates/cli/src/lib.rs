// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! stockrs - An offline-first client for an inventory product API.
//!
//! This crate provides the functionality behind the `stock` CLI: a local
//! SQLite cache of the server's products, a persistent queue of changes made
//! while offline, and the sync engine that replays them.
//!
//! # Main Components
//!
//! - [`sync::SyncManager`] - Optimistic mutations, queue replay and refresh
//! - [`sync::HttpRemote`] - REST client for `/api/products`
//! - [`sync::NetworkMonitor`] - Online/offline state and transition events
//! - [`Config`] - Project configuration (API url, timeouts, retry policy)
//! - [`Error`] - Error types for all operations
//!
//! # Initialization
//!
//! Use [`init_work_dir`] to create a new `.stock/` directory, then open the
//! local store:
//!
//! ```rust,ignore
//! use stockrs::{init_work_dir, find_work_dir, get_db_path, Config, Database};
//!
//! // Initialize a new project
//! let work_dir = init_work_dir(Path::new("."), "http://localhost:5173")?;
//!
//! // Later, find and open an existing project
//! let work_dir = find_work_dir()?;
//! let config = Config::load(&work_dir)?;
//! let db = Database::open(&get_db_path(&work_dir))?;
//! ```

mod cli;
mod commands;
mod display;
mod env;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, DetailArgs, OutputFormat, PageArgs, SortField};
pub use config::{find_work_dir, get_db_path, init_work_dir, Config};
pub use error::{Error, Result};
pub use stock_core::Database;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `default_level`. Calling this twice is harmless.
pub fn init_logging(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let offline = cli.offline;
    match cli.command {
        Command::Init { api_url } => commands::init::run(&api_url),
        Command::List {
            query,
            barcode,
            sort,
            desc,
            pages,
            output,
        } => {
            let options = commands::list::ListOptions {
                query,
                barcode,
                sort: sort.into(),
                desc,
                page: usize::try_from(pages.page).unwrap_or(usize::MAX),
                per_page: usize::try_from(pages.per_page).unwrap_or(usize::MAX),
            };
            commands::list::run(&options, output)
        }
        Command::Add {
            name,
            price,
            details,
        } => commands::add::run(offline, name, price, details),
        Command::Edit {
            id,
            name,
            price,
            details,
        } => commands::edit::run(
            offline,
            id,
            commands::edit::Changes {
                name,
                price,
                details,
            },
        ),
        Command::Delete { id } => commands::delete::run(offline, id),
        Command::Pending { output } => commands::pending::run(output),
        Command::Sync => commands::sync::run(offline),
        Command::Watch => commands::watch::run(offline),
    }
}
