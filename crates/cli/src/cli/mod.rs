// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use clap::{Parser, Subcommand, ValueEnum};
use stock_core::SortKey;

use crate::config::DEFAULT_API_URL;

pub use args::{DetailArgs, PageArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Column a listing is ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Price,
}

impl From<SortField> for SortKey {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Id => SortKey::Id,
            SortField::Name => SortKey::Name,
            SortField::Price => SortKey::Price,
        }
    }
}

#[derive(Parser)]
#[command(name = "stock")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An offline-first client for an inventory product API")]
#[command(
    long_about = "An offline-first client for an inventory product API.\n\n\
    Products are cached locally; changes made while offline are queued and \
    replayed against the server once it is reachable again."
)]
pub struct Cli {
    /// Never contact the server; every change is queued
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Initialize stock in the current directory
    Init {
        /// Base URL of the product API
        #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// List cached products
    #[command(after_help = "\
Examples:
  stock list                     First page, ordered by id
  stock list -q mouse            Search name, id, price and barcode
  stock list --barcode 0123      Exact barcode lookup
  stock list --sort price --desc Most expensive first
  stock list --page 2 -o json    Second page as JSON")]
    List {
        /// Search text matched against name, id, price and barcode
        #[arg(long, short)]
        query: Option<String>,

        /// Show only the product with this barcode
        #[arg(long, conflicts_with = "query")]
        barcode: Option<String>,

        /// Column to order by
        #[arg(long, value_enum, default_value_t)]
        sort: SortField,

        /// Reverse the order
        #[arg(long)]
        desc: bool,

        #[command(flatten)]
        pages: PageArgs,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Create a product
    Add {
        /// Product name
        #[arg(long, short, value_parser = non_empty_string)]
        name: String,

        /// Unit price, greater than 0
        #[arg(long, short, allow_negative_numbers = true)]
        price: f64,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Change fields of a product
    Edit {
        /// Product id (negative for products not yet synced)
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// New name
        #[arg(long, short, value_parser = non_empty_string)]
        name: Option<String>,

        /// New unit price
        #[arg(long, short, allow_negative_numbers = true)]
        price: Option<f64>,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Delete a product
    Delete {
        /// Product id (negative for products not yet synced)
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Show operations waiting to be sent
    Pending {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Send queued operations and refresh the local cache
    Sync,

    /// Stay running and sync every time the server becomes reachable
    Watch,
}

impl Command {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Command::Watch => "info",
            _ => "warn",
        }
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
