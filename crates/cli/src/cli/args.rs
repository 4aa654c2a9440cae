// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! These structs are used with `#[command(flatten)]` to reduce duplication
//! across commands that take the same product fields.

use std::path::PathBuf;

use clap::Args;

/// Optional product fields shared by `add` and `edit`.
#[derive(Args, Clone, Debug, Default, PartialEq)]
pub struct DetailArgs {
    /// Free-text description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Barcode (as printed or scanned)
    #[arg(long, short)]
    pub barcode: Option<String>,

    /// Image file to upload with the product
    #[arg(long, short, value_name = "PATH")]
    pub image: Option<PathBuf>,
}

/// Pagination arguments for listings.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct PageArgs {
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Products per page
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub per_page: u64,
}
