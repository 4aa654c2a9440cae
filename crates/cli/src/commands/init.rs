// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use stock_core::Database;

use crate::config::{get_db_path, init_work_dir};
use crate::error::Result;

pub fn run(api_url: &str) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let work_dir = run_impl(&cwd, api_url)?;
    println!("Initialized stock in {}", work_dir.display());
    println!("  API: {}", api_url.trim_end_matches('/'));
    Ok(())
}

/// Create `.stock/` under `path` with its config and an empty store.
pub(crate) fn run_impl(path: &Path, api_url: &str) -> Result<PathBuf> {
    let work_dir = init_work_dir(path, api_url)?;
    Database::open(&get_db_path(&work_dir))?;
    Ok(work_dir)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
