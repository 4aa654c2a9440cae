// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions.

/// Environment variable names.
pub mod vars {
    /// Overrides `api_url` from the project config.
    pub const STOCK_API_URL: &str = "STOCK_API_URL";
}

/// Returns the value of `STOCK_API_URL` if set and not blank.
pub fn api_url() -> Option<String> {
    std::env::var(vars::STOCK_API_URL)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
