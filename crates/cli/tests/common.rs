// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens here, so every probe fails fast.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:1";

pub fn stock() -> Command {
    let mut cmd = cargo_bin_cmd!("stock");
    cmd.env_remove("STOCK_API_URL").env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized temp directory whose API is unreachable
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    stock()
        .arg("init")
        .arg("--api-url")
        .arg(UNREACHABLE_API)
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to add a product offline and return its (temporary) id
pub fn add_product(temp: &TempDir, name: &str, price: &str) -> i64 {
    let output = stock()
        .args(["--offline", "add", "--name", name, "--price", price])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .skip_while(|w| *w != "product")
        .nth(1)
        .and_then(|id| id.parse().ok())
        .unwrap()
}

/// Parsed output of `stock list -o json`
pub fn list_json(temp: &TempDir) -> serde_json::Value {
    let output = stock()
        .args(["list", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Parsed output of `stock pending -o json`
pub fn pending_json(temp: &TempDir) -> serde_json::Value {
    let output = stock()
        .args(["pending", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}
