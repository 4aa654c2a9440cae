// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use stockrs::Cli;

fn main() {
    let cli = Cli::parse();
    stockrs::init_logging(cli.command.default_log_level());
    if let Err(e) = stockrs::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
