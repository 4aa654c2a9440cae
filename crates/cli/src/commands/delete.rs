// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::display::format_mutation;
use crate::error::{Error, Result};
use crate::sync::{Mutation, RemoteApi, SyncManager};

use super::{block_on, open_session};

pub fn run(offline: bool, id: i64) -> Result<()> {
    block_on(async {
        let session = open_session(offline).await?;
        let mutation = run_impl(&session.manager, id).await?;
        println!("{}", format_mutation("Deleted", &mutation));
        Ok::<(), Error>(())
    })?
}

/// Internal implementation that accepts a manager for testing.
pub(crate) async fn run_impl<R: RemoteApi>(manager: &SyncManager<R>, id: i64) -> Result<Mutation> {
    Ok(manager.delete_product(id).await?)
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
