// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::display::format_sync_outcome;
use crate::error::{Error, Result};
use crate::sync::{RemoteApi, SyncManager, SyncOutcome};

use super::{block_on, open_session};

pub fn run(offline: bool) -> Result<()> {
    block_on(async {
        let session = open_session(offline).await?;
        if !session.manager.is_online() && !offline {
            eprintln!(
                "warning: {}:{} is unreachable, changes stay queued",
                session.endpoint.host, session.endpoint.port
            );
        }
        let (outcome, pending) = run_impl(&session.manager).await?;
        for line in format_sync_outcome(&outcome, pending) {
            println!("{}", line);
        }
        Ok::<(), Error>(())
    })?
}

/// Run one cycle and report how many operations are left.
pub(crate) async fn run_impl<R: RemoteApi>(
    manager: &SyncManager<R>,
) -> Result<(SyncOutcome, usize)> {
    let outcome = manager.sync().await?;
    let pending = manager.store().pending_count()?;
    Ok((outcome, pending))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
