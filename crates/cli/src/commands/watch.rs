// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running sync loop.
//!
//! Probes the API host on an interval and runs a sync cycle on every
//! offline → online transition until interrupted.

use stock_core::Product;

use crate::error::{Error, Result};
use crate::sync::Connectivity;

use super::{block_on, open_session, Session};

pub fn run(offline: bool) -> Result<()> {
    block_on(async {
        let Session {
            manager,
            monitor,
            endpoint,
            config,
        } = open_session(offline).await?;
        let manager = manager.on_refresh(Box::new(|products: &[Product]| {
            println!("Refreshed {} products.", products.len());
        }));

        println!(
            "Watching {}:{} (Ctrl-C to stop)",
            endpoint.host, endpoint.port
        );

        // Subscribe before the first probe so no transition is missed
        let events = monitor.subscribe();
        let probe = (!offline).then(|| {
            monitor.spawn_probe(endpoint, config.probe_interval(), config.probe_timeout())
        });

        if manager.is_online() {
            let outcome = manager.sync().await?;
            tracing::info!(?outcome, "initial sync");
        } else {
            tracing::warn!("server unreachable, waiting for connection");
        }

        tokio::select! {
            _ = manager.run(events) => {}
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("interrupted, stopping");
            }
        }

        if let Some(probe) = probe {
            probe.abort();
        }
        let pending = manager.store().pending_count()?;
        if pending > 0 {
            println!("{} operations still pending.", pending);
        }
        Ok::<(), Error>(())
    })?
}
