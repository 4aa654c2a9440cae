// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod pending;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stock_core::{Database, Image};

use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::{Error, Result};
use crate::sync::{Connectivity, Endpoint, HttpRemote, NetworkMonitor, SyncManager};

/// Helper to open the database from the current context.
pub fn open_db() -> Result<(Database, Config, PathBuf)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let db = Database::open(&get_db_path(&work_dir))?;
    Ok((db, config, work_dir))
}

/// Everything a command needs to change products.
pub struct Session {
    pub manager: SyncManager<HttpRemote>,
    pub monitor: Arc<NetworkMonitor>,
    pub endpoint: Endpoint,
    pub config: Config,
}

/// Open the store and build a sync manager for the configured API.
///
/// Connectivity starts from one probe of the API host, or offline when
/// `offline` is set.
pub async fn open_session(offline: bool) -> Result<Session> {
    let (db, config, _) = open_db()?;
    let api_url = config.effective_api_url();
    let remote = HttpRemote::new(&api_url, config.request_timeout())?;
    let endpoint = remote.endpoint()?;

    let online = !offline && NetworkMonitor::probe(&endpoint, config.probe_timeout()).await;
    tracing::debug!(api = %api_url, online, "session opened");

    let monitor = Arc::new(NetworkMonitor::new(online));
    let connectivity: Arc<dyn Connectivity> = monitor.clone();
    let manager = SyncManager::new(db, remote, connectivity).with_policy(config.retry_policy());
    Ok(Session {
        manager,
        monitor,
        endpoint,
        config,
    })
}

/// Run `future` to completion on a single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(future))
}

/// Read an image file into a pending upload, guessing its type from the name.
pub fn load_image(path: &Path) -> Result<Image> {
    let bytes = std::fs::read(path).map_err(|source| Error::ImageRead {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(Image::pending_upload(bytes, filename, mime_type))
}
