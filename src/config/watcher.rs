//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself. Editors
//! usually save by writing a temporary file and renaming it over the
//! original, which replaces the inode a file-level watch is attached to.
//! Watching the directory and filtering by file name survives any number
//! of such saves.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;

/// Keeps the OS watch alive; dropping it stops the updates.
pub struct ConfigWatcher {
    _inner: RecommendedWatcher,
}

impl ConfigWatcher {
    /// Watch `path` and send every successfully validated reload on the
    /// returned channel. Files that fail to load are logged and skipped.
    pub fn watch(
        path: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServiceConfig>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (dir, file_name) = split_watch_target(path)?;
        let config_path = path.to_path_buf();

        let mut inner = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(error = %e, "Config watch error");
                    return;
                }
            };
            if !touches_file(&event, &file_name) {
                return;
            }

            match load_config(&config_path) {
                Ok(config) => {
                    tracing::info!(path = ?config_path, "Config file reloaded");
                    let _ = tx.send(config);
                }
                Err(e) => tracing::warn!(
                    path = ?config_path,
                    error = %e,
                    "Config reload failed, keeping current configuration"
                ),
            }
        })?;

        inner.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, dir = ?dir, "Config watcher started");

        Ok((Self { _inner: inner }, rx))
    }
}

fn split_watch_target(path: &Path) -> Result<(PathBuf, OsString), notify::Error> {
    let file_name = path.file_name().map(OsString::from).ok_or_else(|| {
        notify::Error::generic(&format!("{} does not name a file", path.display()))
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

/// A create or modify (renames included) that lands on the config file.
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
