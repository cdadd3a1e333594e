//! Utilities for loading RON files and watching directories for changes.
//!
//! This module provides helpers for reading RON files from disk and a simple
//! filesystem watcher resource that raises a shared flag when files change.
//! The watcher is used for hot-reloading RON-based configuration (settings,
//! building templates, block palette) during development.

use bevy::log::{error, warn};
use bevy::prelude::Resource;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Failure reading or parsing a single RON file.
#[derive(Debug, Error)]
pub enum RonError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Resource)]
/// File-watcher resource for RON hot-reload.
pub struct RonWatcher {
    changed: Arc<AtomicBool>, // Raised by the notify callback when a watched file changes.
    _watcher: Option<RecommendedWatcher>, // Watcher handle kept to prevent immediate drop.
}

impl RonWatcher {
    /// Create a stub `RonWatcher` that does not have an active OS watcher.
    ///
    /// # Return
    /// Returns a `RonWatcher` whose flag is never raised. Useful as a fallback
    /// when watcher creation fails or the directory does not exist.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Consume the change flag.
    ///
    /// # Return
    /// `true` exactly once per batch of file modifications.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Raise the change flag manually (used by tests and forced reloads).
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}

/// Read and deserialize one RON file.
///
/// # Errors
/// Returns `RonError::Io` if the file cannot be read and `RonError::Parse`
/// if its contents do not deserialize into `T`.
pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, RonError> {
    let content = std::fs::read_to_string(path).map_err(|source| RonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str::<T>(&content).map_err(|source| RonError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// Files are visited in file-name order so the result is stable across
/// platforms.
///
/// # Arguments
/// * `path` - Directory path to scan for `.ron` files.
///
/// # Return
/// A `Vec<T>` containing all successfully deserialized items found in the
/// directory. Files that fail to parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut items = Vec::with_capacity(files.len());
    for file in files {
        match load_ron_file::<T>(&file) {
            Ok(item) => items.push(item),
            Err(e) => warn!("{e}"),
        }
    }
    items
}

/// Create a `RonWatcher` that watches a directory for modifications.
///
/// # Arguments
/// * `path` - Directory path to watch for `.ron` file changes.
///
/// # Errors
/// Returns a `notify::Error` if the underlying file-watcher cannot be
/// created or the watcher cannot be registered for the provided path.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&changed);
    // Canonical form so event paths can be filtered against it
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let modifies = matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_) | notify::EventKind::Remove(_)
                );
                let relevant = event.paths.iter().any(|p| {
                    let canon = std::fs::canonicalize(p).unwrap_or_else(|_| p.clone());
                    canon.starts_with(&watched_path)
                });
                if modifies && relevant {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => error!("watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}
