//! Modification-time-keyed staleness cache around the ingestion pipeline.
//!
//! A hit returns the previously materialized table without re-reading file
//! content; a miss re-parses and atomically replaces the whole entry, so
//! concurrent readers never observe a half-built table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use fleetlens_engine::config::EngineConfig;
use fleetlens_engine::materialize;
use fleetlens_engine::model::IncidentTable;

use crate::error::LoadError;
use crate::{snapshot, workbook};

/// Parse options that participate in the cache key: the same file loaded
/// with a different sheet is a different logical table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    pub sheet: Option<String>,
    /// Skip the snapshot fast path and never write one.
    pub no_snapshot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    mtime: SystemTime,
    options: LoadOptions,
}

/// Cache of materialized tables keyed by (path, mtime, options).
///
/// Entries are immutable `Arc`s; replacement happens whole-entry under the
/// write lock, so a poisoned lock still holds a consistent map and is
/// recovered rather than propagated. Safe to share across concurrent callers.
#[derive(Default)]
pub struct TableCache {
    entries: RwLock<HashMap<CacheKey, Arc<IncidentTable>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical table for `path`, re-parsed only when the source's
    /// modification time changed since the last load.
    ///
    /// An unreachable source is an error, never silently stale data.
    pub fn load(
        &self,
        path: &Path,
        options: &LoadOptions,
        config: &EngineConfig,
    ) -> Result<Arc<IncidentTable>, LoadError> {
        let mtime = source_mtime(path)?;
        let key = CacheKey {
            path: path.to_path_buf(),
            mtime,
            options: options.clone(),
        };

        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(table) = entries.get(&key) {
                return Ok(Arc::clone(table));
            }
        }

        log::debug!("cache miss for {}, re-parsing", path.display());
        let table = Arc::new(self.parse(path, mtime, options, config)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Drop entries for older mtimes of the same file; they can't be
        // requested again.
        entries.retain(|k, _| k.path != key.path || k.mtime == key.mtime);
        entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of cached tables (for diagnostics and tests).
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parse(
        &self,
        path: &Path,
        source_mtime: SystemTime,
        options: &LoadOptions,
        config: &EngineConfig,
    ) -> Result<IncidentTable, LoadError> {
        let snap_path = snapshot::snapshot_path(path, options.sheet.as_deref());

        // Fast path: a snapshot newer than the source replaces the parse.
        if !options.no_snapshot {
            if let Ok(snap_meta) = std::fs::metadata(&snap_path) {
                let snap_newer = snap_meta
                    .modified()
                    .map(|m| m > source_mtime)
                    .unwrap_or(false);
                if snap_newer {
                    match snapshot::load(&snap_path) {
                        Ok(table) => return Ok(table),
                        Err(e) => {
                            log::warn!(
                                "snapshot {} unreadable ({e}), falling back to workbook",
                                snap_path.display()
                            );
                        }
                    }
                }
            }
        }

        let sheet = options.sheet.as_deref().unwrap_or(&config.source_sheet);
        let raw = workbook::read_table(path, Some(sheet))?;
        let table = materialize(&raw, config);

        for warning in &table.warnings {
            log::warn!("{}: {warning}", path.display());
        }

        // Best-effort accelerator write; failure is logged, never propagated.
        if !options.no_snapshot {
            if let Err(e) = snapshot::save(&table, &snap_path) {
                log::warn!("could not write snapshot {}: {e}", snap_path.display());
            }
        }

        Ok(table)
    }
}

fn source_mtime(path: &Path) -> Result<SystemTime, LoadError> {
    let meta = std::fs::metadata(path).map_err(|e| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    meta.modified().map_err(|e| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })
}
