//! Accelerator snapshots: a pre-materialized JSON copy of the canonical
//! table, colocated with the source. Loading one skips the workbook parse
//! entirely when the snapshot is newer than the source.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fleetlens_engine::model::{IncidentRecord, IncidentTable};

use crate::SNAPSHOT_FORMAT_VERSION;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    records: Vec<IncidentRecord>,
}

/// Snapshot file colocated with the source: `schade.xlsm` → `schade.snapshot.json`.
///
/// An explicit sheet selection gets its own file
/// (`schade.ander.snapshot.json`), so a snapshot written from one sheet never
/// answers a load requesting another.
pub fn snapshot_path(source: &Path, sheet: Option<&str>) -> PathBuf {
    match sheet {
        None => source.with_extension("snapshot.json"),
        Some(name) => source.with_extension(format!("{}.snapshot.json", file_tag(name))),
    }
}

/// Filesystem-safe tag for a sheet name.
fn file_tag(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Load a snapshot. Any failure (missing, corrupt, version mismatch) is a
/// reason to fall back to the workbook, not an error for the caller.
pub fn load(path: &Path) -> Result<IncidentTable, String> {
    let data = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let envelope: Envelope = serde_json::from_str(&data).map_err(|e| e.to_string())?;
    if envelope.version != SNAPSHOT_FORMAT_VERSION {
        return Err(format!(
            "snapshot version {} != {}",
            envelope.version, SNAPSHOT_FORMAT_VERSION
        ));
    }
    Ok(IncidentTable {
        records: envelope.records,
        warnings: Vec::new(),
    })
}

/// Write a fresh snapshot via temp-file + rename, so a partial write never
/// leaves a corrupt file behind and never touches the primary source.
pub fn save(table: &IncidentTable, path: &Path) -> Result<(), String> {
    let envelope = Envelope {
        version: SNAPSHOT_FORMAT_VERSION,
        records: table.records.clone(),
    };
    let json = serde_json::to_string(&envelope).map_err(|e| e.to_string())?;

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    {
        let mut file = fs::File::create(&tmp).map_err(|e| e.to_string())?;
        file.write_all(json.as_bytes()).map_err(|e| e.to_string())?;
    }
    fs::rename(&tmp, path).map_err(|e| e.to_string())
}
