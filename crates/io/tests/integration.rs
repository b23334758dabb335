use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use fleetlens_engine::config::EngineConfig;
use fleetlens_engine::model::{IncidentRecord, IncidentTable};
use fleetlens_io::{snapshot, workbook, LoadError, LoadOptions, TableCache};

fn write_incident_workbook(path: &Path, drivers: &[(&str, &str)]) {
    let mut wb = Workbook::new();
    let sheet = wb.add_worksheet();
    sheet.set_name("BRON").unwrap();

    let headers = ["Datum", "volledige naam", "Locatie", "Bus/ Tram", "Link", "teamcoach"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    for (i, (date, driver)) in drivers.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, *date).unwrap();
        sheet.write_string(row, 1, *driver).unwrap();
        sheet.write_string(row, 2, "Gent").unwrap();
        sheet.write_string(row, 3, "Bus").unwrap();
        sheet.write_string(row, 4, "https://example.com/a").unwrap();
        sheet.write_string(row, 5, "Coach A").unwrap();
    }

    wb.save(path).unwrap();
}

fn fixture(dir: &TempDir, rows: &[(&str, &str)]) -> PathBuf {
    let path = dir.path().join("schade.xlsx");
    write_incident_workbook(&path, rows);
    path
}

fn no_snapshot() -> LoadOptions {
    LoadOptions {
        sheet: None,
        no_snapshot: true,
    }
}

// -------------------------------------------------------------------------
// Workbook reading
// -------------------------------------------------------------------------

#[test]
fn workbook_round_trips_through_the_engine() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let cache = TableCache::new();
    let table = cache.load(&path, &no_snapshot(), &EngineConfig::default()).unwrap();

    assert_eq!(table.records.len(), 1);
    let r = &table.records[0];
    assert_eq!(r.employee_id.as_deref(), Some("41092"));
    assert_eq!(r.driver_display_name, "Jan Peeters");
    assert_eq!(r.link.as_deref(), Some("https://example.com/a"));
    // Day-first: 3 April, not 4 March
    assert_eq!(r.quarter.unwrap().to_string(), "2024Q2");
}

#[test]
fn sheet_name_matching_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let options = LoadOptions {
        sheet: Some("bron".into()),
        no_snapshot: true,
    };
    let cache = TableCache::new();
    let table = cache.load(&path, &options, &EngineConfig::default()).unwrap();
    assert_eq!(table.records.len(), 1);
}

#[test]
fn missing_source_is_fatal() {
    let dir = TempDir::new().unwrap();
    let cache = TableCache::new();
    let err = cache
        .load(&dir.path().join("nope.xlsx"), &no_snapshot(), &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(err, LoadError::SourceUnavailable { .. }));
}

// -------------------------------------------------------------------------
// Staleness cache
// -------------------------------------------------------------------------

#[test]
fn unchanged_mtime_hits_the_cache() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let cache = TableCache::new();
    let config = EngineConfig::default();
    let first = cache.load(&path, &no_snapshot(), &config).unwrap();
    let second = cache.load(&path, &no_snapshot(), &config).unwrap();

    // Same snapshot, not a re-parse
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn changed_mtime_reparses_exactly_once() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let cache = TableCache::new();
    let config = EngineConfig::default();
    let first = cache.load(&path, &no_snapshot(), &config).unwrap();

    // Rewrite with an extra row and push the mtime forward explicitly
    write_incident_workbook(
        &path,
        &[("03/04/2024", "41092 - Jan Peeters"), ("04/04/2024", "50317 - An Claes")],
    );
    let f = fs::File::options().write(true).open(&path).unwrap();
    f.set_modified(SystemTime::now() + Duration::from_secs(2)).unwrap();
    drop(f);

    let second = cache.load(&path, &no_snapshot(), &config).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.records.len(), 2);

    // Old-mtime entry was replaced whole, and a repeat load hits again
    assert_eq!(cache.len(), 1);
    let third = cache.load(&path, &no_snapshot(), &config).unwrap();
    assert!(Arc::ptr_eq(&second, &third));
}

#[test]
fn distinct_options_are_distinct_entries() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let cache = TableCache::new();
    let config = EngineConfig::default();
    let a = cache.load(&path, &no_snapshot(), &config).unwrap();
    let b = cache
        .load(
            &path,
            &LoadOptions { sheet: Some("BRON".into()), no_snapshot: true },
            &config,
        )
        .unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 2);
}

// -------------------------------------------------------------------------
// Snapshot acceleration
// -------------------------------------------------------------------------

fn marker_table() -> IncidentTable {
    IncidentTable {
        records: vec![IncidentRecord {
            employee_id: Some("1".into()),
            driver_display_name: "Snapshot Marker".into(),
            incident_date: None,
            location: "onbekend".into(),
            vehicle_type: "onbekend".into(),
            vehicle_number: None,
            incident_type: None,
            link: None,
            team_coach: "onbekend".into(),
            quarter: None,
        }],
        warnings: Vec::new(),
    }
}

#[test]
fn newer_snapshot_short_circuits_the_parse() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    // Plant a snapshot with recognizable content, newer than the source
    let snap = snapshot::snapshot_path(&path, None);
    snapshot::save(&marker_table(), &snap).unwrap();
    let f = fs::File::options().write(true).open(&snap).unwrap();
    f.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();
    drop(f);

    let cache = TableCache::new();
    let table = cache.load(&path, &LoadOptions::default(), &EngineConfig::default()).unwrap();
    assert_eq!(table.records[0].driver_display_name, "Snapshot Marker");
}

#[test]
fn stale_snapshot_is_ignored_and_refreshed() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let snap = snapshot::snapshot_path(&path, None);
    snapshot::save(&marker_table(), &snap).unwrap();
    let f = fs::File::options().write(true).open(&snap).unwrap();
    f.set_modified(SystemTime::now() - Duration::from_secs(3600)).unwrap();
    drop(f);

    let cache = TableCache::new();
    let table = cache.load(&path, &LoadOptions::default(), &EngineConfig::default()).unwrap();
    assert_eq!(table.records[0].driver_display_name, "Jan Peeters");

    // The stale snapshot was rewritten from the fresh parse
    let refreshed = snapshot::load(&snap).unwrap();
    assert_eq!(refreshed.records[0].driver_display_name, "Jan Peeters");
}

#[test]
fn corrupt_snapshot_falls_back_to_workbook() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    let snap = snapshot::snapshot_path(&path, None);
    fs::write(&snap, "definitely not json").unwrap();
    let f = fs::File::options().write(true).open(&snap).unwrap();
    f.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();
    drop(f);

    let cache = TableCache::new();
    let table = cache.load(&path, &LoadOptions::default(), &EngineConfig::default()).unwrap();
    assert_eq!(table.records[0].driver_display_name, "Jan Peeters");
}

#[test]
fn snapshots_are_scoped_to_the_requested_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schade.xlsx");

    let mut wb = Workbook::new();
    let bron = wb.add_worksheet();
    bron.set_name("BRON").unwrap();
    bron.write_string(0, 0, "Datum").unwrap();
    bron.write_string(0, 1, "volledige naam").unwrap();
    bron.write_string(1, 0, "03/04/2024").unwrap();
    bron.write_string(1, 1, "41092 - Jan Peeters").unwrap();
    let ander = wb.add_worksheet();
    ander.set_name("ANDER").unwrap();
    ander.write_string(0, 0, "Datum").unwrap();
    ander.write_string(0, 1, "volledige naam").unwrap();
    ander.write_string(1, 0, "04/04/2024").unwrap();
    ander.write_string(1, 1, "50317 - An Claes").unwrap();
    wb.save(&path).unwrap();

    let cache = TableCache::new();
    let config = EngineConfig::default();

    // Default load writes its snapshot; push that file's mtime ahead of the
    // source so the fast path would pick it up for any later load keyed to it
    cache.load(&path, &LoadOptions::default(), &config).unwrap();
    let snap = snapshot::snapshot_path(&path, None);
    let f = fs::File::options().write(true).open(&snap).unwrap();
    f.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();
    drop(f);

    // A load naming another sheet must parse that sheet, not the snapshot
    let options = LoadOptions { sheet: Some("ANDER".into()), no_snapshot: false };
    let table = cache.load(&path, &options, &config).unwrap();
    assert_eq!(table.records[0].driver_display_name, "An Claes");
}

#[test]
fn snapshot_write_failure_is_nonfatal() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, &[("03/04/2024", "41092 - Jan Peeters")]);

    // Occupy the snapshot path with a directory so the rename must fail
    let snap = snapshot::snapshot_path(&path, None);
    fs::create_dir(&snap).unwrap();

    let cache = TableCache::new();
    let table = cache.load(&path, &LoadOptions::default(), &EngineConfig::default()).unwrap();
    assert_eq!(table.records.len(), 1);
}

// -------------------------------------------------------------------------
// Membership workbook
// -------------------------------------------------------------------------

#[test]
fn membership_sheets_found_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coachingslijst.xlsx");

    let mut wb = Workbook::new();
    let done = wb.add_worksheet();
    done.set_name("Voltooide Coachings").unwrap();
    done.write_string(0, 0, "P-nr").unwrap();
    done.write_number(1, 0, 41092.0).unwrap();
    done.write_string(2, 0, "50317 ").unwrap();

    let active = wb.add_worksheet();
    active.set_name("coaching").unwrap();
    active.write_string(0, 0, "Dienstnummer").unwrap();
    active.write_number(1, 0, 50317.0).unwrap();
    wb.save(&path).unwrap();

    let (membership, warnings) =
        workbook::read_membership(&path, &EngineConfig::default()).unwrap();
    assert!(warnings.is_empty());
    assert!(membership.completed.contains("41092"));
    assert!(membership.completed.contains("50317"));
    assert_eq!(membership.completed.len(), 2);
    assert!(membership.ongoing.contains("50317"));
    assert_eq!(membership.ongoing.len(), 1);
}

#[test]
fn missing_category_contributes_empty_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coachingslijst.xlsx");

    let mut wb = Workbook::new();
    let done = wb.add_worksheet();
    done.set_name("voltooide coachings").unwrap();
    done.write_string(0, 0, "pnr").unwrap();
    done.write_number(1, 0, 41092.0).unwrap();
    wb.save(&path).unwrap();

    let (membership, warnings) =
        workbook::read_membership(&path, &EngineConfig::default()).unwrap();
    assert_eq!(membership.completed.len(), 1);
    assert!(membership.ongoing.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("coaching"));
}

#[test]
fn membership_sheet_without_id_column_warns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coachingslijst.xlsx");

    let mut wb = Workbook::new();
    let done = wb.add_worksheet();
    done.set_name("voltooide coachings").unwrap();
    done.write_string(0, 0, "naam").unwrap();
    done.write_string(1, 0, "Jan Peeters").unwrap();
    let active = wb.add_worksheet();
    active.set_name("coaching").unwrap();
    active.write_string(0, 0, "p-nr").unwrap();
    active.write_number(1, 0, 7.0).unwrap();
    wb.save(&path).unwrap();

    let (membership, warnings) =
        workbook::read_membership(&path, &EngineConfig::default()).unwrap();
    assert!(membership.completed.is_empty());
    assert!(membership.ongoing.contains("7"));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("no id column"));
}
