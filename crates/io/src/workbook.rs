//! Workbook reading via calamine: raw sheet extraction and coaching
//! membership discovery. All cell typing happens in the engine crate.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use fleetlens_engine::config::EngineConfig;
use fleetlens_engine::model::{CoachingMembership, RawTable, RawValue};
use fleetlens_engine::{dates, extract, schema};

use crate::error::LoadError;

/// Read one sheet into a raw header+rows table.
///
/// `sheet` is matched case-insensitively after trimming; `None` (or no match
/// by that name) falls back to the first sheet, mirroring how the historical
/// extracts sometimes renamed the source tab.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook {
        path: path.to_path_buf(),
        message: format!("failed to open: {e}"),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(LoadError::Workbook {
            path: path.to_path_buf(),
            message: "workbook contains no sheets".into(),
        });
    }

    let chosen = sheet
        .and_then(|wanted| find_sheet(&sheet_names, wanted))
        .unwrap_or_else(|| sheet_names[0].clone());

    let range = workbook
        .worksheet_range(&chosen)
        .map_err(|e| LoadError::Workbook {
            path: path.to_path_buf(),
            message: format!("failed to read sheet '{chosen}': {e}"),
        })?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| match c {
                Data::String(s) => s.trim().to_string(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<RawValue>> = rows_iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

/// Sheet name matching the wanted label, case-insensitive and trimmed.
fn find_sheet(sheet_names: &[String], wanted: &str) -> Option<String> {
    let wanted = wanted.trim().to_lowercase();
    sheet_names
        .iter()
        .find(|name| name.trim().to_lowercase() == wanted)
        .cloned()
}

fn convert_cell(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(n) => RawValue::Number(*n),
        Data::Int(n) => RawValue::Number(*n as f64),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => {
            // calamine hands dates back as serials; resolve them here so the
            // engine sees a native instant.
            let serial = dt.as_f64();
            match dates::from_serial(serial) {
                Some(instant) => RawValue::DateTime(instant),
                None => RawValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(e) => RawValue::Text(format!("#{e:?}")),
    }
}

/// Build coaching membership sets from the secondary workbook.
///
/// A missing workbook, sheet or id column is non-fatal: that category
/// contributes an empty set and a warning string for the caller's UI. Only a
/// completely unreadable file after it was found is surfaced as an error.
pub fn read_membership(
    path: &Path,
    config: &EngineConfig,
) -> Result<(CoachingMembership, Vec<String>), LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook {
        path: path.to_path_buf(),
        message: format!("failed to open: {e}"),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut membership = CoachingMembership::default();
    let mut warnings = Vec::new();

    let categories = [
        (config.membership.completed_sheet.as_str(), "completed"),
        (config.membership.ongoing_sheet.as_str(), "ongoing"),
    ];

    for (label, category) in categories {
        let Some(sheet) = find_sheet(&sheet_names, label) else {
            warnings.push(format!("membership sheet '{label}' not found ({category} empty)"));
            continue;
        };

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| LoadError::Workbook {
                path: path.to_path_buf(),
                message: format!("failed to read sheet '{sheet}': {e}"),
            })?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
            None => Vec::new(),
        };

        let Some(id_col) = schema::resolve(&headers, &config.membership.id_aliases) else {
            warnings.push(format!(
                "sheet '{sheet}' has no id column ({category} empty)"
            ));
            continue;
        };

        let ids = match category {
            "completed" => &mut membership.completed,
            _ => &mut membership.ongoing,
        };
        for row in rows {
            if let Some(cell) = row.get(id_col) {
                let text = convert_cell(cell).as_text().unwrap_or_default();
                let digits = extract::digits_only(&text);
                if !digits.is_empty() {
                    ids.insert(digits);
                }
            }
        }
    }

    Ok((membership, warnings))
}
