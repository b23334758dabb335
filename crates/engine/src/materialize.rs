//! One-shot materialization: resolve the schema once against the header row,
//! then build fixed-shape records. Consumers never re-derive column lookups.

use crate::config::EngineConfig;
use crate::model::{IncidentRecord, IncidentTable, Quarter, RawTable, RawValue, SchemaWarning};
use crate::{dates, extract, link, schema};

struct ColumnPlan {
    employee_id: Option<usize>,
    driver_name: Option<usize>,
    date: Option<usize>,
    link: Option<usize>,
    location: Option<usize>,
    vehicle_number: Option<usize>,
    vehicle_type: Option<usize>,
    incident_type: Option<usize>,
    team_coach: Option<usize>,
}

/// Build the canonical incident table from one raw sheet.
///
/// A missing logical column degrades to a fully-null/sentinel column plus a
/// `SchemaWarning`; a malformed cell degrades to `None` for that field only.
/// Rows whose resolved cells are all empty are skipped. Pure function.
pub fn materialize(raw: &RawTable, config: &EngineConfig) -> IncidentTable {
    let mut warnings = Vec::new();
    let mut plan_field = |field: &'static str, aliases: &[String]| -> Option<usize> {
        let idx = schema::resolve(&raw.headers, aliases);
        if idx.is_none() {
            warnings.push(SchemaWarning {
                field: field.to_string(),
                aliases: aliases.to_vec(),
            });
        }
        idx
    };

    let fields = &config.fields;
    let plan = ColumnPlan {
        employee_id: plan_field("employee_id", &fields.employee_id),
        driver_name: plan_field("driver_name", &fields.driver_name),
        date: plan_field("date", &fields.date),
        link: plan_field("link", &fields.link),
        location: plan_field("location", &fields.location),
        vehicle_number: plan_field("vehicle_number", &fields.vehicle_number),
        vehicle_type: plan_field("vehicle_type", &fields.vehicle_type),
        incident_type: plan_field("incident_type", &fields.incident_type),
        team_coach: plan_field("team_coach", &fields.team_coach),
    };

    let unknown = config.unknown_label.as_str();
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        if row.iter().all(RawValue::is_empty) {
            continue;
        }

        let driver_raw = cell_text(row, plan.driver_name);

        // Id comes from the composite driver field, with the dedicated id
        // column as fallback for extracts that split them.
        let employee_id = driver_raw
            .as_deref()
            .and_then(extract::employee_id)
            .or_else(|| {
                cell_text(row, plan.employee_id)
                    .as_deref()
                    .and_then(extract::employee_id)
            });

        let driver_display_name = match driver_raw.as_deref() {
            Some(text) => extract::display_name(text, unknown),
            None => unknown.to_string(),
        };

        let incident_date = dates::normalize(cell(row, plan.date));

        records.push(IncidentRecord {
            employee_id,
            driver_display_name,
            incident_date,
            location: extract::safe_display(cell_text(row, plan.location).as_deref(), unknown),
            vehicle_type: extract::safe_display(cell_text(row, plan.vehicle_type).as_deref(), unknown),
            vehicle_number: cell_text(row, plan.vehicle_number),
            incident_type: cell_text(row, plan.incident_type),
            link: link::extract(cell(row, plan.link)),
            team_coach: extract::safe_display(cell_text(row, plan.team_coach).as_deref(), unknown),
            quarter: incident_date.map(Quarter::of),
        });
    }

    IncidentTable { records, warnings }
}

fn cell<'a>(row: &'a [RawValue], idx: Option<usize>) -> &'a RawValue {
    static EMPTY: RawValue = RawValue::Empty;
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY)
}

fn cell_text(row: &[RawValue], idx: Option<usize>) -> Option<String> {
    cell(row, idx).as_text()
}
