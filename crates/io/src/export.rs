//! CSV export of a (filtered) record view, for download by the UI layer.

use std::io;

use fleetlens_engine::model::IncidentRecord;

const HEADERS: [&str; 10] = [
    "datum",
    "personeelsnr",
    "chauffeur",
    "locatie",
    "voertuigtype",
    "voertuignummer",
    "type",
    "teamcoach",
    "link",
    "kwartaal",
];

/// Write records as CSV. Dates render day-first (`DD-MM-YYYY`); an absent
/// date renders as the unknown label, other absent fields as empty.
pub fn write_csv<W: io::Write>(
    records: &[IncidentRecord],
    unknown_label: &str,
    writer: W,
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADERS)?;

    for r in records {
        let date = match r.incident_date {
            Some(dt) => dt.format("%d-%m-%Y").to_string(),
            None => unknown_label.to_string(),
        };
        let quarter = r.quarter.map(|q| q.to_string()).unwrap_or_default();
        out.write_record([
            date.as_str(),
            r.employee_id.as_deref().unwrap_or(""),
            r.driver_display_name.as_str(),
            r.location.as_str(),
            r.vehicle_type.as_str(),
            r.vehicle_number.as_deref().unwrap_or(""),
            r.incident_type.as_deref().unwrap_or(""),
            r.team_coach.as_str(),
            r.link.as_deref().unwrap_or(""),
            quarter.as_str(),
        ])?;
    }

    out.flush()?;
    Ok(())
}
