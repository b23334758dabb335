//! Filtered views over the canonical table. The table itself is read-only;
//! every view copies the matching records.

use chrono::NaiveDate;

use crate::model::{IncidentRecord, Quarter};

/// Filter over the canonical record set. Empty allow-lists accept everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub team_coaches: Vec<String>,
    pub locations: Vec<String>,
    pub vehicle_types: Vec<String>,
    pub quarters: Vec<Quarter>,
    /// Inclusive calendar-date range. A range makes the view date-scoped:
    /// records without a valid date are excluded.
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Sentinel personnel numbers to drop (dummy "unassigned" rows).
    pub excluded_employee_ids: Vec<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &IncidentRecord) -> bool {
        if !self.excluded_employee_ids.is_empty() {
            if let Some(id) = &record.employee_id {
                if self.excluded_employee_ids.iter().any(|x| x == id) {
                    return false;
                }
            }
        }

        let allow = |list: &[String], value: &str| list.is_empty() || list.iter().any(|v| v == value);
        if !allow(&self.team_coaches, &record.team_coach)
            || !allow(&self.locations, &record.location)
            || !allow(&self.vehicle_types, &record.vehicle_type)
        {
            return false;
        }

        if !self.quarters.is_empty() {
            match record.quarter {
                Some(q) if self.quarters.contains(&q) => {}
                _ => return false,
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            // Date-scoped view: undated records are out
            let date = match record.incident_date {
                Some(dt) => dt.date(),
                None => return false,
            };
            if let Some(from) = self.date_from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = self.date_to {
                if date > to {
                    return false;
                }
            }
        }

        true
    }

    pub fn apply(&self, records: &[IncidentRecord]) -> Vec<IncidentRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// All records for one personnel number (digits-only), newest first.
/// Undated records sort last. Entity-scoped: undated rows are kept.
pub fn lookup_by_id(records: &[IncidentRecord], digits: &str) -> Vec<IncidentRecord> {
    let mut out: Vec<IncidentRecord> = records
        .iter()
        .filter(|r| r.employee_id.as_deref() == Some(digits))
        .cloned()
        .collect();
    out.sort_by(|a, b| b.incident_date.cmp(&a.incident_date));
    out
}
