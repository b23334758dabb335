//! Coaching-status classification.
//!
//! Membership sets are explicit parameters, never ambient state, so every
//! result is reproducible in isolation.

use std::collections::HashMap;

use crate::model::{CoachingMembership, CoachingStatus, DriverClassification, IncidentRecord};

/// Fixed-precedence status for one employee id: both sets win over either
/// single set; an absent id is always `None`. O(1) per lookup.
pub fn classify(employee_id: Option<&str>, membership: &CoachingMembership) -> CoachingStatus {
    let id = match employee_id {
        Some(id) if !id.is_empty() => id,
        _ => return CoachingStatus::None,
    };

    let completed = membership.completed.contains(id);
    let ongoing = membership.ongoing.contains(id);

    match (completed, ongoing) {
        (true, true) => CoachingStatus::Both,
        (true, false) => CoachingStatus::Completed,
        (false, true) => CoachingStatus::Ongoing,
        (false, false) => CoachingStatus::None,
    }
}

impl CoachingStatus {
    /// Rendering badge, decoupled from the status itself: adding a status is
    /// a two-function change, not a cascading rewrite.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Completed => "🟡 ",
            Self::Ongoing => "🔵 ",
            Self::Both => "🟡🔵 ",
            Self::None => "",
        }
    }
}

/// Per-driver classification rows over a record view, deduplicated by
/// employee id (records without an id group under the display name).
/// Ordered by descending incident count, ties by first appearance.
pub fn classify_drivers(
    records: &[IncidentRecord],
    membership: &CoachingMembership,
) -> Vec<DriverClassification> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, DriverClassification> = HashMap::new();

    for record in records {
        let key = record
            .employee_id
            .clone()
            .unwrap_or_else(|| record.driver_display_name.clone());

        let entry = by_key.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            let status = classify(record.employee_id.as_deref(), membership);
            DriverClassification {
                employee_id: record.employee_id.clone(),
                display_name: record.driver_display_name.clone(),
                status,
                badge: status.badge(),
                incident_count: 0,
            }
        });
        entry.incident_count += 1;
    }

    let mut rows: Vec<DriverClassification> = order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect();
    rows.sort_by(|a, b| b.incident_count.cmp(&a.incident_count));
    rows
}
