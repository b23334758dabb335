use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One untyped cell value as read from a source sheet.
///
/// Ephemeral: raw tables are discarded after materialization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl RawValue {
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display text for the cell, trimmed. Empty cells yield `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            RawValue::Number(n) => {
                // Whole numbers render without a trailing ".0" (ids, vehicle numbers)
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{n}"))
                }
            }
            RawValue::DateTime(dt) => Some(dt.to_string()),
            RawValue::Bool(b) => Some(b.to_string()),
        }
    }
}

/// Header row + body rows from one source sheet, before schema resolution.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// Calendar quarter derived from an incident date. Displays as `2024Q2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u8,
}

impl Quarter {
    pub fn of(date: NaiveDateTime) -> Self {
        Quarter {
            year: date.year(),
            quarter: ((date.month() - 1) / 3 + 1) as u8,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Canonical structured representation of one damage event.
///
/// `incident_date` is either a fully valid instant or `None`, never a
/// partially parsed value. `driver_display_name` is never empty; missing or
/// placeholder names fall back to the configured unknown label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Digits-only personnel number, if the driver field carried one.
    pub employee_id: Option<String>,
    pub driver_display_name: String,
    pub incident_date: Option<NaiveDateTime>,
    pub location: String,
    pub vehicle_type: String,
    pub vehicle_number: Option<String>,
    pub incident_type: Option<String>,
    pub link: Option<String>,
    pub team_coach: String,
    pub quarter: Option<Quarter>,
}

/// A logical field that could not be resolved against the header row.
/// Non-fatal: the column materializes as null/sentinel values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaWarning {
    pub field: String,
    pub aliases: Vec<String>,
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column for '{}' not found (tried: {})",
            self.field,
            self.aliases.join(", ")
        )
    }
}

/// The canonical record table for one source file.
///
/// Owned by the staleness cache and handed to consumers read-only; filtering
/// and derived columns operate on copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentTable {
    pub records: Vec<IncidentRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(skip_deserializing)]
    pub warnings: Vec<SchemaWarning>,
}

impl IncidentTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Coaching membership + classification
// ---------------------------------------------------------------------------

/// Per-category employee-id sets built from the coaching workbook.
/// Sets may overlap; a missing category is simply empty.
#[derive(Debug, Clone, Default)]
pub struct CoachingMembership {
    pub completed: HashSet<String>,
    pub ongoing: HashSet<String>,
}

/// Coaching status of one driver, in fixed precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingStatus {
    None,
    Completed,
    Ongoing,
    Both,
}

impl fmt::Display for CoachingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Completed => write!(f, "completed"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// One driver's classification, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct DriverClassification {
    pub employee_id: Option<String>,
    pub display_name: String,
    pub status: CoachingStatus,
    pub badge: &'static str,
    pub incident_count: usize,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One group in descending-frequency order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoRow {
    pub key: String,
    pub count: usize,
    /// Inclusive cumulative share of the grand total at this rank.
    pub cumulative_share: f64,
    pub within_threshold: bool,
}

/// Frequency + cumulative-share aggregation over one grouping key.
#[derive(Debug, Clone, Serialize)]
pub struct ParetoResult {
    pub rows: Vec<ParetoRow>,
    pub total: usize,
    pub threshold: f64,
    /// Smallest rank whose cumulative share reaches the threshold.
    /// `None` exactly when the input was empty.
    pub threshold_index: Option<usize>,
}
