use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine configuration: alias lists, membership category labels, the Pareto
/// threshold. Everything the historical script variants hard-coded per screen
/// lives here instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sheet holding the incident rows. Falls back to the first sheet when absent.
    pub source_sheet: String,
    pub fields: FieldAliases,
    pub membership: MembershipConfig,
    /// Pareto crossing proportion, inclusive. Must be in (0, 1].
    pub pareto_threshold: f64,
    /// Display token for missing/placeholder names.
    pub unknown_label: String,
    /// Sentinel personnel numbers (dummy "unassigned" rows) excluded from
    /// per-driver analyses.
    pub excluded_employee_ids: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            source_sheet: "BRON".into(),
            fields: FieldAliases::default(),
            membership: MembershipConfig::default(),
            pareto_threshold: 0.80,
            unknown_label: "onbekend".into(),
            excluded_employee_ids: vec!["9999".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Field aliases
// ---------------------------------------------------------------------------

/// Accepted header spellings per logical field.
///
/// Matching is case-insensitive and whitespace/punctuation tolerant (see
/// `schema::canonical_header`), so one alias covers "Bus/Tram", "Bus/ Tram"
/// and "Bus / Tram". Defaults carry the header variants seen across the
/// historical extracts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub employee_id: Vec<String>,
    pub driver_name: Vec<String>,
    pub date: Vec<String>,
    pub link: Vec<String>,
    pub location: Vec<String>,
    pub vehicle_number: Vec<String>,
    pub vehicle_type: Vec<String>,
    pub incident_type: Vec<String>,
    pub team_coach: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        FieldAliases {
            employee_id: vec!["personeelsnr".into(), "dienstnummer".into(), "p-nr".into()],
            driver_name: vec!["volledige naam".into(), "naam".into()],
            date: vec!["datum".into(), "date".into()],
            link: vec!["link".into()],
            location: vec!["locatie".into(), "location".into()],
            vehicle_number: vec!["voertuig".into(), "voertuignummer".into()],
            vehicle_type: vec!["bus/tram".into(), "voertuigtype".into()],
            incident_type: vec!["type".into(), "soort".into()],
            team_coach: vec!["teamcoach".into(), "team coach".into()],
        }
    }
}

impl FieldAliases {
    /// (field name, alias list) pairs, for validation and warnings.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        [
            ("employee_id", self.employee_id.as_slice()),
            ("driver_name", self.driver_name.as_slice()),
            ("date", self.date.as_slice()),
            ("link", self.link.as_slice()),
            ("location", self.location.as_slice()),
            ("vehicle_number", self.vehicle_number.as_slice()),
            ("vehicle_type", self.vehicle_type.as_slice()),
            ("incident_type", self.incident_type.as_slice()),
            ("team_coach", self.team_coach.as_slice()),
        ]
        .into_iter()
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// How to locate coaching membership sets in the secondary workbook.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    /// Sheet-name label for the completed-coaching category.
    pub completed_sheet: String,
    /// Sheet-name label for the ongoing-coaching category.
    pub ongoing_sheet: String,
    /// Accepted spellings for the identifier column inside each sheet.
    pub id_aliases: Vec<String>,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        MembershipConfig {
            completed_sheet: "voltooide coachings".into(),
            ongoing_sheet: "coaching".into(),
            id_aliases: vec![
                "p-nr".into(),
                "p_nr".into(),
                "pnr".into(),
                "pnummer".into(),
                "p nr".into(),
                "dienstnummer".into(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.pareto_threshold > 0.0 && self.pareto_threshold <= 1.0) {
            return Err(EngineError::ConfigValidation(format!(
                "pareto_threshold must be in (0, 1], got {}",
                self.pareto_threshold
            )));
        }

        for (field, aliases) in self.fields.iter() {
            if aliases.is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "field '{field}' has no aliases"
                )));
            }
        }

        if self.membership.id_aliases.is_empty() {
            return Err(EngineError::ConfigValidation(
                "membership.id_aliases must not be empty".into(),
            ));
        }

        if self.unknown_label.trim().is_empty() {
            return Err(EngineError::ConfigValidation(
                "unknown_label must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
