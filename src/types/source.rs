//! Source records returned alongside an answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A ranked supporting record.
///
/// `document` is kept exactly as the service delivered it; case fields are
/// read through [`CaseField`] so a missing or oddly typed value never
/// fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRecord {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub document: Value,
}

impl SourceRecord {
    pub fn new(id: impl Into<String>, score: f64, document: Value) -> Self {
        Self {
            id: id.into(),
            score,
            document,
        }
    }

    /// Display text for a case field, `None` when absent or null.
    pub fn field(&self, field: CaseField) -> Option<String> {
        let value = self.document.get(field.key())?;
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
            other => Some(other.to_string()),
        }
    }
}

/// Named fields of a case profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseField {
    Age,
    Gender,
    BloodPressure,
    CholesterolLevel,
    Cough,
    Fever,
    Fatigue,
    DifficultyBreathing,
    Disease,
}

impl CaseField {
    /// Fields shown in a case panel, in display order.
    pub const PANEL: [CaseField; 8] = [
        CaseField::Age,
        CaseField::Gender,
        CaseField::Cough,
        CaseField::Fever,
        CaseField::Fatigue,
        CaseField::DifficultyBreathing,
        CaseField::BloodPressure,
        CaseField::CholesterolLevel,
    ];

    /// Key in the source document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::BloodPressure => "Blood Pressure",
            Self::CholesterolLevel => "Cholesterol Level",
            Self::Cough => "Cough",
            Self::Fever => "Fever",
            Self::Fatigue => "Fatigue",
            Self::DifficultyBreathing => "Difficulty Breathing",
            Self::Disease => "Disease",
        }
    }

    /// Short label used in the panel grid.
    pub fn label(self) -> &'static str {
        match self {
            Self::DifficultyBreathing => "Breathing",
            Self::BloodPressure => "BP",
            Self::CholesterolLevel => "Cholesterol",
            other => other.key(),
        }
    }
}

// Hosted indexes hand out both numeric and string ids.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
