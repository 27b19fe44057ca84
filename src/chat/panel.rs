//! Fact panels for retrieved case records.

use crate::types::{CaseField, SourceRecord};

use super::MAX_VISIBLE_SOURCES;

/// Shown in place of a field the record does not carry.
pub const PLACEHOLDER: &str = "n/a";

/// One rendered case card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePanel {
    /// 1-based position in the result list.
    pub number: usize,
    pub source_id: String,
    pub disease: String,
    /// One `(label, value)` row per field in [`CaseField::PANEL`].
    pub rows: Vec<(&'static str, String)>,
}

impl CasePanel {
    pub fn from_source(number: usize, source: &SourceRecord) -> Self {
        let rows = CaseField::PANEL
            .iter()
            .map(|field| (field.label(), display_value(source, *field)))
            .collect();
        Self {
            number,
            source_id: source.id.clone(),
            disease: display_value(source, CaseField::Disease),
            rows,
        }
    }

    pub fn title(&self) -> String {
        format!("Case {}: {}", self.number, self.disease)
    }
}

/// Panels for the first [`MAX_VISIBLE_SOURCES`] records, in service order.
pub fn case_panels(sources: &[SourceRecord]) -> Vec<CasePanel> {
    sources
        .iter()
        .take(MAX_VISIBLE_SOURCES)
        .enumerate()
        .map(|(index, source)| CasePanel::from_source(index + 1, source))
        .collect()
}

fn display_value(source: &SourceRecord, field: CaseField) -> String {
    source
        .field(field)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
