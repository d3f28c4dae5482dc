// Dropdown filters over the auction table.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, PlayerRecord};

/// Dropdown value meaning "do not filter on this field".
pub const OVERALL: &str = "Overall";

/// The three dropdown selections of one interaction.
///
/// Each field is either unset, the `"Overall"` sentinel, or a concrete value
/// compared by exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub player_type: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl FilterSelection {
    /// A selection with no active constraints.
    pub fn overall() -> Self {
        Self::default()
    }

    pub fn with_nationality(mut self, value: impl Into<String>) -> Self {
        self.nationality = Some(value.into());
        self
    }

    pub fn with_player_type(mut self, value: impl Into<String>) -> Self {
        self.player_type = Some(value.into());
        self
    }

    pub fn with_team(mut self, value: impl Into<String>) -> Self {
        self.team = Some(value.into());
        self
    }

    /// True when no field constrains the result.
    pub fn is_unfiltered(&self) -> bool {
        active(&self.nationality).is_none()
            && active(&self.player_type).is_none()
            && active(&self.team).is_none()
    }

    fn matches(&self, record: &PlayerRecord) -> bool {
        field_matches(&self.nationality, &record.nationality)
            && field_matches(&self.player_type, record.player_type.as_str())
            && field_matches(&self.team, &record.team)
    }
}

/// The constraint value of a field, or `None` when it imposes nothing.
/// An empty string counts as unset, like an untouched dropdown.
fn active(selection: &Option<String>) -> Option<&str> {
    match selection.as_deref() {
        None | Some("") | Some(OVERALL) => None,
        Some(value) => Some(value),
    }
}

fn field_matches(selection: &Option<String>, value: &str) -> bool {
    match active(selection) {
        Some(wanted) => wanted == value,
        None => true,
    }
}

/// Records of a dataset that passed a [`FilterSelection`], in dataset order.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a PlayerRecord>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record, unfiltered.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            records: dataset.records().iter().collect(),
        }
    }

    pub fn records(&self) -> &[&'a PlayerRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PlayerRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Apply the selection to the dataset. The three constraints are ANDed.
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView {
        records: dataset
            .records()
            .iter()
            .filter(|r| selection.matches(r))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Dropdown options
// ---------------------------------------------------------------------------

/// Choices for each dropdown: distinct observed values in first-seen order,
/// followed by `"Overall"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub nationality: Vec<String>,
    pub player_type: Vec<String>,
    pub team: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = dataset.records();
        Self {
            nationality: distinct_with_overall(records.iter().map(|r| r.nationality.as_str())),
            player_type: distinct_with_overall(records.iter().map(|r| r.player_type.as_str())),
            team: distinct_with_overall(records.iter().map(|r| r.team.as_str())),
        }
    }
}

fn distinct_with_overall<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out.push(OVERALL.to_string());
    out
}
