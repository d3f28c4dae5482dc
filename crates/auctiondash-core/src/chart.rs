// Declarative chart descriptions handed to the browser.
//
// The page maps these onto plotly traces; nothing here knows about drawing.

use serde::{Deserialize, Serialize};

use crate::aggregate::{self, TypeCount};
use crate::filter::FilteredView;

pub const HISTOGRAM_TITLE: &str = "Number of Players Each Team Purchased";
pub const PIE_TITLE: &str = "% Team Used in Total Spent";
pub const BAR_TITLE: &str = "Different Types of Players in Each Team";

const TEAM_AXIS: &str = "Team Name";
const HISTOGRAM_Y_AXIS: &str = "No. of Players";
const BAR_Y_AXIS: &str = "No of Players of Each Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Pie,
    /// Series are stacked on top of each other.
    StackedBar,
}

/// One trace: parallel label/value columns and an optional fixed colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
    pub series: Vec<Series>,
}

/// The three charts of one dashboard state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSet {
    pub histogram: ChartSpec,
    pub pie: ChartSpec,
    pub bar: ChartSpec,
}

impl ChartSet {
    pub fn build(view: &FilteredView<'_>) -> Self {
        Self {
            histogram: histogram(view),
            pie: pie(view),
            bar: type_bar(view),
        }
    }
}

/// Players bought per team.
pub fn histogram(view: &FilteredView<'_>) -> ChartSpec {
    let (labels, values) = aggregate::count_by_team(view)
        .into_iter()
        .map(|(team, n)| (team, n as u64))
        .unzip();
    ChartSpec {
        kind: ChartKind::Histogram,
        title: HISTOGRAM_TITLE.into(),
        x_axis_title: Some(TEAM_AXIS.into()),
        y_axis_title: Some(HISTOGRAM_Y_AXIS.into()),
        series: vec![Series {
            name: None,
            labels,
            values,
            color: None,
        }],
    }
}

/// Share of total spend per team.
pub fn pie(view: &FilteredView<'_>) -> ChartSpec {
    let (labels, values) = aggregate::spend_share_by_team(view).into_iter().unzip();
    ChartSpec {
        kind: ChartKind::Pie,
        title: PIE_TITLE.into(),
        x_axis_title: None,
        y_axis_title: None,
        series: vec![Series {
            name: None,
            labels,
            values,
            color: None,
        }],
    }
}

/// Player-type composition per team, one series per type.
pub fn type_bar(view: &FilteredView<'_>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::StackedBar,
        title: BAR_TITLE.into(),
        x_axis_title: Some(TEAM_AXIS.into()),
        y_axis_title: Some(BAR_Y_AXIS.into()),
        series: series_per_type(aggregate::type_composition_by_team(view)),
    }
}

/// Split grouped rows into one series per type, types in first-seen order.
fn series_per_type(rows: Vec<TypeCount>) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();
    for row in rows {
        let label = row.player_type.as_str();
        let pos = match series.iter().position(|s| s.name.as_deref() == Some(label)) {
            Some(pos) => pos,
            None => {
                series.push(Series {
                    name: Some(label.to_string()),
                    labels: Vec::new(),
                    values: Vec::new(),
                    color: Some(aggregate::type_color(&row.player_type).to_string()),
                });
                series.len() - 1
            }
        };
        series[pos].labels.push(row.team);
        series[pos].values.push(row.count as u64);
    }
    series
}
