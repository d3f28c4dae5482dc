// Filter-and-recompute pipeline behind every dropdown change.
//
// `Dashboard` owns the dataset and the unfiltered charts computed once at
// construction. `refresh` is a pure function of the selection: filter, then
// aggregate, then pick the price extremes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::{ChartSet, ChartSpec};
use crate::dataset::{Dataset, PlayerRecord};
use crate::filter::{self, FilterOptions, FilterSelection, FilteredView};

/// Label text shown in both cards when no record matches.
pub const NO_DATA_LABEL: &str = "No data for the selected filters";

/// Everything the page re-renders after a filter change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOutput {
    pub histogram: ChartSpec,
    pub pie: ChartSpec,
    pub bar: ChartSpec,
    pub highest_paid: String,
    pub lowest_paid: String,
}

impl DashboardOutput {
    fn from_parts(charts: ChartSet, highest_paid: String, lowest_paid: String) -> Self {
        Self {
            histogram: charts.histogram,
            pie: charts.pie,
            bar: charts.bar,
            highest_paid,
            lowest_paid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    options: FilterOptions,
    base: ChartSet,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        let base = ChartSet::build(&FilteredView::all(&dataset));
        let options = FilterOptions::from_dataset(&dataset);
        Self {
            dataset,
            options,
            base,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Charts of the unfiltered dataset.
    pub fn base_charts(&self) -> &ChartSet {
        &self.base
    }

    /// Recompute the dashboard for a selection.
    ///
    /// An empty result falls back to the base charts while both labels
    /// report that nothing matched.
    pub fn refresh(&self, selection: &FilterSelection) -> DashboardOutput {
        let view = filter::apply(&self.dataset, selection);
        debug!(?selection, matched = view.len(), "refreshing dashboard");

        let (Some(highest), Some(lowest)) = (highest_paid(&view), lowest_paid(&view)) else {
            return DashboardOutput::from_parts(
                self.base.clone(),
                NO_DATA_LABEL.to_string(),
                NO_DATA_LABEL.to_string(),
            );
        };

        DashboardOutput::from_parts(
            ChartSet::build(&view),
            highest.player.clone(),
            lowest.player.clone(),
        )
    }
}

/// Record with the largest price; the earliest one wins a tie.
pub fn highest_paid<'a>(view: &FilteredView<'a>) -> Option<&'a PlayerRecord> {
    view.iter().fold(None, |best, r| match best {
        Some(b) if b.price_paid >= r.price_paid => Some(b),
        _ => Some(r),
    })
}

/// Record with the smallest price; the earliest one wins a tie.
pub fn lowest_paid<'a>(view: &FilteredView<'a>) -> Option<&'a PlayerRecord> {
    view.iter().fold(None, |best, r| match best {
        Some(b) if b.price_paid <= r.price_paid => Some(b),
        _ => Some(r),
    })
}
