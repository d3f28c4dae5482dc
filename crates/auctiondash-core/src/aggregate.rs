// Per-team summaries feeding the three charts.
//
// All derivations are total over any view, including the empty one, and
// deterministic: team tallies keep first-seen order, the (team, type)
// grouping is sorted by team then type.

use std::collections::{BTreeMap, HashMap};

use crate::dataset::PlayerType;
use crate::filter::FilteredView;

/// Colour used for any type outside the four known roles.
pub const DEFAULT_TYPE_COLOR: &str = "#7f8c8d";

/// Fixed display colour of a player type.
pub fn type_color(player_type: &PlayerType) -> &'static str {
    match player_type {
        PlayerType::Batsman => "#3498db",
        PlayerType::Bowler => "#2ecc71",
        PlayerType::WicketKeeper => "#e74c3c",
        PlayerType::AllRounder => "#f39c12",
        PlayerType::Other(_) => DEFAULT_TYPE_COLOR,
    }
}

/// Number of players in one (team, type) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    pub team: String,
    pub player_type: PlayerType,
    pub count: usize,
}

/// Sum `value` per team, keeping teams in the order they first appear.
fn tally_by_team<T, F>(view: &FilteredView<'_>, mut value: F) -> Vec<(String, T)>
where
    T: Copy + Default + std::ops::AddAssign,
    F: FnMut(&crate::dataset::PlayerRecord) -> T,
{
    let mut order: Vec<(String, T)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in view.iter() {
        let slot = *index.entry(record.team.as_str()).or_insert_with(|| {
            order.push((record.team.clone(), T::default()));
            order.len() - 1
        });
        order[slot].1 += value(record);
    }
    order
}

/// Players bought per team.
pub fn count_by_team(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    tally_by_team(view, |_| 1usize)
}

/// Total price paid per team. Proportions are left to the chart.
pub fn spend_share_by_team(view: &FilteredView<'_>) -> Vec<(String, u64)> {
    tally_by_team(view, |r| r.price_paid)
}

/// Players per (team, type), sorted by team then type label.
pub fn type_composition_by_team(view: &FilteredView<'_>) -> Vec<TypeCount> {
    let mut groups: BTreeMap<(&str, &str), (PlayerType, usize)> = BTreeMap::new();
    for record in view.iter() {
        groups
            .entry((record.team.as_str(), record.player_type.as_str()))
            .or_insert_with(|| (record.player_type.clone(), 0))
            .1 += 1;
    }
    groups
        .into_iter()
        .map(|((team, _), (player_type, count))| TypeCount {
            team: team.to_string(),
            player_type,
            count,
        })
        .collect()
}
