// Auction dataset loading and normalization.
//
// Reads the sold-players CSV once at startup. Every row must parse: a single
// bad price or a missing column aborts the load so the dashboard never runs
// on a partial table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Columns the loader requires in the CSV header.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Players", "Team", "Type", "Nationality", "Price Paid"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The role a player was bought for.
///
/// The four IPL roles are closed; anything else is kept verbatim in `Other`
/// so no rows are lost if the source uses an unexpected label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerType {
    Batsman,
    Bowler,
    WicketKeeper,
    AllRounder,
    Other(String),
}

impl PlayerType {
    /// Parse a `Type` cell. Matching is exact after trimming.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Batsman" => PlayerType::Batsman,
            "Bowler" => PlayerType::Bowler,
            "Wicket Keeper" => PlayerType::WicketKeeper,
            "All-Rounder" => PlayerType::AllRounder,
            other => PlayerType::Other(other.to_string()),
        }
    }

    /// The label as it appears in the source data and in the dropdowns.
    pub fn as_str(&self) -> &str {
        match self {
            PlayerType::Batsman => "Batsman",
            PlayerType::Bowler => "Bowler",
            PlayerType::WicketKeeper => "Wicket Keeper",
            PlayerType::AllRounder => "All-Rounder",
            PlayerType::Other(label) => label,
        }
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PlayerType {
    fn from(raw: String) -> Self {
        PlayerType::parse(&raw)
    }
}

impl From<PlayerType> for String {
    fn from(t: PlayerType) -> Self {
        t.as_str().to_string()
    }
}

/// One sold player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRecord {
    pub player: String,
    pub team: String,
    pub player_type: PlayerType,
    pub nationality: String,
    pub price_paid: u64,
}

/// The full auction table. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<PlayerRecord>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: price paid `{value}` is not an integer")]
    InvalidPrice { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    #[serde(rename = "Players")]
    players: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Type")]
    player_type: String,
    #[serde(rename = "Nationality")]
    nationality: String,
    #[serde(rename = "Price Paid")]
    price_paid: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an auction price, dropping thousands separators first.
///
/// Both western (`1,200,000`) and Indian (`10,50,000`) grouping are accepted
/// since only the commas are removed.
pub fn parse_price(raw: &str) -> Option<u64> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Dataset {
    /// Build a dataset directly from records (tests, fixtures).
    pub fn from_records(records: Vec<PlayerRecord>) -> Self {
        Self { records }
    }

    /// Load the auction table from a CSV file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file)
    }

    /// Load the auction table from any reader producing CSV text.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(rdr);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn(column));
            }
        }

        let mut records = Vec::new();
        for (idx, result) in reader.deserialize::<RawPlayerRow>().enumerate() {
            let raw = result?;
            // Row numbers are 1-based and count the header line.
            let row = idx + 2;
            let price_paid = parse_price(&raw.price_paid).ok_or_else(|| LoadError::InvalidPrice {
                row,
                value: raw.price_paid.clone(),
            })?;
            records.push(PlayerRecord {
                player: raw.players.trim().to_string(),
                team: raw.team.trim().to_string(),
                player_type: PlayerType::parse(&raw.player_type),
                nationality: raw.nationality.trim().to_string(),
                price_paid,
            });
        }

        debug!("loaded {} player records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
