use clash_data::{
    Gender,
    StatTable,
};
use serde::{
    Deserialize,
    Serialize,
};

fn default_status() -> String {
    "ok".to_owned()
}

/// A saved move slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Move ID.
    pub kind: String,
    /// Remaining PP.
    ///
    /// If not given, the move starts with full PP.
    #[serde(default)]
    pub pp: Option<u8>,
}

/// The plain record a monster is saved to and loaded from.
///
/// Fields serialize in a fixed order, so saving a loaded record reproduces it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    /// Nickname.
    ///
    /// If not given, the monster goes by its species name.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Species ID.
    pub species: String,
    /// Form ID.
    ///
    /// If not given, the species' default form is used.
    #[serde(default)]
    pub form: Option<String>,
    pub level: u8,
    #[serde(default)]
    pub shiny: bool,
    /// Held item ID.
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    /// Nature ID.
    pub nature: String,
    /// Ability ID.
    pub ability: String,
    /// Innate stat bonuses.
    #[serde(default)]
    pub genes: StatTable,
    /// Trained stat bonuses.
    #[serde(default)]
    pub effort: StatTable,
    /// Calculated stats.
    ///
    /// If not given, stats are calculated from the form's base stats.
    #[serde(default)]
    pub stats: Option<StatTable>,
    #[serde(default)]
    pub tameness: u8,
    /// Current HP.
    ///
    /// If not given, the monster starts at full HP.
    #[serde(default)]
    pub hp: Option<u16>,
    #[serde(default = "default_status")]
    pub status: String,
    pub moves: Vec<MoveRecord>,
}
