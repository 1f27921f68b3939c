use serde::{
    Deserialize,
    Serialize,
};

/// Data about an ability.
///
/// The behavior of an ability is supplied by the battle engine's effect library, keyed by the
/// ability's ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityData {
    /// Name of the ability.
    pub name: String,
    #[serde(default)]
    pub description: String,
}
