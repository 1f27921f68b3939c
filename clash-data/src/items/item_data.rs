use serde::{
    Deserialize,
    Serialize,
};

/// Data about an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    /// Name of the item.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Can the item be used from the bag during battle?
    #[serde(default)]
    pub usable_in_battle: bool,
}
