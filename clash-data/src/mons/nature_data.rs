use serde::{
    Deserialize,
    Serialize,
};

use crate::Stat;

/// Data about a nature, which raises one stat by 10% and lowers another by 10%.
///
/// Neutral natures raise and lower nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatureData {
    /// Name of the nature.
    pub name: String,
    #[serde(default)]
    pub increased: Option<Stat>,
    #[serde(default)]
    pub decreased: Option<Stat>,
}
