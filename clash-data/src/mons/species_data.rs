use serde::{
    Deserialize,
    Serialize,
};

use crate::Id;

/// Data about a species.
///
/// A species groups one or more forms. All battle-relevant numbers live on [`FormData`][`crate::FormData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    /// Name of the species.
    pub name: String,
    /// The form a newly-created monster of this species takes.
    pub default_form: Id,
    /// Percentage chance that a monster of this species is female.
    ///
    /// Genderless species have no ratio.
    #[serde(default)]
    pub female_percentage: Option<u8>,
}
