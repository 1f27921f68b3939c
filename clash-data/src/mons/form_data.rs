use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    Id,
    StatTable,
    Type,
};

/// Data about a single form of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    /// Name of the form.
    pub name: String,
    /// The species this form belongs to.
    pub species: Id,
    /// Types of the form, at most two.
    pub types: Vec<Type>,
    /// Base stats.
    pub base_stats: StatTable,
}

impl FormData {
    /// Does the form have the given type?
    pub fn has_type(&self, typ: Type) -> bool {
        self.types.contains(&typ)
    }
}
