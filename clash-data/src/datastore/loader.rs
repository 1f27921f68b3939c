use std::{
    str::FromStr,
    sync::Arc,
};

use anyhow::{
    Error,
    Result,
};

use crate::{
    AbilityData,
    FormData,
    Id,
    ItemData,
    MoveData,
    NatureData,
    SpeciesData,
    Stat,
    TypeChart,
};

/// Lookup service for all descriptive data a battle needs.
///
/// Implementations must be deterministic and free of side effects, but may cache. Records are
/// shared behind [`Arc`], since many battlers can reference the same move or form at once.
///
/// Lookups fail with an error if the ID does not exist. Those failures happen while building
/// monsters and battles, never in the middle of a turn.
pub trait Loader: Send + Sync {
    /// Loads a move by ID.
    fn load_move(&self, id: &Id) -> Result<Arc<MoveData>>;
    /// Loads an ability by ID.
    fn load_ability(&self, id: &Id) -> Result<Arc<AbilityData>>;
    /// Loads an item by ID.
    fn load_item(&self, id: &Id) -> Result<Arc<ItemData>>;
    /// Loads a nature by ID.
    fn load_nature(&self, id: &Id) -> Result<Arc<NatureData>>;
    /// Loads a species by ID.
    fn load_species(&self, id: &Id) -> Result<Arc<SpeciesData>>;
    /// Loads a form by ID.
    fn load_form(&self, id: &Id) -> Result<Arc<FormData>>;
    /// Loads the move substituted when a battler has no legal move.
    fn load_struggle(&self) -> Result<Arc<MoveData>>;
    /// Loads the type chart.
    fn type_chart(&self) -> Result<Arc<TypeChart>>;

    /// Resolves a stat from its identifier.
    fn load_stat(&self, id: &Id) -> Result<Stat> {
        Stat::from_str(id.as_str()).map_err(|_| Error::msg(format!("stat {id} does not exist")))
    }

    /// The stats that persist on a monster outside of battle, in order.
    fn permanent_stats(&self) -> &[Stat] {
        &Stat::ALL
    }
}
