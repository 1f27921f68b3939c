use std::sync::Arc;

use clash_data::Id;
use hashbrown::HashMap;

use crate::effect::Effect;

/// Supplies the effects that back abilities, items and moves.
///
/// A move effect is applied to its user for the turn the move is selected, so it can intercept
/// every step of that move's use.
pub trait EffectLibrary: Send + Sync {
    fn ability_effect(&self, ability: &Id) -> Option<Arc<dyn Effect>>;
    fn item_effect(&self, item: &Id) -> Option<Arc<dyn Effect>>;
    fn move_effect(&self, id: &Id) -> Option<Arc<dyn Effect>>;
}

/// An [`EffectLibrary`] backed by maps from ID to effect.
#[derive(Default, Clone)]
pub struct MapEffectLibrary {
    abilities: HashMap<Id, Arc<dyn Effect>>,
    items: HashMap<Id, Arc<dyn Effect>>,
    moves: HashMap<Id, Arc<dyn Effect>>,
}

impl MapEffectLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ability(mut self, id: Id, effect: Arc<dyn Effect>) -> Self {
        self.abilities.insert(id, effect);
        self
    }

    pub fn with_item(mut self, id: Id, effect: Arc<dyn Effect>) -> Self {
        self.items.insert(id, effect);
        self
    }

    pub fn with_move(mut self, id: Id, effect: Arc<dyn Effect>) -> Self {
        self.moves.insert(id, effect);
        self
    }
}

impl EffectLibrary for MapEffectLibrary {
    fn ability_effect(&self, ability: &Id) -> Option<Arc<dyn Effect>> {
        self.abilities.get(ability).cloned()
    }

    fn item_effect(&self, item: &Id) -> Option<Arc<dyn Effect>> {
        self.items.get(item).cloned()
    }

    fn move_effect(&self, id: &Id) -> Option<Arc<dyn Effect>> {
        self.moves.get(id).cloned()
    }
}
