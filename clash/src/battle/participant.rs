use std::fmt;

use clash_data::Id;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    mons::Monster,
    trainer::Trainer,
};

/// Identifies one monster on a trainer's team.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MonsterId {
    pub trainer: usize,
    pub index: usize,
}

impl MonsterId {
    pub fn new(trainer: usize, index: usize) -> Self {
        Self { trainer, index }
    }
}

impl fmt::Display for MonsterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trainer, self.index)
    }
}

/// A trainer taking part in a battle: a team, a bag, and whoever decides its commands.
pub struct Participant {
    name: String,
    pub(crate) team: Vec<Monster>,
    pub(crate) items: Vec<Id>,
    pub(crate) controller: Option<Box<dyn Trainer>>,
    pub(crate) side: usize,
    pub(crate) forfeited: bool,
}

impl Participant {
    pub fn new<S>(name: S, team: Vec<Monster>, controller: Box<dyn Trainer>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            team,
            items: Vec::new(),
            controller: Some(controller),
            side: 0,
            forfeited: false,
        }
    }

    /// Fills the trainer's bag.
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = Id>,
    {
        self.items.extend(items);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> &[Monster] {
        &self.team
    }

    /// Items left in the bag.
    pub fn items(&self) -> &[Id] {
        &self.items
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn forfeited(&self) -> bool {
        self.forfeited
    }
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("team", &self.team)
            .field("items", &self.items)
            .field("side", &self.side)
            .field("forfeited", &self.forfeited)
            .finish()
    }
}
