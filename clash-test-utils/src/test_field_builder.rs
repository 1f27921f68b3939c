use std::sync::Arc;

use anyhow::Result;
use clash::{
    battle::{
        Field,
        FieldOptions,
        Participant,
        RngFactory,
    },
    config::{
        Clause,
        Rules,
    },
    effect::EffectLibrary,
    mons::Monster,
    trainer::{
        DeferredTrainer,
        Trainer,
    },
};
use clash_data::{
    Id,
    LocalLoader,
};

use crate::{
    ControlledRandomNumberGenerator,
    test_loader,
    test_team,
};

/// Field builder for integration tests.
///
/// Trainers are numbered in the order they are added. Without a format, trainer 0 battles
/// trainer 1 in singles.
pub struct TestFieldBuilder {
    loader: Arc<LocalLoader>,
    rules: Rules,
    options: FieldOptions,
    participants: Vec<Participant>,
    controlled_rng: bool,
}

impl TestFieldBuilder {
    pub fn new() -> Self {
        let loader = test_loader();
        Self {
            rules: Rules::new(loader.clone()),
            loader,
            options: FieldOptions::default(),
            participants: Vec::new(),
            controlled_rng: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn with_allow_run(mut self, allow_run: bool) -> Self {
        self.options.allow_run = allow_run;
        self
    }

    /// Uses a [`ControlledRandomNumberGenerator`], reachable through
    /// [`get_controlled_rng`][`crate::get_controlled_rng`].
    pub fn with_controlled_rng(mut self, controlled_rng: bool) -> Self {
        self.controlled_rng = controlled_rng;
        self
    }

    pub fn with_rng_factory(mut self, rng_factory: RngFactory) -> Self {
        self.options.rng_factory = rng_factory;
        self
    }

    pub fn with_format(mut self, format: Vec<Vec<usize>>) -> Self {
        self.rules = self.rules.with_format(format);
        self
    }

    pub fn with_clause<C>(mut self, clause: C) -> Self
    where
        C: Clause + 'static,
    {
        self.rules = self.rules.with_clause(clause);
        self
    }

    pub fn with_library(mut self, library: Arc<dyn EffectLibrary>) -> Self {
        self.rules = self.rules.with_library(library);
        self
    }

    /// Adds a trainer whose commands are selected through [`Field::select_command`].
    pub fn add_trainer(self, name: &str, species: &[&str]) -> Self {
        let team = test_team(&self.loader, species);
        self.add_trainer_with(name, team, Box::new(DeferredTrainer))
    }

    pub fn add_trainer_with(
        mut self,
        name: &str,
        team: Vec<Monster>,
        controller: Box<dyn Trainer>,
    ) -> Self {
        self.participants
            .push(Participant::new(name, team, controller));
        self
    }

    /// Fills the bag of the most recently added trainer.
    pub fn with_items(mut self, items: &[&str]) -> Self {
        if let Some(participant) = self.participants.pop() {
            self.participants
                .push(participant.with_items(items.iter().map(|item| Id::from(*item))));
        }
        self
    }

    /// Validates the trainers and builds the field, without starting the battle.
    pub fn build(mut self) -> Result<Field> {
        if self.controlled_rng {
            self.options.rng_factory =
                |seed: Option<u64>| Box::new(ControlledRandomNumberGenerator::new(seed));
        }
        self.rules.field(self.participants, self.options)
    }
}
