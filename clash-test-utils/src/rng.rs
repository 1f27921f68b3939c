use std::{
    any::Any,
    collections::hash_map::Entry,
};

use ahash::{
    HashMap,
    HashMapExt,
};
use clash::battle::Field;
use clash_prng::{
    PseudoRandomNumberGenerator,
    RealPseudoRandomNumberGenerator,
};

/// A controlled random number generator, for tests that need fine-grained control over battle RNG.
pub struct ControlledRandomNumberGenerator {
    count: usize,
    fake_values: HashMap<usize, u64>,
    real: RealPseudoRandomNumberGenerator,
}

impl ControlledRandomNumberGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            count: 0,
            fake_values: HashMap::new(),
            real: RealPseudoRandomNumberGenerator::new(seed),
        }
    }

    pub fn sequence_count(&self) -> usize {
        self.count
    }

    pub fn insert_fake_value(&mut self, count: usize, value: u64) {
        self.fake_values.insert(count, value);
    }

    pub fn insert_fake_values<I>(&mut self, iterable: I)
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        self.fake_values.extend(iterable);
    }

    pub fn insert_fake_values_relative_to_sequence_count<I>(&mut self, iterable: I)
    where
        I: IntoIterator<Item = (usize, u64)>,
    {
        let count = self.count;
        self.fake_values.extend(
            iterable
                .into_iter()
                .map(|(offset, value)| (offset + count, value)),
        );
    }
}

impl PseudoRandomNumberGenerator for ControlledRandomNumberGenerator {
    fn initial_seed(&self) -> u64 {
        self.real.initial_seed()
    }

    fn next(&mut self) -> u64 {
        // Roll the underlying generator anyway, so faking a value never shifts the sequence.
        let next = self.real.next();
        self.count += 1;
        match self.fake_values.entry(self.count) {
            Entry::Occupied(fake) => fake.remove(),
            Entry::Vacant(_) => next,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Returns the same value forever.
///
/// With a value of 0, every chance roll succeeds and every range roll lands on its minimum.
pub struct FixedRandomNumberGenerator {
    value: u64,
}

impl FixedRandomNumberGenerator {
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

impl PseudoRandomNumberGenerator for FixedRandomNumberGenerator {
    fn initial_seed(&self) -> u64 {
        0
    }

    fn next(&mut self) -> u64 {
        self.value
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Returns the field's generator, if it is a [`ControlledRandomNumberGenerator`].
pub fn get_controlled_rng(field: &mut Field) -> Option<&mut ControlledRandomNumberGenerator> {
    field
        .prng()
        .as_any_mut()
        .downcast_mut::<ControlledRandomNumberGenerator>()
}

/// Rolls that keep damage tests exact.
///
/// Every draw is 15: full accuracy hits, critical hits and secondary effects never trigger, and
/// damage variance rolls 100%.
pub fn max_damage_rng(_: Option<u64>) -> Box<dyn PseudoRandomNumberGenerator> {
    Box::new(FixedRandomNumberGenerator::new(15))
}
