use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use crate::battle::BattlerHandle;

/// Identifies one spot on the field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SpotId {
    pub side: usize,
    pub spot: usize,
}

impl SpotId {
    pub fn new(side: usize, spot: usize) -> Self {
        Self { side, spot }
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.side, self.spot)
    }
}

/// A position on a side, owned by one trainer for the whole battle.
#[derive(Debug, Clone)]
pub struct Spot {
    id: SpotId,
    trainer: usize,
    pub(crate) battler: Option<BattlerHandle>,
}

impl Spot {
    pub(crate) fn new(id: SpotId, trainer: usize) -> Self {
        Self {
            id,
            trainer,
            battler: None,
        }
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    /// The trainer that sends battlers out to this spot.
    pub fn trainer(&self) -> usize {
        self.trainer
    }

    /// The battler currently standing on the spot, fainted or not.
    pub fn battler(&self) -> Option<BattlerHandle> {
        self.battler
    }
}

/// A group of spots sharing one role in battle.
#[derive(Debug, Clone)]
pub struct Side {
    index: usize,
    spots: Vec<Spot>,
}

impl Side {
    pub(crate) fn new(index: usize, trainers: &[usize]) -> Self {
        Self {
            index,
            spots: trainers
                .iter()
                .enumerate()
                .map(|(spot, trainer)| Spot::new(SpotId::new(index, spot), *trainer))
                .collect(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub(crate) fn spot_mut(&mut self, spot: usize) -> Option<&mut Spot> {
        self.spots.get_mut(spot)
    }

    /// Every trainer with a spot on this side, in spot order and without duplicates.
    pub fn trainers(&self) -> Vec<usize> {
        let mut trainers = Vec::new();
        for spot in &self.spots {
            if !trainers.contains(&spot.trainer) {
                trainers.push(spot.trainer);
            }
        }
        trainers
    }

    /// Battlers standing on the side's spots, fainted or not.
    pub fn battlers(&self) -> impl Iterator<Item = BattlerHandle> + '_ {
        self.spots.iter().filter_map(|spot| spot.battler)
    }
}

#[cfg(test)]
mod side_test {
    use pretty_assertions::assert_eq;

    use crate::battle::{
        Side,
        SpotId,
    };

    #[test]
    fn lays_out_spots_for_trainers() {
        let side = Side::new(1, &[2, 3, 2]);
        assert_eq!(
            side.spots()
                .iter()
                .map(|spot| (spot.id(), spot.trainer()))
                .collect::<Vec<_>>(),
            vec![
                (SpotId::new(1, 0), 2),
                (SpotId::new(1, 1), 3),
                (SpotId::new(1, 2), 2)
            ]
        );
        assert_eq!(side.trainers(), vec![2, 3]);
        assert_eq!(side.battlers().count(), 0);
    }

    #[test]
    fn spot_ids_sort_by_side_then_spot() {
        assert!(SpotId::new(0, 1) < SpotId::new(1, 0));
        assert!(SpotId::new(1, 0) < SpotId::new(1, 1));
        assert_eq!(SpotId::new(1, 2).to_string(), "1,2");
    }
}
