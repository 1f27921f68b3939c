use anyhow::Error;
use clash_data::Stat;
use serde::{
    Deserialize,
    Serialize,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::error::illegal_usage;

/// A single stat that carries a stage in battle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Boost {
    #[string = "atk"]
    #[alias = "Attack"]
    Atk,
    #[string = "def"]
    #[alias = "Defense"]
    Def,
    #[string = "spa"]
    #[alias = "spatk"]
    #[alias = "Special Attack"]
    SpAtk,
    #[string = "spd"]
    #[alias = "spdef"]
    #[alias = "Special Defense"]
    SpDef,
    #[string = "spe"]
    #[alias = "Speed"]
    Spe,
    #[string = "acc"]
    #[alias = "Accuracy"]
    Accuracy,
    #[string = "eva"]
    #[alias = "Evasion"]
    Evasion,
}

impl Boost {
    /// The lowest stage a stat can reach.
    pub const MIN_STAGE: i8 = -6;
    /// The highest stage a stat can reach.
    pub const MAX_STAGE: i8 = 6;

    /// The permanent stat this boost applies to, if any.
    ///
    /// Accuracy and evasion only exist in battle.
    pub fn stat(&self) -> Option<Stat> {
        match self {
            Self::Atk => Some(Stat::Atk),
            Self::Def => Some(Stat::Def),
            Self::SpAtk => Some(Stat::SpAtk),
            Self::SpDef => Some(Stat::SpDef),
            Self::Spe => Some(Stat::Spe),
            Self::Accuracy | Self::Evasion => None,
        }
    }

    /// The base of the stage ratio: 2 for permanent stats, 3 for battle-only stats.
    pub fn stage_base(&self) -> u64 {
        match self.stat() {
            Some(_) => 2,
            None => 3,
        }
    }
}

impl TryFrom<Stat> for Boost {
    type Error = Error;
    fn try_from(value: Stat) -> Result<Self, Self::Error> {
        match value {
            Stat::HP => Err(illegal_usage("HP cannot be boosted")),
            Stat::Atk => Ok(Self::Atk),
            Stat::Def => Ok(Self::Def),
            Stat::SpAtk => Ok(Self::SpAtk),
            Stat::SpDef => Ok(Self::SpDef),
            Stat::Spe => Ok(Self::Spe),
        }
    }
}

/// A stat value a battler can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleStat {
    /// A stat that persists outside of battle.
    Permanent(Stat),
    /// Accuracy, which starts at 1.
    Accuracy,
    /// Evasion, which starts at 1.
    Evasion,
}

impl BattleStat {
    /// The boost that applies to this stat, if any.
    pub fn boost(&self) -> Option<Boost> {
        match self {
            Self::Permanent(stat) => Boost::try_from(*stat).ok(),
            Self::Accuracy => Some(Boost::Accuracy),
            Self::Evasion => Some(Boost::Evasion),
        }
    }
}

impl From<Stat> for BattleStat {
    fn from(value: Stat) -> Self {
        Self::Permanent(value)
    }
}

/// Stages for every boostable stat, each within [`Boost::MIN_STAGE`] and [`Boost::MAX_STAGE`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostTable {
    #[serde(default)]
    pub atk: i8,
    #[serde(default)]
    pub def: i8,
    #[serde(default)]
    pub spa: i8,
    #[serde(default)]
    pub spd: i8,
    #[serde(default)]
    pub spe: i8,
    #[serde(default)]
    pub acc: i8,
    #[serde(default)]
    pub eva: i8,
}

impl BoostTable {
    /// Returns the stage of a single stat.
    pub fn get(&self, boost: Boost) -> i8 {
        match boost {
            Boost::Atk => self.atk,
            Boost::Def => self.def,
            Boost::SpAtk => self.spa,
            Boost::SpDef => self.spd,
            Boost::Spe => self.spe,
            Boost::Accuracy => self.acc,
            Boost::Evasion => self.eva,
        }
    }

    fn get_mut(&mut self, boost: Boost) -> &mut i8 {
        match boost {
            Boost::Atk => &mut self.atk,
            Boost::Def => &mut self.def,
            Boost::SpAtk => &mut self.spa,
            Boost::SpDef => &mut self.spd,
            Boost::Spe => &mut self.spe,
            Boost::Accuracy => &mut self.acc,
            Boost::Evasion => &mut self.eva,
        }
    }

    /// Changes the stage of a stat, clamping the result.
    ///
    /// Returns the delta actually applied, which is zero if the stat is already at the limit.
    pub fn change(&mut self, boost: Boost, delta: i8) -> i8 {
        let stage = self.get_mut(boost);
        let previous = *stage;
        *stage = previous
            .saturating_add(delta)
            .clamp(Boost::MIN_STAGE, Boost::MAX_STAGE);
        *stage - previous
    }

    /// Resets every stage to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod boosts_test {
    use clash_data::Stat;

    use crate::battle::{
        BattleStat,
        Boost,
        BoostTable,
    };

    #[test]
    fn clamps_and_reports_actual_delta() {
        let mut boosts = BoostTable::default();
        assert_eq!(boosts.change(Boost::Atk, 4), 4);
        assert_eq!(boosts.change(Boost::Atk, 4), 2);
        assert_eq!(boosts.get(Boost::Atk), 6);
        assert_eq!(boosts.change(Boost::Atk, 2), 0);
        assert_eq!(boosts.get(Boost::Atk), 6);
        assert_eq!(boosts.change(Boost::Evasion, -7), -6);
        assert_eq!(boosts.change(Boost::Evasion, i8::MIN), 0);
        assert_eq!(boosts.get(Boost::Evasion), -6);
    }

    #[test]
    fn maps_stats_to_boosts() {
        assert!(Boost::try_from(Stat::HP).is_err());
        assert_eq!(Boost::try_from(Stat::Spe).unwrap(), Boost::Spe);
        assert_eq!(BattleStat::Permanent(Stat::HP).boost(), None);
        assert_eq!(BattleStat::Accuracy.boost(), Some(Boost::Accuracy));
        assert_eq!(Boost::Def.stage_base(), 2);
        assert_eq!(Boost::Evasion.stage_base(), 3);
    }
}
