use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::Stat;

/// The category of a move, which decides the stats used in damage calculation.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum MoveCategory {
    #[string = "Physical"]
    Physical,
    #[string = "Special"]
    Special,
    #[string = "Status"]
    #[default]
    Status,
}

impl MoveCategory {
    /// The attacking and defending stats used for damage, if the category deals damage.
    pub fn damage_stats(&self) -> Option<(Stat, Stat)> {
        match self {
            Self::Physical => Some((Stat::Atk, Stat::Def)),
            Self::Special => Some((Stat::SpAtk, Stat::SpDef)),
            Self::Status => None,
        }
    }
}

#[cfg(test)]
mod move_category_test {
    use crate::{
        MoveCategory,
        Stat,
        test_util::{
            test_string_deserialization,
            test_string_serialization,
        },
    };

    #[test]
    fn serializes_to_string() {
        test_string_serialization(MoveCategory::Physical, "Physical");
        test_string_serialization(MoveCategory::Status, "Status");
        test_string_deserialization("special", MoveCategory::Special);
    }

    #[test]
    fn selects_damage_stats() {
        assert_eq!(
            MoveCategory::Physical.damage_stats(),
            Some((Stat::Atk, Stat::Def))
        );
        assert_eq!(
            MoveCategory::Special.damage_stats(),
            Some((Stat::SpAtk, Stat::SpDef))
        );
        assert_eq!(MoveCategory::Status.damage_stats(), None);
    }
}
