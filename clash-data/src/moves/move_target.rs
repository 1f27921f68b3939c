use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// The acceptable target(s) of a move.
///
/// In this enum, "opponent" means a battler on another side, and "ally" means a different
/// battler on the user's side.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum MoveTarget {
    /// Any other battler of the user's choice.
    #[string = "SelectedBattler"]
    #[default]
    SelectedBattler,
    /// An ally of the user's choice.
    #[string = "Ally"]
    Ally,
    /// The user or an ally of the user's choice.
    #[string = "UserOrAlly"]
    UserOrAlly,
    /// The user of the move.
    #[string = "User"]
    User,
    /// A random opponent.
    #[string = "RandomOpponent"]
    RandomOpponent,
    /// All opponents at once.
    #[string = "AllOpponents"]
    AllOpponents,
    /// All battlers other than the user.
    #[string = "AllOthers"]
    AllOthers,
    /// All battlers, including the user.
    #[string = "AllBattlers"]
    AllBattlers,
    /// The user's side, not any battler on it.
    #[string = "UsersSide"]
    UsersSide,
    /// The opposing side, not any battler on it.
    #[string = "OpponentsSide"]
    OpponentsSide,
    /// The whole field.
    #[string = "EntireField"]
    EntireField,
}

impl MoveTarget {
    /// Does the move require a chosen target?
    pub fn choosable(&self) -> bool {
        match self {
            Self::SelectedBattler | Self::Ally | Self::UserOrAlly => true,
            _ => false,
        }
    }

    /// Does the move affect an area rather than battlers?
    pub fn affects_area(&self) -> bool {
        match self {
            Self::UsersSide | Self::OpponentsSide | Self::EntireField => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod move_target_test {
    use crate::{
        MoveTarget,
        test_util::{
            test_string_deserialization,
            test_string_serialization,
        },
    };

    #[test]
    fn serializes_to_string() {
        test_string_serialization(MoveTarget::SelectedBattler, "SelectedBattler");
        test_string_serialization(MoveTarget::AllOpponents, "AllOpponents");
        test_string_deserialization("randomopponent", MoveTarget::RandomOpponent);
    }

    #[test]
    fn only_selection_targets_are_choosable() {
        assert!(MoveTarget::SelectedBattler.choosable());
        assert!(MoveTarget::UserOrAlly.choosable());
        assert!(!MoveTarget::User.choosable());
        assert!(!MoveTarget::AllOpponents.choosable());
        assert!(MoveTarget::EntireField.affects_area());
    }
}
