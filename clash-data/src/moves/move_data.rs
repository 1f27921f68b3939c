use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    Accuracy,
    MoveCategory,
    MoveTarget,
    Type,
};

/// Data about a particular move.
///
/// Every monster enters a battle with a small set of moves. Each turn, a battler may use one of
/// them. What a move does beyond dealing damage is implemented by effects in the battle engine.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    /// Name of the move.
    pub name: String,
    /// Move category.
    pub category: MoveCategory,
    /// Move type.
    #[serde(rename = "type")]
    pub primary_type: Type,
    /// Base power, if the move deals damage.
    #[serde(default)]
    pub base_power: Option<u32>,
    /// Base accuracy.
    #[serde(default)]
    pub accuracy: Accuracy,
    /// Maximum power points.
    pub pp: u8,
    /// Does using the move cost no PP?
    #[serde(default)]
    pub ppless: bool,
    /// Move priority.
    #[serde(default)]
    pub priority: i8,
    /// Valid targets.
    #[serde(default)]
    pub target: MoveTarget,
    /// Percentage chance of the move's secondary effect, if any.
    #[serde(default)]
    pub secondary_effect_chance: Option<u8>,
}

#[cfg(test)]
mod move_data_test {
    use pretty_assertions::assert_eq;

    use crate::{
        Accuracy,
        MoveCategory,
        MoveData,
        MoveTarget,
        Type,
    };

    #[test]
    fn deserializes_with_defaults() {
        let data = serde_json::from_str::<MoveData>(
            r#"{
                "name": "Tackle",
                "category": "Physical",
                "type": "Normal",
                "base_power": 40,
                "pp": 35
            }"#,
        )
        .unwrap();
        assert_eq!(
            data,
            MoveData {
                name: "Tackle".to_owned(),
                category: MoveCategory::Physical,
                primary_type: Type::Normal,
                base_power: Some(40),
                accuracy: Accuracy::Chance(100),
                pp: 35,
                ppless: false,
                priority: 0,
                target: MoveTarget::SelectedBattler,
                secondary_effect_chance: None,
            }
        );
    }
}
