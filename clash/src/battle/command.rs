use anyhow::Result;
use clash_data::Id;
use serde::{
    Deserialize,
    Serialize,
};

use crate::battle::{
    BattlerHandle,
    Field,
    MonsterId,
    SpotId,
};

/// The move a move command uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveChoice {
    /// A move slot on the battler.
    Slot(usize),
    /// The fallback move, used when nothing else is legal.
    Struggle,
}

/// The kind of a [`Command`], in the order commands execute within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    Run,
    Item,
    Switch,
    Move,
}

/// An action chosen for a spot.
///
/// Commands are plain values: two commands are equal when they have the same kind and payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Move {
        spot: SpotId,
        battler: BattlerHandle,
        choice: MoveChoice,
        target: Option<SpotId>,
    },
    Switch {
        spot: SpotId,
        replacement: MonsterId,
    },
    Item {
        spot: SpotId,
        item: Id,
    },
    Run {
        spot: SpotId,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Move { .. } => CommandKind::Move,
            Self::Switch { .. } => CommandKind::Switch,
            Self::Item { .. } => CommandKind::Item,
            Self::Run { .. } => CommandKind::Run,
        }
    }

    /// The spot the command was chosen for.
    pub fn spot(&self) -> SpotId {
        match self {
            Self::Move { spot, .. }
            | Self::Switch { spot, .. }
            | Self::Item { spot, .. }
            | Self::Run { spot } => *spot,
        }
    }

    /// Selects this command on the field.
    ///
    /// Used by trainers that answer a request after it was issued.
    pub fn select(self, field: &mut Field) -> Result<()> {
        field.select_command(self)
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Move {
                    battler: a_battler,
                    choice: a_choice,
                    target: a_target,
                    ..
                },
                Self::Move {
                    battler: b_battler,
                    choice: b_choice,
                    target: b_target,
                    ..
                },
            ) => a_battler == b_battler && a_choice == b_choice && a_target == b_target,
            (
                Self::Switch {
                    replacement: a, ..
                },
                Self::Switch {
                    replacement: b, ..
                },
            ) => a == b,
            (Self::Item { item: a, .. }, Self::Item { item: b, .. }) => a == b,
            (Self::Run { .. }, Self::Run { .. }) => true,
            _ => false,
        }
    }
}

impl Eq for Command {}

#[cfg(test)]
mod command_test {
    use clash_data::Id;

    use crate::battle::{
        BattlerHandle,
        Command,
        CommandKind,
        MonsterId,
        MoveChoice,
        SpotId,
    };

    #[test]
    fn compares_kind_and_payload() {
        let a = Command::Switch {
            spot: SpotId::new(0, 0),
            replacement: MonsterId::new(0, 1),
        };
        let b = Command::Switch {
            spot: SpotId::new(0, 1),
            replacement: MonsterId::new(0, 1),
        };
        let c = Command::Switch {
            spot: SpotId::new(0, 0),
            replacement: MonsterId::new(0, 2),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(
            a,
            Command::Item {
                spot: SpotId::new(0, 0),
                item: Id::from("potion"),
            }
        );
        assert_eq!(
            Command::Move {
                spot: SpotId::new(0, 0),
                battler: BattlerHandle::new(0),
                choice: MoveChoice::Struggle,
                target: None,
            },
            Command::Move {
                spot: SpotId::new(1, 0),
                battler: BattlerHandle::new(0),
                choice: MoveChoice::Struggle,
                target: None,
            }
        );
    }

    #[test]
    fn kinds_order_run_item_switch_move() {
        assert!(CommandKind::Run < CommandKind::Item);
        assert!(CommandKind::Item < CommandKind::Switch);
        assert!(CommandKind::Switch < CommandKind::Move);
    }
}
