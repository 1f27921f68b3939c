use std::fmt;

use clash_data::Fraction;
use serde::Serialize;

use crate::{
    battle::Boost,
    battle_event,
};

/// Identifies a battler in a message: its display name plus its side and spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattlerLabel {
    pub name: String,
    pub side: usize,
    pub spot: usize,
}

impl fmt::Display for BattlerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.name, self.side, self.spot)
    }
}

/// An immutable record of something that happened in battle.
///
/// Messages are emitted after each mechanical step. They are appended to the field's
/// [`EventLog`][`crate::messages::EventLog`] and handed to every observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    BattleStart,
    Victory {
        side: usize,
    },
    Draw,
    SendOut {
        battler: BattlerLabel,
        trainer: String,
    },
    Withdraw {
        battler: BattlerLabel,
    },
    TurnStart {
        turn: u64,
    },
    TurnEnd {
        turn: u64,
    },
    UseMove {
        battler: BattlerLabel,
        name: String,
    },
    HpChange {
        battler: BattlerLabel,
        delta: i32,
        hp: u16,
        direct: bool,
    },
    PpChange {
        battler: BattlerLabel,
        name: String,
        delta: i32,
        pp: u8,
    },
    Fainted {
        battler: BattlerLabel,
    },
    StatChange {
        battler: BattlerLabel,
        boost: Boost,
        requested: i8,
        delta: i8,
        stage: i8,
    },
    Effectiveness {
        target: BattlerLabel,
        multiplier: Fraction,
    },
    CriticalHit {
        target: BattlerLabel,
    },
    Miss {
        user: BattlerLabel,
        target: BattlerLabel,
    },
    Failed {
        user: BattlerLabel,
        target: Option<BattlerLabel>,
    },
    NoTarget {
        user: BattlerLabel,
    },
    EffectStart {
        effect: String,
        subject: String,
    },
    EffectEnd {
        effect: String,
        subject: String,
    },
    UseItem {
        trainer: String,
        item: String,
    },
    Forfeit {
        side: usize,
        trainer: String,
    },
}

impl Message {
    /// Is this message the last one a battle can emit?
    pub fn ends_battle(&self) -> bool {
        matches!(self, Self::Victory { .. } | Self::Draw)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = match self {
            Self::BattleStart => battle_event!("battlestart"),
            Self::Victory { side } => battle_event!("win", format!("side:{side}")),
            Self::Draw => battle_event!("tie"),
            Self::SendOut { battler, trainer } => battle_event!(
                "switch",
                format!("mon:{battler}"),
                format!("trainer:{trainer}"),
            ),
            Self::Withdraw { battler } => battle_event!("withdraw", format!("mon:{battler}")),
            Self::TurnStart { turn } => battle_event!("turn", format!("turn:{turn}")),
            Self::TurnEnd { turn } => battle_event!("turnend", format!("turn:{turn}")),
            Self::UseMove { battler, name } => {
                battle_event!("move", format!("mon:{battler}"), format!("name:{name}"))
            }
            Self::HpChange {
                battler,
                delta,
                hp,
                direct,
            } => {
                let kind = if *delta < 0 { "damage" } else { "heal" };
                let event = battle_event!(
                    kind,
                    format!("mon:{battler}"),
                    format!("delta:{}", delta.abs()),
                    format!("hp:{hp}"),
                );
                if *direct {
                    event
                } else {
                    battle_event!(event.as_str(), "indirect")
                }
            }
            Self::PpChange {
                battler,
                name,
                delta,
                pp,
            } => battle_event!(
                "pp",
                format!("mon:{battler}"),
                format!("move:{name}"),
                format!("delta:{delta}"),
                format!("pp:{pp}"),
            ),
            Self::Fainted { battler } => battle_event!("faint", format!("mon:{battler}")),
            Self::StatChange {
                battler,
                boost,
                requested,
                delta,
                stage,
            } => battle_event!(
                "boost",
                format!("mon:{battler}"),
                format!("stat:{boost}"),
                format!("requested:{requested}"),
                format!("delta:{delta}"),
                format!("stage:{stage}"),
            ),
            Self::Effectiveness { target, multiplier } => battle_event!(
                "effectiveness",
                format!("mon:{target}"),
                format!("multiplier:{multiplier}"),
            ),
            Self::CriticalHit { target } => battle_event!("crit", format!("mon:{target}")),
            Self::Miss { user, target } => {
                battle_event!("miss", format!("mon:{user}"), format!("target:{target}"))
            }
            Self::Failed { user, target } => match target {
                Some(target) => {
                    battle_event!("fail", format!("mon:{user}"), format!("target:{target}"))
                }
                None => battle_event!("fail", format!("mon:{user}")),
            },
            Self::NoTarget { user } => battle_event!("notarget", format!("mon:{user}")),
            Self::EffectStart { effect, subject } => battle_event!(
                "start",
                format!("effect:{effect}"),
                format!("subject:{subject}"),
            ),
            Self::EffectEnd { effect, subject } => battle_event!(
                "end",
                format!("effect:{effect}"),
                format!("subject:{subject}"),
            ),
            Self::UseItem { trainer, item } => battle_event!(
                "useitem",
                format!("trainer:{trainer}"),
                format!("item:{item}"),
            ),
            Self::Forfeit { side, trainer } => battle_event!(
                "forfeit",
                format!("side:{side}"),
                format!("trainer:{trainer}"),
            ),
        };
        f.write_str(event.as_str())
    }
}
