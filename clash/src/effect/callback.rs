use std::fmt;

use crate::common::OrderKey;

/// How a dispatch combines the results of its handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Every handler runs, and no result influences another handler.
    NotifyAll,
    /// Each handler transforms the value returned by the previous one.
    Chain,
    /// Handlers run until one returns `true`.
    FirstTrue,
}

/// A named extension point that effects can intercept.
///
/// This is the fixed capability table of the engine. An effect declares which entries it handles
/// through [`Effect::callbacks`][`crate::effect::Effect::callbacks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    /// An effect was applied to some subject.
    EffectApplied,
    /// An effect was removed from some subject.
    EffectRemoved,
    /// A battler was sent out onto the field.
    SendOut,
    /// A battler was withdrawn from the field, including after fainting.
    Withdraw,
    /// A turn began.
    BeginTurn,
    /// A turn ended.
    EndTurn,
    /// A move was used, after PP was deducted and targets were resolved.
    MoveUsed,
    /// A move connected with its target.
    MoveHit,
    /// A battler took damage.
    DamageDone,
    /// A move's secondary effect triggered on a hit.
    SecondaryEffect,
    /// A trainer used an item.
    UseItem,

    /// Blocks an effect from being applied.
    BlockApplication,
    /// Excludes another effect's handler from a single dispatch.
    DisableCallback,
    /// Prevents a move from being selected.
    PreventMoveSelection,
    /// Prevents a battler from switching out.
    PreventSwitch,
    /// Prevents a move from being used at all.
    PreventUse,
    /// Prevents a move from hitting one target.
    PreventHit,
    /// Skips the accuracy roll.
    EnsureHit,
    /// Prevents a critical hit.
    PreventCriticalHit,
    /// Forces a critical hit.
    ForceCriticalHit,

    /// Modifies a stat value.
    ModifyStat,
    /// Modifies the accuracy of a hit.
    ModifyAccuracy,
    /// Modifies the base power of a hit.
    ModifyBasePower,
    /// Modifies the damage of a hit.
    ModifyMoveDamage,
    /// Modifies the effectiveness of a move type against one defending type.
    ModifyEffectiveness,
    /// Modifies the critical hit stage of a hit.
    CriticalHitStage,
    /// Modifies how much PP a move use costs.
    PpReduction,
    /// Modifies the factor applied to speed when ordering commands.
    SpeedFactor,
    /// Modifies the chance of a secondary effect.
    SecondaryEffectChance,
}

impl Callback {
    /// The dispatch discipline of the callback.
    pub fn discipline(&self) -> Discipline {
        match self {
            Self::EffectApplied
            | Self::EffectRemoved
            | Self::SendOut
            | Self::Withdraw
            | Self::BeginTurn
            | Self::EndTurn
            | Self::MoveUsed
            | Self::MoveHit
            | Self::DamageDone
            | Self::SecondaryEffect
            | Self::UseItem => Discipline::NotifyAll,
            Self::BlockApplication
            | Self::DisableCallback
            | Self::PreventMoveSelection
            | Self::PreventSwitch
            | Self::PreventUse
            | Self::PreventHit
            | Self::EnsureHit
            | Self::PreventCriticalHit
            | Self::ForceCriticalHit => Discipline::FirstTrue,
            Self::ModifyStat
            | Self::ModifyAccuracy
            | Self::ModifyBasePower
            | Self::ModifyMoveDamage
            | Self::ModifyEffectiveness
            | Self::CriticalHitStage
            | Self::PpReduction
            | Self::SpeedFactor
            | Self::SecondaryEffectChance => Discipline::Chain,
        }
    }

    /// The snake-case name of the callback.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EffectApplied => "effect_applied",
            Self::EffectRemoved => "effect_removed",
            Self::SendOut => "send_out",
            Self::Withdraw => "withdraw",
            Self::BeginTurn => "begin_turn",
            Self::EndTurn => "end_turn",
            Self::MoveUsed => "move_used",
            Self::MoveHit => "move_hit",
            Self::DamageDone => "damage_done",
            Self::SecondaryEffect => "secondary_effect",
            Self::UseItem => "use_item",
            Self::BlockApplication => "block_application",
            Self::DisableCallback => "disable_callback",
            Self::PreventMoveSelection => "prevent_move_selection",
            Self::PreventSwitch => "prevent_switch",
            Self::PreventUse => "prevent_use",
            Self::PreventHit => "prevent_hit",
            Self::EnsureHit => "ensure_hit",
            Self::PreventCriticalHit => "prevent_critical_hit",
            Self::ForceCriticalHit => "force_critical_hit",
            Self::ModifyStat => "modify_stat",
            Self::ModifyAccuracy => "modify_accuracy",
            Self::ModifyBasePower => "modify_base_power",
            Self::ModifyMoveDamage => "modify_move_damage",
            Self::ModifyEffectiveness => "modify_effectiveness",
            Self::CriticalHitStage => "critical_hit_stage",
            Self::PpReduction => "pp_reduction",
            Self::SpeedFactor => "speed_factor",
            Self::SecondaryEffectChance => "secondary_effect_chance",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declares that an effect handles a callback.
///
/// A registration without an order key runs after every keyed handler. A registration with stages
/// runs once per stage, each time ordered by the stage key instead of the primary key.
#[derive(Debug, Clone)]
pub struct CallbackRegistration {
    pub callback: Callback,
    pub order: Option<OrderKey>,
    pub stages: Vec<OrderKey>,
}

impl CallbackRegistration {
    /// Registers an unordered handler.
    pub fn new(callback: Callback) -> Self {
        Self {
            callback,
            order: None,
            stages: Vec::new(),
        }
    }

    /// Orders the handler by the given key.
    pub fn ordered(mut self, key: OrderKey) -> Self {
        self.order = Some(key);
        self
    }

    /// Runs the handler once per stage key.
    pub fn staged<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = OrderKey>,
    {
        self.stages = stages.into_iter().collect();
        self
    }

    /// The order keys this registration is invoked at.
    ///
    /// Each entry is the sort key along with the stage passed to the handler.
    pub(crate) fn invocations(&self) -> Vec<(Option<OrderKey>, Option<OrderKey>)> {
        if self.stages.is_empty() {
            Vec::from([(self.order.clone(), None)])
        } else {
            self.stages
                .iter()
                .map(|stage| (Some(stage.clone()), Some(stage.clone())))
                .collect()
        }
    }
}
