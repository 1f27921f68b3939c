use std::sync::Arc;

use anyhow::Result;
use clash_data::{
    Fraction,
    Id,
    MoveCategory,
    MoveData,
    Type,
};
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::{
    battle::{
        BattleStat,
        Battler,
        BattlerHandle,
        Field,
        MoveChoice,
        SpotId,
        base_damage,
        critical_hit_chance,
        resolve_targets,
    },
    effect::{
        EffectHandle,
        Subject,
        apply_effect,
        events,
        remove_effect,
    },
    error::WrapOptionError,
    messages::Message,
};

/// The result of using a move, or of one of its hits.
///
/// These are ordinary outcomes of battle, not errors.
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
pub enum MoveOutcome {
    #[string = "success"]
    Success,
    /// An effect stopped the move or hit.
    #[string = "failed"]
    Failed,
    /// The accuracy roll failed.
    #[string = "missed"]
    Missed,
    /// The target is immune to the move's type.
    #[string = "noeffect"]
    NoEffect,
    /// The move had nothing to hit.
    #[string = "notarget"]
    NoTarget,
}

/// One target's share of a move use.
#[derive(Debug, Clone)]
pub struct Hit {
    pub user: BattlerHandle,
    pub target: BattlerHandle,
    pub move_id: Id,
    pub data: Arc<MoveData>,
    pub move_type: Type,
    pub category: MoveCategory,
    /// Final accuracy, if it was rolled.
    pub accuracy: Option<Fraction>,
    /// Final base power, if the move deals damage.
    pub base_power: Option<u32>,
    pub effectiveness: Fraction,
    pub critical_hit: bool,
    pub damage: Option<u32>,
    pub outcome: MoveOutcome,
}

impl Hit {
    fn new(move_effect: &MoveEffect, target: BattlerHandle) -> Self {
        Self {
            user: move_effect.user,
            target,
            move_id: move_effect.id.clone(),
            data: move_effect.data.clone(),
            move_type: move_effect.data.primary_type,
            category: move_effect.data.category,
            accuracy: None,
            base_power: None,
            effectiveness: Fraction::new(1, 1),
            critical_hit: false,
            damage: None,
            outcome: MoveOutcome::Success,
        }
    }
}

/// The result of [`MoveEffect::attempt_use`].
#[derive(Debug, Clone)]
pub struct MoveUse {
    pub outcome: MoveOutcome,
    pub hits: Vec<Hit>,
}

impl MoveUse {
    fn without_hits(outcome: MoveOutcome) -> Self {
        Self {
            outcome,
            hits: Vec::new(),
        }
    }
}

/// One use of a move by one battler this turn.
///
/// This is the sole authority for the mechanics of the use: targeting, PP, accuracy, critical
/// hits, damage, and secondary effects all resolve here, each step open to effects.
#[derive(Debug, Clone)]
pub struct MoveEffect {
    pub user: BattlerHandle,
    pub choice: MoveChoice,
    pub id: Id,
    pub data: Arc<MoveData>,
    /// The spot the move was aimed at, for moves with a choosable target.
    pub target: Option<SpotId>,
    behavior: Option<EffectHandle>,
}

impl MoveEffect {
    pub fn new(
        field: &Field,
        user: BattlerHandle,
        choice: MoveChoice,
        target: Option<SpotId>,
    ) -> Result<Self> {
        let (id, data) = match choice {
            MoveChoice::Slot(slot) => {
                let battle_move = field
                    .battler(user)?
                    .moves()
                    .get(slot)
                    .wrap_expectation_with_format(format_args!(
                        "battler {} has no move in slot {slot}",
                        user.index()
                    ))?;
                (battle_move.id.clone(), battle_move.data.clone())
            }
            MoveChoice::Struggle => {
                let data = field.struggle().clone();
                (Id::from(data.name.as_str()), data)
            }
        };
        Ok(Self {
            user,
            choice,
            id,
            data,
            target,
            behavior: None,
        })
    }

    /// Does the use skip PP deduction?
    pub fn ppless(&self) -> bool {
        self.data.ppless || self.choice == MoveChoice::Struggle
    }

    /// The effect backing the move's own behavior this turn, if any.
    pub fn behavior(&self) -> Option<EffectHandle> {
        self.behavior
    }

    /// Applies the move's own behavior to the user for the turn.
    ///
    /// Runs when the turn starts, before any command executes, so moves that react to the turn
    /// do so even if the user never gets to act.
    pub fn begin_turn(&mut self, field: &mut Field) -> Result<()> {
        if let Some(effect) = field.library().move_effect(&self.id) {
            let subject = Subject::Battler(self.user);
            self.behavior = apply_effect(field, subject, effect, subject)?;
        }
        Ok(())
    }

    /// Removes the move's own behavior once the turn is over.
    pub fn end_turn(&mut self, field: &mut Field) -> Result<()> {
        match self.behavior.take() {
            Some(behavior) => remove_effect(field, behavior),
            None => Ok(()),
        }
    }

    /// Attempts to use the move.
    pub fn attempt_use(&self, field: &mut Field) -> Result<MoveUse> {
        if events::prevent_use(field, self)? {
            log::debug!("use of {} was prevented", self.id);
            let user = field.battler_label(self.user)?;
            field.send_message(Message::Failed { user, target: None });
            return Ok(MoveUse::without_hits(MoveOutcome::Failed));
        }
        self.do_use(field)
    }

    fn do_use(&self, field: &mut Field) -> Result<MoveUse> {
        let user = field.battler_label(self.user)?;
        field.send_message(Message::UseMove {
            battler: user.clone(),
            name: self.data.name.clone(),
        });
        field.battler_mut(self.user)?.moves_used.push(self.id.clone());
        self.deduct_pp(field)?;

        let targets = resolve_targets(field, self.user, self.data.target, self.target)?;
        events::move_used(field, self, &targets)?;

        if self.data.target.affects_area() {
            return Ok(MoveUse::without_hits(MoveOutcome::Success));
        }

        let mut hits = Vec::with_capacity(targets.len());
        for target in targets {
            if field.battler_fainted(target)? {
                continue;
            }
            let mut hit = Hit::new(self, target);
            hit.outcome = self.attempt_hit(field, &mut hit)?;
            hits.push(hit);
        }

        if hits.is_empty() {
            field.send_message(Message::NoTarget { user });
            return Ok(MoveUse::without_hits(MoveOutcome::NoTarget));
        }

        let outcome = if hits.iter().any(|hit| hit.outcome == MoveOutcome::Success) {
            MoveOutcome::Success
        } else {
            hits[0].outcome
        };
        Ok(MoveUse { outcome, hits })
    }

    fn deduct_pp(&self, field: &mut Field) -> Result<()> {
        if self.ppless() {
            return Ok(());
        }
        let MoveChoice::Slot(slot) = self.choice else {
            return Ok(());
        };
        let amount = events::pp_reduction(field, self, 1)?;
        if amount == 0 {
            return Ok(());
        }
        let deducted = Battler::deduct_pp(field, self.user, slot, amount)?;
        let pp = field
            .battler(self.user)?
            .moves()
            .get(slot)
            .map(|battle_move| battle_move.pp)
            .unwrap_or_default();
        let battler = field.battler_label(self.user)?;
        field.send_message(Message::PpChange {
            battler,
            name: self.data.name.clone(),
            delta: -(deducted as i32),
            pp,
        });
        Ok(())
    }

    fn attempt_hit(&self, field: &mut Field, hit: &mut Hit) -> Result<MoveOutcome> {
        if events::prevent_hit(field, hit)? {
            let user = field.battler_label(hit.user)?;
            let target = field.battler_label(hit.target)?;
            field.send_message(Message::Failed {
                user,
                target: Some(target),
            });
            return Ok(MoveOutcome::Failed);
        }

        if !self.roll_accuracy(field, hit)? {
            let user = field.battler_label(hit.user)?;
            let target = field.battler_label(hit.target)?;
            field.send_message(Message::Miss { user, target });
            return Ok(MoveOutcome::Missed);
        }

        self.do_hit(field, hit)
    }

    fn roll_accuracy(&self, field: &mut Field, hit: &mut Hit) -> Result<bool> {
        let Some(accuracy) = self.data.accuracy.chance() else {
            return Ok(true);
        };
        if events::ensure_hit(field, hit)? {
            return Ok(true);
        }
        let user_accuracy = Battler::calculate_stat(field, hit.user, BattleStat::Accuracy)?;
        let evasion = Battler::calculate_stat(field, hit.target, BattleStat::Evasion)?;
        let accuracy = if evasion.is_zero() {
            accuracy * user_accuracy
        } else {
            accuracy * user_accuracy * evasion.inverse()
        };
        hit.accuracy = Some(accuracy);
        let accuracy = events::modify_accuracy(field, hit, accuracy)?;
        hit.accuracy = Some(accuracy);
        field.flip_coin(accuracy)
    }

    fn do_hit(&self, field: &mut Field, hit: &mut Hit) -> Result<MoveOutcome> {
        events::move_hit(field, hit)?;

        if let (Some(power), Some((attack, defense))) =
            (self.data.base_power, self.data.category.damage_stats())
        {
            hit.base_power = Some(power);
            let power = events::modify_base_power(field, hit, power)?;
            hit.base_power = Some(power);

            hit.effectiveness = self.calculate_effectiveness(field, hit)?;
            if hit.effectiveness.is_zero() {
                let target = field.battler_label(hit.target)?;
                field.send_message(Message::Effectiveness {
                    target,
                    multiplier: hit.effectiveness,
                });
                return Ok(MoveOutcome::NoEffect);
            }

            hit.critical_hit = self.roll_critical_hit(field, hit)?;

            let attack = Battler::stat(field, hit.user, attack)?;
            let defense = Battler::stat(field, hit.target, defense)?;
            let level = field.battler(hit.user)?.level();
            let damage = base_damage(level, power, attack, defense);
            let damage = events::modify_move_damage(field, hit, damage)?.max(1);
            hit.damage = Some(damage);

            let target = field.battler_label(hit.target)?;
            if hit.critical_hit {
                field.send_message(Message::CriticalHit {
                    target: target.clone(),
                });
            }
            if hit.effectiveness != Fraction::new(1, 1) {
                field.send_message(Message::Effectiveness {
                    target,
                    multiplier: hit.effectiveness,
                });
            }
            field.damage_battler(hit.target, damage, true)?;
        }

        self.roll_secondary_effect(field, hit)?;
        Ok(MoveOutcome::Success)
    }

    fn calculate_effectiveness(&self, field: &mut Field, hit: &Hit) -> Result<Fraction> {
        let chart = field.type_chart().clone();
        let types = field.battler(hit.target)?.types().to_vec();
        let mut effectiveness = Fraction::new(1, 1);
        for defending in types {
            let base = chart.effectiveness(hit.move_type, defending).multiplier();
            effectiveness =
                effectiveness * events::modify_effectiveness(field, hit, defending, base)?;
        }
        Ok(effectiveness)
    }

    fn roll_critical_hit(&self, field: &mut Field, hit: &Hit) -> Result<bool> {
        if events::prevent_critical_hit(field, hit)? {
            return Ok(false);
        }
        if events::force_critical_hit(field, hit)? {
            return Ok(true);
        }
        let stage = events::critical_hit_stage(field, hit, 1)?;
        field.flip_coin(critical_hit_chance(stage))
    }

    fn roll_secondary_effect(&self, field: &mut Field, hit: &Hit) -> Result<()> {
        let Some(percent) = self.data.secondary_effect_chance else {
            return Ok(());
        };
        let chance = Fraction::percentage(percent as u64);
        let chance = events::secondary_effect_chance(field, hit, chance)?;
        if field.flip_coin(chance)? {
            events::secondary_effect(field, hit)?;
        }
        Ok(())
    }
}
