use anyhow::Result;
use clash_data::{
    Fraction,
    Id,
    Type,
};

use crate::{
    battle::{
        BattleStat,
        BattlerHandle,
        Command,
        Hit,
        MoveEffect,
    },
    effect::{
        Callback,
        CallbackRegistration,
        EffectContext,
        EffectHandle,
    },
};

/// A unit of rule behavior that intercepts extension points of the battle.
///
/// An effect only receives the callbacks it declares in [`Effect::callbacks`]; every other
/// handler keeps its default implementation and is never invoked. Handlers receive an
/// [`EffectContext`] with mutable access to the whole field, plus the handle of the application
/// being invoked.
///
/// One effect object may be applied many times. Per-application data belongs in the
/// [`EffectState`][`crate::effect::EffectState`] reachable through the context.
#[allow(unused_variables)]
pub trait Effect: Send + Sync {
    /// Name of the effect, used in messages.
    fn name(&self) -> &str;

    /// At most one active effect of this class may be attached to a subject.
    fn unique_class(&self) -> Option<&str> {
        None
    }

    /// Does the effect keep running while its battler is fainted?
    fn active_on_fainted_subject(&self) -> bool {
        false
    }

    /// Should applying and removing the effect emit a message?
    fn announce(&self) -> bool {
        false
    }

    /// The callbacks this effect handles, along with their ordering.
    fn callbacks(&self) -> Vec<CallbackRegistration>;

    /// Does the effect declare the given callback?
    fn handles(&self, callback: Callback) -> bool {
        self.callbacks()
            .iter()
            .any(|registration| registration.callback == callback)
    }

    fn effect_applied(&self, ctx: &mut EffectContext, effect: EffectHandle) -> Result<()> {
        Ok(())
    }

    fn effect_removed(&self, ctx: &mut EffectContext, effect: EffectHandle) -> Result<()> {
        Ok(())
    }

    fn send_out(&self, ctx: &mut EffectContext, battler: BattlerHandle) -> Result<()> {
        Ok(())
    }

    fn withdraw(&self, ctx: &mut EffectContext, battler: BattlerHandle) -> Result<()> {
        Ok(())
    }

    fn begin_turn(&self, ctx: &mut EffectContext, turn: u64) -> Result<()> {
        Ok(())
    }

    fn end_turn(&self, ctx: &mut EffectContext, turn: u64) -> Result<()> {
        Ok(())
    }

    fn move_used(
        &self,
        ctx: &mut EffectContext,
        move_effect: &MoveEffect,
        targets: &[BattlerHandle],
    ) -> Result<()> {
        Ok(())
    }

    fn move_hit(&self, ctx: &mut EffectContext, hit: &Hit) -> Result<()> {
        Ok(())
    }

    fn damage_done(
        &self,
        ctx: &mut EffectContext,
        battler: BattlerHandle,
        damage: u16,
    ) -> Result<()> {
        Ok(())
    }

    fn secondary_effect(&self, ctx: &mut EffectContext, hit: &Hit) -> Result<()> {
        Ok(())
    }

    fn use_item(&self, ctx: &mut EffectContext, trainer: usize, item: &Id) -> Result<()> {
        Ok(())
    }

    /// Returns `true` to reject the application of `effect`.
    ///
    /// A candidate effect is asked about itself before anything else sees it.
    fn block_application(&self, ctx: &mut EffectContext, effect: EffectHandle) -> Result<bool> {
        Ok(false)
    }

    /// Returns `true` to exclude `effect`'s handler from the current dispatch of `callback`.
    fn disable_callback(
        &self,
        ctx: &mut EffectContext,
        effect: EffectHandle,
        callback: Callback,
    ) -> Result<bool> {
        Ok(false)
    }

    fn prevent_move_selection(&self, ctx: &mut EffectContext, command: &Command) -> Result<bool> {
        Ok(false)
    }

    fn prevent_switch(&self, ctx: &mut EffectContext, command: &Command) -> Result<bool> {
        Ok(false)
    }

    /// Returns `true` to stop a move before the use message and PP deduction.
    fn prevent_use(&self, ctx: &mut EffectContext, move_effect: &MoveEffect) -> Result<bool> {
        Ok(false)
    }

    fn prevent_hit(&self, ctx: &mut EffectContext, hit: &Hit) -> Result<bool> {
        Ok(false)
    }

    fn ensure_hit(&self, ctx: &mut EffectContext, hit: &Hit) -> Result<bool> {
        Ok(false)
    }

    fn prevent_critical_hit(&self, ctx: &mut EffectContext, hit: &Hit) -> Result<bool> {
        Ok(false)
    }

    fn force_critical_hit(&self, ctx: &mut EffectContext, hit: &Hit) -> Result<bool> {
        Ok(false)
    }

    fn modify_stat(
        &self,
        ctx: &mut EffectContext,
        battler: BattlerHandle,
        stat: BattleStat,
        value: Fraction,
    ) -> Result<Fraction> {
        Ok(value)
    }

    fn modify_accuracy(
        &self,
        ctx: &mut EffectContext,
        hit: &Hit,
        accuracy: Fraction,
    ) -> Result<Fraction> {
        Ok(accuracy)
    }

    fn modify_base_power(&self, ctx: &mut EffectContext, hit: &Hit, power: u32) -> Result<u32> {
        Ok(power)
    }

    fn modify_move_damage(&self, ctx: &mut EffectContext, hit: &Hit, damage: u32) -> Result<u32> {
        Ok(damage)
    }

    /// Modifies the effectiveness of the hit's type against a single defending type.
    fn modify_effectiveness(
        &self,
        ctx: &mut EffectContext,
        hit: &Hit,
        defending: Type,
        effectiveness: Fraction,
    ) -> Result<Fraction> {
        Ok(effectiveness)
    }

    fn critical_hit_stage(&self, ctx: &mut EffectContext, hit: &Hit, stage: u8) -> Result<u8> {
        Ok(stage)
    }

    fn pp_reduction(
        &self,
        ctx: &mut EffectContext,
        move_effect: &MoveEffect,
        amount: u8,
    ) -> Result<u8> {
        Ok(amount)
    }

    /// Modifies the factor speed is multiplied by when ordering commands.
    ///
    /// A negative factor reverses the speed order.
    fn speed_factor(
        &self,
        ctx: &mut EffectContext,
        battler: BattlerHandle,
        factor: i64,
    ) -> Result<i64> {
        Ok(factor)
    }

    fn secondary_effect_chance(
        &self,
        ctx: &mut EffectContext,
        hit: &Hit,
        chance: Fraction,
    ) -> Result<Fraction> {
        Ok(chance)
    }
}
