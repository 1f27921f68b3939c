//! Typed dispatches for every callback in the capability table.
//!
//! Every dispatch is scoped to the whole field, so it reaches side and battler effects too.

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
        Field,
        Hit,
        MoveEffect,
    },
    effect::{
        Callback,
        EffectHandle,
        Subject,
        run_any,
        run_callbacks,
        run_chain,
    },
};

pub fn effect_applied(field: &mut Field, effect: EffectHandle) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::EffectApplied,
        Some(effect),
        |handler, ctx| handler.effect_applied(ctx, effect),
    )?;
    Ok(())
}

pub fn effect_removed(field: &mut Field, effect: EffectHandle) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::EffectRemoved,
        Some(effect),
        |handler, ctx| handler.effect_removed(ctx, effect),
    )?;
    Ok(())
}

pub fn send_out(field: &mut Field, battler: BattlerHandle) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::SendOut,
        None,
        |handler, ctx| handler.send_out(ctx, battler),
    )?;
    Ok(())
}

pub fn withdraw(field: &mut Field, battler: BattlerHandle) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::Withdraw,
        None,
        |handler, ctx| handler.withdraw(ctx, battler),
    )?;
    Ok(())
}

pub fn begin_turn(field: &mut Field, turn: u64) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::BeginTurn,
        None,
        |handler, ctx| handler.begin_turn(ctx, turn),
    )?;
    Ok(())
}

pub fn end_turn(field: &mut Field, turn: u64) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::EndTurn,
        None,
        |handler, ctx| handler.end_turn(ctx, turn),
    )?;
    Ok(())
}

pub fn move_used(
    field: &mut Field,
    move_effect: &MoveEffect,
    targets: &[BattlerHandle],
) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::MoveUsed,
        None,
        |handler, ctx| handler.move_used(ctx, move_effect, targets),
    )?;
    Ok(())
}

pub fn move_hit(field: &mut Field, hit: &Hit) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::MoveHit,
        None,
        |handler, ctx| handler.move_hit(ctx, hit),
    )?;
    Ok(())
}

pub fn damage_done(field: &mut Field, battler: BattlerHandle, damage: u16) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::DamageDone,
        None,
        |handler, ctx| handler.damage_done(ctx, battler, damage),
    )?;
    Ok(())
}

pub fn secondary_effect(field: &mut Field, hit: &Hit) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::SecondaryEffect,
        None,
        |handler, ctx| handler.secondary_effect(ctx, hit),
    )?;
    Ok(())
}

pub fn use_item(field: &mut Field, trainer: usize, item: &Id) -> Result<()> {
    run_callbacks(
        field,
        Subject::Field,
        Callback::UseItem,
        None,
        |handler, ctx| handler.use_item(ctx, trainer, item),
    )?;
    Ok(())
}

pub fn block_application(field: &mut Field, effect: EffectHandle) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::BlockApplication,
        |handler, ctx| handler.block_application(ctx, effect),
    )
}

pub fn prevent_move_selection(field: &mut Field, command: &Command) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::PreventMoveSelection,
        |handler, ctx| handler.prevent_move_selection(ctx, command),
    )
}

pub fn prevent_switch(field: &mut Field, command: &Command) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::PreventSwitch,
        |handler, ctx| handler.prevent_switch(ctx, command),
    )
}

pub fn prevent_use(field: &mut Field, move_effect: &MoveEffect) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::PreventUse,
        |handler, ctx| handler.prevent_use(ctx, move_effect),
    )
}

pub fn prevent_hit(field: &mut Field, hit: &Hit) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::PreventHit,
        |handler, ctx| handler.prevent_hit(ctx, hit),
    )
}

pub fn ensure_hit(field: &mut Field, hit: &Hit) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::EnsureHit,
        |handler, ctx| handler.ensure_hit(ctx, hit),
    )
}

pub fn prevent_critical_hit(field: &mut Field, hit: &Hit) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::PreventCriticalHit,
        |handler, ctx| handler.prevent_critical_hit(ctx, hit),
    )
}

pub fn force_critical_hit(field: &mut Field, hit: &Hit) -> Result<bool> {
    run_any(
        field,
        Subject::Field,
        Callback::ForceCriticalHit,
        |handler, ctx| handler.force_critical_hit(ctx, hit),
    )
}

pub fn modify_stat(
    field: &mut Field,
    battler: BattlerHandle,
    stat: BattleStat,
    value: Fraction,
) -> Result<Fraction> {
    run_chain(
        field,
        Subject::Field,
        Callback::ModifyStat,
        value,
        |handler, ctx, value| handler.modify_stat(ctx, battler, stat, value),
    )
}

pub fn modify_accuracy(field: &mut Field, hit: &Hit, accuracy: Fraction) -> Result<Fraction> {
    run_chain(
        field,
        Subject::Field,
        Callback::ModifyAccuracy,
        accuracy,
        |handler, ctx, accuracy| handler.modify_accuracy(ctx, hit, accuracy),
    )
}

pub fn modify_base_power(field: &mut Field, hit: &Hit, power: u32) -> Result<u32> {
    run_chain(
        field,
        Subject::Field,
        Callback::ModifyBasePower,
        power,
        |handler, ctx, power| handler.modify_base_power(ctx, hit, power),
    )
}

pub fn modify_move_damage(field: &mut Field, hit: &Hit, damage: u32) -> Result<u32> {
    run_chain(
        field,
        Subject::Field,
        Callback::ModifyMoveDamage,
        damage,
        |handler, ctx, damage| handler.modify_move_damage(ctx, hit, damage),
    )
}

pub fn modify_effectiveness(
    field: &mut Field,
    hit: &Hit,
    defending: Type,
    effectiveness: Fraction,
) -> Result<Fraction> {
    run_chain(
        field,
        Subject::Field,
        Callback::ModifyEffectiveness,
        effectiveness,
        |handler, ctx, effectiveness| {
            handler.modify_effectiveness(ctx, hit, defending, effectiveness)
        },
    )
}

pub fn critical_hit_stage(field: &mut Field, hit: &Hit, stage: u8) -> Result<u8> {
    run_chain(
        field,
        Subject::Field,
        Callback::CriticalHitStage,
        stage,
        |handler, ctx, stage| handler.critical_hit_stage(ctx, hit, stage),
    )
}

pub fn pp_reduction(field: &mut Field, move_effect: &MoveEffect, amount: u8) -> Result<u8> {
    run_chain(
        field,
        Subject::Field,
        Callback::PpReduction,
        amount,
        |handler, ctx, amount| handler.pp_reduction(ctx, move_effect, amount),
    )
}

pub fn speed_factor(field: &mut Field, battler: BattlerHandle, factor: i64) -> Result<i64> {
    run_chain(
        field,
        Subject::Field,
        Callback::SpeedFactor,
        factor,
        |handler, ctx, factor| handler.speed_factor(ctx, battler, factor),
    )
}

pub fn secondary_effect_chance(field: &mut Field, hit: &Hit, chance: Fraction) -> Result<Fraction> {
    run_chain(
        field,
        Subject::Field,
        Callback::SecondaryEffectChance,
        chance,
        |handler, ctx, chance| handler.secondary_effect_chance(ctx, hit, chance),
    )
}
