use std::{
    cmp::Ordering,
    sync::Arc,
};

use anyhow::Result;
use hashbrown::HashMap;

use crate::{
    battle::Field,
    common::OrderKey,
    effect::{
        Callback,
        Discipline,
        Effect,
        EffectContext,
        EffectHandle,
        Subject,
    },
};

/// One invocation of one effect's handler within a dispatch.
#[derive(Debug, Clone)]
struct Handler {
    effect: EffectHandle,
    key: Option<OrderKey>,
    stage: Option<OrderKey>,
}

/// Unkeyed handlers sort after every keyed handler.
fn compare_order_keys(a: &Option<OrderKey>, b: &Option<OrderKey>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The scope subject followed by every subject nested inside it, breadth first.
fn subjects_in_scope(field: &Field, scope: Subject) -> Vec<Subject> {
    let mut subjects = Vec::from([scope]);
    let mut i = 0;
    while i < subjects.len() {
        let nested = field.sub_subjects(subjects[i]);
        subjects.extend(nested);
        i += 1;
    }
    subjects
}

fn collect_handlers(field: &Field, scope: Subject, callback: Callback) -> Result<Vec<Handler>> {
    let mut handlers = Vec::new();
    for subject in subjects_in_scope(field, scope) {
        let fainted = match subject {
            Subject::Battler(battler) => field.battler_fainted(battler)?,
            _ => false,
        };
        for handle in field.effects().attached(subject) {
            let applied = field.effects().get(*handle)?;
            if !applied.is_active() {
                continue;
            }
            if fainted && !applied.effect().active_on_fainted_subject() {
                continue;
            }
            for registration in applied
                .effect()
                .callbacks()
                .into_iter()
                .filter(|registration| registration.callback == callback)
            {
                for (key, stage) in registration.invocations() {
                    handlers.push(Handler {
                        effect: *handle,
                        key,
                        stage,
                    });
                }
            }
        }
    }
    // Stable, so handlers with equal keys keep their attachment order.
    handlers.sort_by(|a, b| compare_order_keys(&a.key, &b.key));
    Ok(handlers)
}

/// The effect behind a handler, if it may still run.
///
/// Earlier handlers in the same dispatch may have removed or disabled it.
fn runnable_effect(field: &Field, handler: &Handler) -> Option<Arc<dyn Effect>> {
    match field.effects().get(handler.effect) {
        Ok(applied) if applied.is_active() && applied.is_attached() => {
            Some(applied.effect().clone())
        }
        _ => None,
    }
}

fn vetoed(
    field: &mut Field,
    voters: &[Handler],
    target: EffectHandle,
    callback: Callback,
) -> Result<bool> {
    for voter in voters {
        let Some(effect) = runnable_effect(field, voter) else {
            continue;
        };
        let mut ctx = EffectContext::new(field, voter.effect, voter.stage.clone());
        if effect.disable_callback(&mut ctx, target, callback)? {
            log::trace!(
                "{} disabled {callback} for {target:?}",
                effect.name()
            );
            return Ok(true);
        }
    }
    Ok(false)
}

/// Drops the handlers that an active effect votes to disable.
///
/// Disablers vote in order. A disabler that an earlier voter disables for
/// [`Callback::DisableCallback`] loses its own vote.
fn enabled_handlers(
    field: &mut Field,
    scope: Subject,
    callback: Callback,
    handlers: Vec<Handler>,
) -> Result<Vec<Handler>> {
    if callback == Callback::DisableCallback || handlers.is_empty() {
        return Ok(handlers);
    }
    let disablers = collect_handlers(field, scope, Callback::DisableCallback)?;
    if disablers.is_empty() {
        return Ok(handlers);
    }

    let mut voters = Vec::new();
    for disabler in disablers {
        if !vetoed(field, &voters, disabler.effect, Callback::DisableCallback)? {
            voters.push(disabler);
        }
    }

    let mut decisions = HashMap::new();
    let mut enabled = Vec::with_capacity(handlers.len());
    for handler in handlers {
        let disabled = match decisions.get(&handler.effect) {
            Some(disabled) => *disabled,
            None => {
                let disabled = vetoed(field, &voters, handler.effect, callback)?;
                decisions.insert(handler.effect, disabled);
                disabled
            }
        };
        if !disabled {
            enabled.push(handler);
        }
    }
    Ok(enabled)
}

fn handlers_for(field: &mut Field, scope: Subject, callback: Callback) -> Result<Vec<Handler>> {
    let handlers = collect_handlers(field, scope, callback)?;
    let handlers = enabled_handlers(field, scope, callback, handlers)?;
    log::trace!(
        "dispatching {callback} over {scope:?} to {} handler(s)",
        handlers.len()
    );
    Ok(handlers)
}

/// Runs a notify-all dispatch, collecting every handler's result.
///
/// `exclude` keeps one effect out of the dispatch, which lets a newly applied effect stay out of
/// its own notification.
pub fn run_callbacks<R, F>(
    field: &mut Field,
    scope: Subject,
    callback: Callback,
    exclude: Option<EffectHandle>,
    mut invoke: F,
) -> Result<Vec<R>>
where
    F: FnMut(&dyn Effect, &mut EffectContext) -> Result<R>,
{
    debug_assert_eq!(callback.discipline(), Discipline::NotifyAll);
    let mut results = Vec::new();
    for handler in handlers_for(field, scope, callback)? {
        if exclude == Some(handler.effect) {
            continue;
        }
        let Some(effect) = runnable_effect(field, &handler) else {
            continue;
        };
        let mut ctx = EffectContext::new(field, handler.effect, handler.stage);
        results.push(invoke(effect.as_ref(), &mut ctx)?);
    }
    Ok(results)
}

/// Runs a chain dispatch, passing each handler the value returned by the previous one.
pub fn run_chain<T, F>(
    field: &mut Field,
    scope: Subject,
    callback: Callback,
    initial: T,
    mut invoke: F,
) -> Result<T>
where
    F: FnMut(&dyn Effect, &mut EffectContext, T) -> Result<T>,
{
    debug_assert_eq!(callback.discipline(), Discipline::Chain);
    let mut value = initial;
    for handler in handlers_for(field, scope, callback)? {
        let Some(effect) = runnable_effect(field, &handler) else {
            continue;
        };
        let mut ctx = EffectContext::new(field, handler.effect, handler.stage);
        value = invoke(effect.as_ref(), &mut ctx, value)?;
    }
    Ok(value)
}

/// Runs a first-true dispatch, stopping at the first handler that returns `true`.
pub fn run_any<F>(field: &mut Field, scope: Subject, callback: Callback, mut invoke: F) -> Result<bool>
where
    F: FnMut(&dyn Effect, &mut EffectContext) -> Result<bool>,
{
    debug_assert_eq!(callback.discipline(), Discipline::FirstTrue);
    for handler in handlers_for(field, scope, callback)? {
        let Some(effect) = runnable_effect(field, &handler) else {
            continue;
        };
        let mut ctx = EffectContext::new(field, handler.effect, handler.stage);
        if invoke(effect.as_ref(), &mut ctx)? {
            log::trace!("{} returned true for {callback}", effect.name());
            return Ok(true);
        }
    }
    Ok(false)
}
