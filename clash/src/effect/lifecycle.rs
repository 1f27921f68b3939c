use std::sync::Arc;

use anyhow::Result;

use crate::{
    battle::Field,
    effect::{
        Effect,
        EffectContext,
        EffectHandle,
        Subject,
        events,
    },
    messages::Message,
};

/// Applies an effect to a subject.
///
/// Returns [`None`] without changing any subject if the application is rejected. That happens
/// when the subject already has an active effect of the same unique class, when the candidate
/// blocks itself, or when any active effect blocks it through [`Effect::block_application`].
///
/// On success, every other active effect is notified through [`Effect::effect_applied`]. The new
/// effect does not observe its own application.
pub fn apply_effect(
    field: &mut Field,
    subject: Subject,
    effect: Arc<dyn Effect>,
    inducer: Subject,
) -> Result<Option<EffectHandle>> {
    field.check_subject(subject)?;
    if let Some(class) = effect.unique_class() {
        if field.effects().find_unique(subject, class).is_some() {
            log::debug!("{} was rejected by {subject:?}", effect.name());
            return Ok(None);
        }
    }

    // Blocking callbacks receive the candidate through its handle, so it is registered first.
    let handle = field.effects_mut().register(effect.clone(), subject, inducer);
    let rejected = {
        let mut ctx = EffectContext::new(field, handle, None);
        effect.block_application(&mut ctx, handle)?
    } || events::block_application(field, handle)?;

    if rejected {
        log::debug!("{} was blocked on {subject:?}", effect.name());
        field.effects_mut().discard(handle)?;
        return Ok(None);
    }

    field.effects_mut().attach(handle)?;
    log::debug!("{} applied to {subject:?}", effect.name());
    if effect.announce() {
        let subject = field.subject_label(subject)?;
        field.send_message(Message::EffectStart {
            effect: effect.name().to_owned(),
            subject,
        });
    }
    events::effect_applied(field, handle)?;
    Ok(Some(handle))
}

/// Removes an effect from its subject.
///
/// The effect is deactivated and detached before [`Effect::effect_removed`] fires, so it never
/// observes its own removal. Removing an effect twice does nothing.
pub fn remove_effect(field: &mut Field, handle: EffectHandle) -> Result<()> {
    let applied = field.effects().get(handle)?;
    if !applied.is_attached() {
        return Ok(());
    }
    let effect = applied.effect().clone();
    let subject = applied.subject();

    field.effects_mut().set_active(handle, false)?;
    field.effects_mut().detach(handle)?;
    log::debug!("{} removed from {subject:?}", effect.name());
    if effect.announce() {
        let subject = field.subject_label(subject)?;
        field.send_message(Message::EffectEnd {
            effect: effect.name().to_owned(),
            subject,
        });
    }
    events::effect_removed(field, handle)
}

/// Removes every effect attached to a subject without notifying anything.
///
/// Used when a subject leaves the battle, since effects never outlive their subject.
pub fn discard_effects(field: &mut Field, subject: Subject) -> Result<()> {
    let attached = field.effects().attached(subject).to_vec();
    for handle in attached {
        field.effects_mut().set_active(handle, false)?;
        field.effects_mut().detach(handle)?;
    }
    Ok(())
}

/// Moves an effect onto another subject without removing and reapplying it.
///
/// No callbacks fire, and the effect keeps its state and active flag.
pub fn reparent_effect(field: &mut Field, handle: EffectHandle, subject: Subject) -> Result<()> {
    field.check_subject(subject)?;
    field.effects_mut().move_to(handle, subject)
}

/// Runs `f` with the effect temporarily inactive.
///
/// The previous active flag is restored when `f` finishes, whether it returns normally, returns
/// an error, or panics.
pub fn with_effect_disabled<F, R>(field: &mut Field, handle: EffectHandle, f: F) -> Result<R>
where
    F: FnOnce(&mut Field) -> Result<R>,
{
    let previous = field.effects_mut().set_active(handle, false)?;
    let mut field = scopeguard::guard(field, |field| {
        // The handle was valid a moment ago, and effects are never deleted.
        let _ = field.effects_mut().set_active(handle, previous);
    });
    f(&mut **field)
}
