use anyhow::Result;

use crate::{
    battle::{
        BattlerHandle,
        Field,
    },
    common::OrderKey,
    effect::{
        EffectHandle,
        EffectState,
        Subject,
        remove_effect,
    },
};

/// The context a single effect handler runs in.
///
/// Gives mutable access to the field, and knows which application of which effect is being
/// invoked.
pub struct EffectContext<'f> {
    field: &'f mut Field,
    effect: EffectHandle,
    stage: Option<OrderKey>,
}

impl<'f> EffectContext<'f> {
    pub(crate) fn new(field: &'f mut Field, effect: EffectHandle, stage: Option<OrderKey>) -> Self {
        Self {
            field,
            effect,
            stage,
        }
    }

    pub fn field(&mut self) -> &mut Field {
        self.field
    }

    pub fn field_ref(&self) -> &Field {
        self.field
    }

    /// The handle of the effect being invoked.
    pub fn effect_handle(&self) -> EffectHandle {
        self.effect
    }

    /// The stage key the handler is invoked at, for staged registrations.
    pub fn stage(&self) -> Option<&OrderKey> {
        self.stage.as_ref()
    }

    /// The subject the effect is attached to.
    pub fn subject(&self) -> Result<Subject> {
        Ok(self.field.effects().get(self.effect)?.subject())
    }

    /// The subject that caused the effect.
    pub fn inducer(&self) -> Result<Subject> {
        Ok(self.field.effects().get(self.effect)?.inducer())
    }

    /// The battler the effect is attached to, if it is attached to a battler.
    pub fn subject_battler(&self) -> Result<Option<BattlerHandle>> {
        Ok(self.subject()?.battler())
    }

    pub fn state(&self) -> Result<&EffectState> {
        Ok(self.field.effects().get(self.effect)?.state())
    }

    pub fn state_mut(&mut self) -> Result<&mut EffectState> {
        Ok(self.field.effects_mut().get_mut(self.effect)?.state_mut())
    }

    /// Removes the effect being invoked from its subject.
    pub fn remove_self(&mut self) -> Result<()> {
        remove_effect(self.field, self.effect)
    }
}
