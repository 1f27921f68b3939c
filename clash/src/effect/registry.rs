use std::sync::Arc;

use anyhow::Result;
use hashbrown::HashMap;
use serde::{
    Serialize,
    de::DeserializeOwned,
};

use crate::{
    effect::{
        Effect,
        Subject,
    },
    error::{
        WrapOptionError,
        WrapResultError,
        illegal_usage,
    },
};

/// A handle to an effect that has been registered on a field.
///
/// Handles stay valid for the whole battle, even after the effect is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(usize);

/// Free-form state owned by a single application of an effect.
///
/// The same [`Effect`] object can be applied many times, so anything that differs per
/// application lives here rather than on the effect.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EffectState {
    values: HashMap<String, serde_json::Value>,
}

impl EffectState {
    /// Reads a value.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.values
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .wrap_error_with_format(format_args!("invalid value for {key}"))
            })
            .transpose()
    }

    /// Writes a value.
    pub fn set<T>(&mut self, key: &str, value: T) -> Result<()>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value)
            .wrap_error_with_format(format_args!("failed to store {key}"))?;
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// An effect along with everything about its application.
pub struct AppliedEffect {
    effect: Arc<dyn Effect>,
    subject: Subject,
    inducer: Subject,
    active: bool,
    attached: bool,
    state: EffectState,
}

impl AppliedEffect {
    /// The effect itself.
    pub fn effect(&self) -> &Arc<dyn Effect> {
        &self.effect
    }

    /// The name of the effect.
    pub fn name(&self) -> &str {
        self.effect.name()
    }

    /// The subject that owns the effect.
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// The subject that caused the effect.
    pub fn inducer(&self) -> Subject {
        self.inducer
    }

    /// Does the effect currently participate in dispatches?
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Is the effect in its subject's collection?
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> &EffectState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }
}

/// Every effect registered on a field, plus the per-subject collections of attached effects.
///
/// Applied effects are never deleted, so removed effects stay inspectable through their handle.
/// A candidate blocked during application is discarded instead.
#[derive(Default)]
pub struct EffectRegistry {
    effects: Vec<AppliedEffect>,
    attachments: HashMap<Subject, Vec<EffectHandle>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of effects ever registered.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Registers a detached, active effect.
    pub(crate) fn register(
        &mut self,
        effect: Arc<dyn Effect>,
        subject: Subject,
        inducer: Subject,
    ) -> EffectHandle {
        let handle = EffectHandle(self.effects.len());
        self.effects.push(AppliedEffect {
            effect,
            subject,
            inducer,
            active: true,
            attached: false,
            state: EffectState::default(),
        });
        handle
    }

    /// Drops a detached candidate that was never applied.
    ///
    /// The slot is reclaimed when it is the newest one. Otherwise an effect applied while the
    /// candidate was being checked holds a later handle, and the candidate is only deactivated.
    pub(crate) fn discard(&mut self, handle: EffectHandle) -> Result<()> {
        if self.get(handle)?.attached {
            return Err(illegal_usage(format!("effect {} is attached", handle.0)));
        }
        if handle.0 + 1 == self.effects.len() {
            self.effects.pop();
        } else {
            self.set_active(handle, false)?;
        }
        Ok(())
    }

    /// Looks up an effect by handle.
    pub fn get(&self, handle: EffectHandle) -> Result<&AppliedEffect> {
        self.effects
            .get(handle.0)
            .wrap_expectation_with_format(format_args!("effect {} does not exist", handle.0))
    }

    pub(crate) fn get_mut(&mut self, handle: EffectHandle) -> Result<&mut AppliedEffect> {
        self.effects
            .get_mut(handle.0)
            .wrap_expectation_with_format(format_args!("effect {} does not exist", handle.0))
    }

    /// Adds the effect to its subject's collection.
    pub(crate) fn attach(&mut self, handle: EffectHandle) -> Result<()> {
        let applied = self.get_mut(handle)?;
        if applied.attached {
            return Ok(());
        }
        applied.attached = true;
        let subject = applied.subject;
        self.attachments.entry(subject).or_default().push(handle);
        Ok(())
    }

    /// Removes the effect from its subject's collection.
    pub(crate) fn detach(&mut self, handle: EffectHandle) -> Result<()> {
        let applied = self.get_mut(handle)?;
        if !applied.attached {
            return Ok(());
        }
        applied.attached = false;
        let subject = applied.subject;
        if let Some(attached) = self.attachments.get_mut(&subject) {
            attached.retain(|attached| *attached != handle);
        }
        Ok(())
    }

    /// Moves an attached effect onto another subject.
    pub(crate) fn move_to(&mut self, handle: EffectHandle, subject: Subject) -> Result<()> {
        let attached = self.get(handle)?.attached;
        self.detach(handle)?;
        self.get_mut(handle)?.subject = subject;
        if attached {
            self.attach(handle)?;
        }
        Ok(())
    }

    /// Sets the active flag, returning the previous value.
    pub(crate) fn set_active(&mut self, handle: EffectHandle, active: bool) -> Result<bool> {
        let applied = self.get_mut(handle)?;
        Ok(std::mem::replace(&mut applied.active, active))
    }

    /// Handles of every effect attached to the subject, in application order.
    pub fn attached(&self, subject: Subject) -> &[EffectHandle] {
        self.attachments
            .get(&subject)
            .map(|attached| attached.as_slice())
            .unwrap_or_default()
    }

    /// Handles of every active effect attached to the subject.
    pub fn active_on(&self, subject: Subject) -> Vec<EffectHandle> {
        self.attached(subject)
            .iter()
            .copied()
            .filter(|handle| self.get(*handle).is_ok_and(|applied| applied.active))
            .collect()
    }

    /// Finds the active effect of the given unique class on the subject.
    pub fn find_unique(&self, subject: Subject, class: &str) -> Option<EffectHandle> {
        self.active_on(subject).into_iter().find(|handle| {
            self.get(*handle)
                .is_ok_and(|applied| applied.effect.unique_class() == Some(class))
        })
    }

    /// Finds the first active effect with the given name on the subject.
    pub fn find_by_name(&self, subject: Subject, name: &str) -> Option<EffectHandle> {
        self.active_on(subject)
            .into_iter()
            .find(|handle| self.get(*handle).is_ok_and(|applied| applied.name() == name))
    }
}

#[cfg(test)]
mod registry_test {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::{
        battle::BattlerHandle,
        effect::{
            CallbackRegistration,
            Effect,
            EffectRegistry,
            EffectState,
            Subject,
        },
    };

    struct Marker(&'static str);

    impl Effect for Marker {
        fn name(&self) -> &str {
            self.0
        }

        fn unique_class(&self) -> Option<&str> {
            Some("marker")
        }

        fn callbacks(&self) -> Vec<CallbackRegistration> {
            Vec::new()
        }
    }

    #[test]
    fn attaches_and_detaches_per_subject() {
        let mut registry = EffectRegistry::new();
        let battler = Subject::Battler(BattlerHandle::new(0));
        let a = registry.register(Arc::new(Marker("a")), battler, Subject::Field);
        let b = registry.register(Arc::new(Marker("b")), Subject::Field, Subject::Field);
        assert!(registry.attached(battler).is_empty());

        registry.attach(a).unwrap();
        registry.attach(b).unwrap();
        assert_eq!(registry.attached(battler), &[a]);
        assert_eq!(registry.find_unique(battler, "marker"), Some(a));
        assert_eq!(registry.find_by_name(Subject::Field, "b"), Some(b));

        registry.move_to(a, Subject::Side(1)).unwrap();
        assert!(registry.attached(battler).is_empty());
        assert_eq!(registry.attached(Subject::Side(1)), &[a]);
        assert_eq!(registry.get(a).unwrap().subject(), Subject::Side(1));

        assert!(registry.set_active(a, false).unwrap());
        assert!(registry.active_on(Subject::Side(1)).is_empty());

        registry.detach(a).unwrap();
        registry.detach(a).unwrap();
        assert!(!registry.get(a).unwrap().is_attached());
        assert_eq!(registry.get(a).unwrap().name(), "a");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn stores_typed_state() {
        let mut state = EffectState::default();
        state.set("turns", 3u8).unwrap();
        assert_eq!(state.get::<u8>("turns").unwrap(), Some(3));
        assert_eq!(state.get::<u8>("missing").unwrap(), None);
        assert!(state.get::<String>("turns").is_err());
        assert!(state.remove("turns").is_some());
        assert!(!state.contains("turns"));
    }
}
