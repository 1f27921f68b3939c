mod callback;
mod context;
mod damage_stages;
mod dispatch;
mod effect;
pub mod events;
mod library;
mod lifecycle;
mod registry;
mod subject;

pub use callback::{
    Callback,
    CallbackRegistration,
    Discipline,
};
pub use context::EffectContext;
pub use damage_stages::{
    DamageOrderKeys,
    DamageStage,
    DamageStageKind,
};
pub use dispatch::{
    run_any,
    run_callbacks,
    run_chain,
};
pub use effect::Effect;
pub use library::{
    EffectLibrary,
    MapEffectLibrary,
};
pub use lifecycle::{
    apply_effect,
    discard_effects,
    remove_effect,
    reparent_effect,
    with_effect_disabled,
};
pub use registry::{
    AppliedEffect,
    EffectHandle,
    EffectRegistry,
    EffectState,
};
pub use subject::Subject;
