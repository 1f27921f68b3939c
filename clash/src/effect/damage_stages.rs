use anyhow::Result;
use clash_data::Fraction;
use clash_prng::rand_util;

use crate::{
    battle::Hit,
    common::{
        OrderKey,
        OrderKeySequence,
    },
    effect::{
        Callback,
        CallbackRegistration,
        Effect,
        EffectContext,
    },
};

/// Order keys of the standard damage modifiers, from first to last.
///
/// Effects that modify damage place their handlers relative to these keys.
#[derive(Debug, Clone)]
pub struct DamageOrderKeys {
    pub flat_bonus: OrderKey,
    pub critical_hit: OrderKey,
    pub variance: OrderKey,
    pub same_type_bonus: OrderKey,
    pub effectiveness: OrderKey,
}

impl DamageOrderKeys {
    /// Appends the standard stages to the end of a sequence.
    pub fn new(sequence: &mut OrderKeySequence) -> Self {
        Self {
            flat_bonus: sequence.new_last(),
            critical_hit: sequence.new_last(),
            variance: sequence.new_last(),
            same_type_bonus: sequence.new_last(),
            effectiveness: sequence.new_last(),
        }
    }
}

/// One of the standard steps of the damage chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageStageKind {
    /// Adds 2.
    FlatBonus,
    /// Doubles damage on a critical hit.
    CriticalHit,
    /// Multiplies by a uniform roll in 85..=100 percent.
    Variance,
    /// Multiplies by 3/2 if the user shares the move's type.
    SameTypeBonus,
    /// Multiplies by the hit's type effectiveness.
    Effectiveness,
}

/// A standard damage modifier, attached to the field when it is created.
pub struct DamageStage {
    kind: DamageStageKind,
    key: OrderKey,
}

impl DamageStage {
    pub fn new(kind: DamageStageKind, keys: &DamageOrderKeys) -> Self {
        let key = match kind {
            DamageStageKind::FlatBonus => &keys.flat_bonus,
            DamageStageKind::CriticalHit => &keys.critical_hit,
            DamageStageKind::Variance => &keys.variance,
            DamageStageKind::SameTypeBonus => &keys.same_type_bonus,
            DamageStageKind::Effectiveness => &keys.effectiveness,
        };
        Self {
            kind,
            key: key.clone(),
        }
    }

    /// All standard stages, in chain order.
    pub fn all(keys: &DamageOrderKeys) -> Vec<Self> {
        [
            DamageStageKind::FlatBonus,
            DamageStageKind::CriticalHit,
            DamageStageKind::Variance,
            DamageStageKind::SameTypeBonus,
            DamageStageKind::Effectiveness,
        ]
        .into_iter()
        .map(|kind| Self::new(kind, keys))
        .collect()
    }

    pub fn kind(&self) -> DamageStageKind {
        self.kind
    }
}

impl Effect for DamageStage {
    fn name(&self) -> &str {
        match self.kind {
            DamageStageKind::FlatBonus => "Flat Damage Bonus",
            DamageStageKind::CriticalHit => "Critical Hit Damage",
            DamageStageKind::Variance => "Damage Variance",
            DamageStageKind::SameTypeBonus => "Same Type Attack Bonus",
            DamageStageKind::Effectiveness => "Type Effectiveness",
        }
    }

    fn callbacks(&self) -> Vec<CallbackRegistration> {
        Vec::from([
            CallbackRegistration::new(Callback::ModifyMoveDamage).ordered(self.key.clone())
        ])
    }

    fn modify_move_damage(&self, ctx: &mut EffectContext, hit: &Hit, damage: u32) -> Result<u32> {
        match self.kind {
            DamageStageKind::FlatBonus => Ok(damage + 2),
            DamageStageKind::CriticalHit => {
                if hit.critical_hit {
                    Ok(damage * 2)
                } else {
                    Ok(damage)
                }
            }
            DamageStageKind::Variance => {
                let roll = rand_util::range(ctx.field().prng(), 85, 101) as u32;
                Ok(damage * roll / 100)
            }
            DamageStageKind::SameTypeBonus => {
                if ctx.field_ref().battler(hit.user)?.has_type(hit.move_type) {
                    Ok(Fraction::new(3, 2).apply(damage as u64) as u32)
                } else {
                    Ok(damage)
                }
            }
            DamageStageKind::Effectiveness => Ok(hit.effectiveness.apply(damage as u64) as u32),
        }
    }
}

#[cfg(test)]
mod damage_stages_test {
    use itertools::Itertools;

    use crate::{
        common::OrderKeySequence,
        effect::{
            DamageOrderKeys,
            DamageStage,
            DamageStageKind,
        },
    };

    #[test]
    fn stages_are_ordered_in_sequence() {
        let mut sequence = OrderKeySequence::new();
        let keys = DamageOrderKeys::new(&mut sequence);
        let stages = DamageStage::all(&keys);
        assert_eq!(
            stages.iter().map(|stage| stage.kind()).collect::<Vec<_>>(),
            vec![
                DamageStageKind::FlatBonus,
                DamageStageKind::CriticalHit,
                DamageStageKind::Variance,
                DamageStageKind::SameTypeBonus,
                DamageStageKind::Effectiveness,
            ]
        );
        assert!(
            stages
                .iter()
                .map(|stage| stage.key.clone())
                .tuple_windows()
                .all(|(a, b)| a < b)
        );
    }
}
