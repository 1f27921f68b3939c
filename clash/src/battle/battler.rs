use std::sync::Arc;

use anyhow::Result;
use clash_data::{
    FormData,
    Fraction,
    Id,
    MoveData,
    Stat,
    StatTable,
    Type,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    battle::{
        BattleStat,
        Boost,
        BoostTable,
        Field,
        MonsterId,
        MoveChoice,
        SpotId,
        stage_ratio,
    },
    effect::{
        EffectHandle,
        events,
    },
    messages::Message,
    mons::Monster,
};

/// A handle to a battler on the field.
///
/// Handles are never reused within a battle, so a handle to a battler that has left the field
/// still refers to that same battler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BattlerHandle(usize);

impl BattlerHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// A move slot on a battler.
#[derive(Debug, Clone)]
pub struct BattleMove {
    pub id: Id,
    pub data: Arc<MoveData>,
    pub pp: u8,
    pub max_pp: u8,
    /// The monster's move slot this move mirrors its PP to.
    ///
    /// Moves learned in battle do not persist.
    pub monster_slot: Option<usize>,
}

/// A move the battler must use instead of whatever its trainer selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedMove {
    pub choice: MoveChoice,
    pub target: Option<SpotId>,
}

/// The live battle projection of a monster.
///
/// HP and status belong to the monster. Everything here is discarded when the battler leaves
/// the field.
#[derive(Debug, Clone)]
pub struct Battler {
    handle: BattlerHandle,
    monster: MonsterId,
    name: String,
    position: SpotId,
    active: bool,
    form_id: Id,
    form: Arc<FormData>,
    types: Vec<Type>,
    level: u8,
    stats: StatTable,
    pub(crate) boosts: BoostTable,
    pub(crate) moves: Vec<BattleMove>,
    pub(crate) ability: Id,
    pub(crate) item: Option<Id>,
    pub(crate) ability_effect: Option<EffectHandle>,
    pub(crate) item_effect: Option<EffectHandle>,
    pub(crate) forced_move: Option<ForcedMove>,
    pub(crate) moves_used: Vec<Id>,
}

impl Battler {
    pub(crate) fn new(
        handle: BattlerHandle,
        id: MonsterId,
        monster: &Monster,
        position: SpotId,
    ) -> Self {
        Self {
            handle,
            monster: id,
            name: monster.name().to_owned(),
            position,
            active: true,
            form_id: monster.form_id().clone(),
            form: monster.form().clone(),
            types: monster.form().types.clone(),
            level: monster.level(),
            stats: monster.stats().clone(),
            boosts: BoostTable::default(),
            moves: monster
                .moves()
                .iter()
                .enumerate()
                .map(|(slot, known)| BattleMove {
                    id: known.id.clone(),
                    data: known.data.clone(),
                    pp: known.pp,
                    max_pp: known.max_pp(),
                    monster_slot: Some(slot),
                })
                .collect(),
            ability: monster.ability().clone(),
            item: monster.item().cloned(),
            ability_effect: None,
            item_effect: None,
            forced_move: None,
            moves_used: Vec::new(),
        }
    }

    /// Rebuilds the battler for a new form under a new handle.
    ///
    /// Stages, moves, ability, and item carry over. HP is untouched.
    pub(crate) fn rebuild_for_form(
        &self,
        handle: BattlerHandle,
        form_id: Id,
        form: Arc<FormData>,
        mut stats: StatTable,
    ) -> Self {
        stats.hp = self.stats.hp;
        let mut battler = self.clone();
        battler.handle = handle;
        battler.types = form.types.clone();
        battler.form_id = form_id;
        battler.form = form;
        battler.stats = stats;
        battler
    }

    pub fn handle(&self) -> BattlerHandle {
        self.handle
    }

    /// The monster this battler projects.
    pub fn monster(&self) -> MonsterId {
        self.monster
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The spot the battler stands on, if it is still on the field.
    pub fn spot(&self) -> Option<SpotId> {
        self.active.then_some(self.position)
    }

    /// The spot the battler stands on, or last stood on.
    pub fn position(&self) -> SpotId {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn leave_field(&mut self) {
        self.active = false;
    }

    pub fn form_id(&self) -> &Id {
        &self.form_id
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn has_type(&self, typ: Type) -> bool {
        self.types.contains(&typ)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Stats before stages and effects.
    pub fn base_stats(&self) -> &StatTable {
        &self.stats
    }

    pub fn boosts(&self) -> &BoostTable {
        &self.boosts
    }

    pub fn moves(&self) -> &[BattleMove] {
        &self.moves
    }

    pub fn ability(&self) -> &Id {
        &self.ability
    }

    pub fn item(&self) -> Option<&Id> {
        self.item.as_ref()
    }

    pub fn ability_effect(&self) -> Option<EffectHandle> {
        self.ability_effect
    }

    pub fn item_effect(&self) -> Option<EffectHandle> {
        self.item_effect
    }

    pub fn forced_move(&self) -> Option<&ForcedMove> {
        self.forced_move.as_ref()
    }

    /// Moves used this turn, in order.
    pub fn moves_used(&self) -> &[Id] {
        &self.moves_used
    }

    /// Calculates a stat for the battler.
    ///
    /// Permanent stats start from the battler's stat table, and accuracy and evasion start from
    /// one. The stage ratio applies next, and the [`Effect::modify_stat`] chain last. Nothing is
    /// cached.
    ///
    /// [`Effect::modify_stat`]: crate::effect::Effect::modify_stat
    pub fn calculate_stat(
        field: &mut Field,
        battler: BattlerHandle,
        stat: BattleStat,
    ) -> Result<Fraction> {
        let context = field.battler(battler)?;
        let base = match stat {
            BattleStat::Permanent(stat) => context.stats.get(stat) as u64,
            BattleStat::Accuracy | BattleStat::Evasion => 1,
        };
        let value = match stat.boost() {
            Some(boost) => {
                let ratio = stage_ratio(context.boosts.get(boost), boost.stage_base());
                Fraction::new(base * ratio.numerator(), ratio.denominator())
            }
            None => Fraction::from(base),
        };
        events::modify_stat(field, battler, stat, value)
    }

    /// Calculates the integer value of a permanent stat.
    pub fn stat(field: &mut Field, battler: BattlerHandle, stat: Stat) -> Result<u32> {
        let value = Self::calculate_stat(field, battler, BattleStat::Permanent(stat))?;
        Ok(value.integer().min(u32::MAX as u64) as u32)
    }

    /// Changes the stage of a stat, clamping to the legal range.
    ///
    /// Returns the delta actually applied, which is what the message reports next to the
    /// requested delta.
    pub fn boost(
        field: &mut Field,
        battler: BattlerHandle,
        boost: Boost,
        delta: i8,
    ) -> Result<i8> {
        let context = field.battler_mut(battler)?;
        let applied = context.boosts.change(boost, delta);
        let stage = context.boosts.get(boost);
        let label = field.battler_label(battler)?;
        field.send_message(Message::StatChange {
            battler: label,
            boost,
            requested: delta,
            delta: applied,
            stage,
        });
        Ok(applied)
    }

    /// Deducts PP from a move slot, mirroring it to the monster.
    ///
    /// Returns the PP actually deducted.
    pub(crate) fn deduct_pp(
        field: &mut Field,
        battler: BattlerHandle,
        slot: usize,
        amount: u8,
    ) -> Result<u8> {
        let context = field.battler_mut(battler)?;
        let monster = context.monster;
        let Some(battle_move) = context.moves.get_mut(slot) else {
            return Ok(0);
        };
        let deducted = amount.min(battle_move.pp);
        battle_move.pp -= deducted;
        let pp = battle_move.pp;
        let monster_slot = battle_move.monster_slot;
        if let Some(monster_slot) = monster_slot {
            field.monster_mut(monster)?.set_move_pp(monster_slot, pp);
        }
        Ok(deducted)
    }
}

#[cfg(test)]
mod battler_test {
    use clash_data::{
        Fraction,
        Stat,
    };
    use pretty_assertions::assert_eq;

    use crate::{
        battle::{
            BattleStat,
            Battler,
            Boost,
        },
        test_util::empty_field,
    };

    #[test]
    fn stat_stages_scale_stats() {
        let mut field = empty_field();
        let battler = field.active_battlers()[0];
        let base = Battler::stat(&mut field, battler, Stat::Atk).unwrap();
        assert_eq!(Battler::boost(&mut field, battler, Boost::Atk, 2).unwrap(), 2);
        assert_eq!(Battler::stat(&mut field, battler, Stat::Atk).unwrap(), base * 2);
    }

    #[test]
    fn accuracy_starts_at_one() {
        let mut field = empty_field();
        let battler = field.active_battlers()[0];
        assert_eq!(
            Battler::calculate_stat(&mut field, battler, BattleStat::Accuracy).unwrap(),
            Fraction::new(1, 1)
        );
        Battler::boost(&mut field, battler, Boost::Evasion, -3).unwrap();
        assert_eq!(
            Battler::calculate_stat(&mut field, battler, BattleStat::Evasion).unwrap(),
            Fraction::new(1, 2)
        );
    }

    #[test]
    fn boost_reports_actual_delta() {
        let mut field = empty_field();
        let battler = field.active_battlers()[0];
        assert_eq!(Battler::boost(&mut field, battler, Boost::Def, 5).unwrap(), 5);
        assert_eq!(Battler::boost(&mut field, battler, Boost::Def, 2).unwrap(), 1);
        assert_eq!(Battler::boost(&mut field, battler, Boost::Def, 2).unwrap(), 0);
        assert_eq!(field.battler(battler).unwrap().boosts().get(Boost::Def), 6);
        assert_eq!(
            field.log().logs().last().unwrap(),
            "boost|mon:Bulbasaur,0,0|stat:def|requested:2|delta:0|stage:6"
        );
    }
}
