use std::sync::Arc;

use anyhow::Result;
use clash_data::{
    FormData,
    Gender,
    Id,
    Loader,
    MoveData,
    NatureData,
    SpeciesData,
    StatTable,
};

use crate::{
    battle::calculate_monster_stats,
    error::WrapResultError,
    mons::{
        MonsterRecord,
        MoveRecord,
    },
};

/// A move known by a monster.
#[derive(Debug, Clone)]
pub struct MonsterMove {
    pub id: Id,
    pub data: Arc<MoveData>,
    pub pp: u8,
}

impl MonsterMove {
    pub fn max_pp(&self) -> u8 {
        self.data.pp
    }
}

/// A monster on a trainer's team.
///
/// This is the persistent record a battler projects into battle. HP, status, and PP live here so
/// they outlast any single battler.
#[derive(Debug, Clone)]
pub struct Monster {
    nickname: Option<String>,
    species_id: Id,
    species: Arc<SpeciesData>,
    form_id: Id,
    form: Arc<FormData>,
    level: u8,
    shiny: bool,
    item: Option<Id>,
    gender: Gender,
    nature_id: Id,
    nature: Arc<NatureData>,
    ability: Id,
    genes: StatTable,
    effort: StatTable,
    stats: StatTable,
    tameness: u8,
    hp: u16,
    status: String,
    moves: Vec<MonsterMove>,
}

impl Monster {
    /// Loads a monster from its record, looking up every referenced resource.
    pub fn load(record: MonsterRecord, loader: &dyn Loader) -> Result<Self> {
        let species_id = Id::from(record.species.as_str());
        let species = loader.load_species(&species_id)?;
        let form_id = match &record.form {
            Some(form) => Id::from(form.as_str()),
            None => species.default_form.clone(),
        };
        let form = loader.load_form(&form_id)?;
        let nature_id = Id::from(record.nature.as_str());
        let nature = loader.load_nature(&nature_id)?;
        let ability = Id::from(record.ability.as_str());
        loader.load_ability(&ability)?;
        let item = match &record.item {
            Some(item) => {
                let item = Id::from(item.as_str());
                loader.load_item(&item)?;
                Some(item)
            }
            None => None,
        };
        let moves = record
            .moves
            .iter()
            .map(|slot| {
                let id = Id::from(slot.kind.as_str());
                let data = loader.load_move(&id)?;
                let pp = slot.pp.unwrap_or(data.pp);
                Ok(MonsterMove { id, data, pp })
            })
            .collect::<Result<Vec<_>>>()
            .wrap_error_with_format(format_args!("failed to load moves of {}", record.species))?;
        let stats = match record.stats {
            Some(stats) => stats,
            None => calculate_monster_stats(
                &form.base_stats,
                record.level,
                &record.genes,
                &record.effort,
                &nature,
            ),
        };
        let hp = record.hp.unwrap_or(stats.hp);
        Ok(Self {
            nickname: record.nickname,
            species_id,
            species,
            form_id,
            form,
            level: record.level,
            shiny: record.shiny,
            item,
            gender: record.gender,
            nature_id,
            nature,
            ability,
            genes: record.genes,
            effort: record.effort,
            stats,
            tameness: record.tameness,
            hp,
            status: record.status,
            moves,
        })
    }

    /// Saves the monster to a plain record.
    ///
    /// Every optional field is filled, so loading the result and saving again yields the same
    /// record.
    pub fn save(&self) -> MonsterRecord {
        MonsterRecord {
            nickname: self.nickname.clone(),
            species: self.species_id.to_string(),
            form: Some(self.form_id.to_string()),
            level: self.level,
            shiny: self.shiny,
            item: self.item.as_ref().map(|item| item.to_string()),
            gender: self.gender,
            nature: self.nature_id.to_string(),
            ability: self.ability.to_string(),
            genes: self.genes.clone(),
            effort: self.effort.clone(),
            stats: Some(self.stats.clone()),
            tameness: self.tameness,
            hp: Some(self.hp),
            status: self.status.clone(),
            moves: self
                .moves
                .iter()
                .map(|slot| MoveRecord {
                    kind: slot.id.to_string(),
                    pp: Some(slot.pp),
                })
                .collect(),
        }
    }

    /// The name the monster goes by: its nickname, or its species name.
    pub fn name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.species.name)
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn species(&self) -> &SpeciesData {
        &self.species
    }

    pub fn species_id(&self) -> &Id {
        &self.species_id
    }

    pub fn form(&self) -> &Arc<FormData> {
        &self.form
    }

    pub fn form_id(&self) -> &Id {
        &self.form_id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn shiny(&self) -> bool {
        self.shiny
    }

    pub fn item(&self) -> Option<&Id> {
        self.item.as_ref()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn nature(&self) -> &NatureData {
        &self.nature
    }

    pub fn ability(&self) -> &Id {
        &self.ability
    }

    pub fn genes(&self) -> &StatTable {
        &self.genes
    }

    pub fn effort(&self) -> &StatTable {
        &self.effort
    }

    pub fn stats(&self) -> &StatTable {
        &self.stats
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn tameness(&self) -> u8 {
        self.tameness
    }

    pub fn hp(&self) -> u16 {
        self.hp
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn moves(&self) -> &[MonsterMove] {
        &self.moves
    }

    pub fn fainted(&self) -> bool {
        self.hp == 0
    }

    /// Calculates stats for the given form, as if the monster took it.
    pub fn stats_for_form(&self, form: &FormData) -> StatTable {
        calculate_monster_stats(
            &form.base_stats,
            self.level,
            &self.genes,
            &self.effort,
            &self.nature,
        )
    }

    pub(crate) fn set_hp(&mut self, hp: u16) {
        self.hp = hp.min(self.max_hp());
    }

    pub(crate) fn set_move_pp(&mut self, slot: usize, pp: u8) {
        if let Some(slot) = self.moves.get_mut(slot) {
            slot.pp = pp;
        }
    }
}
