use anyhow::Result;
use hashbrown::HashSet;

use crate::{
    battle::{
        Field,
        Participant,
    },
    mons::{
        Monster,
        MonsterMove,
    },
};

/// A rule of a battle format.
///
/// Clauses validate trainers before the battle is built, and may prepare the field once it is.
/// Every validation hook returns the problems it found. An empty list passes.
#[allow(unused_variables)]
pub trait Clause: Send + Sync {
    fn name(&self) -> &str;

    /// Validates a trainer's team as a whole.
    fn validate_team(&self, participant: &Participant) -> Vec<String> {
        Vec::new()
    }

    /// Validates one monster on a team.
    fn validate_monster(&self, monster: &Monster) -> Vec<String> {
        Vec::new()
    }

    /// Validates one move known by a monster.
    fn validate_move(&self, monster: &Monster, known: &MonsterMove) -> Vec<String> {
        Vec::new()
    }

    /// Runs once the field is built, before the battle starts.
    fn init_battle(&self, field: &mut Field) -> Result<()> {
        Ok(())
    }
}

/// Basic sanity of every monster: level between 1 and 100, one to four moves, and HP and PP
/// within their maximums.
#[derive(Debug, Default)]
pub struct MonsterValidationClause;

impl MonsterValidationClause {
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 100;
    pub const MAX_MOVES: usize = 4;
}

impl Clause for MonsterValidationClause {
    fn name(&self) -> &str {
        "Monster Validation"
    }

    fn validate_monster(&self, monster: &Monster) -> Vec<String> {
        let mut problems = Vec::new();
        if !(Self::MIN_LEVEL..=Self::MAX_LEVEL).contains(&monster.level()) {
            problems.push(format!(
                "level {} is not between {} and {}",
                monster.level(),
                Self::MIN_LEVEL,
                Self::MAX_LEVEL
            ));
        }
        if monster.moves().is_empty() {
            problems.push("knows no moves".to_owned());
        }
        if monster.moves().len() > Self::MAX_MOVES {
            problems.push(format!(
                "knows {} moves, but at most {} are allowed",
                monster.moves().len(),
                Self::MAX_MOVES
            ));
        }
        if monster.hp() > monster.max_hp() {
            problems.push(format!(
                "HP {} exceeds maximum of {}",
                monster.hp(),
                monster.max_hp()
            ));
        }
        problems
    }

    fn validate_move(&self, _: &Monster, known: &MonsterMove) -> Vec<String> {
        if known.pp > known.max_pp() {
            Vec::from([format!(
                "PP {} exceeds maximum of {}",
                known.pp,
                known.max_pp()
            )])
        } else {
            Vec::new()
        }
    }
}

/// No two monsters on a team may share a species.
#[derive(Debug, Default)]
pub struct SpeciesClause;

impl Clause for SpeciesClause {
    fn name(&self) -> &str {
        "Species Clause"
    }

    fn validate_team(&self, participant: &Participant) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut problems = Vec::new();
        for monster in participant.team() {
            if !seen.insert(monster.species_id()) {
                problems.push(format!(
                    "{} appears more than once",
                    monster.species().name
                ));
            }
        }
        problems
    }
}
