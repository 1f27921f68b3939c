mod clause;
mod rules;

pub use clause::{
    Clause,
    MonsterValidationClause,
    SpeciesClause,
};
pub use rules::Rules;
