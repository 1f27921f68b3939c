use std::fmt::{
    self,
    Display,
};

use thiserror::Error;

/// The entity that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedEntity {
    /// A trainer as a whole, such as one with an empty team.
    Trainer { trainer: String },
    /// A monster on a trainer's team.
    Monster {
        trainer: String,
        index: usize,
        name: String,
    },
    /// A move known by a monster on a trainer's team.
    Move {
        trainer: String,
        monster: usize,
        index: usize,
        name: String,
    },
}

impl Display for ValidatedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trainer { trainer } => write!(f, "trainer {trainer}"),
            Self::Monster {
                trainer,
                index,
                name,
            } => write!(f, "{name} (team slot {index} of {trainer})"),
            Self::Move {
                trainer,
                monster,
                index,
                name,
            } => write!(
                f,
                "move {name} (move slot {index} of team slot {monster} of {trainer})"
            ),
        }
    }
}

/// An error resulting from validating a trainer before battle.
///
/// Carries the offending entity and every problem found with it.
#[derive(Debug, Error)]
pub struct ValidationError {
    entity: ValidatedEntity,
    problems: Vec<String>,
}

impl ValidationError {
    /// Creates a new validation error for the given entity.
    pub fn new<I, S>(entity: ValidatedEntity, problems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity,
            problems: problems.into_iter().map(|s| s.into()).collect(),
        }
    }

    /// The entity that failed validation.
    pub fn entity(&self) -> &ValidatedEntity {
        &self.entity
    }

    /// All problems.
    pub fn problems(&self) -> impl Iterator<Item = &str> {
        self.problems.iter().map(|s| s.as_str())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed for {}: {}",
            self.entity,
            self.problems.join("; ")
        )
    }
}

#[cfg(test)]
mod validation_error_test {
    use crate::error::{
        ValidationError,
        validation_error::ValidatedEntity,
    };

    #[test]
    fn formats_entity_and_problems() {
        let error = ValidationError::new(
            ValidatedEntity::Monster {
                trainer: "Red".to_owned(),
                index: 1,
                name: "Pikachu".to_owned(),
            },
            ["level 0 is out of range", "no moves"],
        );
        assert_eq!(
            error.to_string(),
            "validation failed for Pikachu (team slot 1 of Red): level 0 is out of range; no moves"
        );
        assert_eq!(error.problems().count(), 2);
    }
}
