use std::sync::Arc;

use anyhow::Result;
use clash_data::Loader;

use crate::{
    battle::{
        Field,
        FieldOptions,
        Participant,
    },
    config::{
        Clause,
        MonsterValidationClause,
    },
    effect::{
        EffectLibrary,
        MapEffectLibrary,
    },
    error::{
        ValidatedEntity,
        ValidationError,
    },
};

/// The rules a battle is built under: who stands where, which clauses apply, and which effects
/// back abilities, items and moves.
pub struct Rules {
    loader: Arc<dyn Loader>,
    format: Vec<Vec<usize>>,
    clauses: Vec<Arc<dyn Clause>>,
    library: Arc<dyn EffectLibrary>,
}

impl Rules {
    /// Singles between trainers 0 and 1, validating every monster, with no effect library.
    pub fn new(loader: Arc<dyn Loader>) -> Self {
        Self {
            loader,
            format: Vec::from([Vec::from([0]), Vec::from([1])]),
            clauses: Vec::from([Arc::new(MonsterValidationClause) as Arc<dyn Clause>]),
            library: Arc::new(MapEffectLibrary::new()),
        }
    }

    /// Sets the trainers owning each spot, side by side.
    pub fn with_format(mut self, format: Vec<Vec<usize>>) -> Self {
        self.format = format;
        self
    }

    pub fn with_clause<C>(mut self, clause: C) -> Self
    where
        C: Clause + 'static,
    {
        self.clauses.push(Arc::new(clause));
        self
    }

    pub fn with_library(mut self, library: Arc<dyn EffectLibrary>) -> Self {
        self.library = library;
        self
    }

    pub fn format(&self) -> &[Vec<usize>] {
        &self.format
    }

    pub fn clauses(&self) -> impl Iterator<Item = &dyn Clause> {
        self.clauses.iter().map(|clause| clause.as_ref())
    }

    /// Validates every trainer against every clause.
    ///
    /// Fails with a [`ValidationError`] for the first offending entity, carrying every problem
    /// the clauses found with it.
    pub fn validate(&self, participants: &[Participant]) -> Result<()> {
        for participant in participants {
            let trainer = participant.name().to_owned();
            let mut problems = Vec::new();
            if participant.team().is_empty() {
                problems.push("team is empty".to_owned());
            }
            for clause in &self.clauses {
                problems.extend(clause.validate_team(participant));
            }
            if !problems.is_empty() {
                return Err(
                    ValidationError::new(ValidatedEntity::Trainer { trainer }, problems).into(),
                );
            }

            for (index, monster) in participant.team().iter().enumerate() {
                let problems = self
                    .clauses
                    .iter()
                    .flat_map(|clause| clause.validate_monster(monster))
                    .collect::<Vec<_>>();
                if !problems.is_empty() {
                    let entity = ValidatedEntity::Monster {
                        trainer,
                        index,
                        name: monster.name().to_owned(),
                    };
                    return Err(ValidationError::new(entity, problems).into());
                }

                for (slot, known) in monster.moves().iter().enumerate() {
                    let problems = self
                        .clauses
                        .iter()
                        .flat_map(|clause| clause.validate_move(monster, known))
                        .collect::<Vec<_>>();
                    if !problems.is_empty() {
                        let entity = ValidatedEntity::Move {
                            trainer,
                            monster: index,
                            index: slot,
                            name: known.data.name.clone(),
                        };
                        return Err(ValidationError::new(entity, problems).into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Validates the trainers and builds a field for them.
    ///
    /// No field is built if validation fails.
    pub fn field(&self, participants: Vec<Participant>, options: FieldOptions) -> Result<Field> {
        self.validate(&participants)?;
        let mut field = Field::new(
            self.loader.clone(),
            self.library.clone(),
            &self.format,
            participants,
            options,
        )?;
        for clause in &self.clauses {
            log::debug!("initializing {}", clause.name());
            clause.init_battle(&mut field)?;
        }
        Ok(field)
    }
}

#[cfg(test)]
mod rules_test {
    use std::sync::Arc;

    use anyhow::Result;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use crate::{
        battle::{
            Field,
            FieldOptions,
            FieldState,
            Participant,
        },
        config::{
            Clause,
            Rules,
            SpeciesClause,
        },
        effect::{
            CallbackRegistration,
            Effect,
            Subject,
            apply_effect,
        },
        error::{
            ValidatedEntity,
            ValidationError,
        },
        mons::{
            Monster,
            MonsterRecord,
        },
        test_util::{
            deferred_participant,
            test_loader,
        },
        trainer::DeferredTrainer,
    };

    fn participant_with(name: &str, record: serde_json::Value) -> Participant {
        let loader = test_loader();
        let record: MonsterRecord = serde_json::from_value(record).unwrap();
        let monster = Monster::load(record, loader.as_ref()).unwrap();
        Participant::new(name, Vec::from([monster]), Box::new(DeferredTrainer))
    }

    #[test]
    fn rejects_level_out_of_range() {
        let rules = Rules::new(test_loader());
        let participants = vec![
            participant_with(
                "Red",
                serde_json::json!({
                    "species": "Bulbasaur",
                    "level": 0,
                    "nature": "Hardy",
                    "ability": "Overgrow",
                    "moves": [],
                }),
            ),
            deferred_participant("Blue", &["charmander"]),
        ];
        let error = rules
            .field(participants, FieldOptions::default())
            .err()
            .unwrap();
        assert_matches!(error.downcast_ref::<ValidationError>(), Some(error) => {
            assert_eq!(error.entity(), &ValidatedEntity::Monster {
                trainer: "Red".to_owned(),
                index: 0,
                name: "Bulbasaur".to_owned(),
            });
            assert_eq!(
                error.problems().collect::<Vec<_>>(),
                vec!["level 0 is not between 1 and 100", "knows no moves"]
            );
        });
    }

    #[test]
    fn rejects_pp_above_maximum() {
        let rules = Rules::new(test_loader());
        let participants = vec![
            participant_with(
                "Red",
                serde_json::json!({
                    "species": "Bulbasaur",
                    "level": 5,
                    "nature": "Hardy",
                    "ability": "Overgrow",
                    "moves": [{ "kind": "Tackle" }, { "kind": "Growl", "pp": 41 }],
                }),
            ),
            deferred_participant("Blue", &["charmander"]),
        ];
        let error = rules.validate(&participants).unwrap_err();
        assert_matches!(error.downcast_ref::<ValidationError>(), Some(error) => {
            assert_eq!(error.entity(), &ValidatedEntity::Move {
                trainer: "Red".to_owned(),
                monster: 0,
                index: 1,
                name: "Growl".to_owned(),
            });
        });
    }

    #[test]
    fn team_clauses_see_whole_team() {
        let rules = Rules::new(test_loader()).with_clause(SpeciesClause);
        let participants = vec![
            deferred_participant("Red", &["bulbasaur", "bulbasaur"]),
            deferred_participant("Blue", &["charmander"]),
        ];
        let error = rules.validate(&participants).unwrap_err();
        assert_matches!(error.downcast_ref::<ValidationError>(), Some(error) => {
            assert_eq!(error.entity(), &ValidatedEntity::Trainer { trainer: "Red".to_owned() });
            assert_eq!(
                error.problems().collect::<Vec<_>>(),
                vec!["Bulbasaur appears more than once"]
            );
        });
    }

    struct Announced;

    impl Effect for Announced {
        fn name(&self) -> &str {
            "Announced"
        }

        fn announce(&self) -> bool {
            true
        }

        fn callbacks(&self) -> Vec<CallbackRegistration> {
            Vec::new()
        }
    }

    struct AppliesFieldEffect;

    impl Clause for AppliesFieldEffect {
        fn name(&self) -> &str {
            "Applies Field Effect"
        }

        fn init_battle(&self, field: &mut Field) -> Result<()> {
            apply_effect(field, Subject::Field, Arc::new(Announced), Subject::Field)?;
            Ok(())
        }
    }

    #[test]
    fn initializes_battle_through_clauses() {
        let rules = Rules::new(test_loader()).with_clause(AppliesFieldEffect);
        let field = rules
            .field(
                vec![
                    deferred_participant("Red", &["bulbasaur"]),
                    deferred_participant("Blue", &["charmander"]),
                ],
                FieldOptions::default(),
            )
            .unwrap();
        assert_eq!(field.state(), FieldState::New);
        assert_eq!(
            field.log().logs().collect::<Vec<_>>(),
            vec!["start|effect:Announced|subject:field"]
        );
    }
}
