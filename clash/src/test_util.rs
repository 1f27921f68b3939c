use std::sync::Arc;

use clash_data::LocalLoader;

use crate::{
    battle::{
        Field,
        FieldOptions,
        Participant,
    },
    effect::MapEffectLibrary,
    mons::{
        Monster,
        MonsterRecord,
    },
    trainer::DeferredTrainer,
};

pub fn test_loader() -> Arc<LocalLoader> {
    Arc::new(LocalLoader::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../data")).unwrap())
}

/// A level 50 monster with perfect genes and the standard moves of its species.
pub fn test_monster(loader: &Arc<LocalLoader>, species: &str) -> Monster {
    let (ability, moves) = match species {
        "bulbasaur" => ("Overgrow", ["Tackle", "Vine Whip"]),
        "charmander" => ("Blaze", ["Tackle", "Ember"]),
        "squirtle" => ("Torrent", ["Tackle", "Water Gun"]),
        "gastly" => ("Levitate", ["Lick", "Splash"]),
        _ => panic!("no test monster for {species}"),
    };
    let record: MonsterRecord = serde_json::from_value(serde_json::json!({
        "species": species,
        "level": 50,
        "nature": "Hardy",
        "ability": ability,
        "genes": { "hp": 31, "atk": 31, "def": 31, "spa": 31, "spd": 31, "spe": 31 },
        "moves": moves.map(|kind| serde_json::json!({ "kind": kind })),
    }))
    .unwrap();
    Monster::load(record, loader.as_ref()).unwrap()
}

pub fn test_team(loader: &Arc<LocalLoader>, species: &[&str]) -> Vec<Monster> {
    species
        .iter()
        .map(|species| test_monster(loader, species))
        .collect()
}

pub fn deferred_participant(name: &str, species: &[&str]) -> Participant {
    let loader = test_loader();
    Participant::new(name, test_team(&loader, species), Box::new(DeferredTrainer))
}

/// A started singles battle between Red and Blue, waiting for both trainers' commands.
pub fn field_with_teams(red: &[&str], blue: &[&str]) -> Field {
    let mut field = Field::new(
        test_loader(),
        Arc::new(MapEffectLibrary::new()),
        &[vec![0], vec![1]],
        vec![
            deferred_participant("Red", red),
            deferred_participant("Blue", blue),
        ],
        FieldOptions {
            seed: Some(0),
            ..Default::default()
        },
    )
    .unwrap();
    field.run().unwrap();
    field
}

/// Bulbasaur on spot 0,0 against Charmander on spot 1,0, before any turn.
pub fn empty_field() -> Field {
    field_with_teams(&["bulbasaur"], &["charmander"])
}
