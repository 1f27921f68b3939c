use std::sync::Arc;

use clash::mons::{
    Monster,
    MonsterRecord,
};
use clash_data::LocalLoader;

/// Loads the data fixtures shared by every test in the workspace.
pub fn test_loader() -> Arc<LocalLoader> {
    Arc::new(
        LocalLoader::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../data"))
            .expect("failed to load test data"),
    )
}

/// A level 50 monster with perfect genes and the standard moves of its species.
pub fn test_monster(loader: &LocalLoader, species: &str) -> Monster {
    let (ability, moves): (&str, &[&str]) = match species {
        "bulbasaur" => ("Overgrow", &["Tackle", "Vine Whip", "Growl", "Swords Dance"]),
        "charmander" => ("Blaze", &["Tackle", "Ember", "Growl", "Quick Attack"]),
        "squirtle" => ("Torrent", &["Tackle", "Water Gun"]),
        "gastly" => ("Levitate", &["Lick", "Splash"]),
        _ => panic!("no test monster for {species}"),
    };
    let record: MonsterRecord = serde_json::from_value(serde_json::json!({
        "species": species,
        "level": 50,
        "nature": "Hardy",
        "ability": ability,
        "genes": { "hp": 31, "atk": 31, "def": 31, "spa": 31, "spd": 31, "spe": 31 },
        "moves": moves
            .iter()
            .map(|kind| serde_json::json!({ "kind": kind }))
            .collect::<Vec<_>>(),
    }))
    .expect("invalid test monster record");
    Monster::load(record, loader).expect("failed to load test monster")
}

pub fn test_team(loader: &LocalLoader, species: &[&str]) -> Vec<Monster> {
    species
        .iter()
        .map(|species| test_monster(loader, species))
        .collect()
}
