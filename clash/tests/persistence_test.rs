use assert_matches::assert_matches;
use clash::{
    battle::{
        Field,
        MonsterId,
        SpotId,
    },
    mons::{
        Monster,
        MonsterRecord,
    },
};
use clash_data::Id;
use clash_test_utils::{
    TestFieldBuilder,
    max_damage_rng,
    move_command,
    select_all,
    test_loader,
};
use pretty_assertions::assert_eq;

fn red() -> SpotId {
    SpotId::new(0, 0)
}

fn blue() -> SpotId {
    SpotId::new(1, 0)
}

fn field_after_one_turn() -> Field {
    let mut field = TestFieldBuilder::new()
        .with_rng_factory(max_damage_rng)
        .add_trainer("Red", &["bulbasaur"])
        .add_trainer("Blue", &["charmander"])
        .build()
        .unwrap();
    assert_matches!(field.run(), Ok(()));
    let commands = [
        move_command(&field, red(), 0, Some(blue())),
        move_command(&field, blue(), 0, Some(red())),
    ];
    select_all(&mut field, commands);
    field
}

#[test]
fn battle_damage_and_pp_persist_to_monster() {
    let field = field_after_one_turn();
    let record = field.monster(MonsterId::new(0, 0)).unwrap().save();
    assert_eq!(record.hp, Some(100));
    assert_eq!(record.moves[0].kind, "tackle");
    assert_eq!(record.moves[0].pp, Some(34));
    assert_eq!(record.moves[1].pp, Some(25));
}

#[test]
fn saved_monster_survives_json() {
    let field = field_after_one_turn();
    let saved = field.monster(MonsterId::new(1, 0)).unwrap().save();
    let json = serde_json::to_string(&saved).unwrap();
    let record: MonsterRecord = serde_json::from_str(&json).unwrap();
    let loader = test_loader();
    let monster = Monster::load(record, loader.as_ref()).unwrap();
    assert_eq!(monster.hp(), 93);
    assert_eq!(monster.save(), saved);
}

#[test]
fn battle_local_changes_do_not_persist() {
    let mut field = field_after_one_turn();
    let battler = field.battler_at(red()).unwrap().unwrap();
    field
        .set_item(battler, Some(Id::from("Leftovers")))
        .unwrap();
    field.set_ability(battler, Id::from("Levitate")).unwrap();

    let record = field.monster(MonsterId::new(0, 0)).unwrap().save();
    assert_eq!(record.item, None);
    assert_eq!(record.ability, "overgrow");
}
