use assert_matches::assert_matches;
use clash::{
    battle::{
        Field,
        MonsterId,
        SpotId,
    },
    mons::{
        Monster,
        MoveRecord,
    },
    trainer::DeferredTrainer,
};
use clash_test_utils::{
    TestFieldBuilder,
    assert_new_logs_eq,
    max_damage_rng,
    move_command,
    select_all,
    test_loader,
    test_monster,
};

fn make_field(red: &[&str], blue: &[&str]) -> Field {
    let mut field = TestFieldBuilder::new()
        .with_rng_factory(max_damage_rng)
        .add_trainer("Red", red)
        .add_trainer("Blue", blue)
        .build()
        .unwrap();
    assert_matches!(field.run(), Ok(()));
    field
}

fn red() -> SpotId {
    SpotId::new(0, 0)
}

fn blue() -> SpotId {
    SpotId::new(1, 0)
}

#[test]
fn tackles_deal_exact_damage_in_speed_order() {
    let mut field = make_field(&["bulbasaur"], &["charmander"]);
    assert_new_logs_eq(
        &mut field,
        &[
            "battlestart",
            "switch|mon:Charmander,1,0|trainer:Blue",
            "switch|mon:Bulbasaur,0,0|trainer:Red",
        ],
    );

    let commands = [
        move_command(&field, red(), 0, Some(blue())),
        move_command(&field, blue(), 0, Some(red())),
    ];
    select_all(&mut field, commands);

    // Charmander: (22 * 40 * 72 / 50 / 69) + 2 = 20.
    // Bulbasaur: (22 * 40 * 69 / 50 / 63) + 2 = 21.
    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:1",
            "move|mon:Charmander,1,0|name:Tackle",
            "pp|mon:Charmander,1,0|move:Tackle|delta:-1|pp:34",
            "damage|mon:Bulbasaur,0,0|delta:20|hp:100",
            "move|mon:Bulbasaur,0,0|name:Tackle",
            "pp|mon:Bulbasaur,0,0|move:Tackle|delta:-1|pp:34",
            "damage|mon:Charmander,1,0|delta:21|hp:93",
            "turnend|turn:1",
        ],
    );
    assert_eq!(field.turn(), 1);
}

#[test]
fn same_type_bonus_and_effectiveness_apply_after_variance() {
    let mut field = make_field(&["bulbasaur"], &["squirtle"]);
    field.log_mut().read_out().for_each(drop);

    let commands = [
        move_command(&field, red(), 1, Some(blue())),
        move_command(&field, blue(), 1, Some(red())),
    ];
    select_all(&mut field, commands);

    // Vine Whip: 16 + 2 = 18, then 3/2 for Grass, then 2 against Water.
    // Water Gun: 14 + 2 = 16, then 3/2 for Water, then 1/2 against Grass.
    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:1",
            "move|mon:Bulbasaur,0,0|name:Vine Whip",
            "pp|mon:Bulbasaur,0,0|move:Vine Whip|delta:-1|pp:24",
            "effectiveness|mon:Squirtle,1,0|multiplier:2",
            "damage|mon:Squirtle,1,0|delta:54|hp:65",
            "move|mon:Squirtle,1,0|name:Water Gun",
            "pp|mon:Squirtle,1,0|move:Water Gun|delta:-1|pp:24",
            "effectiveness|mon:Bulbasaur,0,0|multiplier:1/2",
            "damage|mon:Bulbasaur,0,0|delta:12|hp:108",
            "turnend|turn:1",
        ],
    );
}

#[test]
fn immunity_deals_no_damage() {
    let mut field = make_field(&["bulbasaur"], &["gastly"]);
    field.log_mut().read_out().for_each(drop);

    let commands = [
        move_command(&field, red(), 0, Some(blue())),
        move_command(&field, blue(), 1, None),
    ];
    select_all(&mut field, commands);

    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:1",
            "move|mon:Gastly,1,0|name:Splash",
            "pp|mon:Gastly,1,0|move:Splash|delta:-1|pp:39",
            "move|mon:Bulbasaur,0,0|name:Tackle",
            "pp|mon:Bulbasaur,0,0|move:Tackle|delta:-1|pp:34",
            "effectiveness|mon:Gastly,1,0|multiplier:0",
            "turnend|turn:1",
        ],
    );
    let gastly = field.monster(MonsterId::new(1, 0)).unwrap();
    assert_eq!(gastly.hp(), gastly.max_hp());
}

#[test]
fn status_move_spends_pp_without_damage() {
    let mut field = make_field(&["bulbasaur"], &["charmander"]);
    field.log_mut().read_out().for_each(drop);

    let commands = [
        move_command(&field, red(), 2, None),
        move_command(&field, blue(), 2, None),
    ];
    select_all(&mut field, commands);

    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:1",
            "move|mon:Charmander,1,0|name:Growl",
            "pp|mon:Charmander,1,0|move:Growl|delta:-1|pp:39",
            "move|mon:Bulbasaur,0,0|name:Growl",
            "pp|mon:Bulbasaur,0,0|move:Growl|delta:-1|pp:39",
            "turnend|turn:1",
        ],
    );
}

#[test]
fn priority_beats_speed() {
    let loader = test_loader();
    let mut record = test_monster(&loader, "bulbasaur").save();
    record.moves = Vec::from([MoveRecord {
        kind: "Quick Attack".to_owned(),
        pp: None,
    }]);
    let bulbasaur = Monster::load(record, loader.as_ref()).unwrap();
    let mut field = TestFieldBuilder::new()
        .with_rng_factory(max_damage_rng)
        .add_trainer_with("Red", Vec::from([bulbasaur]), Box::new(DeferredTrainer))
        .add_trainer("Blue", &["charmander"])
        .build()
        .unwrap();
    assert_matches!(field.run(), Ok(()));
    field.log_mut().read_out().for_each(drop);

    let commands = [
        move_command(&field, red(), 0, Some(blue())),
        move_command(&field, blue(), 0, Some(red())),
    ];
    select_all(&mut field, commands);

    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:1",
            "move|mon:Bulbasaur,0,0|name:Quick Attack",
            "pp|mon:Bulbasaur,0,0|move:Quick Attack|delta:-1|pp:29",
            "damage|mon:Charmander,1,0|delta:21|hp:93",
            "move|mon:Charmander,1,0|name:Tackle",
            "pp|mon:Charmander,1,0|move:Tackle|delta:-1|pp:34",
            "damage|mon:Bulbasaur,0,0|delta:20|hp:100",
            "turnend|turn:1",
        ],
    );
}
