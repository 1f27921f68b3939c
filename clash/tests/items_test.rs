use std::sync::Arc;

use anyhow::Result;
use assert_matches::assert_matches;
use clash::{
    battle::{
        Command,
        Field,
        SpotId,
    },
    effect::{
        Callback,
        CallbackRegistration,
        Effect,
        EffectContext,
        Subject,
        apply_effect,
    },
};
use clash_data::Id;
use clash_test_utils::{
    TestFieldBuilder,
    assert_new_logs_eq,
    max_damage_rng,
    move_command,
    select_all,
};

fn red() -> SpotId {
    SpotId::new(0, 0)
}

fn blue() -> SpotId {
    SpotId::new(1, 0)
}

/// Potions restore 20 HP to the trainer's active battler.
struct Pharmacy;

impl Effect for Pharmacy {
    fn name(&self) -> &str {
        "Pharmacy"
    }

    fn callbacks(&self) -> Vec<CallbackRegistration> {
        Vec::from([CallbackRegistration::new(Callback::UseItem)])
    }

    fn use_item(&self, ctx: &mut EffectContext, trainer: usize, item: &Id) -> Result<()> {
        if item != &Id::from("potion") {
            return Ok(());
        }
        let field = ctx.field();
        let battlers = field.active_battlers();
        for battler in battlers {
            if field.battler(battler)?.monster().trainer == trainer {
                field.heal_battler(battler, 20)?;
            }
        }
        Ok(())
    }
}

fn make_field() -> Field {
    let mut field = TestFieldBuilder::new()
        .with_rng_factory(max_damage_rng)
        .add_trainer("Red", &["bulbasaur"])
        .with_items(&["potion"])
        .add_trainer("Blue", &["charmander"])
        .build()
        .unwrap();
    apply_effect(
        &mut field,
        Subject::Field,
        Arc::new(Pharmacy),
        Subject::Field,
    )
    .unwrap();
    assert_matches!(field.run(), Ok(()));
    field
}

#[test]
fn potion_heals_before_moves() {
    let mut field = make_field();
    let commands = [
        move_command(&field, red(), 0, Some(blue())),
        move_command(&field, blue(), 0, Some(red())),
    ];
    select_all(&mut field, commands);
    field.log_mut().read_out().for_each(drop);

    let commands = [
        move_command(&field, blue(), 0, Some(red())),
        Command::Item {
            spot: red(),
            item: Id::from("potion"),
        },
    ];
    select_all(&mut field, commands);
    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:2",
            "useitem|trainer:Red|item:Potion",
            "heal|mon:Bulbasaur,0,0|delta:20|hp:120",
            "move|mon:Charmander,1,0|name:Tackle",
            "pp|mon:Charmander,1,0|move:Tackle|delta:-1|pp:33",
            "damage|mon:Bulbasaur,0,0|delta:20|hp:100",
            "turnend|turn:2",
        ],
    );
    assert!(field.participant(0).unwrap().items().is_empty());

    let request = field.request(red()).cloned().unwrap();
    assert_eq!(request.items(&mut field).unwrap(), Vec::<Command>::new());
}

#[test]
fn potion_at_full_hp_heals_nothing() {
    let mut field = make_field();
    field.log_mut().read_out().for_each(drop);
    let commands = [
        Command::Item {
            spot: red(),
            item: Id::from("potion"),
        },
        move_command(&field, blue(), 1, Some(red())),
    ];
    select_all(&mut field, commands);
    let logs = field
        .log_mut()
        .read_out()
        .map(|message| message.to_string())
        .collect::<Vec<_>>();
    assert_eq!(logs[1], "useitem|trainer:Red|item:Potion");
    assert!(!logs.iter().any(|log| log.starts_with("heal")));
}
