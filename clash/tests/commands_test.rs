use std::sync::Arc;

use anyhow::Result;
use assert_matches::assert_matches;
use clash::{
    battle::{
        Command,
        Field,
        MonsterId,
        MoveChoice,
        SpotId,
    },
    effect::{
        Callback,
        CallbackRegistration,
        Effect,
        EffectContext,
        Subject,
        apply_effect,
        remove_effect,
    },
    error::IllegalUsageError,
    mons::Monster,
    trainer::DeferredTrainer,
};
use clash_data::{
    Id,
    MoveCategory,
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

fn red() -> SpotId {
    SpotId::new(0, 0)
}

fn blue() -> SpotId {
    SpotId::new(1, 0)
}

fn bulbasaur_with_pp(pp: &[u8]) -> Monster {
    let loader = test_loader();
    let mut record = test_monster(&loader, "bulbasaur").save();
    for (slot, pp) in record.moves.iter_mut().zip(pp) {
        slot.pp = Some(*pp);
    }
    Monster::load(record, loader.as_ref()).unwrap()
}

fn singles(red_team: Vec<Monster>) -> Field {
    let mut field = TestFieldBuilder::new()
        .with_rng_factory(max_damage_rng)
        .add_trainer_with("Red", red_team, Box::new(DeferredTrainer))
        .add_trainer("Blue", &["charmander"])
        .build()
        .unwrap();
    assert_matches!(field.run(), Ok(()));
    field.log_mut().read_out().for_each(drop);
    field
}

fn doubles() -> Field {
    let mut field = TestFieldBuilder::new()
        .with_format(vec![vec![0, 0], vec![1, 1]])
        .add_trainer("Red", &["bulbasaur", "charmander", "squirtle"])
        .with_items(&["potion", "bicycle"])
        .add_trainer("Blue", &["charmander", "squirtle"])
        .build()
        .unwrap();
    assert_matches!(field.run(), Ok(()));
    field
}

fn legal_commands(field: &mut Field, spot: SpotId) -> Vec<Command> {
    let request = field.request(spot).cloned().unwrap();
    request.commands(field).unwrap()
}

fn legal_moves(field: &mut Field, spot: SpotId) -> Vec<Command> {
    let request = field.request(spot).cloned().unwrap();
    request.moves(field).unwrap()
}

fn legal_switches(field: &mut Field, spot: SpotId) -> Vec<Command> {
    let request = field.request(spot).cloned().unwrap();
    request.switches(field).unwrap()
}

fn legal_items(field: &mut Field, spot: SpotId) -> Vec<Command> {
    let request = field.request(spot).cloned().unwrap();
    request.items(field).unwrap()
}

#[test]
fn lists_one_command_per_move_target() {
    let mut field = singles(Vec::from([bulbasaur_with_pp(&[])]));
    let bulbasaur = field.battler_at(red()).unwrap().unwrap();
    let slot = |slot, target| Command::Move {
        spot: red(),
        battler: bulbasaur,
        choice: MoveChoice::Slot(slot),
        target,
    };
    assert_eq!(
        legal_commands(&mut field, red()),
        vec![
            slot(0, Some(blue())),
            slot(1, Some(blue())),
            slot(2, None),
            slot(3, None),
        ]
    );
}

#[test]
fn move_without_pp_is_illegal() {
    let mut field = singles(Vec::from([bulbasaur_with_pp(&[0])]));
    let moves = legal_moves(&mut field, red());
    assert_eq!(moves.len(), 3);
    assert!(!moves.contains(&move_command(&field, red(), 0, Some(blue()))));

    assert_matches!(
        field.select_command(move_command(&field, red(), 0, Some(blue()))),
        Err(error) => {
            assert!(error.downcast_ref::<IllegalUsageError>().is_some());
        }
    );

    // Struggle stays illegal while any move is.
    let bulbasaur = field.battler_at(red()).unwrap().unwrap();
    let struggle = Command::Move {
        spot: red(),
        battler: bulbasaur,
        choice: MoveChoice::Struggle,
        target: None,
    };
    assert_matches!(field.select_command(struggle), Err(_));
}

#[test]
fn struggle_replaces_moves_when_none_are_legal() {
    let mut field = singles(Vec::from([bulbasaur_with_pp(&[0, 0, 0, 0])]));
    let bulbasaur = field.battler_at(red()).unwrap().unwrap();
    let struggle = Command::Move {
        spot: red(),
        battler: bulbasaur,
        choice: MoveChoice::Struggle,
        target: None,
    };
    assert_eq!(legal_moves(&mut field, red()), vec![struggle.clone()]);

    let commands = [struggle, move_command(&field, blue(), 0, Some(red()))];
    select_all(&mut field, commands);

    // Struggle costs no PP: (22 * 50 * 69 / 50 / 63) + 2 = 26.
    assert_new_logs_eq(
        &mut field,
        &[
            "turn|turn:1",
            "move|mon:Charmander,1,0|name:Tackle",
            "pp|mon:Charmander,1,0|move:Tackle|delta:-1|pp:34",
            "damage|mon:Bulbasaur,0,0|delta:20|hp:100",
            "move|mon:Bulbasaur,0,0|name:Struggle",
            "damage|mon:Charmander,1,0|delta:26|hp:88",
            "turnend|turn:1",
        ],
    );
}

#[test]
fn claimed_switch_target_is_illegal_for_other_spots() {
    let mut field = doubles();
    let claim = |spot| Command::Switch {
        spot,
        replacement: MonsterId::new(0, 2),
    };
    let left = SpotId::new(0, 0);
    let right = SpotId::new(0, 1);
    assert_eq!(legal_switches(&mut field, left), vec![claim(left)]);
    assert_eq!(legal_switches(&mut field, right), vec![claim(right)]);

    assert_matches!(field.select_command(claim(left)), Ok(()));
    assert_eq!(legal_switches(&mut field, right), Vec::<Command>::new());
    assert_matches!(field.select_command(claim(right)), Err(_));
}

#[test]
fn items_are_limited_by_bag_and_usability() {
    let mut field = doubles();
    let potion = |spot| Command::Item {
        spot,
        item: Id::from("potion"),
    };
    let left = SpotId::new(0, 0);
    let right = SpotId::new(0, 1);

    // Bicycles cannot be used in battle.
    assert_eq!(legal_items(&mut field, left), vec![potion(left)]);
    assert_matches!(
        field.select_command(Command::Item {
            spot: left,
            item: Id::from("bicycle"),
        }),
        Err(_)
    );

    assert_matches!(field.select_command(potion(left)), Ok(()));
    assert_eq!(legal_items(&mut field, right), Vec::<Command>::new());
}

#[test]
fn run_needs_permission() {
    let mut field = singles(Vec::from([bulbasaur_with_pp(&[])]));
    assert!(
        !legal_commands(&mut field, red())
            .iter()
            .any(|command| matches!(command, Command::Run { .. }))
    );
    assert_matches!(field.select_command(Command::Run { spot: red() }), Err(_));
}

#[test]
fn forfeit_loses_immediately() {
    let mut field = TestFieldBuilder::new()
        .with_rng_factory(max_damage_rng)
        .with_allow_run(true)
        .add_trainer("Red", &["bulbasaur"])
        .add_trainer("Blue", &["charmander"])
        .build()
        .unwrap();
    assert_matches!(field.run(), Ok(()));
    field.log_mut().read_out().for_each(drop);

    let commands = [
        move_command(&field, blue(), 0, Some(red())),
        Command::Run { spot: red() },
    ];
    select_all(&mut field, commands);

    assert_new_logs_eq(
        &mut field,
        &["turn|turn:1", "forfeit|side:0|trainer:Red", "win|side:1"],
    );
    assert!(field.participant(0).unwrap().forfeited());
}

struct Trapped;

impl Effect for Trapped {
    fn name(&self) -> &str {
        "Trapped"
    }

    fn callbacks(&self) -> Vec<CallbackRegistration> {
        Vec::from([CallbackRegistration::new(Callback::PreventSwitch)])
    }

    fn prevent_switch(&self, ctx: &mut EffectContext, command: &Command) -> Result<bool> {
        let Some(battler) = ctx.subject_battler()? else {
            return Ok(false);
        };
        Ok(ctx.field_ref().battler(battler)?.spot() == Some(command.spot()))
    }
}

struct Taunted;

impl Effect for Taunted {
    fn name(&self) -> &str {
        "Taunted"
    }

    fn callbacks(&self) -> Vec<CallbackRegistration> {
        Vec::from([CallbackRegistration::new(Callback::PreventMoveSelection)])
    }

    fn prevent_move_selection(&self, ctx: &mut EffectContext, command: &Command) -> Result<bool> {
        let Command::Move {
            battler,
            choice: MoveChoice::Slot(slot),
            ..
        } = command
        else {
            return Ok(false);
        };
        let category = ctx.field_ref().battler(*battler)?.moves()[*slot].data.category;
        Ok(category == MoveCategory::Status)
    }
}

#[test]
fn effects_veto_switches() {
    let loader = test_loader();
    let team = Vec::from([
        test_monster(&loader, "bulbasaur"),
        test_monster(&loader, "squirtle"),
    ]);
    let mut field = singles(team);
    assert_eq!(legal_switches(&mut field, red()).len(), 1);

    let bulbasaur = Subject::Battler(field.battler_at(red()).unwrap().unwrap());
    let trapped = apply_effect(&mut field, bulbasaur, Arc::new(Trapped), bulbasaur)
        .unwrap()
        .unwrap();
    assert_eq!(legal_switches(&mut field, red()), Vec::<Command>::new());

    remove_effect(&mut field, trapped).unwrap();
    assert_eq!(legal_switches(&mut field, red()).len(), 1);
}

#[test]
fn effects_veto_move_selection() {
    let mut field = singles(Vec::from([bulbasaur_with_pp(&[])]));
    apply_effect(
        &mut field,
        Subject::Field,
        Arc::new(Taunted),
        Subject::Field,
    )
    .unwrap();
    assert_eq!(
        legal_moves(&mut field, red()),
        vec![
            move_command(&field, red(), 0, Some(blue())),
            move_command(&field, red(), 1, Some(blue())),
        ]
    );
}
