use clash::battle::{
    Command,
    Field,
    MoveChoice,
    SpotId,
};

/// A move command for the battler currently on `spot`.
#[track_caller]
pub fn move_command(field: &Field, spot: SpotId, slot: usize, target: Option<SpotId>) -> Command {
    let battler = field
        .battler_at(spot)
        .unwrap()
        .unwrap_or_else(|| panic!("no battler on {spot}"));
    Command::Move {
        spot,
        battler,
        choice: MoveChoice::Slot(slot),
        target,
    }
}

/// Selects one command after another, panicking on the first failure.
#[track_caller]
pub fn select_all<I>(field: &mut Field, commands: I)
where
    I: IntoIterator<Item = Command>,
{
    for command in commands {
        if let Err(error) = field.select_command(command.clone()) {
            panic!("failed to select {command:?}: {error:#}");
        }
    }
}
