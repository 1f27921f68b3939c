use anyhow::Result;
use clash_data::MoveTarget;

use crate::battle::{
    BattlerHandle,
    Command,
    Field,
    MonsterId,
    MoveChoice,
    SpotId,
    possible_targets,
};

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A command for the coming turn.
    Turn,
    /// A mandatory replacement for a fainted battler. Only switches are legal.
    Replacement,
}

/// A request for one spot's command.
///
/// The legal commands are computed on demand, since legality depends on what other spots have
/// already selected this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    spot: SpotId,
    trainer: usize,
    battler: Option<BattlerHandle>,
    kind: RequestKind,
}

impl CommandRequest {
    pub(crate) fn new(
        spot: SpotId,
        trainer: usize,
        battler: Option<BattlerHandle>,
        kind: RequestKind,
    ) -> Self {
        Self {
            spot,
            trainer,
            battler,
            kind,
        }
    }

    pub fn spot(&self) -> SpotId {
        self.spot
    }

    /// The trainer that must answer the request.
    pub fn trainer(&self) -> usize {
        self.trainer
    }

    /// The battler standing on the spot when the request was made.
    pub fn battler(&self) -> Option<BattlerHandle> {
        self.battler
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Legal move commands.
    ///
    /// Each move with a choosable target yields one command per possible target. If no move is
    /// legal, the struggle command is the only one.
    pub fn moves(&self, field: &mut Field) -> Result<Vec<Command>> {
        let Some(battler) = self.usable_battler(field)? else {
            return Ok(Vec::new());
        };
        let slots = field.battler(battler)?.moves().len();
        let mut commands = Vec::new();
        for slot in 0..slots {
            let target = field.battler(battler)?.moves()[slot].data.target;
            for command in self.move_commands(field, battler, MoveChoice::Slot(slot), target)? {
                if field.command_allowed(&command)? {
                    commands.push(command);
                }
            }
        }
        if commands.is_empty() {
            let target = field.struggle().target;
            commands = self.move_commands(field, battler, MoveChoice::Struggle, target)?;
        }
        Ok(commands)
    }

    /// Legal switch commands.
    pub fn switches(&self, field: &mut Field) -> Result<Vec<Command>> {
        let team = field.participant(self.trainer)?.team().len();
        let mut commands = Vec::new();
        for index in 0..team {
            let command = Command::Switch {
                spot: self.spot,
                replacement: MonsterId::new(self.trainer, index),
            };
            if field.command_allowed(&command)? {
                commands.push(command);
            }
        }
        Ok(commands)
    }

    /// Legal item commands, one per distinct item in the bag.
    pub fn items(&self, field: &mut Field) -> Result<Vec<Command>> {
        let items = field.participant(self.trainer)?.items().to_vec();
        let mut commands = Vec::new();
        for item in items {
            let command = Command::Item {
                spot: self.spot,
                item,
            };
            if !commands.contains(&command) && field.command_allowed(&command)? {
                commands.push(command);
            }
        }
        Ok(commands)
    }

    /// Legal forfeit commands.
    pub fn forfeits(&self, field: &mut Field) -> Result<Vec<Command>> {
        let command = Command::Run { spot: self.spot };
        if field.command_allowed(&command)? {
            Ok(Vec::from([command]))
        } else {
            Ok(Vec::new())
        }
    }

    /// Every legal command: moves, then switches, then items, then forfeits.
    pub fn commands(&self, field: &mut Field) -> Result<Vec<Command>> {
        if self.kind == RequestKind::Replacement {
            return self.switches(field);
        }
        let mut commands = self.moves(field)?;
        commands.extend(self.switches(field)?);
        commands.extend(self.items(field)?);
        commands.extend(self.forfeits(field)?);
        Ok(commands)
    }

    /// Checks if the command is a legal answer to this request.
    pub fn accepts(&self, field: &mut Field, command: &Command) -> Result<bool> {
        if command.spot() != self.spot {
            return Ok(false);
        }
        match (self.kind, command) {
            (RequestKind::Replacement, Command::Switch { .. }) => field.command_allowed(command),
            (RequestKind::Replacement, _) => Ok(false),
            (
                RequestKind::Turn,
                Command::Move {
                    battler,
                    choice,
                    target,
                    ..
                },
            ) => {
                if self.usable_battler(field)? != Some(*battler) {
                    return Ok(false);
                }
                let move_target = match choice {
                    MoveChoice::Slot(slot) => match field.battler(*battler)?.moves().get(*slot) {
                        Some(battle_move) => battle_move.data.target,
                        None => return Ok(false),
                    },
                    MoveChoice::Struggle => {
                        // Struggle is only legal when no move is.
                        let moves = self.moves(field)?;
                        if moves.iter().any(|command| {
                            matches!(
                                command,
                                Command::Move {
                                    choice: MoveChoice::Slot(_),
                                    ..
                                }
                            )
                        }) {
                            return Ok(false);
                        }
                        field.struggle().target
                    }
                };
                let candidates = self.move_commands(field, *battler, *choice, move_target)?;
                if !candidates.iter().any(|candidate| match candidate {
                    Command::Move {
                        target: candidate, ..
                    } => candidate == target,
                    _ => false,
                }) {
                    return Ok(false);
                }
                field.command_allowed(command)
            }
            (RequestKind::Turn, _) => field.command_allowed(command),
        }
    }

    /// The battler currently on the spot, which a form change may have replaced since the
    /// request was made.
    fn usable_battler(&self, field: &Field) -> Result<Option<BattlerHandle>> {
        match field.battler_at(self.spot)? {
            Some(battler) if !field.battler_fainted(battler)? => Ok(Some(battler)),
            _ => Ok(None),
        }
    }

    fn move_commands(
        &self,
        field: &Field,
        battler: BattlerHandle,
        choice: MoveChoice,
        target: MoveTarget,
    ) -> Result<Vec<Command>> {
        let command = |target| Command::Move {
            spot: self.spot,
            battler,
            choice,
            target,
        };
        if !target.choosable() {
            return Ok(Vec::from([command(None)]));
        }
        let targets = possible_targets(field, battler, target)?;
        if targets.is_empty() {
            return Ok(Vec::from([command(None)]));
        }
        Ok(targets.into_iter().map(|target| command(Some(target))).collect())
    }
}
