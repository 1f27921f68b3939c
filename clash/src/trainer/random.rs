use anyhow::Result;
use clash_prng::rand_util;

use crate::{
    battle::{
        Command,
        CommandRequest,
        Field,
        MonsterId,
        RequestKind,
    },
    error::WrapOptionError,
    trainer::Trainer,
};

/// The first team member of the trainer that can be sent out.
pub fn first_inactive_monster(field: &Field, trainer: usize) -> Option<MonsterId> {
    field.available_monsters(trainer).first().copied()
}

/// Picks a random legal command.
///
/// Replacements pick a random legal switch, so a team member already claimed by another spot is
/// never picked twice. Turns pick uniformly from every legal command, except that running is
/// never chosen.
#[derive(Debug, Default)]
pub struct RandomTrainer;

impl Trainer for RandomTrainer {
    fn request_command(
        &mut self,
        field: &mut Field,
        request: &CommandRequest,
    ) -> Result<Option<Command>> {
        if request.kind() == RequestKind::Replacement {
            let switches = request.switches(field)?;
            let command = rand_util::sample_slice(field.prng(), &switches)
                .cloned()
                .wrap_expectation_with_format(format_args!(
                    "trainer {} has nothing to send out",
                    request.trainer()
                ))?;
            return Ok(Some(command));
        }
        let commands = request
            .commands(field)?
            .into_iter()
            .filter(|command| !matches!(command, Command::Run { .. }))
            .collect::<Vec<_>>();
        let command = rand_util::sample_slice(field.prng(), &commands)
            .cloned()
            .wrap_expectation_with_format(format_args!(
                "no legal command exists for {}",
                request.spot()
            ))?;
        Ok(Some(command))
    }
}

#[cfg(test)]
mod random_test {
    use pretty_assertions::assert_eq;

    use crate::{
        battle::MonsterId,
        test_util::empty_field,
        trainer::first_inactive_monster,
    };

    #[test]
    fn active_monsters_are_not_inactive() {
        let field = empty_field();
        assert_eq!(first_inactive_monster(&field, 0), None);
        assert_eq!(first_inactive_monster(&field, 1), None);
    }

    #[test]
    fn picks_reserve_members() {
        let field = crate::test_util::field_with_teams(&["bulbasaur", "charmander"], &[
            "charmander",
        ]);
        assert_eq!(
            first_inactive_monster(&field, 0),
            Some(MonsterId::new(0, 1))
        );
    }
}
