use anyhow::Result;

use crate::{
    battle::{
        Command,
        CommandRequest,
        Field,
    },
    error::WrapOptionError,
};

/// Decides commands for one trainer.
///
/// The field asks the trainer for a command whenever one of its spots needs a decision. A
/// trainer may answer right away, or return [`None`] and answer later with
/// [`Command::select`]. Answering with a command the request does not accept is illegal usage
/// and fails the battle.
pub trait Trainer: Send {
    /// Commands the trainer would like to use, most preferred first.
    ///
    /// Preferences that are not legal for the request are skipped.
    fn preferred_commands(
        &mut self,
        field: &mut Field,
        request: &CommandRequest,
    ) -> Result<Vec<Command>> {
        let _ = (field, request);
        Ok(Vec::new())
    }

    /// Answers a request.
    ///
    /// By default, the first legal preference wins. Without one, the first legal command
    /// does.
    fn request_command(
        &mut self,
        field: &mut Field,
        request: &CommandRequest,
    ) -> Result<Option<Command>> {
        for command in self.preferred_commands(field, request)? {
            if request.accepts(field, &command)? {
                return Ok(Some(command));
            }
        }
        let command = request
            .commands(field)?
            .into_iter()
            .next()
            .wrap_expectation_with_format(format_args!(
                "no legal command exists for {}",
                request.spot()
            ))?;
        Ok(Some(command))
    }
}

/// Always picks the first legal command.
#[derive(Debug, Default)]
pub struct FirstLegalTrainer;

impl Trainer for FirstLegalTrainer {}

/// Never answers immediately.
///
/// Commands for its spots must be selected through [`Field::select_command`], as a human player
/// would.
#[derive(Debug, Default)]
pub struct DeferredTrainer;

impl Trainer for DeferredTrainer {
    fn request_command(&mut self, _: &mut Field, _: &CommandRequest) -> Result<Option<Command>> {
        Ok(None)
    }
}
