use std::{
    collections::VecDeque,
    sync::{
        Arc,
        Mutex,
    },
};

use anyhow::Result;
use clash::{
    battle::{
        Command,
        CommandRequest,
        Field,
    },
    trainer::Trainer,
};

/// Commands queued for a [`ScriptedTrainer`].
///
/// Tests keep this handle after the trainer moves into the field, so commands can be queued once
/// battler handles are known.
#[derive(Clone, Default)]
pub struct CommandScript {
    queue: Arc<Mutex<VecDeque<Command>>>,
}

impl CommandScript {
    pub fn push(&self, command: Command) {
        self.lock().push_back(command);
    }

    pub fn extend<I>(&self, commands: I)
    where
        I: IntoIterator<Item = Command>,
    {
        self.lock().extend(commands);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn pop(&self) -> Option<Command> {
        self.lock().pop_front()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Command>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Answers requests with queued commands, in order.
///
/// Once the script runs dry, the trainer defers like a human player would.
pub struct ScriptedTrainer {
    script: CommandScript,
}

impl ScriptedTrainer {
    pub fn new() -> (Self, CommandScript) {
        let script = CommandScript::default();
        (
            Self {
                script: script.clone(),
            },
            script,
        )
    }
}

impl Trainer for ScriptedTrainer {
    fn request_command(&mut self, _: &mut Field, _: &CommandRequest) -> Result<Option<Command>> {
        Ok(self.script.pop())
    }
}
