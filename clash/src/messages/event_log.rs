use std::{
    borrow::Cow,
    fmt::Display,
    mem,
};

use itertools::Itertools;

use crate::messages::Message;

/// Trait for objects that can be written as one part of a log line.
///
/// Automatically implemented for types that implement [`Display`].
pub trait BattleLoggable {
    fn log<'s>(&'s self, items: &mut Vec<Cow<'s, str>>);
}

impl<T> BattleLoggable for T
where
    T: Display,
{
    fn log(&self, parts: &mut Vec<Cow<'_, str>>) {
        parts.push(Cow::Owned(format!("{self}")))
    }
}

/// A single rendered log line.
///
/// This object should not be constructed directly. Instead, use the [`battle_event`] macro.
pub struct BattleEvent(String);

impl BattleEvent {
    pub fn from_parts(parts: &[&dyn BattleLoggable]) -> Self {
        let mut log_parts = Vec::with_capacity(parts.len());
        for part in parts {
            part.log(&mut log_parts);
        }
        Self(log_parts.into_iter().join("|"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Constructs a [`BattleEvent`], joining every part with `|`.
///
/// This macro enforces a common format for all rendered messages.
#[macro_export]
macro_rules! battle_event {
    ($($arg:expr),* $(,)?) => {{
        $crate::messages::BattleEvent::from_parts(&[$(&$arg),*])
    }};
}

/// A log of every message a battle has emitted.
///
/// Keeps a read cursor, so callers can consume only the messages added since they last looked.
#[derive(Default)]
pub struct EventLog {
    messages: Vec<Message>,
    last_read: usize,
}

impl EventLog {
    /// Creates a new event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Does the log contain new messages since the last call to [`Self::read_out`]?
    pub fn has_new_messages(&self) -> bool {
        self.last_read < self.messages.len()
    }

    /// Pushes a new message to the log.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message)
    }

    /// Returns an iterator over all messages.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Returns every message rendered as a log line.
    pub fn logs(&self) -> impl Iterator<Item = String> + '_ {
        self.messages.iter().map(|message| message.to_string())
    }

    /// Reads out any new messages that have been added since the last call to
    /// [`Self::read_out`].
    pub fn read_out(&mut self) -> impl Iterator<Item = &Message> {
        let i = mem::replace(&mut self.last_read, self.messages.len());
        self.messages[i..].iter()
    }
}
