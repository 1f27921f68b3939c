mod event_log;
mod message;

pub use event_log::{
    BattleEvent,
    BattleLoggable,
    EventLog,
};
pub use message::{
    BattlerLabel,
    Message,
};
