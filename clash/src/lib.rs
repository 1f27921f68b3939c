extern crate alloc;

pub mod battle;
pub mod common;
pub mod config;
pub mod effect;
pub mod error;
pub mod messages;
pub mod mons;
pub mod trainer;

#[cfg(test)]
mod test_util;
