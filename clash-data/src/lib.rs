extern crate alloc;

mod abilities;
mod common;
mod datastore;
mod items;
mod mons;
mod moves;

#[cfg(test)]
pub mod test_util;

pub use abilities::*;
pub use common::*;
pub use datastore::*;
pub use items::*;
pub use mons::*;
pub use moves::*;
