mod monster;
mod monster_record;

pub use monster::{
    Monster,
    MonsterMove,
};
pub use monster_record::{
    MonsterRecord,
    MoveRecord,
};
