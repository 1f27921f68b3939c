mod battler;
mod boosts;
mod calculations;
mod command;
mod field;
mod field_options;
mod move_effect;
mod participant;
mod request;
mod side;
mod speed_order;
mod targeting;

pub use battler::{
    BattleMove,
    Battler,
    BattlerHandle,
    ForcedMove,
};
pub use boosts::{
    BattleStat,
    Boost,
    BoostTable,
};
pub use calculations::{
    apply_nature_to_stats,
    base_damage,
    calculate_monster_stats,
    critical_hit_chance,
    stage_ratio,
};
pub use command::{
    Command,
    CommandKind,
    MoveChoice,
};
pub use field::{
    Field,
    FieldState,
};
pub use field_options::{
    FieldOptions,
    RngFactory,
};
pub use move_effect::{
    Hit,
    MoveEffect,
    MoveOutcome,
    MoveUse,
};
pub use participant::{
    MonsterId,
    Participant,
};
pub use request::{
    CommandRequest,
    RequestKind,
};
pub use side::{
    Side,
    Spot,
    SpotId,
};
pub use speed_order::{
    SpeedOrderable,
    compare_priority,
    speed_sort,
};
pub use targeting::{
    possible_targets,
    resolve_targets,
};
