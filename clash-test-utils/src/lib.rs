mod commands;
mod data;
mod log_assert;
mod logging;
mod rng;
mod scripted_trainer;
mod test_field_builder;

pub use commands::{
    move_command,
    select_all,
};
pub use data::{
    test_loader,
    test_monster,
    test_team,
};
pub use log_assert::{
    assert_logs_since_turn_eq,
    assert_new_logs_eq,
};
pub use logging::init_test_logging;
pub use rng::{
    ControlledRandomNumberGenerator,
    FixedRandomNumberGenerator,
    get_controlled_rng,
    max_damage_rng,
};
pub use scripted_trainer::{
    CommandScript,
    ScriptedTrainer,
};
pub use test_field_builder::TestFieldBuilder;
