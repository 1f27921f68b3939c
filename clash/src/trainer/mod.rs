mod random;
mod trainer;

pub use random::{
    RandomTrainer,
    first_inactive_monster,
};
pub use trainer::{
    DeferredTrainer,
    FirstLegalTrainer,
    Trainer,
};
