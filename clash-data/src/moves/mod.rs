mod accuracy;
mod move_category;
mod move_data;
mod move_target;

pub use accuracy::Accuracy;
pub use move_category::MoveCategory;
pub use move_data::MoveData;
pub use move_target::MoveTarget;
