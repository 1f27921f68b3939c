mod form_data;
mod gender;
mod nature_data;
mod species_data;
mod stat;
mod r#type;

pub use form_data::FormData;
pub use gender::Gender;
pub use nature_data::NatureData;
pub use species_data::SpeciesData;
pub use stat::{
    Stat,
    StatTable,
    StatTableEntries,
};
pub use r#type::{
    Type,
    TypeChart,
    TypeEffectiveness,
    TypeTable,
};
