use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

/// The gender of a specific monster.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Gender {
    #[string = "U"]
    #[alias = "Unknown"]
    #[default]
    Unknown,
    #[string = "F"]
    #[alias = "Female"]
    Female,
    #[string = "M"]
    #[alias = "Male"]
    Male,
}

impl Gender {
    /// The gender symbol shown next to a monster's name.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Female => "♀",
            Self::Male => "♂",
        }
    }
}
