use clash_prng::{
    PseudoRandomNumberGenerator,
    RealPseudoRandomNumberGenerator,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Creates the random number generator for a battle from an optional seed.
pub type RngFactory = fn(seed: Option<u64>) -> Box<dyn PseudoRandomNumberGenerator>;

fn default_rng_factory() -> RngFactory {
    |seed: Option<u64>| Box::new(RealPseudoRandomNumberGenerator::new(seed))
}

/// Options for a single battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Seed for the battle's random number generator.
    ///
    /// Two battles with the same seed and the same commands play out identically.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Can trainers forfeit with a run command?
    #[serde(default)]
    pub allow_run: bool,
    /// Creates the battle's random number generator.
    ///
    /// Tests replace this to control every random draw.
    #[serde(skip, default = "default_rng_factory")]
    pub rng_factory: RngFactory,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            seed: None,
            allow_run: false,
            rng_factory: default_rng_factory(),
        }
    }
}

#[cfg(test)]
mod field_options_test {
    use crate::battle::FieldOptions;

    #[test]
    fn deserializes_with_defaults() {
        let options: FieldOptions = serde_json::from_str(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(options.seed, Some(42));
        assert!(!options.allow_run);
        assert_eq!((options.rng_factory)(Some(7)).initial_seed(), 7);
    }
}
