use std::{
    fs::File,
    hash::Hash,
    path::Path,
    sync::Arc,
};

use ahash::HashMap;
use anyhow::{
    Context,
    Error,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
    de::DeserializeOwned,
};

use crate::{
    AbilityData,
    FormData,
    Id,
    ItemData,
    Loader,
    MoveData,
    NatureData,
    SpeciesData,
    TypeChart,
};

fn default_struggle() -> Id {
    Id::from("struggle")
}

/// Raw tables read by a [`LocalLoader`].
///
/// Every table is keyed by resource name, which is normalized to an [`Id`] on load.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LocalLoaderTables {
    #[serde(default)]
    pub type_chart: TypeChart,
    #[serde(default)]
    pub abilities: HashMap<String, AbilityData>,
    #[serde(default)]
    pub items: HashMap<String, ItemData>,
    #[serde(default)]
    pub moves: HashMap<String, MoveData>,
    #[serde(default)]
    pub natures: HashMap<String, NatureData>,
    #[serde(default)]
    pub species: HashMap<String, SpeciesData>,
    #[serde(default)]
    pub forms: HashMap<String, FormData>,
    /// ID of the move substituted when no move is legal.
    #[serde(default = "default_struggle")]
    pub struggle: Id,
}

/// An implementation of [`Loader`] that keeps all data in memory.
///
/// Data can be read from a single JSON document or from a directory of JSON files, one per
/// table.
pub struct LocalLoader {
    type_chart: Arc<TypeChart>,
    abilities: HashMap<Id, Arc<AbilityData>>,
    items: HashMap<Id, Arc<ItemData>>,
    moves: HashMap<Id, Arc<MoveData>>,
    natures: HashMap<Id, Arc<NatureData>>,
    species: HashMap<Id, Arc<SpeciesData>>,
    forms: HashMap<Id, Arc<FormData>>,
    struggle: Id,
}

fn into_table<T>(table: HashMap<String, T>) -> HashMap<Id, Arc<T>> {
    table
        .into_iter()
        .map(|(key, value)| (Id::from(key), Arc::new(value)))
        .collect()
}

fn lookup<K, T>(table: &HashMap<K, Arc<T>>, id: &K, kind: &str) -> Result<Arc<T>>
where
    K: Eq + Hash + std::fmt::Display,
{
    table
        .get(id)
        .cloned()
        .ok_or_else(|| Error::msg(format!("{kind} {id} does not exist")))
}

impl LocalLoader {
    /// Type chart file name.
    pub const TYPE_CHART_FILE: &str = "type-chart.json";
    /// Abilities file name.
    pub const ABILITIES_FILE: &str = "abilities.json";
    /// Items file name.
    pub const ITEMS_FILE: &str = "items.json";
    /// Moves file name.
    pub const MOVES_FILE: &str = "moves.json";
    /// Natures file name.
    pub const NATURES_FILE: &str = "natures.json";
    /// Species file name.
    pub const SPECIES_FILE: &str = "species.json";
    /// Forms file name.
    pub const FORMS_FILE: &str = "forms.json";

    /// Creates a loader from already-parsed tables.
    pub fn from_tables(tables: LocalLoaderTables) -> Self {
        Self {
            type_chart: Arc::new(tables.type_chart),
            abilities: into_table(tables.abilities),
            items: into_table(tables.items),
            moves: into_table(tables.moves),
            natures: into_table(tables.natures),
            species: into_table(tables.species),
            forms: into_table(tables.forms),
            struggle: tables.struggle,
        }
    }

    /// Creates a loader from a single JSON document containing every table.
    pub fn from_json(json: &str) -> Result<Self> {
        let tables = serde_json::from_str::<LocalLoaderTables>(json)
            .context("failed to parse loader tables")?;
        Ok(Self::from_tables(tables))
    }

    /// Creates a loader that reads every table from the given directory.
    ///
    /// Missing files leave their table empty.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::msg(format!(
                "root directory for LocalLoader ({}) does not exist",
                root.display()
            )));
        }
        let tables = LocalLoaderTables {
            type_chart: read_optional_file(root, Self::TYPE_CHART_FILE)?.unwrap_or_default(),
            abilities: read_optional_file(root, Self::ABILITIES_FILE)?.unwrap_or_default(),
            items: read_optional_file(root, Self::ITEMS_FILE)?.unwrap_or_default(),
            moves: read_optional_file(root, Self::MOVES_FILE)?.unwrap_or_default(),
            natures: read_optional_file(root, Self::NATURES_FILE)?.unwrap_or_default(),
            species: read_optional_file(root, Self::SPECIES_FILE)?.unwrap_or_default(),
            forms: read_optional_file(root, Self::FORMS_FILE)?.unwrap_or_default(),
            struggle: default_struggle(),
        };
        Ok(Self::from_tables(tables))
    }
}

fn read_optional_file<T: DeserializeOwned>(root: &Path, file: &str) -> Result<Option<T>> {
    let path = root.join(file);
    if !path.is_file() {
        return Ok(None);
    }
    let path_name = path.to_string_lossy().to_string();
    let value = serde_json::from_reader(
        File::open(&path).with_context(|| format!("{path_name} could not be opened"))?,
    )
    .with_context(|| format!("failed to parse {path_name}"))?;
    Ok(Some(value))
}

impl Loader for LocalLoader {
    fn load_move(&self, id: &Id) -> Result<Arc<MoveData>> {
        lookup(&self.moves, id, "move")
    }

    fn load_ability(&self, id: &Id) -> Result<Arc<AbilityData>> {
        lookup(&self.abilities, id, "ability")
    }

    fn load_item(&self, id: &Id) -> Result<Arc<ItemData>> {
        lookup(&self.items, id, "item")
    }

    fn load_nature(&self, id: &Id) -> Result<Arc<NatureData>> {
        lookup(&self.natures, id, "nature")
    }

    fn load_species(&self, id: &Id) -> Result<Arc<SpeciesData>> {
        lookup(&self.species, id, "species")
    }

    fn load_form(&self, id: &Id) -> Result<Arc<FormData>> {
        lookup(&self.forms, id, "form")
    }

    fn load_struggle(&self) -> Result<Arc<MoveData>> {
        self.load_move(&self.struggle)
    }

    fn type_chart(&self) -> Result<Arc<TypeChart>> {
        Ok(self.type_chart.clone())
    }
}

#[cfg(test)]
mod local_loader_test {
    use assert_matches::assert_matches;

    use crate::{
        Id,
        LocalLoader,
        Loader,
        Stat,
        Type,
        TypeEffectiveness,
    };

    const DATA: &str = r#"{
        "type_chart": {
            "types": {
                "Normal": { "Ghost": 0 }
            }
        },
        "moves": {
            "Tackle": {
                "name": "Tackle",
                "category": "Physical",
                "type": "Normal",
                "base_power": 40,
                "pp": 35
            },
            "Struggle": {
                "name": "Struggle",
                "category": "Physical",
                "type": "None",
                "base_power": 50,
                "accuracy": "exempt",
                "pp": 1,
                "ppless": true
            }
        },
        "natures": {
            "Hardy": { "name": "Hardy" }
        }
    }"#;

    #[test]
    fn loads_records_by_normalized_id() {
        let loader = LocalLoader::from_json(DATA).unwrap();
        assert_eq!(loader.load_move(&Id::from("tackle")).unwrap().name, "Tackle");
        assert_eq!(loader.load_struggle().unwrap().name, "Struggle");
        assert!(loader.load_struggle().unwrap().ppless);
        assert_eq!(loader.load_nature(&Id::from("HARDY")).unwrap().increased, None);
    }

    #[test]
    fn fails_missing_records() {
        let loader = LocalLoader::from_json(DATA).unwrap();
        assert_matches!(loader.load_move(&Id::from("Surf")), Err(err) => {
            assert_eq!(err.to_string(), "move surf does not exist");
        });
        assert!(loader.load_ability(&Id::from("Overgrow")).is_err());
    }

    #[test]
    fn exposes_type_chart_and_stats() {
        let loader = LocalLoader::from_json(DATA).unwrap();
        assert_eq!(
            loader
                .type_chart()
                .unwrap()
                .effectiveness(Type::Normal, Type::Ghost),
            TypeEffectiveness::None
        );
        assert_eq!(loader.load_stat(&Id::from("spe")).unwrap(), Stat::Spe);
        assert!(loader.load_stat(&Id::from("luck")).is_err());
        assert_eq!(loader.permanent_stats().len(), 6);
    }

    #[test]
    fn fails_missing_directory() {
        assert!(LocalLoader::from_dir("/definitely/not/a/directory").is_err());
    }
}
