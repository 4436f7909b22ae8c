//! Loading pipeline: detects the file format, deserializes facility data,
//! and validates it into engine configurations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use citywork_core::config::{ConfigError, FacilityConfig};
use citywork_core::resource::Resource;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::schema::FacilityData;

/// TOML key holding the facility array in a catalog file.
pub const CATALOG_KEY: &str = "facilities";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A TOML catalog lacks its top-level array.
    #[error("missing key '{key}' in {file}")]
    MissingKey { file: PathBuf, key: &'static str },

    /// The data parsed but describes an invalid facility.
    #[error("invalid facility in {file}: {source}")]
    Config { file: PathBuf, source: ConfigError },

    /// Two facilities in one catalog share a name.
    #[error("duplicate facility '{name}' in {file}")]
    DuplicateFacility { file: PathBuf, name: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. TOML cannot hold a bare top-level array,
/// so for TOML files the array is read from `toml_key`; RON and JSON files
/// hold the list directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &'static str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table.remove(toml_key).ok_or_else(|| DataLoadError::MissingKey {
                file: path.to_path_buf(),
                key: toml_key,
            })?;
            array.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Facility loading
// ===========================================================================

fn validate<K: Resource>(path: &Path, data: FacilityData<K>) -> Result<FacilityConfig<K>, DataLoadError> {
    data.into_config().map_err(|source| DataLoadError::Config {
        file: path.to_path_buf(),
        source,
    })
}

/// Load a single facility definition.
pub fn load_facility<K>(path: &Path) -> Result<FacilityConfig<K>, DataLoadError>
where
    K: Resource + DeserializeOwned,
{
    let data: FacilityData<K> = deserialize_file(path)?;
    let config = validate(path, data)?;
    debug!(target: "citywork::data", file = %path.display(), facility = %config.name, "facility loaded");
    Ok(config)
}

/// Load a catalog of facility definitions keyed by name.
pub fn load_catalog<K>(path: &Path) -> Result<BTreeMap<String, FacilityConfig<K>>, DataLoadError>
where
    K: Resource + DeserializeOwned,
{
    let entries: Vec<FacilityData<K>> = deserialize_list(path, CATALOG_KEY)?;
    let mut catalog = BTreeMap::new();
    for data in entries {
        if catalog.contains_key(&data.name) {
            return Err(DataLoadError::DuplicateFacility {
                file: path.to_path_buf(),
                name: data.name,
            });
        }
        let config = validate(path, data)?;
        catalog.insert(config.name.clone(), config);
    }
    info!(target: "citywork::data", file = %path.display(), facilities = catalog.len(), "catalog loaded");
    Ok(catalog)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use citywork_core::recipe::CyclePolicy;
    use citywork_core::test_utils::{Good, bakery};
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "citywork_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const BAKERY_RON: &str = r#"(
        name: "bakery",
        materials: (capacity: 100, kinds: [Wheat]),
        products: (capacity: 50, kinds: [Bread]),
        workforce: (max: 10),
        recipes: [(name: "bake", inputs: [(Wheat, 10)], outputs: [(Bread, 12)])],
    )"#;

    const CATALOG_TOML: &str = r#"
[[facilities]]
name = "bakery"
recipes = [{ name = "bake", inputs = [["Wheat", 10]], outputs = [["Bread", 12]] }]
materials = { capacity = 100, kinds = ["Wheat"] }
products = { capacity = 50, kinds = ["Bread"] }
workforce = { max = 10 }

[[facilities]]
name = "winery"
cycle_policy = "gated"
recipes = [
    { name = "press", inputs = [["Grapes", 4]], outputs = [["Must", 2]] },
    { name = "age", inputs = [["Must", 2], ["Water", 1]], outputs = [["Wine", 1]], cycle_time = 3 },
]
materials = { capacity = 100, kinds = ["Grapes", "Water"] }
products = { capacity = 100, kinds = ["Must", "Wine"] }
workforce = { max = 8, base_floor = 0.3, scale_per_worker = 0.7 }
bonus = { seed = 9, chance = 0.2, multiplier = 1.5 }
"#;

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("bakery.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("bakery.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("bakery.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["bakery.yaml", "bakery"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // load_facility
    // -----------------------------------------------------------------------

    #[test]
    fn load_facility_ron() {
        let dir = make_test_dir("facility_ron");
        let path = dir.join("bakery.ron");
        fs::write(&path, BAKERY_RON).unwrap();

        let config = load_facility::<Good>(&path).unwrap();
        assert_eq!(config, bakery(100, 50));

        cleanup(&dir);
    }

    #[test]
    fn load_facility_json() {
        let dir = make_test_dir("facility_json");
        let path = dir.join("bakery.json");
        fs::write(
            &path,
            r#"{
                "name": "bakery",
                "materials": {"capacity": 100, "kinds": ["Wheat"]},
                "products": {"capacity": 50, "kinds": ["Bread"]},
                "workforce": {"max": 10},
                "recipes": [{"name": "bake", "inputs": [["Wheat", 10]], "outputs": [["Bread", 12]]}]
            }"#,
        )
        .unwrap();

        let config = load_facility::<Good>(&path).unwrap();
        assert_eq!(config, bakery(100, 50));

        cleanup(&dir);
    }

    #[test]
    fn load_facility_reports_parse_errors() {
        let dir = make_test_dir("facility_parse");
        let path = dir.join("broken.ron");
        fs::write(&path, "(name: \"broken\", materials: (").unwrap();

        let result = load_facility::<Good>(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn load_facility_reports_config_errors() {
        let dir = make_test_dir("facility_config");
        let path = dir.join("empty.ron");
        fs::write(&path, BAKERY_RON.replace("capacity: 50", "capacity: 0")).unwrap();

        let err = load_facility::<Good>(&path).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Config {
                source: ConfigError::ZeroCapacity { storage: "product" },
                ..
            }
        ));
        assert!(err.to_string().contains("empty.ron"));

        cleanup(&dir);
    }

    #[test]
    fn load_facility_missing_file() {
        let dir = make_test_dir("facility_missing");
        let result = load_facility::<Good>(&dir.join("nowhere.ron"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_catalog
    // -----------------------------------------------------------------------

    #[test]
    fn load_catalog_toml() {
        let dir = make_test_dir("catalog_toml");
        let path = dir.join("town.toml");
        fs::write(&path, CATALOG_TOML).unwrap();

        let catalog = load_catalog::<Good>(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["bakery"], bakery(100, 50));

        let winery = &catalog["winery"];
        assert_eq!(winery.cycle_policy, CyclePolicy::Gated);
        assert_eq!(winery.recipes[1].cycle_time(), 3);
        assert_eq!(winery.bonus.map(|b| b.seed), Some(9));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_ron_list() {
        let dir = make_test_dir("catalog_ron");
        let path = dir.join("town.ron");
        fs::write(&path, format!("[{BAKERY_RON}]")).unwrap();

        let catalog = load_catalog::<Good>(&path).unwrap();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["bakery"]);

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_rejects_duplicates() {
        let dir = make_test_dir("catalog_dup");
        let path = dir.join("town.ron");
        fs::write(&path, format!("[{BAKERY_RON}, {BAKERY_RON}]")).unwrap();

        let result = load_catalog::<Good>(&path);
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateFacility { ref name, .. }) if name == "bakery"
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_catalog_toml_missing_key() {
        let dir = make_test_dir("catalog_key");
        let path = dir.join("town.toml");
        fs::write(&path, "[[buildings]]\nname = \"bakery\"\n").unwrap();

        let result = load_catalog::<Good>(&path);
        assert!(matches!(
            result,
            Err(DataLoadError::MissingKey {
                key: "facilities",
                ..
            })
        ));

        cleanup(&dir);
    }
}
