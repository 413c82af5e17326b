use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::ReconError;
use crate::geo::CoordinatePolicy;
use crate::key::column_index;

/// Category tables compiled into the engine.
const BUILTIN_CATEGORIES: &str = include_str!("../data/categories.toml");

static BUILTIN: OnceLock<CategoryTables> = OnceLock::new();

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "builtin_categories")]
    pub categories: CategoryTables,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            columns: ColumnsConfig::default(),
            geo: GeoConfig::default(),
            output: OutputConfig::default(),
            categories: builtin_categories(),
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub inspection: InspectionColumns,
    #[serde(default)]
    pub reiterated: ReiteratedColumns,
}

/// Letter-addressed columns of the inspection sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionColumns {
    #[serde(default = "default_inspection_device")]
    pub device: String,
    #[serde(default = "default_inspection_installation")]
    pub installation: String,
    #[serde(default = "default_inspection_work_order")]
    pub work_order: String,
}

impl Default for InspectionColumns {
    fn default() -> Self {
        Self {
            device: default_inspection_device(),
            installation: default_inspection_installation(),
            work_order: default_inspection_work_order(),
        }
    }
}

/// Letter-addressed columns of the reiterated-occurrences sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct ReiteratedColumns {
    #[serde(default = "default_reiterated_element")]
    pub element: String,
    #[serde(default = "default_reiterated_feeder")]
    pub feeder: String,
}

impl Default for ReiteratedColumns {
    fn default() -> Self {
        Self {
            element: default_reiterated_element(),
            feeder: default_reiterated_feeder(),
        }
    }
}

fn default_inspection_device() -> String {
    "AP".into()
}

fn default_inspection_installation() -> String {
    "E".into()
}

fn default_inspection_work_order() -> String {
    "H".into()
}

fn default_reiterated_element() -> String {
    "A".into()
}

fn default_reiterated_feeder() -> String {
    "C".into()
}

/// Zero-based column positions resolved from [`InspectionColumns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionLayout {
    pub device: usize,
    pub installation: usize,
    pub work_order: usize,
}

impl Default for InspectionLayout {
    fn default() -> Self {
        Self { device: 41, installation: 4, work_order: 7 }
    }
}

/// Zero-based column positions resolved from [`ReiteratedColumns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReiteratedLayout {
    pub element: usize,
    pub feeder: usize,
}

impl Default for ReiteratedLayout {
    fn default() -> Self {
        Self { element: 0, feeder: 2 }
    }
}

fn resolve(dataset: &str, field: &str, letters: &str) -> Result<usize, ReconError> {
    column_index(letters).ok_or_else(|| ReconError::BadColumn {
        dataset: dataset.into(),
        field: field.into(),
        value: letters.into(),
    })
}

impl InspectionColumns {
    pub fn layout(&self) -> Result<InspectionLayout, ReconError> {
        Ok(InspectionLayout {
            device: resolve("inspection", "device", &self.device)?,
            installation: resolve("inspection", "installation", &self.installation)?,
            work_order: resolve("inspection", "work_order", &self.work_order)?,
        })
    }
}

impl ReiteratedColumns {
    pub fn layout(&self) -> Result<ReiteratedLayout, ReconError> {
        Ok(ReiteratedLayout {
            element: resolve("reiterated", "element", &self.element)?,
            feeder: resolve("reiterated", "feeder", &self.feeder)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Geo + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoConfig {
    /// Also drop placemarks whose longitude or latitude is exactly zero.
    #[serde(default)]
    pub reject_zero: bool,
}

impl GeoConfig {
    pub fn policy(&self) -> CoordinatePolicy {
        if self.reject_zero {
            CoordinatePolicy::NonZero
        } else {
            CoordinatePolicy::Finite
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_document_name")]
    pub document_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { document_name: default_document_name() }
    }
}

fn default_document_name() -> String {
    "Resultado - Reiteradas x Inspecao".into()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Static feeder/prefix lookup tables plus the display order of categories.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTables {
    /// Named categories in display order. The default category always
    /// follows them and is not listed here.
    pub order: Vec<String>,
    #[serde(default = "default_category")]
    pub default: String,
    /// Exact feeder code -> category.
    #[serde(default)]
    pub feeders: HashMap<String, String>,
    /// Three-letter prefix -> category.
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
}

fn default_category() -> String {
    "Outros".into()
}

impl CategoryTables {
    /// The tables shipped with the engine, parsed once per process.
    pub fn builtin() -> &'static CategoryTables {
        BUILTIN.get_or_init(|| {
            toml::from_str(BUILTIN_CATEGORIES).expect("built-in category table must be valid TOML")
        })
    }

    /// Full display order: named categories, then the default.
    pub fn display_order(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str).chain(std::iter::once(self.default.as_str()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.order.is_empty() {
            return Err(ReconError::ConfigValidation(
                "categories.order must list at least one category".into(),
            ));
        }
        if self.default.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "categories.default must not be blank".into(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.order {
            if name == &self.default {
                return Err(ReconError::ConfigValidation(format!(
                    "categories.order must not contain the default category '{name}'"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "categories.order lists '{name}' twice"
                )));
            }
        }

        for (table, entries) in [("feeders", &self.feeders), ("prefixes", &self.prefixes)] {
            for (key, category) in entries {
                if !seen.contains(category.as_str()) {
                    return Err(ReconError::UnknownCategory {
                        table: table.into(),
                        key: key.clone(),
                        category: category.clone(),
                    });
                }
            }
        }

        for key in self.prefixes.keys() {
            let trimmed = key.trim();
            if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ReconError::ConfigValidation(format!(
                    "categories.prefixes: '{key}' is not a three-letter prefix"
                )));
            }
        }

        // Lookups run on normalized keys; two spellings of one key would race.
        for (table, entries) in [("feeders", &self.feeders), ("prefixes", &self.prefixes)] {
            let mut normalized = HashSet::new();
            for key in entries.keys() {
                let table_key = normalize_table_key(key);
                if !normalized.insert(table_key.clone()) {
                    return Err(ReconError::ConfigValidation(format!(
                        "categories.{table}: '{table_key}' is listed more than once"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Lookup form of a feeder code or prefix table key.
pub fn normalize_table_key(key: &str) -> String {
    key.trim().to_uppercase()
}

fn builtin_categories() -> CategoryTables {
    CategoryTables::builtin().clone()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        self.columns.inspection.layout()?;
        self.columns.reiterated.layout()?;
        self.categories.validate()?;

        if self.output.document_name.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "output.document_name must not be blank".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        let tables = CategoryTables::builtin();
        tables.validate().unwrap();
        assert_eq!(tables.order.len(), 4);
        assert_eq!(tables.default, "Outros");
        assert_eq!(tables.feeders["QXD01P2"], "Quixadá");
        assert_eq!(tables.prefixes["QXB"], "Quixadá");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.columns.inspection.layout().unwrap(), InspectionLayout::default());
        assert_eq!(config.columns.reiterated.layout().unwrap(), ReiteratedLayout::default());
        assert_eq!(config.geo.policy(), CoordinatePolicy::Finite);
        assert_eq!(config.output.document_name, "Resultado - Reiteradas x Inspecao");
        assert_eq!(config.categories.order, CategoryTables::builtin().order);
    }

    #[test]
    fn display_order_ends_with_default() {
        let order: Vec<&str> = CategoryTables::builtin().display_order().collect();
        assert_eq!(order, vec!["Quixadá", "Canindé", "Russas", "Iguatu", "Outros"]);
    }

    #[test]
    fn parse_column_overrides() {
        let input = r#"
[columns.inspection]
device = "B"

[columns.reiterated]
feeder = "d"

[geo]
reject_zero = true
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        let ins = config.columns.inspection.layout().unwrap();
        assert_eq!(ins.device, 1);
        assert_eq!(ins.installation, 4);
        assert_eq!(ins.work_order, 7);
        let rei = config.columns.reiterated.layout().unwrap();
        assert_eq!(rei.element, 0);
        assert_eq!(rei.feeder, 3);
        assert_eq!(config.geo.policy(), CoordinatePolicy::NonZero);
    }

    #[test]
    fn parse_custom_categories() {
        let input = r#"
[categories]
order = ["Norte", "Sul"]
default = "Outros"

[categories.feeders]
NRT01 = "Norte"

[categories.prefixes]
SUL = "Sul"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.categories.order, vec!["Norte", "Sul"]);
        assert_eq!(config.categories.feeders.len(), 1);
        assert_eq!(config.categories.prefixes["SUL"], "Sul");
    }

    #[test]
    fn reject_bad_column_letter() {
        let input = r#"
[columns.inspection]
device = "A1"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("inspection.device"));
    }

    #[test]
    fn reject_four_letter_column() {
        let err = ReconConfig::from_toml("[columns.inspection]\ndevice = \"AAAA\"\n").unwrap_err();
        assert!(matches!(err, ReconError::BadColumn { .. }));
        assert!(err.to_string().contains("inspection.device"));
    }

    #[test]
    fn reject_keys_equal_after_normalization() {
        let input = r#"
[categories]
order = ["A", "B"]

[categories.feeders]
qxd01 = "A"
QXD01 = "B"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("QXD01"));

        let input = r#"
[categories]
order = ["A", "B"]

[categories.prefixes]
qxb = "A"
" QXB" = "A"
"#;
        assert!(ReconConfig::from_toml(input).is_err());
    }

    #[test]
    fn reject_unknown_category() {
        let input = r#"
[categories]
order = ["Norte"]

[categories.prefixes]
SUL = "Sul"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'Sul'"));
    }

    #[test]
    fn reject_long_prefix() {
        let input = r#"
[categories]
order = ["Norte"]

[categories.prefixes]
NORT = "Norte"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("three-letter"));
    }

    #[test]
    fn reject_default_in_order() {
        let input = r#"
[categories]
order = ["Norte", "Outros"]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("default category"));
    }

    #[test]
    fn reject_duplicate_order() {
        let input = r#"
[categories]
order = ["Norte", "Norte"]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn reject_malformed_toml() {
        let err = ReconConfig::from_toml("[geo\nreject_zero = ").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
