//! Category assignment for merged records.
//!
//! Resolution is an ordered chain of steps; the first step that yields a
//! category wins, and the default category catches everything else.

use std::collections::HashMap;

use crate::config::{normalize_table_key, CategoryTables};
use crate::model::DeviceRecord;

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverStep {
    /// Exact feeder code in the feeder table.
    FeederCode,
    /// Leading three letters of the feeder in the prefix table.
    FeederPrefix,
    /// Leading three letters of the device label in the prefix table.
    DevicePrefix,
}

/// Steps tried in order before falling back to the default category.
pub const RESOLUTION_CHAIN: [ResolverStep; 3] = [
    ResolverStep::FeederCode,
    ResolverStep::FeederPrefix,
    ResolverStep::DevicePrefix,
];

/// Leading three-letter alphabetic run, uppercased.
///
/// `None` when the trimmed text does not start with three ASCII letters.
pub fn leading_prefix(text: &str) -> Option<String> {
    let prefix: String = text
        .trim()
        .chars()
        .take(3)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if prefix.len() == 3 && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(prefix)
    } else {
        None
    }
}

/// Lookup tables with normalized keys, built once from [`CategoryTables`].
#[derive(Debug, Clone)]
pub struct Classifier {
    feeders: HashMap<String, String>,
    prefixes: HashMap<String, String>,
    default: String,
}

impl Classifier {
    pub fn new(tables: &CategoryTables) -> Self {
        let normalize = |m: &HashMap<String, String>| -> HashMap<String, String> {
            m.iter()
                .map(|(k, v)| (normalize_table_key(k), v.clone()))
                .collect()
        };
        Self {
            feeders: normalize(&tables.feeders),
            prefixes: normalize(&tables.prefixes),
            default: tables.default.clone(),
        }
    }

    fn resolve(&self, step: ResolverStep, record: &DeviceRecord) -> Option<&str> {
        match step {
            ResolverStep::FeederCode => {
                let code = record.feeder.trim().to_uppercase();
                self.feeders.get(&code).map(String::as_str)
            }
            ResolverStep::FeederPrefix => leading_prefix(&record.feeder)
                .and_then(|p| self.prefixes.get(&p))
                .map(String::as_str),
            ResolverStep::DevicePrefix => leading_prefix(&record.device_label)
                .and_then(|p| self.prefixes.get(&p))
                .map(String::as_str),
        }
    }

    /// Category for a record. Never empty; the default is the floor.
    pub fn classify(&self, record: &DeviceRecord) -> &str {
        RESOLUTION_CHAIN
            .iter()
            .find_map(|step| self.resolve(*step, record))
            .unwrap_or(self.default.as_str())
    }

    pub fn default_category(&self) -> &str {
        &self.default
    }
}
