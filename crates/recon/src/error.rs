use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad column letter, unknown category, etc.).
    ConfigValidation(String),
    /// A column letter that cannot be turned into an index.
    BadColumn { dataset: String, field: String, value: String },
    /// A feeder or prefix table points at a category missing from the display order.
    UnknownCategory { table: String, key: String, category: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::BadColumn { dataset, field, value } => {
                write!(f, "{dataset}.{field}: '{value}' is not a column letter (expected A..ZZZ)")
            }
            Self::UnknownCategory { table, key, category } => {
                write!(
                    f,
                    "categories.{table}: '{key}' maps to '{category}', which is not listed in categories.order"
                )
            }
        }
    }
}

impl std::error::Error for ReconError {}
