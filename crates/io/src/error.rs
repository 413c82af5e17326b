use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened or read.
    Read { path: String, message: String },
    /// File could not be created or written.
    Write { path: String, message: String },
    /// Workbook could not be decoded.
    Workbook { path: String, message: String },
    /// Workbook has no sheets at all.
    NoSheets { path: String },
    /// A requested sheet is absent from the workbook.
    MissingSheet { path: String, sheet: String, available: Vec<String> },
    /// CSV decoding error.
    Csv { path: String, message: String },
    /// Compressed container could not be opened.
    Archive { path: String, message: String },
    /// Compressed container holds no .kml entry.
    NoMarkupEntry { path: String },
    /// Markup is not well-formed XML.
    Markup(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write {path}: {message}"),
            Self::Workbook { path, message } => write!(f, "cannot open workbook {path}: {message}"),
            Self::NoSheets { path } => write!(f, "workbook {path} contains no sheets"),
            Self::MissingSheet { path, sheet, available } => write!(
                f,
                "workbook {path} has no sheet named '{sheet}' (available: {})",
                available.join(", ")
            ),
            Self::Csv { path, message } => write!(f, "CSV error in {path}: {message}"),
            Self::Archive { path, message } => write!(f, "cannot open archive {path}: {message}"),
            Self::NoMarkupEntry { path } => {
                write!(f, "archive {path} contains no .kml file (expected doc.kml)")
            }
            Self::Markup(msg) => write!(f, "malformed KML: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}
