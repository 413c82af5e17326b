//! Inspection x reiterated-occurrence reconciliation engine.
//!
//! Pure engine crate: receives decoded row matrices and placemarks, returns
//! the merged record set and the grouped map overlay. No file IO.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod geo;
pub mod key;
pub mod matcher;
pub mod model;
pub mod report;

pub use classify::Classifier;
pub use config::{CategoryTables, ReconConfig};
pub use engine::{overlay, run};
pub use error::ReconError;
pub use geo::{build_index, GeoIndex, GeoPoint, Placemark};
pub use key::normalize_key;
pub use matcher::reconcile;
pub use model::{DeviceRecord, ExportRow, Origin, ReconInput, ReconResult};
pub use report::{build_report, OverlayDocument, OverlayReport};
