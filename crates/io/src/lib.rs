// File I/O operations

pub mod csv;
pub mod error;
pub mod kml;
pub mod rows;
pub mod xlsx;

pub use error::IoError;
