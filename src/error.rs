//! Defines [`GeoParquetError`], representing all errors returned by this crate.

use geozero::error::GeozeroError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoParquetError {
    /// A required argument is missing, empty or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An in-memory or on-disk column type outside the supported set.
    #[error("Unsupported column type: {0}")]
    UnsupportedType(String),

    /// Requested columns do not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// File does not conform to the GeoParquet layout this crate expects
    #[error("GeoParquet error: {0}")]
    GeoParquet(String),

    /// No geometry columns, or geometry columns that disagree on encoding or primary marker.
    #[error("Geometry consistency error: {0}")]
    GeometryConsistency(String),

    /// A cell value does not match the type of its column.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// WKB Error
    #[error("WKB error: {0}")]
    Wkb(String),

    /// WKT Error
    #[error("WKT error: {0}")]
    Wkt(String),

    /// [GeozeroError]
    #[error(transparent)]
    Geozero(#[from] GeozeroError),

    /// [ParquetError]
    #[error(transparent)]
    Parquet(#[from] ParquetError),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoParquetError>;
