use crate::datatypes::GeometryFormat;
use crate::error::Result;
use crate::io::parquet::{check_batch_size, DEFAULT_BATCH_SIZE};

/// Options for reading (Geo)Parquet
///
/// The geometry format only applies to files with GeoParquet metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoParquetReaderOptions {
    /// The number of rows read from each column at a time.
    batch_size: usize,

    /// The representation of geometry columns in the returned table.
    geometry_format: GeometryFormat,
}

impl GeoParquetReaderOptions {
    /// Set the number of rows read from each column at a time. Defaults to 65536.
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Return geometry columns as WKB bytes (the default) or as WKT text.
    pub fn with_geometry_format(self, geometry_format: GeometryFormat) -> Self {
        Self {
            geometry_format,
            ..self
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn geometry_format(&self) -> GeometryFormat {
        self.geometry_format
    }

    pub fn validate(&self) -> Result<()> {
        check_batch_size(self.batch_size)
    }
}

impl Default for GeoParquetReaderOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            geometry_format: GeometryFormat::Wkb,
        }
    }
}
