use parquet::file::properties::WriterProperties;

use crate::error::Result;
use crate::io::parquet::{check_batch_size, DEFAULT_BATCH_SIZE};

/// Options for writing GeoParquet
#[derive(Debug, Clone)]
pub struct GeoParquetWriterOptions {
    /// The number of rows handed to a column writer, and converted from WKT, at a time.
    pub batch_size: usize,

    /// Compression, page sizes and the `created_by` string of the output file. Parquet defaults
    /// when `None`.
    pub writer_properties: Option<WriterProperties>,
}

impl GeoParquetWriterOptions {
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    pub fn with_writer_properties(self, writer_properties: WriterProperties) -> Self {
        Self {
            writer_properties: Some(writer_properties),
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_batch_size(self.batch_size)
    }
}

impl Default for GeoParquetWriterOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            writer_properties: None,
        }
    }
}
