//! Read and write the [GeoParquet](https://github.com/opengeospatial/geoparquet) format.
//!
//! Tables are read and written through the low-level Parquet column API, one typed column at a
//! time and in bounded batches. Geometry columns are stored as WKB; WKT columns are converted on
//! write and, optionally, back on read.

pub mod batch;
pub mod catalog;
pub mod column;
mod metadata;
mod reader;
#[cfg(test)]
mod test;
pub mod transform;
mod writer;

use crate::error::{GeoParquetError, Result};

pub use metadata::{
    Edges, GeoParquetBboxCovering, GeoParquetColumnEncoding, GeoParquetColumnMetadata,
    GeoParquetCovering, GeoParquetGeometryType, GeoParquetMetadata, GEOPARQUET_VERSION,
    GEO_METADATA_KEY,
};
pub use reader::{
    read_file_metadata, read_geo_metadata, read_geoparquet, read_geoparquet_columns,
    ColumnSelection, GeoParquetReaderOptions, ParquetFileMetadata,
};
pub use writer::{
    write_geoparquet, write_geoparquet_multiple, ColumnInfo, GeoParquetMetadataBuilder,
    GeoParquetWriterOptions,
};

/// Rows handled per column read, column write or geometry conversion unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 65536;

pub(crate) fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(GeoParquetError::InvalidArgument(
            "batch size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
