use arrow_schema::DataType;
use indexmap::IndexMap;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;

use crate::error::{GeoParquetError, Result};
use crate::io::parquet::catalog::ColumnCatalog;
use crate::io::parquet::metadata::GeoParquetMetadata;

/// Schema and size of a Parquet file, without reading any column data.
#[derive(Debug, Clone, PartialEq)]
pub struct ParquetFileMetadata {
    /// Column names and the in-memory types they are read as, in file order.
    pub columns: IndexMap<String, DataType>,
    pub num_row_groups: usize,
    pub num_rows: usize,
    /// Total compressed size of all row groups, in bytes.
    pub size: u64,
    /// Parquet format version.
    pub version: i32,
    pub created_by: Option<String>,
}

impl ParquetFileMetadata {
    pub fn try_new(metadata: &ParquetMetaData) -> Result<Self> {
        let file_metadata = metadata.file_metadata();
        let catalog = ColumnCatalog::try_from_parquet_schema(file_metadata.schema_descr())?;
        let columns = catalog
            .iter()
            .map(|adapter| (adapter.name().to_string(), adapter.data_type()))
            .collect();
        let size = metadata
            .row_groups()
            .iter()
            .map(|row_group| row_group.compressed_size().max(0) as u64)
            .sum();
        Ok(Self {
            columns,
            num_row_groups: metadata.num_row_groups(),
            num_rows: file_metadata.num_rows().max(0) as usize,
            size,
            version: file_metadata.version(),
            created_by: file_metadata.created_by().map(String::from),
        })
    }
}

/// Read the schema and row counts of a Parquet file.
pub fn read_file_metadata<R: ChunkReader + 'static>(reader: R) -> Result<ParquetFileMetadata> {
    let reader = SerializedFileReader::new(reader)?;
    ParquetFileMetadata::try_new(reader.metadata())
}

/// Read the `geo` metadata document of a GeoParquet file.
///
/// Fails with [`GeoParquetError::GeoParquet`] when the file has none.
pub fn read_geo_metadata<R: ChunkReader + 'static>(reader: R) -> Result<GeoParquetMetadata> {
    let reader = SerializedFileReader::new(reader)?;
    GeoParquetMetadata::from_parquet_meta(reader.metadata().file_metadata()).ok_or_else(|| {
        GeoParquetError::GeoParquet("file has no 'geo' metadata".to_string())
    })?
}
