mod metadata;
mod options;
mod sync;

pub use metadata::{read_file_metadata, read_geo_metadata, ParquetFileMetadata};
pub use options::GeoParquetReaderOptions;
pub use sync::{read_geoparquet, read_geoparquet_columns, ColumnSelection};
