mod metadata;
mod options;
mod sync;

pub use metadata::{ColumnInfo, GeoParquetMetadataBuilder};
pub use options::GeoParquetWriterOptions;
pub use sync::{write_geoparquet, write_geoparquet_multiple};
