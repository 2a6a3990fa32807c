//! Readers and writers for GeoParquet, plus the WKB and WKT geometry encodings it relies on.

mod display;
pub mod parquet;
pub mod wkb;
pub mod wkt;
