//! Read and write [GeoParquet](https://github.com/opengeospatial/geoparquet) files to and from a
//! simple in-memory [`Table`].
//!
//! Geometry columns hold either WKB bytes or WKT text. On write, WKT columns are converted to WKB
//! and every geometry column is measured to produce the `geo` file metadata (bounding box and
//! geometry types). On read, geometry columns can be returned as WKB or converted back to WKT.
//!
//! ```
//! use arrow_schema::DataType;
//! use geoparquet_table::io::parquet::{
//!     read_geoparquet, write_geoparquet, GeoParquetReaderOptions, GeoParquetWriterOptions,
//! };
//! use geoparquet_table::{GeometryFormat, Table};
//!
//! let mut table = Table::new();
//! table.add_column("name", DataType::Utf8)?;
//! table.add_column("geometry", DataType::Utf8)?;
//! table.push_row(vec!["Amsterdam".into(), "POINT (4.8913 52.3684)".into()])?;
//!
//! let mut buf = Vec::new();
//! write_geoparquet(
//!     &mut table,
//!     &mut buf,
//!     "geometry",
//!     GeometryFormat::Wkt,
//!     &GeoParquetWriterOptions::default(),
//! )?;
//!
//! let options = GeoParquetReaderOptions::default().with_geometry_format(GeometryFormat::Wkt);
//! let again = read_geoparquet(bytes::Bytes::from(buf), &options)?;
//! assert_eq!(again.num_rows(), 1);
//! # Ok::<(), geoparquet_table::error::GeoParquetError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod algorithm;
pub mod datatypes;
pub mod error;
pub mod io;
pub mod table;
#[cfg(test)]
pub(crate) mod test;

pub use datatypes::{GeometryFormat, GeometryMarker, GeometryRole};
pub use error::{GeoParquetError, Result};
pub use table::{Column, Table, Value};
