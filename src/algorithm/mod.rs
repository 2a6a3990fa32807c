//! Algorithms implemented on geometries read from or written to GeoParquet.

pub mod native;
