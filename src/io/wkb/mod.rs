//! Reading and writing ISO-flavored WKB-encoded geometries.

mod api;

pub use api::{from_wkb, to_wkb};
