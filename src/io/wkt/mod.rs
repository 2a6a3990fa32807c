//! Parse and write geometries as well-known text.

mod reader;
mod writer;

pub use reader::from_wkt;
pub use writer::ToWkt;
