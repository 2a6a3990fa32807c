use geo::{Geometry, Point};
use geozero::wkt::Wkt;
use geozero::ToGeo;

use crate::error::{GeoParquetError, Result};

/// Parse a WKT string to a [`geo::Geometry`].
///
/// Only the first two dimensions are kept. `POINT EMPTY` becomes a `Point` with NaN coordinates.
pub fn from_wkt(wkt: &str) -> Result<Geometry> {
    if is_empty_point(wkt) {
        return Ok(Geometry::Point(Point::new(f64::NAN, f64::NAN)));
    }
    Wkt(wkt)
        .to_geo()
        .map_err(|err| GeoParquetError::Wkt(format!("{err} in '{wkt}'")))
}

/// `POINT EMPTY`, optionally with a `Z`, `M` or `ZM` tag, in any case.
fn is_empty_point(wkt: &str) -> bool {
    let tokens: Vec<&str> = wkt.split_whitespace().collect();
    match tokens.as_slice() {
        [keyword, last] => {
            keyword.eq_ignore_ascii_case("POINT") && last.eq_ignore_ascii_case("EMPTY")
        }
        [keyword, dims, last] => {
            keyword.eq_ignore_ascii_case("POINT")
                && ["Z", "M", "ZM"].iter().any(|d| dims.eq_ignore_ascii_case(d))
                && last.eq_ignore_ascii_case("EMPTY")
        }
        _ => false,
    }
}
