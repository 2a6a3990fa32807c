use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use geo::{Geometry, Point};
use geozero::wkb::Wkb;
use geozero::{CoordDimensions, ToGeo, ToWkb};

use crate::error::{GeoParquetError, Result};

const WKB_POINT: u32 = 1;

/// Parse a WKB buffer to a [`geo::Geometry`].
///
/// An empty point (all coordinates NaN) becomes a `Point` with NaN coordinates.
pub fn from_wkb(buf: &[u8]) -> Result<Geometry> {
    if is_empty_point(buf) {
        return Ok(Geometry::Point(Point::new(f64::NAN, f64::NAN)));
    }
    Wkb(buf.to_vec())
        .to_geo()
        .map_err(|err| GeoParquetError::Wkb(err.to_string()))
}

/// Encode a geometry as little-endian 2-D WKB.
pub fn to_wkb(geom: &Geometry) -> Result<Vec<u8>> {
    match geom {
        Geometry::Point(point) if point.x().is_nan() && point.y().is_nan() => {
            let mut buf = Vec::with_capacity(21);
            buf.write_u8(1)?;
            buf.write_u32::<LittleEndian>(WKB_POINT)?;
            buf.write_f64::<LittleEndian>(f64::NAN)?;
            buf.write_f64::<LittleEndian>(f64::NAN)?;
            Ok(buf)
        }
        _ => Ok(geom.to_wkb(CoordDimensions::xy())?),
    }
}

/// Number of ordinates of a point geometry type code, ISO or EWKB flavored.
fn point_dimensions(geometry_type: u32) -> Option<usize> {
    match geometry_type {
        1 => Some(2),
        1001 | 2001 => Some(3),
        3001 => Some(4),
        // EWKB Z and M flags, without an embedded SRID
        t if t & 0x0fff_ffff == WKB_POINT && t & 0x2000_0000 == 0 => {
            Some(2 + usize::from(t & 0x8000_0000 != 0) + usize::from(t & 0x4000_0000 != 0))
        }
        _ => None,
    }
}

fn is_empty_point(buf: &[u8]) -> bool {
    let mut reader = Cursor::new(buf);
    let big_endian = match reader.read_u8() {
        Ok(0) => true,
        Ok(1) => false,
        _ => return false,
    };
    let geometry_type = if big_endian {
        reader.read_u32::<BigEndian>()
    } else {
        reader.read_u32::<LittleEndian>()
    };
    let Some(dims) = geometry_type.ok().and_then(point_dimensions) else {
        return false;
    };
    let all_nan = (0..dims).all(|_| {
        let ordinate = if big_endian {
            reader.read_f64::<BigEndian>()
        } else {
            reader.read_f64::<LittleEndian>()
        };
        ordinate.is_ok_and(f64::is_nan)
    });
    all_nan && reader.position() == buf.len() as u64
}
