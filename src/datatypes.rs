use std::fmt::Display;
use std::str::FromStr;

use arrow_schema::DataType;

use crate::error::GeoParquetError;

/// The representation of geometries held by a column of a [`Table`][crate::table::Table].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryFormat {
    /// Well-known binary, stored in a [`DataType::Binary`] column.
    #[default]
    Wkb,
    /// Well-known text, stored in a [`DataType::Utf8`] column.
    Wkt,
}

impl GeometryFormat {
    /// The column type that holds geometries in this format.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Wkb => DataType::Binary,
            Self::Wkt => DataType::Utf8,
        }
    }
}

impl Display for GeometryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wkb => write!(f, "WKB"),
            Self::Wkt => write!(f, "WKT"),
        }
    }
}

impl FromStr for GeometryFormat {
    type Err = GeoParquetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WKB" => Ok(Self::Wkb),
            "WKT" => Ok(Self::Wkt),
            other => Err(GeoParquetError::InvalidArgument(format!(
                "unknown geometry format: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryRole {
    /// The default geometry column of the table.
    Primary,
    Secondary,
}

/// Side metadata attached to a geometry column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryMarker {
    pub format: GeometryFormat,
    pub role: GeometryRole,
}

impl GeometryMarker {
    pub fn new(format: GeometryFormat, role: GeometryRole) -> Self {
        Self { format, role }
    }

    pub fn is_primary(&self) -> bool {
        self.role == GeometryRole::Primary
    }

    /// The same role with a different representation.
    pub fn with_format(self, format: GeometryFormat) -> Self {
        Self { format, ..self }
    }
}
