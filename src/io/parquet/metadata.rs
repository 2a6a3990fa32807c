use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use geo::Geometry;
use indexmap::IndexMap;
use parquet::file::metadata::{FileMetaData, KeyValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GeoParquetError, Result};

/// The key under which GeoParquet metadata is stored in the Parquet key/value metadata.
pub const GEO_METADATA_KEY: &str = "geo";

/// The GeoParquet specification version written by this crate.
pub const GEOPARQUET_VERSION: &str = "1.1.0";

/// The encoding of a geometry column as recorded in the metadata.
///
/// This crate writes [`WKB`][GeoParquetColumnEncoding::WKB] only; the native encodings are
/// recognised so that metadata written by other producers still parses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum GeoParquetColumnEncoding {
    #[serde(alias = "wkb")]
    WKB,
    #[serde(rename = "point")]
    Point,
    #[serde(rename = "linestring")]
    LineString,
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "multipoint")]
    MultiPoint,
    #[serde(rename = "multilinestring")]
    MultiLineString,
    #[serde(rename = "multipolygon")]
    MultiPolygon,
}

impl Display for GeoParquetColumnEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GeoParquetColumnEncoding::*;
        match self {
            WKB => write!(f, "WKB"),
            Point => write!(f, "point"),
            LineString => write!(f, "linestring"),
            Polygon => write!(f, "polygon"),
            MultiPoint => write!(f, "multipoint"),
            MultiLineString => write!(f, "multilinestring"),
            MultiPolygon => write!(f, "multipolygon"),
        }
    }
}

/// Geometry types that are valid in GeoParquet 1.1
///
/// The declaration order is the order in which types are listed in serialized metadata.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeoParquetGeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    #[serde(rename = "Point Z")]
    PointZ,
    #[serde(rename = "LineString Z")]
    LineStringZ,
    #[serde(rename = "Polygon Z")]
    PolygonZ,
    #[serde(rename = "MultiPoint Z")]
    MultiPointZ,
    #[serde(rename = "MultiLineString Z")]
    MultiLineStringZ,
    #[serde(rename = "MultiPolygon Z")]
    MultiPolygonZ,
    #[serde(rename = "GeometryCollection Z")]
    GeometryCollectionZ,
}

impl GeoParquetGeometryType {
    /// The structural type of a 2-D geometry.
    pub fn from_geometry(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(_) => Self::Point,
            Geometry::Line(_) | Geometry::LineString(_) => Self::LineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => Self::Polygon,
            Geometry::MultiPoint(_) => Self::MultiPoint,
            Geometry::MultiLineString(_) => Self::MultiLineString,
            Geometry::MultiPolygon(_) => Self::MultiPolygon,
            Geometry::GeometryCollection(_) => Self::GeometryCollection,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
            Self::PointZ => "Point Z",
            Self::LineStringZ => "LineString Z",
            Self::PolygonZ => "Polygon Z",
            Self::MultiPointZ => "MultiPoint Z",
            Self::MultiLineStringZ => "MultiLineString Z",
            Self::MultiPolygonZ => "MultiPolygon Z",
            Self::GeometryCollectionZ => "GeometryCollection Z",
        }
    }
}

impl FromStr for GeoParquetGeometryType {
    type Err = GeoParquetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let out = match s {
            "Point" => Self::Point,
            "LineString" => Self::LineString,
            "Polygon" => Self::Polygon,
            "MultiPoint" => Self::MultiPoint,
            "MultiLineString" => Self::MultiLineString,
            "MultiPolygon" => Self::MultiPolygon,
            "GeometryCollection" => Self::GeometryCollection,
            "Point Z" => Self::PointZ,
            "LineString Z" => Self::LineStringZ,
            "Polygon Z" => Self::PolygonZ,
            "MultiPoint Z" => Self::MultiPointZ,
            "MultiLineString Z" => Self::MultiLineStringZ,
            "MultiPolygon Z" => Self::MultiPolygonZ,
            "GeometryCollection Z" => Self::GeometryCollectionZ,
            other => {
                return Err(GeoParquetError::GeoParquet(format!(
                    "Unknown value for geometry_type: {other}"
                )))
            }
        };
        Ok(out)
    }
}

impl Display for GeoParquetGeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How to interpret the edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edges {
    Planar,
    Spherical,
}

/// Column paths of a per-row bounding box, used to filter rows without decoding geometries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetBboxCovering {
    /// The path in the Parquet schema of the column that contains the xmin
    pub xmin: Vec<String>,

    /// The path in the Parquet schema of the column that contains the ymin
    pub ymin: Vec<String>,

    /// The path in the Parquet schema of the column that contains the zmin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmin: Option<Vec<String>>,

    /// The path in the Parquet schema of the column that contains the xmax
    pub xmax: Vec<String>,

    /// The path in the Parquet schema of the column that contains the ymax
    pub ymax: Vec<String>,

    /// The path in the Parquet schema of the column that contains the zmax
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zmax: Option<Vec<String>>,
}

impl GeoParquetBboxCovering {
    /// A 2-D covering stored in a struct column, e.g. `bbox.xmin`, `bbox.ymin`.
    pub fn from_struct_column(column_name: &str) -> Self {
        let path = |field: &str| vec![column_name.to_string(), field.to_string()];
        Self {
            xmin: path("xmin"),
            ymin: path("ymin"),
            zmin: None,
            xmax: path("xmax"),
            ymax: path("ymax"),
            zmax: None,
        }
    }
}

/// Simplified representations of each geometry. Only `"bbox"` is defined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetCovering {
    /// Bounding-box covering
    pub bbox: GeoParquetBboxCovering,
}

/// Top-level GeoParquet file metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetMetadata {
    /// The version identifier for the GeoParquet specification.
    pub version: String,

    /// The name of the "primary" geometry column. In cases where a GeoParquet file contains
    /// multiple geometry columns, the primary geometry may be used by default in geospatial
    /// operations.
    pub primary_column: String,

    /// Metadata about geometry columns. Each key is the name of a geometry column in the table.
    pub columns: IndexMap<String, GeoParquetColumnMetadata>,
}

/// GeoParquet column metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetColumnMetadata {
    /// Name of the geometry encoding format.
    pub encoding: GeoParquetColumnEncoding,

    /// The geometry types of all geometries, or an empty array if they are not known.
    ///
    /// - In case of 3D geometries, a `" Z"` suffix gets added (e.g. `["Point Z"]`).
    /// - A list of multiple values indicates that multiple geometry types are present (e.g.
    ///   `["Polygon", "MultiPolygon"]`).
    /// - The geometry types in the list must be unique.
    #[serde(default)]
    pub geometry_types: BTreeSet<GeoParquetGeometryType>,

    /// Bounding Box of the geometries in the file, formatted according to RFC 7946, section 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,

    /// [PROJJSON](https://proj.org/specifications/projjson.html) object representing the
    /// Coordinate Reference System (CRS) of the geometry. If the field is not provided, the
    /// default CRS is [OGC:CRS84](https://www.opengis.net/def/crs/OGC/1.3/CRS84).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,

    /// Winding order of exterior ring of polygons. If present must be `"counterclockwise"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,

    /// Edges are planar when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Edges>,

    /// Coordinate epoch in case of a dynamic CRS, expressed as a decimal year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<f64>,

    /// Object containing bounding box column names to help accelerate spatial data retrieval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covering: Option<GeoParquetCovering>,
}

impl GeoParquetColumnMetadata {
    /// Metadata for a WKB column with nothing known about its contents yet.
    pub fn new_wkb() -> Self {
        Self {
            encoding: GeoParquetColumnEncoding::WKB,
            geometry_types: BTreeSet::new(),
            bbox: None,
            additional_properties: false,
            crs: None,
            orientation: None,
            edges: None,
            epoch: None,
            covering: None,
        }
    }
}

impl GeoParquetMetadata {
    /// Construct a [`GeoParquetMetadata`] from Parquet [`FileMetaData`]
    ///
    /// Returns `None` if the file has no `geo` key.
    pub fn from_parquet_meta(metadata: &FileMetaData) -> Option<Result<Self>> {
        let kv_metadata = metadata.key_value_metadata()?;
        kv_metadata
            .iter()
            .find(|kv| kv.key == GEO_METADATA_KEY)
            .and_then(|kv| kv.value.as_deref())
            .map(Self::from_json)
    }

    pub fn from_json(value: &str) -> Result<Self> {
        serde_json::from_str(value)
            .map_err(|err| GeoParquetError::GeoParquet(format!("invalid 'geo' metadata: {err}")))
    }

    /// Serialize to a single Parquet key/value pair under the `geo` key.
    pub fn to_key_value(&self) -> Result<KeyValue> {
        Ok(KeyValue::new(
            GEO_METADATA_KEY.to_string(),
            serde_json::to_string(self)?,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use geo::{coord, point, Rect};

    // We want to ensure that extra keys in future GeoParquet versions do not break
    // By default, serde allows and ignores unknown keys
    #[test]
    fn extra_keys_in_column_metadata() {
        let s = r#"{
            "encoding": "WKB",
            "geometry_types": ["Point"],
            "other_key": true
        }"#;
        let meta: GeoParquetColumnMetadata = serde_json::from_str(s).unwrap();
        assert_eq!(meta.encoding, GeoParquetColumnEncoding::WKB);
        assert_eq!(
            meta.geometry_types.iter().next().unwrap(),
            &GeoParquetGeometryType::Point
        );
        assert!(!meta.additional_properties);
    }

    #[test]
    fn omits_absent_fields() {
        let mut column = GeoParquetColumnMetadata::new_wkb();
        column.geometry_types.insert(GeoParquetGeometryType::Polygon);
        column.geometry_types.insert(GeoParquetGeometryType::Point);
        column.bbox = Some(vec![0., 1., 2., 3.]);

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "encoding": "WKB",
                "geometry_types": ["Point", "Polygon"],
                "bbox": [0.0, 1.0, 2.0, 3.0],
                "additionalProperties": false,
            })
        );
    }

    #[test]
    fn optional_fields_round_trip() {
        let mut column = GeoParquetColumnMetadata::new_wkb();
        column.edges = Some(Edges::Spherical);
        column.epoch = Some(2021.47);
        column.orientation = Some("counterclockwise".to_string());
        column.covering = Some(GeoParquetCovering {
            bbox: GeoParquetBboxCovering::from_struct_column("bbox"),
        });

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["edges"], "spherical");
        assert_eq!(json["covering"]["bbox"]["xmin"], serde_json::json!(["bbox", "xmin"]));
        assert!(json["covering"]["bbox"].get("zmin").is_none());

        let again: GeoParquetColumnMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(again, column);
    }

    #[test]
    fn key_value_round_trip() {
        let mut columns = IndexMap::new();
        columns.insert("geometry".to_string(), GeoParquetColumnMetadata::new_wkb());
        let meta = GeoParquetMetadata {
            version: GEOPARQUET_VERSION.to_string(),
            primary_column: "geometry".to_string(),
            columns,
        };
        let kv = meta.to_key_value().unwrap();
        assert_eq!(kv.key, "geo");
        let again = GeoParquetMetadata::from_json(kv.value.as_deref().unwrap()).unwrap();
        assert_eq!(again, meta);
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            GeoParquetMetadata::from_json("{\"version\": 1}"),
            Err(GeoParquetError::GeoParquet(_))
        ));
    }

    #[test]
    fn geometry_type_names() {
        let rect = Rect::new(coord! { x: 0., y: 0. }, coord! { x: 1., y: 1. });
        assert_eq!(
            GeoParquetGeometryType::from_geometry(&Geometry::Rect(rect)),
            GeoParquetGeometryType::Polygon
        );
        assert_eq!(
            GeoParquetGeometryType::from_geometry(&Geometry::Point(point!(x: 1., y: 1.))).as_str(),
            "Point"
        );
        assert_eq!(
            "MultiPolygon Z".parse::<GeoParquetGeometryType>().unwrap(),
            GeoParquetGeometryType::MultiPolygonZ
        );
        assert!("Circle".parse::<GeoParquetGeometryType>().is_err());
    }
}
