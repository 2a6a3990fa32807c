use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use crate::algorithm::native::BoundingRect;
use crate::datatypes::GeometryFormat;
use crate::error::{GeoParquetError, Result};
use crate::io::parquet::metadata::{
    Edges, GeoParquetColumnEncoding, GeoParquetColumnMetadata, GeoParquetGeometryType,
    GeoParquetMetadata, GEOPARQUET_VERSION,
};
use crate::io::parquet::transform::{enumerate_wkb, format_for_type, wkt_to_wkb, GeometrySummary};
use crate::table::{Column, Table};

/// Information for one geometry column being written to Parquet
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// The name of this geometry column
    pub name: String,

    /// The serialized encoding for this geometry column.
    pub encoding: GeoParquetColumnEncoding,

    /// The set of string geometry types for this geometry column
    pub geometry_types: BTreeSet<GeoParquetGeometryType>,

    /// The bounding box of this column.
    pub bbox: Option<BoundingRect>,

    /// The PROJJSON CRS for this geometry column.
    pub crs: Option<Value>,

    /// If present, instructs consumers that edges follow a spherical path rather than a planar
    /// one. If this value is omitted, edges will be interpreted as planar.
    pub edges: Option<Edges>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            encoding: GeoParquetColumnEncoding::WKB,
            geometry_types: BTreeSet::new(),
            bbox: None,
            crs: None,
            edges: None,
        }
    }

    pub fn update_bbox(&mut self, new_bounds: &BoundingRect) {
        if let Some(existing_bounds) = self.bbox.as_mut() {
            existing_bounds.update(new_bounds)
        } else {
            self.bbox = Some(*new_bounds);
        }
    }

    /// Fold the measurements of one transform into this column.
    pub fn update_summary(&mut self, summary: &GeometrySummary) {
        if let Some(bbox) = summary.bbox.as_ref() {
            self.update_bbox(bbox);
        }
        self.geometry_types
            .extend(summary.geometry_types.iter().copied());
    }

    /// Returns (column_name, column_metadata)
    pub fn finish(self) -> (String, GeoParquetColumnMetadata) {
        let column_meta = GeoParquetColumnMetadata {
            encoding: self.encoding,
            geometry_types: self.geometry_types,
            bbox: self.bbox.as_ref().and_then(BoundingRect::to_bbox),
            additional_properties: false,
            crs: self.crs,
            orientation: None,
            edges: self.edges,
            epoch: None,
            covering: None,
        };
        (self.name, column_meta)
    }
}

/// Builds the `geo` metadata document for a table about to be written.
///
/// WKT geometry columns are converted to WKB in place while they are measured, so after a
/// successful [`build`][Self::build] every geometry column of the table holds WKB.
#[derive(Debug, Clone, Copy)]
pub struct GeoParquetMetadataBuilder {
    batch_size: usize,
}

impl GeoParquetMetadataBuilder {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    pub fn build(&self, table: &mut Table) -> Result<GeoParquetMetadata> {
        let geometry_columns: Vec<(usize, &Column)> = table.geometry_columns().collect();
        if geometry_columns.is_empty() {
            return Err(GeoParquetError::GeometryConsistency(
                "table has no geometry column".to_string(),
            ));
        }

        let formats: BTreeSet<_> = geometry_columns
            .iter()
            .filter_map(|(_, column)| column.geometry())
            .map(|marker| marker.format.to_string())
            .collect();
        if formats.len() > 1 {
            return Err(GeoParquetError::GeometryConsistency(
                "geometry columns mix WKT and WKB".to_string(),
            ));
        }

        let primary: Vec<&str> = geometry_columns
            .iter()
            .filter(|(_, column)| column.geometry().is_some_and(|m| m.is_primary()))
            .map(|(_, column)| column.name())
            .collect();
        let [primary_column] = primary.as_slice() else {
            return Err(GeoParquetError::GeometryConsistency(format!(
                "expected exactly one primary geometry column, found {}",
                primary.len()
            )));
        };
        let primary_column = primary_column.to_string();

        // Convert and measure everything before touching the table, so a parse failure leaves
        // it unchanged.
        let mut replacements = Vec::new();
        let mut infos = Vec::with_capacity(geometry_columns.len());
        for (index, column) in geometry_columns {
            let Some(marker) = column.geometry() else {
                continue;
            };
            if format_for_type(column.data_type()) != Some(marker.format) {
                return Err(GeoParquetError::GeometryConsistency(format!(
                    "{} geometry column '{}' has type {}",
                    marker.format,
                    column.name(),
                    column.data_type()
                )));
            }

            let mut info = ColumnInfo::new(column.name());
            match marker.format {
                GeometryFormat::Wkt => {
                    let (converted, summary) = wkt_to_wkb(column, self.batch_size)?;
                    info.update_summary(&summary);
                    replacements.push((index, converted));
                }
                GeometryFormat::Wkb => {
                    info.update_summary(&enumerate_wkb(column, self.batch_size)?);
                }
            }
            debug!(
                column = info.name.as_str(),
                geometry_types = ?info.geometry_types,
                bbox = ?info.bbox.as_ref().and_then(BoundingRect::to_bbox),
                "measured geometry column"
            );
            infos.push(info);
        }

        for (index, column) in replacements {
            table.replace_column(index, column)?;
        }

        Ok(GeoParquetMetadata {
            version: GEOPARQUET_VERSION.to_string(),
            primary_column,
            columns: infos.into_iter().map(ColumnInfo::finish).collect(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::GeometryRole;
    use crate::table::Value;
    use arrow_schema::DataType;
    use geo::{line_string, point, Geometry};

    fn table_with(columns: &[(&str, DataType, GeometryFormat, GeometryRole)]) -> Table {
        let mut table = Table::new();
        table.add_column("id", DataType::Int32).unwrap();
        for (name, data_type, _, _) in columns {
            table.add_column(*name, data_type.clone()).unwrap();
        }
        for (name, _, format, role) in columns {
            table.set_geometry_column(name, *format, *role).unwrap();
        }
        table
    }

    #[test]
    fn wkt_columns_become_wkb() {
        let mut table = crate::test::cities();
        let metadata = GeoParquetMetadataBuilder::new(2).build(&mut table).unwrap();

        assert_eq!(metadata.version, "1.1.0");
        assert_eq!(metadata.primary_column, "geometry");
        let column = &metadata.columns["geometry"];
        assert_eq!(column.encoding, GeoParquetColumnEncoding::WKB);
        assert_eq!(
            column.geometry_types,
            BTreeSet::from([GeoParquetGeometryType::Point])
        );
        assert_eq!(column.bbox, Some(vec![4.2949, 51.913, 4.8913, 52.3684]));

        let geometry = table.column("geometry").unwrap();
        assert_eq!(table.column_index("geometry"), Some(2));
        assert_eq!(geometry.data_type(), &DataType::Binary);
        assert_eq!(
            geometry.geometry().map(|m| m.format),
            Some(GeometryFormat::Wkb)
        );
    }

    #[test]
    fn wkb_columns_are_only_measured() {
        let mut table = crate::test::cities();
        GeoParquetMetadataBuilder::new(10).build(&mut table).unwrap();
        let before = table.clone();
        let metadata = GeoParquetMetadataBuilder::new(10).build(&mut table).unwrap();
        assert_eq!(table, before);
        assert_eq!(
            metadata.columns["geometry"].bbox,
            Some(vec![4.2949, 51.913, 4.8913, 52.3684])
        );
    }

    #[test]
    fn column_entries_keep_table_order() {
        let mut table = crate::test::two_geometry_columns();
        let metadata = GeoParquetMetadataBuilder::new(10).build(&mut table).unwrap();
        let names: Vec<_> = metadata.columns.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["location", "route"]);
        assert_eq!(metadata.primary_column, "route");
    }

    #[test]
    fn no_geometry_columns() {
        let mut table = table_with(&[]);
        assert!(matches!(
            GeoParquetMetadataBuilder::new(10).build(&mut table),
            Err(GeoParquetError::GeometryConsistency(_))
        ));
    }

    #[test]
    fn mixed_encodings() {
        let mut table = table_with(&[
            ("a", DataType::Utf8, GeometryFormat::Wkt, GeometryRole::Primary),
            ("b", DataType::Binary, GeometryFormat::Wkb, GeometryRole::Secondary),
        ]);
        assert!(matches!(
            GeoParquetMetadataBuilder::new(10).build(&mut table),
            Err(GeoParquetError::GeometryConsistency(_))
        ));
    }

    #[test]
    fn missing_primary() {
        let mut table = table_with(&[(
            "a",
            DataType::Utf8,
            GeometryFormat::Wkt,
            GeometryRole::Secondary,
        )]);
        assert!(matches!(
            GeoParquetMetadataBuilder::new(10).build(&mut table),
            Err(GeoParquetError::GeometryConsistency(_))
        ));
    }

    #[test]
    fn parse_failure_leaves_table_unchanged() {
        let mut table = table_with(&[
            ("a", DataType::Utf8, GeometryFormat::Wkt, GeometryRole::Primary),
            ("b", DataType::Utf8, GeometryFormat::Wkt, GeometryRole::Secondary),
        ]);
        table
            .push_row(vec![1.into(), "POINT (1 2)".into(), "POINT (1".into()])
            .unwrap();
        let before = table.clone();
        assert!(matches!(
            GeoParquetMetadataBuilder::new(10).build(&mut table),
            Err(GeoParquetError::Wkt(_))
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn empty_table_has_no_bbox() {
        let mut table = table_with(&[(
            "geometry",
            DataType::Utf8,
            GeometryFormat::Wkt,
            GeometryRole::Primary,
        )]);
        let metadata = GeoParquetMetadataBuilder::new(10).build(&mut table).unwrap();
        let column = &metadata.columns["geometry"];
        assert_eq!(column.bbox, None);
        assert!(column.geometry_types.is_empty());
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json["columns"]["geometry"].get("bbox").is_none());
        assert_eq!(json["columns"]["geometry"]["geometry_types"], serde_json::json!([]));
    }

    #[test]
    fn summaries_accumulate() {
        let mut info = ColumnInfo::new("geometry");
        let mut first = GeometrySummary::default();
        first.add_geometry(&Geometry::Point(point!(x: 0., y: 0.)));
        let mut second = GeometrySummary::default();
        second.add_geometry(&Geometry::LineString(
            line_string![(x: 1., y: 1.), (x: 2., y: -1.)],
        ));
        info.update_summary(&first);
        info.update_summary(&GeometrySummary::default());
        info.update_summary(&second);
        info.edges = Some(Edges::Spherical);
        let (name, meta) = info.finish();
        assert_eq!(name, "geometry");
        assert_eq!(meta.bbox, Some(vec![0., -1., 2., 1.]));
        assert_eq!(meta.geometry_types.len(), 2);
        assert_eq!(meta.edges, Some(Edges::Spherical));
    }

    #[test]
    fn null_cells_do_not_count() {
        let mut table = table_with(&[(
            "geometry",
            DataType::Utf8,
            GeometryFormat::Wkt,
            GeometryRole::Primary,
        )]);
        table.push_row(vec![1.into(), Value::Null]).unwrap();
        table.push_row(vec![2.into(), "POINT (3 4)".into()]).unwrap();
        let metadata = GeoParquetMetadataBuilder::new(1).build(&mut table).unwrap();
        assert_eq!(metadata.columns["geometry"].bbox, Some(vec![3., 4., 3., 4.]));
        assert_eq!(
            table.column("geometry").unwrap().get(0),
            Some(&Value::Null)
        );
    }
}
