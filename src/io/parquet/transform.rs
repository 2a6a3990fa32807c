//! Conversion of geometry columns between WKT and WKB, measuring them on the way.

use std::collections::BTreeSet;

use arrow_schema::DataType;
use geo::Geometry;
use tracing::trace;

use crate::algorithm::native::BoundingRect;
use crate::datatypes::GeometryFormat;
use crate::error::{GeoParquetError, Result};
use crate::io::parquet::check_batch_size;
use crate::io::parquet::metadata::GeoParquetGeometryType;
use crate::io::wkb::{from_wkb, to_wkb};
use crate::io::wkt::{from_wkt, ToWkt};
use crate::table::{Column, Value};

/// The extent and geometry types seen in one geometry column.
///
/// Returned fresh from every transform; nothing is carried over between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySummary {
    /// `None` when the column held no non-null geometry.
    pub bbox: Option<BoundingRect>,
    pub geometry_types: BTreeSet<GeoParquetGeometryType>,
}

impl GeometrySummary {
    pub fn add_geometry(&mut self, geometry: &Geometry) {
        self.geometry_types
            .insert(GeoParquetGeometryType::from_geometry(geometry));
        self.bbox
            .get_or_insert_with(BoundingRect::new)
            .add_geometry(geometry);
    }

    /// `[minx, miny, maxx, maxy]` when at least one coordinate was seen.
    pub fn bbox_vec(&self) -> Option<Vec<f64>> {
        self.bbox.as_ref().and_then(BoundingRect::to_bbox)
    }
}

fn wrong_cell(column: &Column, value: &Value, expected: &str) -> GeoParquetError {
    let found = value
        .data_type()
        .map(|dt| dt.to_string())
        .unwrap_or_else(|| "null".to_string());
    GeoParquetError::Conversion(format!(
        "geometry column '{}' holds a {found} value, expected {expected}",
        column.name()
    ))
}

/// Apply `f` to every non-empty geometry cell, batch by batch. Empty cells map to null.
fn map_cells<F>(column: &Column, batch_size: usize, mut f: F) -> Result<Vec<Value>>
where
    F: FnMut(&Value) -> Result<Option<Value>>,
{
    check_batch_size(batch_size)?;
    let mut out = Vec::with_capacity(column.len());
    for (batch_index, batch) in column.values().chunks(batch_size).enumerate() {
        for value in batch {
            out.push(f(value)?.unwrap_or(Value::Null));
        }
        trace!(column = column.name(), batch = batch_index, rows = batch.len(), "transformed batch");
    }
    Ok(out)
}

fn parse_wkt_cell(column: &Column, value: &Value) -> Result<Option<Geometry>> {
    match value {
        Value::Null => Ok(None),
        Value::Utf8(text) if text.is_empty() => Ok(None),
        Value::Utf8(text) => from_wkt(text).map(Some),
        other => Err(wrong_cell(column, other, "WKT text")),
    }
}

fn parse_wkb_cell(column: &Column, value: &Value) -> Result<Option<Geometry>> {
    match value {
        Value::Null => Ok(None),
        Value::Binary(buf) if buf.is_empty() => Ok(None),
        Value::Binary(buf) => from_wkb(buf).map(Some),
        other => Err(wrong_cell(column, other, "WKB bytes")),
    }
}

fn output_column(column: &Column, format: GeometryFormat, values: Vec<Value>) -> Column {
    let output = Column::from_values(column.name(), format.data_type(), values);
    match column.geometry() {
        Some(marker) => output.with_geometry(marker.with_format(format)),
        None => output,
    }
}

/// Convert a WKT text column to a WKB binary column of the same name and role.
pub fn wkt_to_wkb(column: &Column, batch_size: usize) -> Result<(Column, GeometrySummary)> {
    let mut summary = GeometrySummary::default();
    let values = map_cells(column, batch_size, |value| {
        let Some(geometry) = parse_wkt_cell(column, value)? else {
            return Ok(None);
        };
        summary.add_geometry(&geometry);
        Ok(Some(Value::Binary(to_wkb(&geometry)?)))
    })?;
    Ok((output_column(column, GeometryFormat::Wkb, values), summary))
}

/// Convert a WKB binary column to a canonical WKT text column of the same name and role.
pub fn wkb_to_wkt(column: &Column, batch_size: usize) -> Result<(Column, GeometrySummary)> {
    let mut summary = GeometrySummary::default();
    let values = map_cells(column, batch_size, |value| {
        let Some(geometry) = parse_wkb_cell(column, value)? else {
            return Ok(None);
        };
        summary.add_geometry(&geometry);
        Ok(Some(Value::Utf8(geometry.to_wkt())))
    })?;
    Ok((output_column(column, GeometryFormat::Wkt, values), summary))
}

/// Measure a WKB binary column without converting it.
pub fn enumerate_wkb(column: &Column, batch_size: usize) -> Result<GeometrySummary> {
    check_batch_size(batch_size)?;
    let mut summary = GeometrySummary::default();
    for batch in column.values().chunks(batch_size) {
        for value in batch {
            if let Some(geometry) = parse_wkb_cell(column, value)? {
                summary.add_geometry(&geometry);
            }
        }
    }
    Ok(summary)
}

/// The geometry format a column of this type can hold, if any.
pub(crate) fn format_for_type(data_type: &DataType) -> Option<GeometryFormat> {
    match data_type {
        DataType::Binary => Some(GeometryFormat::Wkb),
        DataType::Utf8 => Some(GeometryFormat::Wkt),
        _ => None,
    }
}
