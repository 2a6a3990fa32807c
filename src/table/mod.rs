//! An in-memory table of named, typed, ordered columns with nullable cells.
//!
//! This is the generic tabular representation that GeoParquet files are read into and written
//! from. Geometry columns are ordinary [`DataType::Binary`] (WKB) or [`DataType::Utf8`] (WKT)
//! columns carrying a [`GeometryMarker`].

mod value;

pub use value::Value;

use arrow_schema::DataType;

use crate::datatypes::{GeometryFormat, GeometryMarker, GeometryRole};
use crate::error::{GeoParquetError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data_type: DataType,
    geometry: Option<GeometryMarker>,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self::from_values(name, data_type, vec![])
    }

    pub fn from_values(name: impl Into<String>, data_type: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            data_type,
            geometry: None,
            values,
        }
    }

    /// Mark this column as holding geometries.
    pub fn with_geometry(self, marker: GeometryMarker) -> Self {
        Self {
            geometry: Some(marker),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn geometry(&self) -> Option<GeometryMarker> {
        self.geometry
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Cells can be edited in place; the column length is fixed.
    pub fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub(crate) fn set_geometry(&mut self, marker: Option<GeometryMarker>) {
        self.geometry = marker;
    }

    pub(crate) fn extend(&mut self, values: Vec<Value>) {
        self.values.extend(values);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns of equal length and unique names.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.insert_column(table.num_columns(), column)?;
        }
        Ok(table)
    }

    /// Append an empty column. Existing rows get a null cell.
    pub fn add_column(&mut self, name: impl Into<String>, data_type: DataType) -> Result<&mut Column> {
        let values = vec![Value::Null; self.num_rows];
        let column = Column::from_values(name, data_type, values);
        let index = self.num_columns();
        self.insert_column(index, column)?;
        Ok(&mut self.columns[index])
    }

    pub fn insert_column(&mut self, index: usize, column: Column) -> Result<()> {
        if column.name.is_empty() {
            return Err(GeoParquetError::InvalidArgument(
                "column name must not be empty".to_string(),
            ));
        }
        if self.column_index(&column.name).is_some() {
            return Err(GeoParquetError::InvalidArgument(format!(
                "column '{}' already exists",
                column.name
            )));
        }
        if index > self.columns.len() {
            return Err(GeoParquetError::InvalidArgument(format!(
                "column position {index} out of range for {} columns",
                self.columns.len()
            )));
        }
        if self.columns.is_empty() {
            self.num_rows = column.len();
        } else if column.len() != self.num_rows {
            return Err(GeoParquetError::InvalidArgument(format!(
                "column '{}' has {} values, expected {}",
                column.name,
                column.len(),
                self.num_rows
            )));
        }
        self.columns.insert(index, column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.column_index(name)?;
        let column = self.columns.remove(index);
        if self.columns.is_empty() {
            self.num_rows = 0;
        }
        Some(column)
    }

    /// Swap the column at `index` for `column`, returning the previous one.
    pub fn replace_column(&mut self, index: usize, column: Column) -> Result<Column> {
        if index >= self.columns.len() {
            return Err(GeoParquetError::InvalidArgument(format!(
                "column position {index} out of range for {} columns",
                self.columns.len()
            )));
        }
        if column.len() != self.num_rows {
            return Err(GeoParquetError::InvalidArgument(format!(
                "column '{}' has {} values, expected {}",
                column.name,
                column.len(),
                self.num_rows
            )));
        }
        if self
            .column_index(&column.name)
            .is_some_and(|existing| existing != index)
        {
            return Err(GeoParquetError::InvalidArgument(format!(
                "column '{}' already exists",
                column.name
            )));
        }
        Ok(std::mem::replace(&mut self.columns[index], column))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    pub fn column_by_index(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Append one row. Cell types are checked when the table is written.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(GeoParquetError::InvalidArgument(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.values.push(value);
        }
        self.num_rows += 1;
        Ok(())
    }

    /// Append a batch of rows given column by column, in table column order.
    pub fn append_batch(&mut self, batch: Vec<Vec<Value>>) -> Result<()> {
        if batch.len() != self.columns.len() {
            return Err(GeoParquetError::InvalidArgument(format!(
                "batch has {} columns, table has {}",
                batch.len(),
                self.columns.len()
            )));
        }
        let batch_rows = batch.first().map(Vec::len).unwrap_or(0);
        if batch.iter().any(|values| values.len() != batch_rows) {
            return Err(GeoParquetError::InvalidArgument(
                "batch columns differ in length".to_string(),
            ));
        }
        for (column, values) in self.columns.iter_mut().zip(batch) {
            column.extend(values);
        }
        self.num_rows += batch_rows;
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.num_rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|column| &column.values[index])
                .collect(),
        )
    }

    /// Mark a column as a geometry column.
    ///
    /// Marking a column as [`GeometryRole::Primary`] demotes any previous primary column to
    /// [`GeometryRole::Secondary`].
    pub fn set_geometry_column(
        &mut self,
        name: &str,
        format: GeometryFormat,
        role: GeometryRole,
    ) -> Result<()> {
        let index = self
            .column_index(name)
            .ok_or_else(|| GeoParquetError::NotFound(format!("column '{name}' does not exist")))?;
        if role == GeometryRole::Primary {
            for column in self.columns.iter_mut() {
                if let Some(marker) = column.geometry.as_mut() {
                    marker.role = GeometryRole::Secondary;
                }
            }
        }
        self.columns[index].set_geometry(Some(GeometryMarker::new(format, role)));
        Ok(())
    }

    /// Drop every geometry marker.
    pub(crate) fn clear_geometry_columns(&mut self) {
        for column in self.columns.iter_mut() {
            column.set_geometry(None);
        }
    }

    /// The geometry marker of every column, in table order.
    pub(crate) fn geometry_markers(&self) -> Vec<Option<GeometryMarker>> {
        self.columns.iter().map(Column::geometry).collect()
    }

    /// Put back markers taken with [`geometry_markers`][Self::geometry_markers].
    pub(crate) fn restore_geometry_markers(&mut self, markers: Vec<Option<GeometryMarker>>) {
        for (column, marker) in self.columns.iter_mut().zip(markers) {
            column.set_geometry(marker);
        }
    }

    /// Geometry columns and their positions, in table order.
    pub fn geometry_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.geometry.is_some())
    }

    pub fn primary_geometry_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.geometry.is_some_and(|marker| marker.is_primary()))
    }
}
