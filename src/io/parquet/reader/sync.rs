use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use tracing::{debug, info};

use crate::datatypes::{GeometryFormat, GeometryRole};
use crate::error::{GeoParquetError, Result};
use crate::io::parquet::batch::read_row_groups;
use crate::io::parquet::catalog::ColumnCatalog;
use crate::io::parquet::metadata::{GeoParquetColumnEncoding, GeoParquetMetadata};
use crate::io::parquet::reader::options::GeoParquetReaderOptions;
use crate::io::parquet::transform::wkb_to_wkt;
use crate::table::Table;

/// Which columns of a file to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelection {
    Names(Vec<String>),
    /// Leaf column indexes in the file schema.
    Indexes(Vec<usize>),
}

impl ColumnSelection {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Names(names) => names.is_empty(),
            Self::Indexes(indexes) => indexes.is_empty(),
        }
    }

    fn apply(&self, catalog: &ColumnCatalog) -> ColumnCatalog {
        match self {
            Self::Names(names) => catalog.select_names(names),
            Self::Indexes(indexes) => catalog.select_indexes(indexes),
        }
    }
}

impl From<Vec<String>> for ColumnSelection {
    fn from(value: Vec<String>) -> Self {
        Self::Names(value)
    }
}

impl From<Vec<&str>> for ColumnSelection {
    fn from(value: Vec<&str>) -> Self {
        Self::Names(value.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for ColumnSelection {
    fn from(value: &[&str]) -> Self {
        Self::Names(value.iter().map(|name| name.to_string()).collect())
    }
}

impl From<Vec<usize>> for ColumnSelection {
    fn from(value: Vec<usize>) -> Self {
        Self::Indexes(value)
    }
}

impl From<&[usize]> for ColumnSelection {
    fn from(value: &[usize]) -> Self {
        Self::Indexes(value.to_vec())
    }
}

/// Read all columns of a (Geo)Parquet file to a [`Table`].
///
/// Columns listed in the file's `geo` metadata are marked as geometry columns. Files without
/// that metadata are read as plain tables.
pub fn read_geoparquet<R: ChunkReader + 'static>(
    reader: R,
    options: &GeoParquetReaderOptions,
) -> Result<Table> {
    options.validate()?;
    let reader = SerializedFileReader::new(reader)?;
    let file_metadata = reader.metadata().file_metadata();
    let geo_meta = GeoParquetMetadata::from_parquet_meta(file_metadata).transpose()?;
    let catalog = ColumnCatalog::try_from_parquet_schema(file_metadata.schema_descr())?;
    read_catalog(&reader, &catalog, geo_meta.as_ref(), options)
}

/// Read a subset of the columns of a GeoParquet file, in the order requested.
///
/// Names or indexes that do not match a column are skipped. Fails with
/// [`GeoParquetError::NotFound`] when nothing matches, and with [`GeoParquetError::GeoParquet`]
/// when the file has no `geo` metadata.
pub fn read_geoparquet_columns<R: ChunkReader + 'static>(
    reader: R,
    selection: impl Into<ColumnSelection>,
    options: &GeoParquetReaderOptions,
) -> Result<Table> {
    let selection = selection.into();
    if selection.is_empty() {
        return Err(GeoParquetError::InvalidArgument(
            "column selection must not be empty".to_string(),
        ));
    }
    options.validate()?;

    let reader = SerializedFileReader::new(reader)?;
    let file_metadata = reader.metadata().file_metadata();
    let geo_meta = GeoParquetMetadata::from_parquet_meta(file_metadata)
        .ok_or_else(|| GeoParquetError::GeoParquet("file has no 'geo' metadata".to_string()))??;

    let catalog = ColumnCatalog::try_from_parquet_schema(file_metadata.schema_descr())?;
    let selected = selection.apply(&catalog);
    if selected.is_empty() {
        return Err(GeoParquetError::NotFound(format!(
            "no column matches {selection:?}"
        )));
    }
    read_catalog(&reader, &selected, Some(&geo_meta), options)
}

fn read_catalog<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
    catalog: &ColumnCatalog,
    geo_meta: Option<&GeoParquetMetadata>,
    options: &GeoParquetReaderOptions,
) -> Result<Table> {
    let mut table = read_row_groups(reader, catalog, options.batch_size())?;

    if let Some(geo_meta) = geo_meta {
        mark_geometry_columns(&mut table, geo_meta)?;
        if options.geometry_format() == GeometryFormat::Wkt {
            let indexes: Vec<usize> = table.geometry_columns().map(|(index, _)| index).collect();
            for index in indexes {
                let Some(column) = table.column_by_index(index) else {
                    continue;
                };
                let (converted, _) = wkb_to_wkt(column, options.batch_size())?;
                table.replace_column(index, converted)?;
            }
        }
    }

    info!(
        num_rows = table.num_rows(),
        num_columns = table.num_columns(),
        geometry_format = %options.geometry_format(),
        "read GeoParquet"
    );
    Ok(table)
}

/// Mark the columns described by the `geo` metadata that are present in `table`.
fn mark_geometry_columns(table: &mut Table, geo_meta: &GeoParquetMetadata) -> Result<()> {
    for (name, column_meta) in geo_meta.columns.iter() {
        let Some(column) = table.column(name) else {
            continue;
        };
        if column_meta.encoding != GeoParquetColumnEncoding::WKB {
            return Err(GeoParquetError::GeoParquet(format!(
                "geometry column '{name}' has unsupported encoding {}",
                column_meta.encoding
            )));
        }
        if column.data_type() != &GeometryFormat::Wkb.data_type() {
            return Err(GeoParquetError::GeoParquet(format!(
                "WKB geometry column '{name}' is stored as {}",
                column.data_type()
            )));
        }
        let role = if *name == geo_meta.primary_column {
            GeometryRole::Primary
        } else {
            GeometryRole::Secondary
        };
        debug!(column = name.as_str(), ?role, "marking geometry column");
        table.set_geometry_column(name, GeometryFormat::Wkb, role)?;
    }
    Ok(())
}
