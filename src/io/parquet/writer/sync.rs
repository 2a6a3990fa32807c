use std::io::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use parquet::file::writer::SerializedFileWriter;
use tracing::{debug, info};

use crate::datatypes::{GeometryFormat, GeometryRole};
use crate::error::{GeoParquetError, Result};
use crate::io::parquet::batch::write_row_group;
use crate::io::parquet::catalog::ColumnCatalog;
use crate::io::parquet::metadata::GeoParquetMetadata;
use crate::io::parquet::transform::format_for_type;
use crate::io::parquet::writer::metadata::GeoParquetMetadataBuilder;
use crate::io::parquet::writer::options::GeoParquetWriterOptions;
use crate::table::Table;

/// Write a table with a single geometry column as GeoParquet.
///
/// The geometry column becomes the primary column. A WKT column is converted to WKB in the table
/// itself before it is written.
pub fn write_geoparquet<W: Write + Send>(
    table: &mut Table,
    writer: W,
    geometry_column: &str,
    format: GeometryFormat,
    options: &GeoParquetWriterOptions,
) -> Result<()> {
    let geometry_columns = IndexMap::from([(geometry_column.to_string(), format)]);
    write_geoparquet_multiple(table, writer, &geometry_columns, geometry_column, options)
}

/// Write a table with any number of geometry columns as GeoParquet.
///
/// All geometry columns must share one format. The table is validated, and every geometry is
/// parsed, before anything is written to `writer`.
pub fn write_geoparquet_multiple<W: Write + Send>(
    table: &mut Table,
    writer: W,
    geometry_columns: &IndexMap<String, GeometryFormat>,
    primary_column: &str,
    options: &GeoParquetWriterOptions,
) -> Result<()> {
    options.validate()?;
    validate_geometry_columns(table, geometry_columns, primary_column)?;
    // Fails on column types that cannot be stored and on cells that do not fit their column
    ColumnCatalog::try_from_table(table)?.check_cells(table)?;

    // A failed build has replaced no column, only the markers
    let previous_markers = table.geometry_markers();
    let geo_meta = match build_metadata(table, geometry_columns, primary_column, options) {
        Ok(geo_meta) => geo_meta,
        Err(err) => {
            table.restore_geometry_markers(previous_markers);
            return Err(err);
        }
    };
    debug!(geo = ?geo_meta, "built GeoParquet metadata");

    let catalog = ColumnCatalog::try_from_table(table)?;
    let properties = options.writer_properties.clone().unwrap_or_default();
    let mut writer =
        SerializedFileWriter::new(writer, catalog.parquet_schema()?, Arc::new(properties))?;
    write_row_group(&mut writer, &catalog, table, options.batch_size)?;
    writer.append_key_value_metadata(geo_meta.to_key_value()?);
    writer.close()?;

    info!(
        num_rows = table.num_rows(),
        num_columns = table.num_columns(),
        primary_column,
        "wrote GeoParquet"
    );
    Ok(())
}

fn build_metadata(
    table: &mut Table,
    geometry_columns: &IndexMap<String, GeometryFormat>,
    primary_column: &str,
    options: &GeoParquetWriterOptions,
) -> Result<GeoParquetMetadata> {
    table.clear_geometry_columns();
    for (name, format) in geometry_columns {
        let role = if name == primary_column {
            GeometryRole::Primary
        } else {
            GeometryRole::Secondary
        };
        table.set_geometry_column(name, *format, role)?;
    }
    GeoParquetMetadataBuilder::new(options.batch_size).build(table)
}

fn validate_geometry_columns(
    table: &Table,
    geometry_columns: &IndexMap<String, GeometryFormat>,
    primary_column: &str,
) -> Result<()> {
    if geometry_columns.is_empty() {
        return Err(GeoParquetError::InvalidArgument(
            "at least one geometry column is required".to_string(),
        ));
    }
    if primary_column.is_empty() {
        return Err(GeoParquetError::InvalidArgument(
            "primary geometry column name must not be empty".to_string(),
        ));
    }

    for (name, format) in geometry_columns {
        if name.is_empty() {
            return Err(GeoParquetError::InvalidArgument(
                "geometry column name must not be empty".to_string(),
            ));
        }
        let column = table
            .column(name)
            .ok_or_else(|| GeoParquetError::NotFound(format!("geometry column '{name}'")))?;
        if format_for_type(column.data_type()) != Some(*format) {
            return Err(GeoParquetError::InvalidArgument(format!(
                "{format} geometry column '{name}' must have type {}, found {}",
                format.data_type(),
                column.data_type()
            )));
        }
    }

    if !geometry_columns.contains_key(primary_column) {
        return Err(GeoParquetError::InvalidArgument(format!(
            "primary column '{primary_column}' is not one of the geometry columns"
        )));
    }
    Ok(())
}
