//! Row group level reading and writing in bounded batches.

use std::io::Write;

use parquet::column::reader::ColumnReader;
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::file::writer::SerializedFileWriter;
use tracing::{debug, trace};

use crate::error::{GeoParquetError, Result};
use crate::io::parquet::catalog::ColumnCatalog;
use crate::io::parquet::check_batch_size;
use crate::table::{Column, Table};

/// Read every row group of `reader` into a new table holding the catalog's columns.
///
/// Rows are pulled `batch_size` at a time from each column, so only one batch per column is
/// materialized outside the table.
pub fn read_row_groups<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
    catalog: &ColumnCatalog,
    batch_size: usize,
) -> Result<Table> {
    check_batch_size(batch_size)?;
    let columns = catalog
        .iter()
        .map(|adapter| Column::new(adapter.name(), adapter.data_type()))
        .collect();
    let mut table = Table::try_new(columns)?;

    let num_row_groups = reader.metadata().num_row_groups();
    for rg_index in 0..num_row_groups {
        let row_group = reader.get_row_group(rg_index)?;
        let num_rows = row_group.metadata().num_rows() as usize;
        debug!(row_group = rg_index, num_rows, "reading row group");

        let mut column_readers = catalog
            .iter()
            .map(|adapter| {
                debug!(column = adapter.name(), position = adapter.position(), "opening column");
                row_group.get_column_reader(adapter.position())
            })
            .collect::<std::result::Result<Vec<ColumnReader>, _>>()?;

        let mut remaining = num_rows;
        while remaining > 0 {
            let rows = remaining.min(batch_size);
            let mut batch = Vec::with_capacity(catalog.len());
            for (adapter, column_reader) in catalog.iter().zip(column_readers.iter_mut()) {
                let values = adapter.read_batch(column_reader, rows)?;
                if values.len() != rows {
                    return Err(GeoParquetError::GeoParquet(format!(
                        "column '{}' in row group {rg_index} ended after {} of {rows} rows",
                        adapter.name(),
                        values.len()
                    )));
                }
                batch.push(values);
            }
            trace!(row_group = rg_index, rows, "read batch");
            table.append_batch(batch)?;
            remaining -= rows;
        }
    }

    Ok(table)
}

/// Write all rows of `table` as one row group, column by column in catalog order.
pub fn write_row_group<W: Write + Send>(
    writer: &mut SerializedFileWriter<W>,
    catalog: &ColumnCatalog,
    table: &Table,
    batch_size: usize,
) -> Result<()> {
    check_batch_size(batch_size)?;
    debug!(num_rows = table.num_rows(), "writing row group");
    let mut row_group = writer.next_row_group()?;

    for adapter in catalog.iter() {
        let column = table.column_by_index(adapter.position()).ok_or_else(|| {
            GeoParquetError::NotFound(format!("column '{}' is not in the table", adapter.name()))
        })?;
        let mut column_writer = row_group.next_column()?.ok_or_else(|| {
            GeoParquetError::GeoParquet(format!(
                "file schema has no column left for '{}'",
                adapter.name()
            ))
        })?;
        debug!(column = adapter.name(), "writing column");

        for chunk in column.values().chunks(batch_size) {
            adapter.write_batch(column_writer.untyped(), chunk)?;
            trace!(column = adapter.name(), rows = chunk.len(), "wrote batch");
        }
        column_writer.close()?;
    }

    row_group.close()?;
    Ok(())
}
