use std::collections::BTreeSet;
use std::fs::File;
use std::sync::Arc;

use approx::assert_relative_eq;
use arrow_schema::DataType;
use bytes::Bytes;
use indexmap::IndexMap;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;

use crate::datatypes::{GeometryFormat, GeometryMarker, GeometryRole};
use crate::error::{GeoParquetError, Result};
use crate::io::parquet::batch::write_row_group;
use crate::io::parquet::catalog::ColumnCatalog;
use crate::io::parquet::{
    read_file_metadata, read_geo_metadata, read_geoparquet, read_geoparquet_columns,
    write_geoparquet, write_geoparquet_multiple, GeoParquetGeometryType, GeoParquetReaderOptions,
    GeoParquetWriterOptions,
};
use crate::io::wkt::from_wkt;
use crate::table::{Table, Value};

fn write_to_bytes(table: &mut Table, options: &GeoParquetWriterOptions) -> Result<Bytes> {
    let mut buf = vec![];
    write_geoparquet(table, &mut buf, "geometry", GeometryFormat::Wkt, options)?;
    Ok(Bytes::from(buf))
}

fn wkt_options() -> GeoParquetReaderOptions {
    GeoParquetReaderOptions::default().with_geometry_format(GeometryFormat::Wkt)
}

#[test]
fn round_trip_cities() -> Result<()> {
    let original = crate::test::cities();
    let mut table = original.clone();
    let bytes = write_to_bytes(&mut table, &Default::default())?;

    let again = read_geoparquet(bytes.clone(), &wkt_options())?;
    assert_eq!(again, original);

    let geo_meta = read_geo_metadata(bytes)?;
    assert_eq!(geo_meta.primary_column, "geometry");
    assert_eq!(
        geo_meta.columns["geometry"].geometry_types,
        BTreeSet::from([GeoParquetGeometryType::Point])
    );
    Ok(())
}

#[test]
fn wkb_output_matches_written_table() -> Result<()> {
    let mut table = crate::test::cities();
    let bytes = write_to_bytes(&mut table, &Default::default())?;
    let again = read_geoparquet(bytes, &Default::default())?;
    // After writing, the table itself holds WKB
    assert_eq!(again, table);
    assert_eq!(
        again.column("geometry").unwrap().geometry(),
        Some(GeometryMarker::new(GeometryFormat::Wkb, GeometryRole::Primary))
    );
    Ok(())
}

#[test]
fn mixed_geometries_round_trip() -> Result<()> {
    let original = crate::test::mixed_geometries();
    let mut table = original.clone();
    let options = GeoParquetWriterOptions::default().with_batch_size(3);
    let bytes = write_to_bytes(&mut table, &options)?;

    let geo_meta = read_geo_metadata(bytes.clone())?;
    let column = &geo_meta.columns["geometry"];
    assert_eq!(
        column.geometry_types,
        BTreeSet::from([
            GeoParquetGeometryType::Point,
            GeoParquetGeometryType::LineString,
            GeoParquetGeometryType::Polygon,
        ])
    );
    let bbox = column.bbox.as_ref().unwrap();
    for (actual, expected) in bbox.iter().zip([0., -3., 10., 5.]) {
        assert_relative_eq!(*actual, expected);
    }

    let again = read_geoparquet(bytes, &wkt_options().with_batch_size(2))?;
    let geometry = again.column("geometry").unwrap();
    assert_eq!(geometry.get(2), Some(&Value::Null));
    for (read, written) in geometry
        .values()
        .iter()
        .zip(original.column("geometry").unwrap().values())
    {
        match (read, written) {
            (Value::Utf8(read), Value::Utf8(written)) => {
                assert_eq!(from_wkt(read)?, from_wkt(written)?)
            }
            (read, written) => assert_eq!(read, written),
        }
    }
    assert_eq!(again.column("score"), original.column("score"));
    Ok(())
}

#[test]
fn two_geometry_columns() -> Result<()> {
    let original = crate::test::two_geometry_columns();
    let mut table = original.clone();
    let columns = IndexMap::from([
        ("location".to_string(), GeometryFormat::Wkt),
        ("route".to_string(), GeometryFormat::Wkt),
    ]);
    let mut buf = vec![];
    write_geoparquet_multiple(&mut table, &mut buf, &columns, "route", &Default::default())?;
    let bytes = Bytes::from(buf);

    let geo_meta = read_geo_metadata(bytes.clone())?;
    assert_eq!(geo_meta.primary_column, "route");
    assert_eq!(
        geo_meta.columns.keys().collect::<Vec<_>>(),
        vec!["location", "route"]
    );

    let again = read_geoparquet(bytes, &wkt_options())?;
    assert_eq!(again, original);
    Ok(())
}

#[test]
fn select_columns_in_request_order() -> Result<()> {
    let mut table = crate::test::cities();
    let bytes = write_to_bytes(&mut table, &Default::default())?;

    let by_name = read_geoparquet_columns(
        bytes.clone(),
        vec!["geometry", "nope", "id"],
        &wkt_options(),
    )?;
    assert_eq!(by_name.column_names(), vec!["geometry", "id"]);
    assert_eq!(
        by_name.column("geometry").unwrap().get(0),
        Some(&Value::from("POINT (4.8913 52.3684)"))
    );
    assert!(by_name.primary_geometry_column().is_some());

    let by_index = read_geoparquet_columns(bytes.clone(), vec![1_usize, 9], &Default::default())?;
    assert_eq!(by_index.column_names(), vec!["name"]);
    assert_eq!(by_index.geometry_columns().count(), 0);

    let nothing = read_geoparquet_columns(bytes.clone(), vec!["a", "b"], &Default::default());
    assert!(matches!(nothing, Err(GeoParquetError::NotFound(_))));

    let empty = read_geoparquet_columns(bytes, Vec::<usize>::new(), &Default::default());
    assert!(matches!(empty, Err(GeoParquetError::InvalidArgument(_))));
    Ok(())
}

/// A Parquet file without GeoParquet metadata.
fn plain_parquet() -> Result<Bytes> {
    let mut table = Table::new();
    table.add_column("id", DataType::Int32)?;
    table.add_column("payload", DataType::Binary)?;
    table.push_row(vec![7.into(), b"\x00\x01".as_slice().into()])?;

    let catalog = ColumnCatalog::try_from_table(&table)?;
    let mut buf = vec![];
    let mut writer = SerializedFileWriter::new(&mut buf, catalog.parquet_schema()?, Arc::default())?;
    write_row_group(&mut writer, &catalog, &table, 16)?;
    writer.close()?;
    Ok(Bytes::from(buf))
}

#[test]
fn plain_parquet_file() -> Result<()> {
    let bytes = plain_parquet()?;
    let table = read_geoparquet(bytes.clone(), &wkt_options())?;
    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.geometry_columns().count(), 0);
    assert_eq!(
        table.column("payload").unwrap().get(0),
        Some(&Value::Binary(vec![0, 1]))
    );

    assert!(matches!(
        read_geo_metadata(bytes.clone()),
        Err(GeoParquetError::GeoParquet(_))
    ));
    assert!(matches!(
        read_geoparquet_columns(bytes, vec!["id"], &Default::default()),
        Err(GeoParquetError::GeoParquet(_))
    ));
    Ok(())
}

#[test]
fn empty_table_round_trip() -> Result<()> {
    let mut table = Table::new();
    table.add_column("id", DataType::Int32)?;
    table.add_column("geometry", DataType::Utf8)?;
    let bytes = write_to_bytes(&mut table, &Default::default())?;

    let geo_meta = read_geo_metadata(bytes.clone())?;
    assert!(geo_meta.columns["geometry"].bbox.is_none());
    assert!(geo_meta.columns["geometry"].geometry_types.is_empty());

    let again = read_geoparquet(bytes, &wkt_options())?;
    assert_eq!(again.num_rows(), 0);
    assert_eq!(again.column_names(), vec!["id", "geometry"]);
    assert_eq!(
        again.column("geometry").unwrap().data_type(),
        &DataType::Utf8
    );
    Ok(())
}

#[test]
fn z_coordinates_are_dropped() -> Result<()> {
    let mut table = Table::new();
    table.add_column("geometry", DataType::Utf8)?;
    table.push_row(vec!["POINT Z (1 2 3)".into()])?;
    let bytes = write_to_bytes(&mut table, &Default::default())?;
    let again = read_geoparquet(bytes, &wkt_options())?;
    assert_eq!(
        again.column("geometry").unwrap().get(0),
        Some(&Value::from("POINT (1 2)"))
    );
    Ok(())
}

#[test]
fn empty_point_round_trip() -> Result<()> {
    let mut table = Table::new();
    table.add_column("geometry", DataType::Utf8)?;
    table.push_row(vec!["POINT EMPTY".into()])?;
    table.push_row(vec!["POINT (1 2)".into()])?;
    let bytes = write_to_bytes(&mut table, &Default::default())?;

    let geo_meta = read_geo_metadata(bytes.clone())?;
    let column = &geo_meta.columns["geometry"];
    assert_eq!(
        column.geometry_types,
        BTreeSet::from([GeoParquetGeometryType::Point])
    );
    assert_eq!(column.bbox, Some(vec![1., 2., 1., 2.]));

    let again = read_geoparquet(bytes, &wkt_options())?;
    assert_eq!(
        again.column("geometry").unwrap().values(),
        &[Value::from("POINT EMPTY"), Value::from("POINT (1 2)")]
    );
    Ok(())
}

#[test]
fn text_in_binary_column() -> Result<()> {
    let mut table = Table::new();
    table.add_column("note", DataType::Binary)?;
    table.add_column("geometry", DataType::Utf8)?;
    table.push_row(vec!["hello".into(), "POINT (0 0)".into()])?;
    let bytes = write_to_bytes(&mut table, &Default::default())?;
    let again = read_geoparquet(bytes, &Default::default())?;
    assert_eq!(
        again.column("note").unwrap().get(0),
        Some(&Value::Binary(b"hello".to_vec()))
    );
    Ok(())
}

#[test]
fn file_metadata() -> Result<()> {
    let mut table = crate::test::mixed_geometries();
    let properties = WriterProperties::builder()
        .set_created_by("geoparquet-table test".to_string())
        .build();
    let options = GeoParquetWriterOptions::default().with_writer_properties(properties);

    let file = tempfile::NamedTempFile::new()?;
    write_geoparquet(
        &mut table,
        file.reopen()?,
        "geometry",
        GeometryFormat::Wkt,
        &options,
    )?;

    let metadata = read_file_metadata(File::open(file.path())?)?;
    assert_eq!(metadata.num_row_groups, 1);
    assert_eq!(metadata.num_rows, 4);
    assert!(metadata.size > 0);
    assert_eq!(metadata.created_by.as_deref(), Some("geoparquet-table test"));
    assert_eq!(
        metadata.columns.iter().collect::<Vec<_>>(),
        vec![
            (&"id".to_string(), &DataType::Int64),
            (&"score".to_string(), &DataType::Float64),
            (&"geometry".to_string(), &DataType::Binary),
        ]
    );

    let again = read_geoparquet(File::open(file.path())?, &wkt_options())?;
    assert_eq!(again.num_rows(), 4);
    Ok(())
}
