use arrow_schema::DataType;
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use geoparquet_table::io::parquet::{
    read_geoparquet, write_geoparquet, GeoParquetReaderOptions, GeoParquetWriterOptions,
};
use geoparquet_table::{GeometryFormat, Table};

fn wkt_points(num_rows: usize) -> Table {
    let mut table = Table::new();
    table.add_column("id", DataType::Int64).unwrap();
    table.add_column("geometry", DataType::Utf8).unwrap();
    for i in 0..num_rows {
        let x = (i % 360) as f64 - 180.;
        let y = (i % 180) as f64 - 90.;
        table
            .push_row(vec![(i as i64).into(), format!("POINT ({x} {y})").into()])
            .unwrap();
    }
    table
}

fn write(table: &mut Table) -> Bytes {
    let mut buf = Vec::new();
    write_geoparquet(
        table,
        &mut buf,
        "geometry",
        GeometryFormat::Wkt,
        &GeoParquetWriterOptions::default().with_batch_size(4096),
    )
    .unwrap();
    Bytes::from(buf)
}

fn criterion_benchmark(c: &mut Criterion) {
    let table = wkt_points(50_000);
    let bytes = write(&mut table.clone());

    c.bench_function("write 50k WKT points", |b| {
        b.iter(|| write(&mut table.clone()))
    });

    c.bench_function("read 50k points as WKB", |b| {
        b.iter(|| read_geoparquet(bytes.clone(), &GeoParquetReaderOptions::default()).unwrap())
    });

    let wkt = GeoParquetReaderOptions::default().with_geometry_format(GeometryFormat::Wkt);
    c.bench_function("read 50k points as WKT", |b| {
        b.iter(|| read_geoparquet(bytes.clone(), &wkt).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
