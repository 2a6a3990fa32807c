use arrow_schema::DataType;

use crate::datatypes::{GeometryFormat, GeometryRole};
use crate::table::{Table, Value};

/// Three Dutch cities with a primary WKT `geometry` column.
pub(crate) fn cities() -> Table {
    let mut table = Table::new();
    table.add_column("id", DataType::Int32).unwrap();
    table.add_column("name", DataType::Utf8).unwrap();
    table.add_column("geometry", DataType::Utf8).unwrap();
    for (id, name, wkt) in [
        (1, "Amsterdam", "POINT (4.8913 52.3684)"),
        (2, "Rotterdam", "POINT (4.4868 51.913)"),
        (3, "Den Haag", "POINT (4.2949 52.0641)"),
    ] {
        table
            .push_row(vec![id.into(), name.into(), wkt.into()])
            .unwrap();
    }
    table
        .set_geometry_column("geometry", GeometryFormat::Wkt, GeometryRole::Primary)
        .unwrap();
    table
}

/// Points, lines and polygons in one WKT column, with a null cell.
pub(crate) fn mixed_geometries() -> Table {
    let mut table = Table::new();
    table.add_column("id", DataType::Int64).unwrap();
    table.add_column("score", DataType::Float64).unwrap();
    table.add_column("geometry", DataType::Utf8).unwrap();
    let rows = [
        (1, Some(0.5), Value::from("POINT (1 1)")),
        (2, None, Value::from("LINESTRING (0 0, 10 5)")),
        (3, Some(-2.25), Value::Null),
        (4, Some(8.), Value::from("POLYGON ((2 2, 6 2, 6 -3, 2 2))")),
    ];
    for (id, score, geometry) in rows {
        table
            .push_row(vec![Value::Int64(id), score.into(), geometry])
            .unwrap();
    }
    table
        .set_geometry_column("geometry", GeometryFormat::Wkt, GeometryRole::Primary)
        .unwrap();
    table
}

/// A secondary `location` and a primary `route` WKT column.
pub(crate) fn two_geometry_columns() -> Table {
    let mut table = Table::new();
    table.add_column("name", DataType::Utf8).unwrap();
    table.add_column("location", DataType::Utf8).unwrap();
    table.add_column("route", DataType::Utf8).unwrap();
    table
        .push_row(vec![
            "ferry".into(),
            "POINT (4.9 52.38)".into(),
            "LINESTRING (4.9 52.38, 4.91 52.39)".into(),
        ])
        .unwrap();
    table
        .push_row(vec![
            "tram".into(),
            "POINT (4.88 52.36)".into(),
            "MULTILINESTRING ((4.88 52.36, 4.89 52.37), (4.89 52.37, 4.9 52.37))".into(),
        ])
        .unwrap();
    table
        .set_geometry_column("location", GeometryFormat::Wkt, GeometryRole::Secondary)
        .unwrap();
    table
        .set_geometry_column("route", GeometryFormat::Wkt, GeometryRole::Primary)
        .unwrap();
    table
}
