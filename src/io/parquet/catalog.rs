use std::collections::HashSet;
use std::sync::Arc;

use parquet::schema::types::{SchemaDescriptor, Type as SchemaType, TypePtr};

use crate::error::{GeoParquetError, Result};
use crate::io::parquet::column::ColumnAdapter;
use crate::table::Table;

/// The ordered set of typed columns taking part in one read or write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCatalog {
    columns: Vec<ColumnAdapter>,
}

impl ColumnCatalog {
    /// One adapter per table column; positions are table column indexes.
    pub fn try_from_table(table: &Table) -> Result<Self> {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(position, column)| {
                ColumnAdapter::try_new(column.name(), column.data_type(), position)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// One adapter per leaf column of a Parquet schema; positions are leaf column indexes.
    pub fn try_from_parquet_schema(schema: &SchemaDescriptor) -> Result<Self> {
        let columns = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(position, descr)| ColumnAdapter::try_from_descriptor(descr, position))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Check every cell of `table` against the adapter for its column.
    pub fn check_cells(&self, table: &Table) -> Result<()> {
        for adapter in self.iter() {
            let column = table.column_by_index(adapter.position()).ok_or_else(|| {
                GeoParquetError::NotFound(format!("column '{}' is not in the table", adapter.name()))
            })?;
            adapter.check(column.values())?;
        }
        Ok(())
    }

    /// The columns with the given names, in request order.
    ///
    /// Unknown and repeated names are skipped, so the result may be empty.
    pub fn select_names<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut seen = HashSet::new();
        let columns = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(*name))
            .filter_map(|name| {
                self.columns
                    .iter()
                    .find(|column| column.name() == name)
                    .cloned()
            })
            .collect();
        Self { columns }
    }

    /// The columns at the given catalog indexes, in request order.
    ///
    /// Out of range and repeated indexes are skipped, so the result may be empty.
    pub fn select_indexes(&self, indexes: &[usize]) -> Self {
        let mut seen = HashSet::new();
        let columns = indexes
            .iter()
            .filter(|index| seen.insert(**index))
            .filter_map(|index| self.columns.get(*index).cloned())
            .collect();
        Self { columns }
    }

    /// The Parquet message type for these columns, in catalog order.
    pub fn parquet_schema(&self) -> Result<TypePtr> {
        let fields = self
            .columns
            .iter()
            .map(ColumnAdapter::schema_type)
            .collect::<Result<Vec<_>>>()?;
        let schema = SchemaType::group_type_builder("schema")
            .with_fields(fields)
            .build()?;
        Ok(Arc::new(schema))
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnAdapter::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnAdapter> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::table::Value;
    use arrow_schema::DataType;
    use parquet::schema::parser::parse_message_type;

    fn catalog() -> ColumnCatalog {
        let mut table = Table::new();
        table.add_column("id", DataType::Int32).unwrap();
        table.add_column("name", DataType::Utf8).unwrap();
        table.add_column("geometry", DataType::Binary).unwrap();
        ColumnCatalog::try_from_table(&table).unwrap()
    }

    #[test]
    fn check_cells_names_the_column() {
        let mut table = crate::test::cities();
        let catalog = ColumnCatalog::try_from_table(&table).unwrap();
        assert!(catalog.check_cells(&table).is_ok());

        table.column_mut("id").unwrap().values_mut()[1] = Value::from("two");
        let err = catalog.check_cells(&table).unwrap_err();
        assert!(matches!(&err, GeoParquetError::Conversion(msg) if msg.contains("'id'")));
    }

    #[test]
    fn select_names_in_request_order() {
        let selected = catalog().select_names(&["geometry", "missing", "id", "geometry"]);
        assert_eq!(selected.names(), vec!["geometry", "id"]);
        let positions: Vec<_> = selected.iter().map(ColumnAdapter::position).collect();
        assert_eq!(positions, vec![2, 0]);
    }

    #[test]
    fn select_indexes_in_request_order() {
        let selected = catalog().select_indexes(&[1, 7, 0]);
        assert_eq!(selected.names(), vec!["name", "id"]);
    }

    #[test]
    fn nothing_selected() {
        assert!(catalog().select_names(&["nope"]).is_empty());
        assert!(catalog().select_indexes(&[42]).is_empty());
    }

    #[test]
    fn unsupported_table_column() {
        let mut table = Table::new();
        table.add_column("id", DataType::Int32).unwrap();
        table.add_column("day", DataType::Date32).unwrap();
        assert!(matches!(
            ColumnCatalog::try_from_table(&table),
            Err(GeoParquetError::UnsupportedType(_))
        ));
    }

    #[test]
    fn from_parquet_schema() {
        let message = "
            message schema {
                OPTIONAL INT32 id;
                OPTIONAL BYTE_ARRAY name (UTF8);
                OPTIONAL BYTE_ARRAY geometry;
                REQUIRED DOUBLE score;
                OPTIONAL BOOLEAN flag;
            }
        ";
        let schema = SchemaDescriptor::new(Arc::new(parse_message_type(message).unwrap()));
        let catalog = ColumnCatalog::try_from_parquet_schema(&schema).unwrap();
        let types: Vec<_> = catalog.iter().map(ColumnAdapter::data_type).collect();
        assert_eq!(
            types,
            vec![
                DataType::Int32,
                DataType::Utf8,
                DataType::Binary,
                DataType::Float64,
                DataType::Boolean
            ]
        );
    }

    #[test]
    fn nested_parquet_column() {
        let message = "
            message schema {
                OPTIONAL group bbox {
                    REQUIRED DOUBLE xmin;
                }
            }
        ";
        let schema = SchemaDescriptor::new(Arc::new(parse_message_type(message).unwrap()));
        assert!(matches!(
            ColumnCatalog::try_from_parquet_schema(&schema),
            Err(GeoParquetError::UnsupportedType(_))
        ));
    }

    #[test]
    fn schema_round_trip() {
        let schema = catalog().parquet_schema().unwrap();
        let descr = SchemaDescriptor::new(schema);
        let again = ColumnCatalog::try_from_parquet_schema(&descr).unwrap();
        assert_eq!(again, catalog());
    }
}
