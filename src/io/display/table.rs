use std::fmt;

use crate::table::Table;

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table ({} rows)", self.num_rows())?;
        for column in self.columns() {
            write!(f, "{}: {}", column.name(), column.data_type())?;
            if let Some(marker) = column.geometry() {
                let role = if marker.is_primary() { "primary" } else { "secondary" };
                write!(f, " ({} geometry, {role})", marker.format)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
