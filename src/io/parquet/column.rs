//! Typed adapters between Parquet column chunks and [`Value`] cells.
//!
//! [`TypedColumn`] is generic over the in-memory value type and talks to the typed Parquet column
//! readers and writers. [`ColumnAdapter`] closes over the supported set of value types so that a
//! column can be dispatched on at runtime without any dynamic type lookup.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use arrow_schema::DataType;
use parquet::basic::{ConvertedType, LogicalType, Repetition, Type as PhysicalType};
use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::column::writer::{ColumnWriter, ColumnWriterImpl};
use parquet::data_type::{
    BoolType, ByteArray, ByteArrayType, DataType as ParquetDataType, DoubleType, FloatType,
    Int32Type, Int64Type,
};
use parquet::schema::types::{ColumnDescriptor, Type as SchemaType, TypePtr};

use crate::error::{GeoParquetError, Result};
use crate::table::Value;

type PhysicalValue<T> = <<T as ColumnValue>::Physical as ParquetDataType>::T;

/// An in-memory value type that can be stored in a Parquet column.
pub trait ColumnValue: Sized + Debug + Clone + PartialEq {
    /// The Parquet physical type this value is stored as.
    type Physical: ParquetDataType;

    fn data_type() -> DataType;

    fn logical_type() -> Option<LogicalType> {
        None
    }

    fn from_physical(value: PhysicalValue<Self>) -> Result<Self>;

    fn into_physical(self) -> PhysicalValue<Self>;

    /// Extract a cell, `None` for [`Value::Null`].
    fn from_value(value: &Value) -> Result<Option<Self>>;

    /// Whether [`from_value`][Self::from_value] would accept this cell.
    fn check_value(value: &Value) -> Result<()> {
        Self::from_value(value).map(drop)
    }

    fn into_value(self) -> Value;
}

fn conversion_error(value: &Value, data_type: DataType) -> GeoParquetError {
    let found = value
        .data_type()
        .map(|dt| dt.to_string())
        .unwrap_or_else(|| "null".to_string());
    GeoParquetError::Conversion(format!("cannot store a {found} value in a {data_type} column"))
}

macro_rules! impl_primitive_column_value {
    ($native:ty, $physical:ty, $variant:ident) => {
        impl ColumnValue for $native {
            type Physical = $physical;

            fn data_type() -> DataType {
                DataType::$variant
            }

            fn from_physical(value: $native) -> Result<Self> {
                Ok(value)
            }

            fn into_physical(self) -> $native {
                self
            }

            fn from_value(value: &Value) -> Result<Option<Self>> {
                match value {
                    Value::Null => Ok(None),
                    Value::$variant(v) => Ok(Some(*v)),
                    other => Err(conversion_error(other, Self::data_type())),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_primitive_column_value!(i32, Int32Type, Int32);
impl_primitive_column_value!(f32, FloatType, Float32);
impl_primitive_column_value!(f64, DoubleType, Float64);
impl_primitive_column_value!(i64, Int64Type, Int64);
impl_primitive_column_value!(bool, BoolType, Boolean);

impl ColumnValue for Vec<u8> {
    type Physical = ByteArrayType;

    fn data_type() -> DataType {
        DataType::Binary
    }

    fn from_physical(value: ByteArray) -> Result<Self> {
        Ok(value.data().to_vec())
    }

    fn into_physical(self) -> ByteArray {
        ByteArray::from(self)
    }

    fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Binary(v) => Ok(Some(v.clone())),
            // Text destined for a byte column is stored as its UTF-8 bytes
            Value::Utf8(v) => Ok(Some(v.as_bytes().to_vec())),
            other => Err(conversion_error(other, Self::data_type())),
        }
    }

    fn check_value(value: &Value) -> Result<()> {
        match value {
            Value::Null | Value::Binary(_) | Value::Utf8(_) => Ok(()),
            other => Err(conversion_error(other, Self::data_type())),
        }
    }

    fn into_value(self) -> Value {
        Value::Binary(self)
    }
}

impl ColumnValue for String {
    type Physical = ByteArrayType;

    fn data_type() -> DataType {
        DataType::Utf8
    }

    fn logical_type() -> Option<LogicalType> {
        Some(LogicalType::String)
    }

    fn from_physical(value: ByteArray) -> Result<Self> {
        String::from_utf8(value.data().to_vec())
            .map_err(|err| GeoParquetError::Conversion(format!("invalid UTF-8 in text column: {err}")))
    }

    fn into_physical(self) -> ByteArray {
        ByteArray::from(self.into_bytes())
    }

    fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Utf8(v) => Ok(Some(v.clone())),
            other => Err(conversion_error(other, Self::data_type())),
        }
    }

    fn check_value(value: &Value) -> Result<()> {
        match value {
            Value::Null | Value::Utf8(_) => Ok(()),
            other => Err(conversion_error(other, Self::data_type())),
        }
    }

    fn into_value(self) -> Value {
        Value::Utf8(self)
    }
}

/// A named column of `T` values at a fixed position in a table or file schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn<T: ColumnValue> {
    name: String,
    position: usize,
    _type: PhantomData<T>,
}

impl<T: ColumnValue> TypedColumn<T> {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of this column in the table it was built from, or its leaf index in the file.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn data_type(&self) -> DataType {
        T::data_type()
    }

    pub fn physical_type(&self) -> PhysicalType {
        <T::Physical as ParquetDataType>::get_physical_type()
    }

    pub fn logical_type(&self) -> Option<LogicalType> {
        T::logical_type()
    }

    /// The optional primitive Parquet field for this column.
    pub fn schema_type(&self) -> Result<TypePtr> {
        let field = SchemaType::primitive_type_builder(&self.name, self.physical_type())
            .with_repetition(Repetition::OPTIONAL)
            .with_logical_type(self.logical_type())
            .build()?;
        Ok(Arc::new(field))
    }

    /// Read up to `batch_size` rows from a positioned column reader.
    ///
    /// Returns fewer rows only when the column chunk is exhausted.
    pub fn read(
        &self,
        reader: &mut ColumnReaderImpl<T::Physical>,
        batch_size: usize,
    ) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(batch_size);
        let mut def_levels = Vec::with_capacity(batch_size);
        let mut records = 0;
        while records < batch_size {
            let (records_read, _, _) = reader.read_records(
                batch_size - records,
                Some(&mut def_levels),
                None,
                &mut values,
            )?;
            if records_read == 0 {
                break;
            }
            records += records_read;
        }

        // Required columns, and optional columns without nulls, have one value per record
        if values.len() == records {
            return values
                .into_iter()
                .map(|v| T::from_physical(v).map(ColumnValue::into_value))
                .collect();
        }

        let mut values = values.into_iter();
        let mut out = Vec::with_capacity(records);
        for level in def_levels.iter().take(records) {
            if *level > 0 {
                let value = values.next().ok_or_else(|| {
                    GeoParquetError::GeoParquet(format!(
                        "column '{}' has fewer values than definition levels",
                        self.name
                    ))
                })?;
                out.push(T::from_physical(value)?.into_value());
            } else {
                out.push(Value::Null);
            }
        }
        Ok(out)
    }

    fn with_column_name(&self, err: GeoParquetError) -> GeoParquetError {
        match err {
            GeoParquetError::Conversion(msg) => {
                GeoParquetError::Conversion(format!("column '{}': {msg}", self.name))
            }
            other => other,
        }
    }

    /// Fail on the first cell that [`write`][Self::write] could not store.
    pub fn check(&self, rows: &[Value]) -> Result<()> {
        rows.iter()
            .try_for_each(|row| T::check_value(row).map_err(|err| self.with_column_name(err)))
    }

    /// Write one batch of cells to a positioned column writer.
    pub fn write(&self, writer: &mut ColumnWriterImpl<'_, T::Physical>, rows: &[Value]) -> Result<()> {
        let mut values = Vec::with_capacity(rows.len());
        let mut def_levels = Vec::with_capacity(rows.len());
        for row in rows {
            let cell = T::from_value(row).map_err(|err| self.with_column_name(err))?;
            match cell {
                Some(value) => {
                    values.push(value.into_physical());
                    def_levels.push(1);
                }
                None => def_levels.push(0),
            }
        }
        writer.write_batch(values.as_slice(), Some(def_levels.as_slice()), None)?;
        Ok(())
    }
}

macro_rules! dispatch {
    ($adapter:expr, $col:ident => $body:expr) => {
        match $adapter {
            ColumnAdapter::Int32($col) => $body,
            ColumnAdapter::Float32($col) => $body,
            ColumnAdapter::Float64($col) => $body,
            ColumnAdapter::Binary($col) => $body,
            ColumnAdapter::Utf8($col) => $body,
            ColumnAdapter::Int64($col) => $body,
            ColumnAdapter::Boolean($col) => $body,
        }
    };
}

/// A [`TypedColumn`] of any supported value type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAdapter {
    Int32(TypedColumn<i32>),
    Float32(TypedColumn<f32>),
    Float64(TypedColumn<f64>),
    Binary(TypedColumn<Vec<u8>>),
    Utf8(TypedColumn<String>),
    Int64(TypedColumn<i64>),
    Boolean(TypedColumn<bool>),
}

impl ColumnAdapter {
    /// Fails with [`GeoParquetError::UnsupportedType`] for types outside the supported set.
    pub fn try_new(name: impl Into<String>, data_type: &DataType, position: usize) -> Result<Self> {
        let name = name.into();
        let adapter = match data_type {
            DataType::Int32 => Self::Int32(TypedColumn::new(name, position)),
            DataType::Float32 => Self::Float32(TypedColumn::new(name, position)),
            DataType::Float64 => Self::Float64(TypedColumn::new(name, position)),
            DataType::Binary => Self::Binary(TypedColumn::new(name, position)),
            DataType::Utf8 => Self::Utf8(TypedColumn::new(name, position)),
            DataType::Int64 => Self::Int64(TypedColumn::new(name, position)),
            DataType::Boolean => Self::Boolean(TypedColumn::new(name, position)),
            other => {
                return Err(GeoParquetError::UnsupportedType(format!(
                    "column '{name}' has type {other}"
                )))
            }
        };
        Ok(adapter)
    }

    /// Derive the in-memory type from a leaf column of a Parquet schema.
    pub fn try_from_descriptor(descr: &ColumnDescriptor, position: usize) -> Result<Self> {
        if descr.max_rep_level() > 0 || descr.path().parts().len() > 1 {
            return Err(GeoParquetError::UnsupportedType(format!(
                "nested column '{}'",
                descr.path()
            )));
        }

        let name = descr.name();
        let data_type = match descr.physical_type() {
            PhysicalType::INT32 => DataType::Int32,
            PhysicalType::FLOAT => DataType::Float32,
            PhysicalType::DOUBLE => DataType::Float64,
            PhysicalType::BYTE_ARRAY if is_text(descr) => DataType::Utf8,
            PhysicalType::BYTE_ARRAY => DataType::Binary,
            PhysicalType::INT64 => DataType::Int64,
            PhysicalType::BOOLEAN => DataType::Boolean,
            other => {
                return Err(GeoParquetError::UnsupportedType(format!(
                    "column '{name}' has physical type {other:?}"
                )))
            }
        };
        Self::try_new(name, &data_type, position)
    }

    pub fn name(&self) -> &str {
        dispatch!(self, col => col.name())
    }

    pub fn position(&self) -> usize {
        dispatch!(self, col => col.position())
    }

    pub fn data_type(&self) -> DataType {
        dispatch!(self, col => col.data_type())
    }

    pub fn schema_type(&self) -> Result<TypePtr> {
        dispatch!(self, col => col.schema_type())
    }

    pub fn check(&self, rows: &[Value]) -> Result<()> {
        dispatch!(self, col => col.check(rows))
    }

    /// Read up to `batch_size` rows from a reader obtained for this column's position.
    pub fn read_batch(&self, reader: &mut ColumnReader, batch_size: usize) -> Result<Vec<Value>> {
        match (self, reader) {
            (Self::Int32(col), ColumnReader::Int32ColumnReader(r)) => col.read(r, batch_size),
            (Self::Float32(col), ColumnReader::FloatColumnReader(r)) => col.read(r, batch_size),
            (Self::Float64(col), ColumnReader::DoubleColumnReader(r)) => col.read(r, batch_size),
            (Self::Binary(col), ColumnReader::ByteArrayColumnReader(r)) => col.read(r, batch_size),
            (Self::Utf8(col), ColumnReader::ByteArrayColumnReader(r)) => col.read(r, batch_size),
            (Self::Int64(col), ColumnReader::Int64ColumnReader(r)) => col.read(r, batch_size),
            (Self::Boolean(col), ColumnReader::BoolColumnReader(r)) => col.read(r, batch_size),
            _ => Err(self.mismatch()),
        }
    }

    /// Write one batch of cells to the writer obtained for this column.
    pub fn write_batch(&self, writer: &mut ColumnWriter<'_>, rows: &[Value]) -> Result<()> {
        match (self, writer) {
            (Self::Int32(col), ColumnWriter::Int32ColumnWriter(w)) => col.write(w, rows),
            (Self::Float32(col), ColumnWriter::FloatColumnWriter(w)) => col.write(w, rows),
            (Self::Float64(col), ColumnWriter::DoubleColumnWriter(w)) => col.write(w, rows),
            (Self::Binary(col), ColumnWriter::ByteArrayColumnWriter(w)) => col.write(w, rows),
            (Self::Utf8(col), ColumnWriter::ByteArrayColumnWriter(w)) => col.write(w, rows),
            (Self::Int64(col), ColumnWriter::Int64ColumnWriter(w)) => col.write(w, rows),
            (Self::Boolean(col), ColumnWriter::BoolColumnWriter(w)) => col.write(w, rows),
            _ => Err(self.mismatch()),
        }
    }

    fn mismatch(&self) -> GeoParquetError {
        GeoParquetError::GeoParquet(format!(
            "physical column for '{}' does not hold {} values",
            self.name(),
            self.data_type()
        ))
    }
}

fn is_text(descr: &ColumnDescriptor) -> bool {
    matches!(descr.logical_type(), Some(LogicalType::String))
        || descr.converted_type() == ConvertedType::UTF8
}
