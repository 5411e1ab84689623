//! Execution results and row records.

use crate::error::{WeaveError, WeaveResult};
use crate::value::{FromValue, Value};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::ser::SerializeMap;
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Kind, Type};

/// One result row: column name → value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a driver row, column by column.
    pub fn from_row(row: &Row) -> WeaveResult<Self> {
        let mut record = Record {
            fields: Vec::with_capacity(row.len()),
        };
        for (idx, column) in row.columns().iter().enumerate() {
            let ColumnValue(value) = row
                .try_get(idx)
                .map_err(|e| WeaveError::decode(column.name(), e.to_string()))?;
            record.fields.push((column.name().to_string(), value));
        }
        Ok(record)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Typed access; a missing column or a type mismatch is a decode error.
    pub fn get_as<T: FromValue>(&self, key: &str) -> WeaveResult<T> {
        let value = self
            .get(key)
            .ok_or_else(|| WeaveError::decode(key, "column not found"))?;
        T::from_value(value).map_err(|message| WeaveError::decode(key, message))
    }

    /// Set a field, keeping its position if it already exists.
    ///
    /// Returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert to a JSON object, keeping column order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or_default()))
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Map a [`Record`] into a user type.
///
/// # Example
/// ```ignore
/// struct User { id: i64, name: String }
///
/// impl FromRecord for User {
///     fn from_record(record: &Record) -> WeaveResult<Self> {
///         Ok(User { id: record.get_as("id")?, name: record.get_as("name")? })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> WeaveResult<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> WeaveResult<Self> {
        Ok(record.clone())
    }
}

/// What a connection returns for one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    affected: u64,
    rows: Vec<Record>,
}

impl QueryResult {
    pub fn new(affected: u64, rows: Vec<Record>) -> Self {
        Self { affected, rows }
    }

    /// Rows affected (or returned) as reported by the server.
    pub fn affected(&self) -> u64 {
        self.affected
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    pub fn fetch_all_as<T: FromRecord>(&self) -> WeaveResult<Vec<T>> {
        self.rows.iter().map(T::from_record).collect()
    }

    /// The first row mapped to `T`; no rows is [`WeaveError::NotFound`].
    pub fn fetch_one_as<T: FromRecord>(&self) -> WeaveResult<T> {
        let record = self
            .rows
            .first()
            .ok_or_else(|| WeaveError::not_found("Expected 1 row, got 0"))?;
        T::from_record(record)
    }

    pub fn fetch_opt_as<T: FromRecord>(&self) -> WeaveResult<Option<T>> {
        self.rows.first().map(T::from_record).transpose()
    }
}

impl IntoIterator for QueryResult {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A column decoded into a [`Value`] according to its server type.
///
/// Integers and floats keep their kind; `numeric`, json, temporal and uuid
/// columns become their canonical text. Arrays and other types are rejected.
struct ColumnValue(Value);

impl<'a> FromSql<'a> for ColumnValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let value = if *ty == Type::BOOL {
            Value::Bool(bool::from_sql(ty, raw)?)
        } else if *ty == Type::INT2 {
            Value::from(i16::from_sql(ty, raw)?)
        } else if *ty == Type::INT4 {
            Value::from(i32::from_sql(ty, raw)?)
        } else if *ty == Type::INT8 {
            Value::Int(i64::from_sql(ty, raw)?)
        } else if *ty == Type::OID {
            Value::from(u32::from_sql(ty, raw)?)
        } else if *ty == Type::FLOAT4 {
            Value::from(f32::from_sql(ty, raw)?)
        } else if *ty == Type::FLOAT8 {
            Value::Float(f64::from_sql(ty, raw)?)
        } else if *ty == Type::NUMERIC {
            Value::Text(Decimal::from_sql(ty, raw)?.to_string())
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::BPCHAR
            || *ty == Type::NAME
            || *ty == Type::UNKNOWN
        {
            Value::Text(String::from_sql(ty, raw)?)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            Value::Text(serde_json::Value::from_sql(ty, raw)?.to_string())
        } else if *ty == Type::TIMESTAMP {
            Value::Text(chrono::NaiveDateTime::from_sql(ty, raw)?.to_string())
        } else if *ty == Type::TIMESTAMPTZ {
            Value::Text(chrono::DateTime::<chrono::Utc>::from_sql(ty, raw)?.to_rfc3339())
        } else if *ty == Type::DATE {
            Value::Text(chrono::NaiveDate::from_sql(ty, raw)?.to_string())
        } else if *ty == Type::UUID {
            Value::Text(uuid::Uuid::from_sql(ty, raw)?.to_string())
        } else if matches!(ty.kind(), Kind::Array(_)) {
            return Err(format!("array column type '{}' is not supported", ty.name()).into());
        } else {
            return Err(format!("unsupported column type '{}'", ty.name()).into());
        };
        Ok(ColumnValue(value))
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(ColumnValue(Value::Null))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}
