//! Bindable scalar values and right-hand-side operands.
//!
//! [`Value`] is the only thing that ever travels in a compiled parameter list.
//! Each variant carries its own bind kind; encoding checks it against the
//! parameter type the server inferred instead of trusting the variant alone.

use crate::raw::Raw;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType, to_sql_checked};
use uuid::Uuid;

/// A tagged scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Text value
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, used in conversion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

/// Text renders as a quoted literal with `'` doubled.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

type BindResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

/// Encodes the value for the parameter type the server inferred.
///
/// Numbers convert between the integer, float and `numeric` types and render
/// as text for text parameters. Text is parsed into the target type, the way
/// the server coerces an untyped literal. Any other pairing is a
/// [`WrongType`] error.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> BindResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => bool_to_sql(*v, ty, out),
            Value::Int(v) => int_to_sql(*v, ty, out),
            Value::Float(v) => float_to_sql(*v, ty, out),
            Value::Text(v) => text_to_sql(v, ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn is_text(ty: &Type) -> bool {
    [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME, Type::UNKNOWN].contains(ty)
}

fn wrong_type(ty: &Type) -> Box<dyn Error + Sync + Send> {
    Box::new(WrongType::new::<Value>(ty.clone()))
}

fn bool_to_sql(v: bool, ty: &Type, out: &mut BytesMut) -> BindResult {
    if *ty == Type::BOOL {
        v.to_sql(ty, out)
    } else if is_text(ty) {
        v.to_string().to_sql(ty, out)
    } else {
        Err(wrong_type(ty))
    }
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> BindResult {
    if *ty == Type::INT8 {
        v.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::OID {
        u32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (v as f64).to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from(v).to_sql(ty, out)
    } else if is_text(ty) {
        v.to_string().to_sql(ty, out)
    } else {
        Err(wrong_type(ty))
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> BindResult {
    if *ty == Type::FLOAT8 {
        v.to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::try_from(v)?.to_sql(ty, out)
    } else if is_text(ty) {
        v.to_string().to_sql(ty, out)
    } else {
        Err(wrong_type(ty))
    }
}

fn text_to_sql(v: &str, ty: &Type, out: &mut BytesMut) -> BindResult {
    if is_text(ty) {
        v.to_sql(ty, out)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        serde_json::from_str::<serde_json::Value>(v)?.to_sql(ty, out)
    } else if *ty == Type::TIMESTAMP {
        parse_timestamp(v)?.to_sql(ty, out)
    } else if *ty == Type::TIMESTAMPTZ {
        parse_timestamptz(v)?.to_sql(ty, out)
    } else if *ty == Type::DATE {
        v.trim().parse::<NaiveDate>()?.to_sql(ty, out)
    } else if *ty == Type::UUID {
        Uuid::parse_str(v.trim())?.to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        v.trim().parse::<Decimal>()?.to_sql(ty, out)
    } else if *ty == Type::INT8 || *ty == Type::INT4 || *ty == Type::INT2 || *ty == Type::OID {
        int_to_sql(v.trim().parse::<i64>()?, ty, out)
    } else if *ty == Type::FLOAT8 || *ty == Type::FLOAT4 {
        float_to_sql(v.trim().parse::<f64>()?, ty, out)
    } else if *ty == Type::BOOL {
        parse_bool(v)?.to_sql(ty, out)
    } else {
        Err(wrong_type(ty))
    }
}

fn parse_timestamp(v: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let v = v.trim();
    NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f"))
}

/// RFC 3339, `2024-01-01 12:00:00+02`, or a zone-less timestamp taken as UTC.
fn parse_timestamptz(v: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let v = v.trim();
    DateTime::parse_from_rfc3339(v)
        .or_else(|_| DateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| parse_timestamp(v).map(|naive| naive.and_utc()))
}

fn parse_bool(v: &str) -> Result<bool, String> {
    match v.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("invalid boolean '{other}'")),
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }

            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => Text as String,
    &str => Text as String,
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion out of a [`Value`], used by typed record accessors.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, found {}", value.kind_name())
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.as_i64().ok_or_else(|| mismatch("int", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = value.as_i64().ok_or_else(|| mismatch("int", value))?;
        i32::try_from(v).map_err(|e| e.to_string())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.as_f64().ok_or_else(|| mismatch("float", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("text", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Right-hand side of a `SET`, condition or `VALUES` position.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single bound parameter.
    Value(Value),
    /// A list of bound parameters, only meaningful for `IN`.
    List(Vec<Value>),
    /// Inlined verbatim.
    Raw(Raw),
}

impl Operand {
    /// Number of `?` placeholders this operand expands to.
    pub fn placeholder_count(&self) -> usize {
        match self {
            Operand::Value(_) => 1,
            Operand::List(values) => values.len(),
            Operand::Raw(_) => 0,
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<&String> for Operand {
    fn from(v: &String) -> Self {
        Operand::Value(Value::from(v))
    }
}

impl From<Raw> for Operand {
    fn from(v: Raw) -> Self {
        Operand::Raw(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Value(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(values: [T; N]) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}
