use crate::encoder::Encoder;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Value carried by a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Utc>),
    Error(String),
    Json(Value),
    /// A value that failed to serialize when the field was built. Holds the reason.
    Invalid(String),
}

impl FieldValue {
    /// JSON form used by the encoders. Durations are rendered as fractional seconds, times as
    /// RFC 3339 and non-finite floats as strings.
    pub fn to_json(&self) -> Result<Value, String> {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => Ok(Value::String(s.clone())),
            FieldValue::I64(v) => Ok(Value::from(*v)),
            FieldValue::U64(v) => Ok(Value::from(*v)),
            FieldValue::F64(v) => Ok(float_to_json(*v)),
            FieldValue::Bool(v) => Ok(Value::Bool(*v)),
            FieldValue::Duration(d) => Ok(float_to_json(d.as_secs_f64())),
            FieldValue::Time(t) => Ok(Value::String(
                t.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            FieldValue::Json(v) => Ok(v.clone()),
            FieldValue::Invalid(reason) => Err(reason.clone()),
        }
    }
}

fn float_to_json(v: f64) -> Value {
    if v.is_nan() {
        Value::String("NaN".to_string())
    } else if v.is_infinite() {
        let s = if v.is_sign_positive() { "+Inf" } else { "-Inf" };
        Value::String(s.to_string())
    } else {
        serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

/// A typed key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn i64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::I64(value))
    }

    pub fn u64(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::U64(value))
    }

    pub fn f64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::F64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, FieldValue::Time(value))
    }

    /// An `error` field holding the error's display form.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }

    /// Serializes `value` eagerly. A serialization failure is kept as [`FieldValue::Invalid`] and
    /// surfaces when the field is encoded.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        let value = match serde_json::to_value(value) {
            Ok(v) => FieldValue::Json(v),
            Err(e) => FieldValue::Invalid(e.to_string()),
        };
        Self::new(key, value)
    }

    /// Accumulates this field into an encoder's context.
    ///
    /// Context accumulation cannot fail, so an invalid value is recorded as a `<key>Error` string
    /// field instead.
    pub fn add_to(&self, encoder: &mut dyn Encoder) {
        match &self.value {
            FieldValue::Invalid(reason) => {
                encoder.add_field(Field::string(format!("{}Error", self.key), reason.clone()));
            }
            _ => encoder.add_field(self.clone()),
        }
    }
}
