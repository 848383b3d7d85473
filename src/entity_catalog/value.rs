use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-native value of an indexed property.
///
/// Produced either by converting a query literal to the property's declared type,
/// or supplied directly by the caller as a named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Long(i64),
    Double(f64),
    /// Must stay ahead of `String` so ISO dates deserialize as dates
    Date(NaiveDate),
    String(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Long(l) => write!(f, "{}", l),
            PropertyValue::Double(d) => write!(f, "{}", d),
            PropertyValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            PropertyValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}
