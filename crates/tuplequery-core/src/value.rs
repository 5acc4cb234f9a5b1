//! Dynamically typed column values

use crate::exception::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single selected or aggregated column
///
/// Values serialize untagged, so a tuple renders as plain JSON
/// (`{"customer_id": 1, "sum": 150}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
}

impl QueryValue {
	/// Returns true for SQL NULL
	pub fn is_null(&self) -> bool {
		matches!(self, QueryValue::Null)
	}

	/// Integer view of the value, if it is an integer
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_core::QueryValue;
	///
	/// assert_eq!(QueryValue::Int(7).as_i64(), Some(7));
	/// assert_eq!(QueryValue::Float(7.0).as_i64(), None);
	/// ```
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			QueryValue::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// Floating point view of the value; integers are widened
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_core::QueryValue;
	///
	/// assert_eq!(QueryValue::Int(2).as_f64(), Some(2.0));
	/// assert_eq!(QueryValue::Float(2.5).as_f64(), Some(2.5));
	/// assert_eq!(QueryValue::Null.as_f64(), None);
	/// ```
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			QueryValue::Int(i) => Some(*i as f64),
			QueryValue::Float(f) => Some(*f),
			_ => None,
		}
	}

	/// String view of the value, if it is text
	pub fn as_str(&self) -> Option<&str> {
		match self {
			QueryValue::String(s) => Some(s),
			_ => None,
		}
	}

	fn type_name(&self) -> &'static str {
		match self {
			QueryValue::Null => "null",
			QueryValue::Bool(_) => "bool",
			QueryValue::Int(_) => "int",
			QueryValue::Float(_) => "float",
			QueryValue::String(_) => "string",
			QueryValue::Bytes(_) => "bytes",
		}
	}
}

impl fmt::Display for QueryValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			QueryValue::Null => write!(f, "NULL"),
			QueryValue::Bool(b) => write!(f, "{}", b),
			QueryValue::Int(i) => write!(f, "{}", i),
			QueryValue::Float(v) => write!(f, "{}", v),
			QueryValue::String(s) => write!(f, "{}", s),
			QueryValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
		}
	}
}

impl From<&str> for QueryValue {
	fn from(s: &str) -> Self {
		QueryValue::String(s.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(s: String) -> Self {
		QueryValue::String(s)
	}
}

impl From<i64> for QueryValue {
	fn from(i: i64) -> Self {
		QueryValue::Int(i)
	}
}

impl From<i32> for QueryValue {
	fn from(i: i32) -> Self {
		QueryValue::Int(i as i64)
	}
}

impl From<f64> for QueryValue {
	fn from(f: f64) -> Self {
		QueryValue::Float(f)
	}
}

impl From<bool> for QueryValue {
	fn from(b: bool) -> Self {
		QueryValue::Bool(b)
	}
}

impl From<Vec<u8>> for QueryValue {
	fn from(b: Vec<u8>) -> Self {
		QueryValue::Bytes(b)
	}
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(QueryValue::Null, Into::into)
	}
}

fn type_error(value: &QueryValue, target: &str) -> Error {
	Error::TypeError(format!(
		"Cannot convert {} value {} to {}",
		value.type_name(),
		value,
		target
	))
}

impl TryFrom<QueryValue> for i64 {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => Ok(i),
			QueryValue::Bool(b) => Ok(b as i64),
			_ => Err(type_error(&value, "i64")),
		}
	}
}

impl TryFrom<QueryValue> for i32 {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => i32::try_from(i)
				.map_err(|_| Error::TypeError(format!("Value {} out of range for i32", i))),
			_ => Err(type_error(&value, "i32")),
		}
	}
}

impl TryFrom<QueryValue> for u64 {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => u64::try_from(i)
				.map_err(|_| Error::TypeError(format!("Value {} out of range for u64", i))),
			_ => Err(type_error(&value, "u64")),
		}
	}
}

impl TryFrom<QueryValue> for f64 {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		value.as_f64().ok_or_else(|| type_error(&value, "f64"))
	}
}

impl TryFrom<QueryValue> for bool {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Bool(b) => Ok(b),
			// SQLite and MySQL report booleans as integers
			QueryValue::Int(0) => Ok(false),
			QueryValue::Int(1) => Ok(true),
			_ => Err(type_error(&value, "bool")),
		}
	}
}

impl TryFrom<QueryValue> for String {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::String(s) => Ok(s),
			_ => Err(type_error(&value, "String")),
		}
	}
}

impl TryFrom<QueryValue> for Vec<u8> {
	type Error = Error;

	fn try_from(value: QueryValue) -> Result<Self, Self::Error> {
		match value {
			QueryValue::Bytes(b) => Ok(b),
			QueryValue::String(s) => Ok(s.into_bytes()),
			_ => Err(type_error(&value, "Vec<u8>")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(QueryValue::Int(42), 42.0)]
	#[case(QueryValue::Float(1.5), 1.5)]
	fn test_numeric_widening(#[case] value: QueryValue, #[case] expected: f64) {
		// Act
		let converted = f64::try_from(value).unwrap();

		// Assert
		assert_eq!(converted, expected);
	}

	#[rstest]
	fn test_string_to_i64_is_type_error() {
		// Arrange
		let value = QueryValue::String("PAID".to_string());

		// Act
		let result = i64::try_from(value);

		// Assert
		assert!(matches!(result, Err(Error::TypeError(_))));
	}

	#[rstest]
	fn test_integer_booleans() {
		assert!(bool::try_from(QueryValue::Int(1)).unwrap());
		assert!(!bool::try_from(QueryValue::Int(0)).unwrap());
		assert!(bool::try_from(QueryValue::Int(2)).is_err());
	}

	#[rstest]
	fn test_untagged_json() {
		// Arrange
		let values = vec![
			QueryValue::Null,
			QueryValue::Int(1),
			QueryValue::Float(2.5),
			QueryValue::String("x".to_string()),
		];

		// Act
		let json = serde_json::to_string(&values).unwrap();

		// Assert
		assert_eq!(json, r#"[null,1,2.5,"x"]"#);
	}
}
