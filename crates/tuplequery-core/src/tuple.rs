//! Loosely-typed result rows

use crate::exception::{Error, Result};
use crate::value::QueryValue;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: aliases mapped to values in selection order
///
/// # Examples
///
/// ```
/// use tuplequery_core::{QueryValue, Tuple};
///
/// let mut row = Tuple::new();
/// row.push("customerId", QueryValue::Int(2));
/// row.push("avg", QueryValue::Float(30.0));
///
/// assert_eq!(row.len(), 2);
/// assert_eq!(row.get::<i64>("customerId").unwrap(), 2);
/// assert_eq!(row.get_index(1), Some(&QueryValue::Float(30.0)));
/// assert_eq!(row.aliases().collect::<Vec<_>>(), vec!["customerId", "avg"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tuple {
	elements: IndexMap<String, QueryValue>,
}

impl Tuple {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a column; an existing alias keeps its position and takes the new value
	pub fn push(&mut self, alias: impl Into<String>, value: QueryValue) {
		self.elements.insert(alias.into(), value);
	}

	/// Raw value by alias
	pub fn value(&self, alias: &str) -> Option<&QueryValue> {
		self.elements.get(alias)
	}

	/// Raw value by selection position
	pub fn get_index(&self, index: usize) -> Option<&QueryValue> {
		self.elements.get_index(index).map(|(_, v)| v)
	}

	/// Typed value by alias
	pub fn get<T>(&self, alias: &str) -> Result<T>
	where
		T: TryFrom<QueryValue, Error = Error>,
	{
		self.elements
			.get(alias)
			.cloned()
			.ok_or_else(|| Error::ColumnNotFound(alias.to_string()))
			.and_then(T::try_from)
	}

	/// Typed value by alias, mapping SQL NULL to `None`
	pub fn get_opt<T>(&self, alias: &str) -> Result<Option<T>>
	where
		T: TryFrom<QueryValue, Error = Error>,
	{
		match self.elements.get(alias) {
			None => Err(Error::ColumnNotFound(alias.to_string())),
			Some(QueryValue::Null) => Ok(None),
			Some(value) => T::try_from(value.clone()).map(Some),
		}
	}

	pub fn aliases(&self) -> impl Iterator<Item = &str> {
		self.elements.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
		self.elements.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.elements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	/// Consume the tuple into its ordered map
	pub fn into_map(self) -> IndexMap<String, QueryValue> {
		self.elements
	}
}

impl FromIterator<(String, QueryValue)> for Tuple {
	fn from_iter<I: IntoIterator<Item = (String, QueryValue)>>(iter: I) -> Self {
		Self {
			elements: iter.into_iter().collect(),
		}
	}
}

impl Serialize for Tuple {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.elements.len()))?;
		for (alias, value) in &self.elements {
			map.serialize_entry(alias, value)?;
		}
		map.end()
	}
}
