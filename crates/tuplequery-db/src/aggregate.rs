//! Aggregate functions

use crate::error::{QueryError, Result};
use indexmap::IndexMap;
use sea_query::{Func, SimpleExpr};
use std::fmt;
use std::str::FromStr;

/// Aggregate applied to one column of a grouped query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
	Avg,
	Sum,
	Count,
	Min,
	Max,
}

impl AggregateFunction {
	/// Lower-case name, used as the alias prefix
	pub fn name(self) -> &'static str {
		match self {
			AggregateFunction::Avg => "avg",
			AggregateFunction::Sum => "sum",
			AggregateFunction::Count => "count",
			AggregateFunction::Min => "min",
			AggregateFunction::Max => "max",
		}
	}

	/// Wrap `expr` in this aggregate
	pub fn apply(self, expr: SimpleExpr) -> SimpleExpr {
		match self {
			AggregateFunction::Avg => Func::avg(expr).into(),
			AggregateFunction::Sum => Func::sum(expr).into(),
			AggregateFunction::Count => Func::count(expr).into(),
			AggregateFunction::Min => Func::min(expr).into(),
			AggregateFunction::Max => Func::max(expr).into(),
		}
	}

	/// Output alias for this aggregate over `column`
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_db::AggregateFunction;
	///
	/// assert_eq!(AggregateFunction::Sum.alias_for("amount"), "sum_amount");
	/// ```
	pub fn alias_for(self, column: &str) -> String {
		format!("{}_{}", self.name(), column)
	}

	/// Whether the result may be an exact numeric the `Any` driver cannot decode
	pub(crate) fn yields_numeric(self) -> bool {
		matches!(self, AggregateFunction::Avg | AggregateFunction::Sum)
	}
}

impl fmt::Display for AggregateFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for AggregateFunction {
	type Err = QueryError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"avg" => Ok(AggregateFunction::Avg),
			"sum" => Ok(AggregateFunction::Sum),
			"count" => Ok(AggregateFunction::Count),
			"min" => Ok(AggregateFunction::Min),
			"max" => Ok(AggregateFunction::Max),
			_ => Err(QueryError::UnsupportedAggregate(s.to_string())),
		}
	}
}

impl TryFrom<&str> for AggregateFunction {
	type Error = QueryError;

	fn try_from(s: &str) -> Result<Self> {
		s.parse()
	}
}

impl TryFrom<String> for AggregateFunction {
	type Error = QueryError;

	fn try_from(s: String) -> Result<Self> {
		s.parse()
	}
}

/// One aggregate output column: function plus column path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
	pub function: AggregateFunction,
	pub column: String,
}

impl AggregateSpec {
	pub fn new(function: AggregateFunction, column: impl Into<String>) -> Self {
		Self {
			function,
			column: column.into(),
		}
	}

	/// `<function>_<column>`
	pub fn alias(&self) -> String {
		self.function.alias_for(&self.column)
	}

	/// Parse a function/column mapping
	///
	/// Each function appears at most once; a repeated function keeps its
	/// first position and takes the last column. An unknown function name
	/// fails the whole mapping.
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_db::{AggregateFunction, AggregateSpec};
	///
	/// let specs = AggregateSpec::collect([("SUM", "amount"), ("max", "amount")]).unwrap();
	/// assert_eq!(specs[0].alias(), "sum_amount");
	/// assert_eq!(specs[1].function, AggregateFunction::Max);
	///
	/// assert!(AggregateSpec::collect([("median", "amount")]).is_err());
	/// ```
	pub fn collect<I, F, C>(aggregates: I) -> Result<Vec<AggregateSpec>>
	where
		I: IntoIterator<Item = (F, C)>,
		F: TryInto<AggregateFunction>,
		QueryError: From<F::Error>,
		C: Into<String>,
	{
		let mut map: IndexMap<AggregateFunction, String> = IndexMap::new();
		for (function, column) in aggregates {
			map.insert(function.try_into()?, column.into());
		}
		Ok(map
			.into_iter()
			.map(|(function, column)| AggregateSpec { function, column })
			.collect())
	}
}
