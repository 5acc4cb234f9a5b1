//! Sort specifications

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	#[default]
	Asc,
	Desc,
}

impl Direction {
	pub fn is_ascending(self) -> bool {
		matches!(self, Direction::Asc)
	}
}

impl FromStr for Direction {
	type Err = crate::exception::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"asc" => Ok(Direction::Asc),
			"desc" => Ok(Direction::Desc),
			other => Err(crate::exception::Error::InvalidPage(format!(
				"Unknown sort direction '{}'",
				other
			))),
		}
	}
}

/// Placement of NULL values in an ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
	/// Leave NULL placement to the database
	#[default]
	Native,
	NullsFirst,
	NullsLast,
}

/// One ordering clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
	pub property: String,
	pub direction: Direction,
	#[serde(default)]
	pub null_handling: NullHandling,
	#[serde(default)]
	pub ignore_case: bool,
}

impl SortOrder {
	pub fn new(direction: Direction, property: impl Into<String>) -> Self {
		Self {
			property: property.into(),
			direction,
			null_handling: NullHandling::Native,
			ignore_case: false,
		}
	}

	pub fn asc(property: impl Into<String>) -> Self {
		Self::new(Direction::Asc, property)
	}

	pub fn desc(property: impl Into<String>) -> Self {
		Self::new(Direction::Desc, property)
	}

	pub fn nulls_first(mut self) -> Self {
		self.null_handling = NullHandling::NullsFirst;
		self
	}

	pub fn nulls_last(mut self) -> Self {
		self.null_handling = NullHandling::NullsLast;
		self
	}

	/// Compare case-insensitively (the property is wrapped in `LOWER`)
	pub fn ignore_case(mut self) -> Self {
		self.ignore_case = true;
		self
	}

	pub fn is_ascending(&self) -> bool {
		self.direction.is_ascending()
	}
}

impl fmt::Display for SortOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let direction = match self.direction {
			Direction::Asc => "ASC",
			Direction::Desc => "DESC",
		};
		write!(f, "{}: {}", self.property, direction)
	}
}

/// Ordered list of sort orders
///
/// # Examples
///
/// ```
/// use tuplequery_core::{Direction, Sort, SortOrder};
///
/// let sort = Sort::by_desc("sum").and(Sort::by(["customerId"]));
///
/// assert!(sort.is_sorted());
/// let orders: Vec<&SortOrder> = sort.iter().collect();
/// assert_eq!(orders[0].property, "sum");
/// assert_eq!(orders[0].direction, Direction::Desc);
/// assert_eq!(orders[1].direction, Direction::Asc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
	orders: Vec<SortOrder>,
}

impl Sort {
	pub fn unsorted() -> Self {
		Self::default()
	}

	/// Ascending sort on each property, in order
	pub fn by<I, S>(properties: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			orders: properties.into_iter().map(SortOrder::asc).collect(),
		}
	}

	pub fn by_desc(property: impl Into<String>) -> Self {
		Self {
			orders: vec![SortOrder::desc(property)],
		}
	}

	pub fn by_orders(orders: impl IntoIterator<Item = SortOrder>) -> Self {
		Self {
			orders: orders.into_iter().collect(),
		}
	}

	/// Append the orders of `other` after this sort's orders
	pub fn and(mut self, other: Sort) -> Self {
		self.orders.extend(other.orders);
		self
	}

	pub fn is_sorted(&self) -> bool {
		!self.orders.is_empty()
	}

	pub fn is_unsorted(&self) -> bool {
		self.orders.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, SortOrder> {
		self.orders.iter()
	}

	/// First order on the given property, if any
	pub fn order_for(&self, property: &str) -> Option<&SortOrder> {
		self.orders.iter().find(|o| o.property == property)
	}
}

impl<'a> IntoIterator for &'a Sort {
	type Item = &'a SortOrder;
	type IntoIter = std::slice::Iter<'a, SortOrder>;

	fn into_iter(self) -> Self::IntoIter {
		self.orders.iter()
	}
}
