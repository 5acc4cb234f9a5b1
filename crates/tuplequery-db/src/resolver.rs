//! Column resolution against an entity's attribute graph

use crate::error::{QueryError, Result};
use crate::schema::{Attribute, Entity, EntitySchema};
use sea_query::{Alias, Expr, SimpleExpr};
use std::marker::PhantomData;

/// Query root bound to one entity type
///
/// Each logical query builds its own root; roots are never shared between
/// the content query and the count query of a paged call.
pub struct Root<E> {
	schema: EntitySchema,
	_entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Root<E> {
	pub fn new() -> Self {
		Self {
			schema: E::schema(),
			_entity: PhantomData,
		}
	}
}

impl<E: Entity> Default for Root<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> Root<E> {
	pub fn table(&self) -> &str {
		self.schema.table()
	}

	pub fn schema(&self) -> &EntitySchema {
		&self.schema
	}

	/// Column name behind a dotted attribute path
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_db::resolver::Root;
	/// use tuplequery_db::schema::{Entity, EntitySchema};
	///
	/// struct Order;
	/// impl Entity for Order {
	/// 	fn schema() -> EntitySchema {
	/// 		EntitySchema::builder("orders")
	/// 			.field("id")
	/// 			.embedded("shipping", |e| e.field_as("city", "shipping_city"))
	/// 			.primary_key(["id"])
	/// 			.build()
	/// 	}
	/// }
	///
	/// let root = Root::<Order>::new();
	/// assert_eq!(root.column_name("shipping.city").unwrap(), "shipping_city");
	/// assert!(root.column_name("shipping").is_err());
	/// assert!(root.column_name("customer").is_err());
	/// ```
	pub fn column_name(&self, path: &str) -> Result<&str> {
		if path.is_empty() || path.split('.').any(str::is_empty) {
			return Err(QueryError::InvalidAttributePath(path.to_string()));
		}

		let mut attributes = self.schema.attributes();
		let mut segments = path.split('.').peekable();
		while let Some(segment) = segments.next() {
			let attribute = attributes
				.get(segment)
				.ok_or_else(|| self.unresolved(path))?;
			let is_last = segments.peek().is_none();
			match (attribute, is_last) {
				(Attribute::Column(column), true) => return Ok(column),
				(Attribute::Embedded(_), true) => {
					return Err(QueryError::NotScalarAttribute {
						entity: self.table().to_string(),
						path: path.to_string(),
					});
				}
				(Attribute::Embedded(group), false) => attributes = group,
				// cannot traverse into a scalar column
				(Attribute::Column(_), false) => return Err(self.unresolved(path)),
			}
		}

		Err(self.unresolved(path))
	}

	/// Table-qualified column expression for a dotted attribute path
	pub fn get(&self, path: &str) -> Result<SimpleExpr> {
		let column = self.column_name(path)?;
		Ok(Expr::col((Alias::new(self.table()), Alias::new(column))).into())
	}

	/// Resolve every path, failing on the first unresolvable one
	pub fn get_all<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<SimpleExpr>> {
		paths.iter().map(|p| self.get(p.as_ref())).collect()
	}

	/// Column expressions of the primary key, in declaration order
	pub fn primary_key(&self) -> Result<Vec<SimpleExpr>> {
		let key = self.schema.primary_key();
		if key.is_empty() {
			return Err(QueryError::Schema(format!(
				"entity '{}' declares no primary key",
				self.table()
			)));
		}
		self.get_all(key)
	}

	fn unresolved(&self, path: &str) -> QueryError {
		QueryError::UnresolvedAttribute {
			entity: self.table().to_string(),
			path: path.to_string(),
		}
	}
}
