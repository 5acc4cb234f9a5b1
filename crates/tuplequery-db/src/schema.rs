//! Entity metadata
//!
//! An [`Entity`] describes one table: its name, its attribute graph and its
//! primary key. Attributes are either scalar columns or embedded groups whose
//! own attributes map onto columns of the same table.
//!
//! ```
//! use tuplequery_db::schema::{Entity, EntitySchema};
//!
//! struct Order;
//!
//! impl Entity for Order {
//! 	fn schema() -> EntitySchema {
//! 		EntitySchema::builder("orders")
//! 			.field("id")
//! 			.field_as("customerId", "customer_id")
//! 			.field("status")
//! 			.field("amount")
//! 			.embedded("shipping", |e| e.field_as("city", "shipping_city"))
//! 			.primary_key(["id"])
//! 			.build()
//! 	}
//! }
//!
//! let schema = Order::schema();
//! assert_eq!(schema.table(), "orders");
//! assert_eq!(schema.primary_key(), &["id".to_string()]);
//! ```

use indexmap::IndexMap;

/// A type that maps onto one table
pub trait Entity: Send + Sync + 'static {
	fn schema() -> EntitySchema;
}

/// One node of the attribute graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
	/// Scalar attribute stored in the named column
	Column(String),
	/// Group of attributes stored in columns of the owning table
	Embedded(IndexMap<String, Attribute>),
}

/// Table name, attribute graph and primary key of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
	table: String,
	attributes: IndexMap<String, Attribute>,
	primary_key: Vec<String>,
}

impl EntitySchema {
	pub fn builder(table: impl Into<String>) -> EntitySchemaBuilder {
		EntitySchemaBuilder {
			table: table.into(),
			attributes: AttributeGroup::default(),
			primary_key: Vec::new(),
		}
	}

	pub fn table(&self) -> &str {
		&self.table
	}

	pub fn attributes(&self) -> &IndexMap<String, Attribute> {
		&self.attributes
	}

	/// Attribute paths forming the primary key
	pub fn primary_key(&self) -> &[String] {
		&self.primary_key
	}
}

/// Attributes collected by a builder
#[derive(Debug, Default)]
pub struct AttributeGroup {
	attributes: IndexMap<String, Attribute>,
}

impl AttributeGroup {
	/// Scalar attribute whose column has the same name
	pub fn field(self, name: impl Into<String>) -> Self {
		let name = name.into();
		let column = name.clone();
		self.field_as(name, column)
	}

	/// Scalar attribute stored in `column`
	pub fn field_as(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
		self.attributes
			.insert(name.into(), Attribute::Column(column.into()));
		self
	}

	/// Nested attribute group
	pub fn embedded<F>(mut self, name: impl Into<String>, build: F) -> Self
	where
		F: FnOnce(AttributeGroup) -> AttributeGroup,
	{
		let group = build(AttributeGroup::default());
		self.attributes
			.insert(name.into(), Attribute::Embedded(group.attributes));
		self
	}
}

/// Builder for [`EntitySchema`]
#[derive(Debug)]
pub struct EntitySchemaBuilder {
	table: String,
	attributes: AttributeGroup,
	primary_key: Vec<String>,
}

impl EntitySchemaBuilder {
	pub fn field(mut self, name: impl Into<String>) -> Self {
		self.attributes = self.attributes.field(name);
		self
	}

	pub fn field_as(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
		self.attributes = self.attributes.field_as(name, column);
		self
	}

	pub fn embedded<F>(mut self, name: impl Into<String>, build: F) -> Self
	where
		F: FnOnce(AttributeGroup) -> AttributeGroup,
	{
		self.attributes = self.attributes.embedded(name, build);
		self
	}

	/// Primary key attribute paths; more than one path forms a composite key
	pub fn primary_key<I, S>(mut self, paths: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.primary_key = paths.into_iter().map(Into::into).collect();
		self
	}

	pub fn build(self) -> EntitySchema {
		EntitySchema {
			table: self.table,
			attributes: self.attributes.attributes,
			primary_key: self.primary_key,
		}
	}
}
