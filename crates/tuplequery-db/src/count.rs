//! Count queries computing page totals
//!
//! A [`CountQuery`] counts what a content query would return under the same
//! filter, without ORDER BY, LIMIT or OFFSET.

use crate::error::Result;
use crate::resolver::Root;
use sea_query::{Alias, Asterisk, Condition, Expr, Func, Query, SelectStatement, SimpleExpr};

/// What a count query counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountTarget {
	/// Combinations of the projected columns, as selected by `SELECT DISTINCT`
	Columns(Vec<String>),
	/// Root entities, by primary key
	Root,
	/// Output groups of a grouped query
	Groups(Vec<String>),
}

/// Builder for the total of a paged query
///
/// # Examples
///
/// ```
/// use sea_query::{QueryStatementWriter, SqliteQueryBuilder};
/// use tuplequery_db::count::CountQuery;
/// use tuplequery_db::resolver::Root;
/// use tuplequery_db::schema::{Entity, EntitySchema};
///
/// struct Order;
/// impl Entity for Order {
/// 	fn schema() -> EntitySchema {
/// 		EntitySchema::builder("orders").field("id").field("status").primary_key(["id"]).build()
/// 	}
/// }
///
/// let root = Root::<Order>::new();
/// let sql = CountQuery::root().build(&root, None).unwrap().to_string(SqliteQueryBuilder);
/// assert_eq!(sql, r#"SELECT COUNT(DISTINCT "orders"."id") AS "count" FROM "orders""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
	target: CountTarget,
	distinct: bool,
}

impl CountQuery {
	pub fn new(target: CountTarget) -> Self {
		Self {
			target,
			distinct: true,
		}
	}

	pub fn columns<S: Into<String> + Clone>(columns: &[S]) -> Self {
		Self::new(CountTarget::Columns(
			columns.iter().cloned().map(Into::into).collect(),
		))
	}

	pub fn root() -> Self {
		Self::new(CountTarget::Root)
	}

	pub fn groups<S: Into<String> + Clone>(columns: &[S]) -> Self {
		Self::new(CountTarget::Groups(
			columns.iter().cloned().map(Into::into).collect(),
		))
	}

	/// Count distinct keys (the default) or every matching row
	pub fn distinct(mut self, distinct: bool) -> Self {
		self.distinct = distinct;
		self
	}

	pub fn target(&self) -> &CountTarget {
		&self.target
	}

	/// Build the statement; the single output column is aliased `count`
	pub fn build<E>(&self, root: &Root<E>, predicate: Option<Condition>) -> Result<SelectStatement> {
		match &self.target {
			CountTarget::Columns(columns) => {
				let projected = root.get_all(columns)?;
				Ok(self.count_distinct_rows(root, projected, predicate))
			}
			CountTarget::Root => {
				let mut key = root.primary_key()?;
				if key.len() == 1 {
					return Ok(self.count_over(root, key.remove(0), predicate));
				}
				Ok(self.count_distinct_rows(root, key, predicate))
			}
			CountTarget::Groups(columns) => {
				let groups = root.get_all(columns)?;
				let mut grouped = Query::select();
				grouped.from(Alias::new(root.table()));
				if groups.is_empty() {
					// an ungrouped aggregate yields exactly one row
					grouped.expr(Func::count(Expr::col(Asterisk)));
				} else {
					grouped.exprs(groups.clone());
					grouped.add_group_by(groups);
				}
				if let Some(condition) = predicate {
					grouped.cond_where(condition);
				}
				Ok(Self::count_subquery(grouped, "grouped"))
			}
		}
	}

	/// `SELECT COUNT(*) AS "count" FROM (inner) AS alias`
	fn count_subquery(inner: SelectStatement, alias: &str) -> SelectStatement {
		let mut stmt = Query::select();
		stmt.expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
			.from_subquery(inner, Alias::new(alias));
		stmt
	}

	/// Distinct combinations of `exprs`, or every row when not distinct
	fn count_distinct_rows<E>(
		&self,
		root: &Root<E>,
		exprs: Vec<SimpleExpr>,
		predicate: Option<Condition>,
	) -> SelectStatement {
		if !self.distinct || exprs.is_empty() {
			let mut stmt = Query::select();
			stmt.expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
				.from(Alias::new(root.table()));
			if let Some(condition) = predicate {
				stmt.cond_where(condition);
			}
			return stmt;
		}
		// row identity survives NULLs and separator-bearing values
		let mut rows = Query::select();
		rows.distinct()
			.exprs(exprs)
			.from(Alias::new(root.table()));
		if let Some(condition) = predicate {
			rows.cond_where(condition);
		}
		Self::count_subquery(rows, "distinct_rows")
	}

	fn count_over<E>(
		&self,
		root: &Root<E>,
		key: SimpleExpr,
		predicate: Option<Condition>,
	) -> SelectStatement {
		let count: SimpleExpr = if self.distinct {
			Func::count_distinct(key).into()
		} else {
			Func::count(key).into()
		};
		let mut stmt = Query::select();
		stmt.expr_as(count, Alias::new("count"))
			.from(Alias::new(root.table()));
		if let Some(condition) = predicate {
			stmt.cond_where(condition);
		}
		stmt
	}
}
