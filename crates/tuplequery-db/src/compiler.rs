//! Statement construction for tuple and grouped aggregate queries

use crate::aggregate::AggregateFunction;
use crate::error::Result;
use crate::executor::DatabaseType;
use crate::resolver::Root;
use sea_query::{
	Alias, Asterisk, Condition, Expr, Func, NullOrdering, Order, Query, SelectStatement, SimpleExpr,
};
use tuplequery_core::{Direction, NullHandling, PageRequest, Sort};

/// One selected output column
#[derive(Debug, Clone)]
pub(crate) struct Projection {
	pub alias: String,
	pub expr: SimpleExpr,
}

/// Aggregate output column of a grouped query, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AggregateColumn {
	/// `COUNT(concat_ws(sep, columns...))` aliased `count`; no columns counts rows
	ConcatCount(Vec<String>),
	/// `function(column)` under the given alias
	Function {
		function: AggregateFunction,
		column: String,
		alias: String,
	},
}

/// `concat_ws(separator, exprs...)`
pub(crate) fn concat_ws(separator: &str, exprs: Vec<SimpleExpr>) -> SimpleExpr {
	// `args` replaces the argument list, so the separator goes in the same call
	let separator: SimpleExpr = Expr::val(separator).into();
	let args = std::iter::once(separator).chain(exprs);
	Func::cust(Alias::new("concat_ws")).args(args).into()
}

/// Builds select statements against one root
pub(crate) struct StatementCompiler<'a, E> {
	root: &'a Root<E>,
	database_type: DatabaseType,
	separator: &'a str,
}

impl<'a, E> StatementCompiler<'a, E> {
	pub fn new(root: &'a Root<E>, database_type: DatabaseType, separator: &'a str) -> Self {
		Self {
			root,
			database_type,
			separator,
		}
	}

	/// Resolve column paths, each aliased by its path
	pub fn project(&self, columns: &[&str]) -> Result<Vec<Projection>> {
		columns
			.iter()
			.map(|path| {
				Ok(Projection {
					alias: (*path).to_string(),
					expr: self.root.get(path)?,
				})
			})
			.collect()
	}

	/// Resolve an aggregate column
	pub fn aggregate(&self, column: &AggregateColumn) -> Result<Projection> {
		match column {
			AggregateColumn::ConcatCount(columns) => {
				let expr: SimpleExpr = if columns.is_empty() {
					Func::count(Expr::col(Asterisk)).into()
				} else {
					let exprs = self.root.get_all(columns)?;
					Func::count(concat_ws(self.separator, exprs)).into()
				};
				Ok(Projection {
					alias: AggregateFunction::Count.name().to_string(),
					expr,
				})
			}
			AggregateColumn::Function {
				function,
				column,
				alias,
			} => {
				let mut expr = function.apply(self.root.get(column)?);
				// Postgres returns NUMERIC for these, which the Any driver cannot decode
				if self.database_type == DatabaseType::Postgres && function.yields_numeric() {
					expr = Func::cast_as(expr, Alias::new("DOUBLE PRECISION")).into();
				}
				Ok(Projection {
					alias: alias.clone(),
					expr,
				})
			}
		}
	}

	/// `SELECT DISTINCT columns FROM table [WHERE ...] [ORDER BY ...]`
	pub fn tuple_select(
		&self,
		columns: &[Projection],
		predicate: Option<Condition>,
		sort: &Sort,
	) -> Result<SelectStatement> {
		let mut stmt = self.base(predicate);
		stmt.distinct();
		for column in columns {
			stmt.expr_as(column.expr.clone(), Alias::new(&column.alias));
		}
		self.apply_sort(&mut stmt, sort, &[])?;
		Ok(stmt)
	}

	/// `SELECT groups, aggregates FROM table [WHERE ...] GROUP BY groups [ORDER BY ...]`
	pub fn grouped_select(
		&self,
		groups: &[Projection],
		aggregates: &[Projection],
		predicate: Option<Condition>,
		sort: &Sort,
	) -> Result<SelectStatement> {
		let mut stmt = self.base(predicate);
		for column in groups.iter().chain(aggregates) {
			stmt.expr_as(column.expr.clone(), Alias::new(&column.alias));
		}
		stmt.add_group_by(groups.iter().map(|g| g.expr.clone()));
		self.apply_sort(&mut stmt, sort, aggregates)?;
		Ok(stmt)
	}

	/// Offset and limit of one page
	pub fn paginate(&self, stmt: &mut SelectStatement, request: &PageRequest) -> Result<()> {
		stmt.limit(request.size()).offset(request.offset()?);
		Ok(())
	}

	/// Append ORDER BY clauses; a property naming an aggregate alias orders by that aggregate
	fn apply_sort(
		&self,
		stmt: &mut SelectStatement,
		sort: &Sort,
		aggregates: &[Projection],
	) -> Result<()> {
		for order in sort {
			let mut expr = match aggregates.iter().find(|a| a.alias == order.property) {
				Some(aggregate) => aggregate.expr.clone(),
				None => self.root.get(&order.property)?,
			};
			if order.ignore_case {
				expr = Func::lower(expr).into();
			}
			let direction = match order.direction {
				Direction::Asc => Order::Asc,
				Direction::Desc => Order::Desc,
			};
			match order.null_handling {
				NullHandling::Native => {
					stmt.order_by_expr(expr, direction);
				}
				NullHandling::NullsFirst => {
					stmt.order_by_expr_with_nulls(expr, direction, NullOrdering::First);
				}
				NullHandling::NullsLast => {
					stmt.order_by_expr_with_nulls(expr, direction, NullOrdering::Last);
				}
			}
		}
		Ok(())
	}

	fn base(&self, predicate: Option<Condition>) -> SelectStatement {
		let mut stmt = Query::select();
		stmt.from(Alias::new(self.root.table()));
		if let Some(condition) = predicate {
			stmt.cond_where(condition);
		}
		stmt
	}
}
