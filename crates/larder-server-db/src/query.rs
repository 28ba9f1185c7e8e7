// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deterministic, parameterized SQL composition.
//!
//! Every builder renders to a [`SqlStatement`]: the statement text with `?`
//! placeholders plus the bound arguments in placeholder order. User-supplied
//! values only ever travel as arguments, never spliced into the text.
//!
//! Equality predicates are keyed by column name and render alphabetically,
//! so a statement's text is a stable function of the builder calls no matter
//! their order. Tests elsewhere in the crate assert generated statements as
//! string literals; that only works because of this ordering contract.

use std::collections::BTreeMap;

use larder_core::QueryFilter;

use crate::value::SqlValue;

/// A rendered statement and its positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlStatement {
	pub statement: String,
	pub args: Vec<SqlValue>,
}

/// A structurally invalid builder state.
///
/// These are programmer errors, not input errors; the repository logs them
/// and substitutes an empty statement for the driver to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
	#[error("select statement has no result columns")]
	EmptySelect,

	#[error("insert statement has no values")]
	EmptyInsert,

	#[error("update statement has no assignments")]
	EmptyUpdate,
}

#[derive(Debug, Clone, Copy)]
enum RangeOp {
	Above,
	Below,
}

impl RangeOp {
	fn symbol(self) -> &'static str {
		match self {
			RangeOp::Above => ">",
			RangeOp::Below => "<",
		}
	}
}

/// Conjunctive WHERE predicates shared by the select and update builders.
///
/// Equality and IS NULL predicates live in one map keyed by column name and
/// render alphabetically; range predicates render after them in call order.
#[derive(Debug, Clone, Default)]
struct WhereClause {
	eq: BTreeMap<String, Option<SqlValue>>,
	ranges: Vec<(String, RangeOp, SqlValue)>,
}

impl WhereClause {
	fn eq(&mut self, column: &str, value: SqlValue) {
		self.eq.insert(column.to_string(), Some(value));
	}

	fn null(&mut self, column: &str) {
		self.eq.insert(column.to_string(), None);
	}

	fn range(&mut self, column: &str, op: RangeOp, value: SqlValue) {
		self.ranges.push((column.to_string(), op, value));
	}

	fn is_empty(&self) -> bool {
		self.eq.is_empty() && self.ranges.is_empty()
	}

	fn render(&self, args: &mut Vec<SqlValue>) -> String {
		let mut conjuncts = Vec::with_capacity(self.eq.len() + self.ranges.len());

		for (column, value) in &self.eq {
			match value {
				Some(value) => {
					conjuncts.push(format!("{column} = ?"));
					args.push(value.clone());
				}
				None => conjuncts.push(format!("{column} IS NULL")),
			}
		}
		for (column, op, value) in &self.ranges {
			conjuncts.push(format!("{column} {} ?", op.symbol()));
			args.push(value.clone());
		}

		conjuncts.join(" AND ")
	}
}

/// The value side of an insert column or update assignment.
#[derive(Debug, Clone)]
enum ValueExpr {
	Bound(SqlValue),
	Raw(String),
}

/// Builder for SELECT statements.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
	table: String,
	columns: Vec<String>,
	conditions: WhereClause,
	order_by: Option<String>,
	limit: Option<u64>,
	offset: Option<u64>,
}

impl SelectBuilder {
	pub fn new(table: &str) -> Self {
		Self {
			table: table.to_string(),
			columns: Vec::new(),
			conditions: WhereClause::default(),
			order_by: None,
			limit: None,
			offset: None,
		}
	}

	/// Add one result column or expression, e.g. `COUNT(id)`.
	pub fn column(mut self, column: &str) -> Self {
		self.columns.push(column.to_string());
		self
	}

	/// Add result columns in order.
	pub fn columns<'a>(mut self, columns: impl IntoIterator<Item = &'a str>) -> Self {
		self.columns.extend(columns.into_iter().map(str::to_string));
		self
	}

	/// Require `column = ?`, binding `value`.
	pub fn where_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
		self.conditions.eq(column, value.into());
		self
	}

	/// Require `column IS NULL`. Binds no argument.
	pub fn where_null(mut self, column: &str) -> Self {
		self.conditions.null(column);
		self
	}

	/// Require `column > ?`, binding `value`.
	pub fn where_gt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
		self.conditions.range(column, RangeOp::Above, value.into());
		self
	}

	/// Require `column < ?`, binding `value`.
	pub fn where_lt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
		self.conditions.range(column, RangeOp::Below, value.into());
		self
	}

	/// Sort clause without the `ORDER BY` keyword, e.g. `created_on DESC`.
	pub fn order_by(mut self, clause: &str) -> Self {
		self.order_by = Some(clause.to_string());
		self
	}

	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);
		self
	}

	/// Append a filter's comparison windows, sort, and pagination.
	///
	/// A zero limit is omitted entirely, as is the zero offset the first
	/// page computes to.
	pub fn apply_filter(mut self, filter: &QueryFilter) -> Self {
		if let Some(created_after) = filter.created_after {
			self = self.where_gt("created_on", created_after);
		}
		if let Some(created_before) = filter.created_before {
			self = self.where_lt("created_on", created_before);
		}
		if let Some(updated_after) = filter.updated_after {
			self = self.where_gt("updated_on", updated_after);
		}
		if let Some(updated_before) = filter.updated_before {
			self = self.where_lt("updated_on", updated_before);
		}
		if let Some(sort) = filter.sort_by {
			self = self.order_by(&format!("created_on {}", sort.as_sql()));
		}
		if filter.limit > 0 {
			self = self.limit(filter.limit);
		}
		let offset = filter.query_offset();
		if offset > 0 {
			self = self.offset(offset);
		}
		self
	}

	pub fn build(self) -> Result<SqlStatement, ComposeError> {
		if self.columns.is_empty() {
			return Err(ComposeError::EmptySelect);
		}

		let mut args = Vec::new();
		let mut statement = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);

		if !self.conditions.is_empty() {
			statement.push_str(" WHERE ");
			statement.push_str(&self.conditions.render(&mut args));
		}
		if let Some(order_by) = &self.order_by {
			statement.push_str(" ORDER BY ");
			statement.push_str(order_by);
		}
		if let Some(limit) = self.limit {
			statement.push_str(&format!(" LIMIT {limit}"));
		}
		if let Some(offset) = self.offset {
			statement.push_str(&format!(" OFFSET {offset}"));
		}

		Ok(SqlStatement { statement, args })
	}
}

/// Builder for INSERT statements.
///
/// Renders the compact column list form:
/// `INSERT INTO t (a,b) VALUES (?,UNIX_TIMESTAMP())`.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
	table: String,
	columns: Vec<String>,
	values: Vec<ValueExpr>,
}

impl InsertBuilder {
	pub fn new(table: &str) -> Self {
		Self {
			table: table.to_string(),
			columns: Vec::new(),
			values: Vec::new(),
		}
	}

	/// Insert a bound value for `column`.
	pub fn value(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
		self.columns.push(column.to_string());
		self.values.push(ValueExpr::Bound(value.into()));
		self
	}

	/// Insert a raw SQL expression for `column`, e.g. `UNIX_TIMESTAMP()`.
	pub fn value_expr(mut self, column: &str, expr: &str) -> Self {
		self.columns.push(column.to_string());
		self.values.push(ValueExpr::Raw(expr.to_string()));
		self
	}

	pub fn build(self) -> Result<SqlStatement, ComposeError> {
		if self.values.is_empty() {
			return Err(ComposeError::EmptyInsert);
		}

		let mut args = Vec::new();
		let placeholders: Vec<&str> = self
			.values
			.iter()
			.map(|value| match value {
				ValueExpr::Bound(value) => {
					args.push(value.clone());
					"?"
				}
				ValueExpr::Raw(expr) => expr.as_str(),
			})
			.collect();

		let statement = format!(
			"INSERT INTO {} ({}) VALUES ({})",
			self.table,
			self.columns.join(","),
			placeholders.join(","),
		);

		Ok(SqlStatement { statement, args })
	}
}

/// Builder for UPDATE statements.
///
/// Assignments render in call order; the WHERE clause renders from the same
/// alphabetical equality set the select builder uses. Assignment arguments
/// precede predicate arguments.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
	table: String,
	assignments: Vec<(String, ValueExpr)>,
	conditions: WhereClause,
}

impl UpdateBuilder {
	pub fn new(table: &str) -> Self {
		Self {
			table: table.to_string(),
			assignments: Vec::new(),
			conditions: WhereClause::default(),
		}
	}

	/// Assign a bound value to `column`.
	pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
		self
			.assignments
			.push((column.to_string(), ValueExpr::Bound(value.into())));
		self
	}

	/// Assign a raw SQL expression to `column`, e.g. `UNIX_TIMESTAMP()`.
	pub fn set_expr(mut self, column: &str, expr: &str) -> Self {
		self
			.assignments
			.push((column.to_string(), ValueExpr::Raw(expr.to_string())));
		self
	}

	/// Require `column = ?`, binding `value`.
	pub fn where_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
		self.conditions.eq(column, value.into());
		self
	}

	/// Require `column IS NULL`. Binds no argument.
	pub fn where_null(mut self, column: &str) -> Self {
		self.conditions.null(column);
		self
	}

	pub fn build(self) -> Result<SqlStatement, ComposeError> {
		if self.assignments.is_empty() {
			return Err(ComposeError::EmptyUpdate);
		}

		let mut args = Vec::new();
		let assignments: Vec<String> = self
			.assignments
			.iter()
			.map(|(column, value)| match value {
				ValueExpr::Bound(value) => {
					args.push(value.clone());
					format!("{column} = ?")
				}
				ValueExpr::Raw(expr) => format!("{column} = {expr}"),
			})
			.collect();

		let mut statement = format!("UPDATE {} SET {}", self.table, assignments.join(", "));

		if !self.conditions.is_empty() {
			statement.push_str(" WHERE ");
			statement.push_str(&self.conditions.render(&mut args));
		}

		Ok(SqlStatement { statement, args })
	}
}
