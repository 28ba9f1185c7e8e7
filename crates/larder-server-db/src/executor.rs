// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Statement execution seam between the repository and the driver.
//!
//! Repositories compose [`SqlStatement`](crate::query::SqlStatement)s and hand
//! the text and arguments to a [`QueryExecutor`]. Production code runs against
//! [`PoolExecutor`]; tests script a
//! [`MockExecutor`](crate::testing::MockExecutor) instead.

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::Row;

use crate::value::{SqlRow, SqlValue};

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
	pub rows_affected: u64,
	pub last_insert_id: u64,
}

/// Executes parameterized statements against a MariaDB-compatible server.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
	/// Fetch exactly one row. Zero rows yield [`sqlx::Error::RowNotFound`].
	async fn fetch_one(&self, statement: &str, args: &[SqlValue]) -> Result<SqlRow, sqlx::Error>;

	/// Fetch every matching row.
	async fn fetch_all(
		&self,
		statement: &str,
		args: &[SqlValue],
	) -> Result<Vec<SqlRow>, sqlx::Error>;

	/// Fetch the first column of the first row as an unsigned integer.
	async fn fetch_scalar(&self, statement: &str, args: &[SqlValue]) -> Result<u64, sqlx::Error>;

	/// Run a statement that returns no rows.
	async fn execute(&self, statement: &str, args: &[SqlValue])
		-> Result<ExecResult, sqlx::Error>;
}

/// [`QueryExecutor`] backed by a [`MySqlPool`].
#[derive(Clone)]
pub struct PoolExecutor {
	pool: MySqlPool,
}

impl PoolExecutor {
	pub fn new(pool: MySqlPool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl QueryExecutor for PoolExecutor {
	async fn fetch_one(&self, statement: &str, args: &[SqlValue]) -> Result<SqlRow, sqlx::Error> {
		let row = bind_args(statement, args).fetch_one(&self.pool).await?;
		row_from_mysql(&row)
	}

	async fn fetch_all(
		&self,
		statement: &str,
		args: &[SqlValue],
	) -> Result<Vec<SqlRow>, sqlx::Error> {
		let rows = bind_args(statement, args).fetch_all(&self.pool).await?;
		rows.iter().map(row_from_mysql).collect()
	}

	async fn fetch_scalar(&self, statement: &str, args: &[SqlValue]) -> Result<u64, sqlx::Error> {
		let row = bind_args(statement, args).fetch_one(&self.pool).await?;
		match row.try_get::<u64, _>(0) {
			Ok(value) => Ok(value),
			// COUNT() reports a signed aggregate even over unsigned columns.
			Err(sqlx::Error::ColumnDecode { .. }) => {
				let value: i64 = row.try_get(0)?;
				Ok(value as u64)
			}
			Err(error) => Err(error),
		}
	}

	async fn execute(
		&self,
		statement: &str,
		args: &[SqlValue],
	) -> Result<ExecResult, sqlx::Error> {
		let result = bind_args(statement, args).execute(&self.pool).await?;
		Ok(ExecResult {
			rows_affected: result.rows_affected(),
			last_insert_id: result.last_insert_id(),
		})
	}
}

fn bind_args<'q>(
	statement: &'q str,
	args: &'q [SqlValue],
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
	let mut query = sqlx::query(statement);
	for arg in args {
		query = match arg {
			SqlValue::Null => query.bind(None::<u64>),
			SqlValue::UInt(value) => query.bind(*value),
			SqlValue::Text(text) => query.bind(text.as_str()),
		};
	}
	query
}

/// Convert a driver row into the loose [`SqlRow`] representation.
///
/// Each cell is read as an unsigned integer first with a text fallback; NULL
/// decodes to [`SqlValue::Null`] whatever the column type.
fn row_from_mysql(row: &MySqlRow) -> Result<SqlRow, sqlx::Error> {
	let mut cells = Vec::with_capacity(row.len());
	for index in 0..row.len() {
		cells.push(cell_from_row(row, index)?);
	}
	Ok(SqlRow::new(cells))
}

fn cell_from_row(row: &MySqlRow, index: usize) -> Result<SqlValue, sqlx::Error> {
	match row.try_get::<Option<u64>, _>(index) {
		Ok(Some(value)) => Ok(SqlValue::UInt(value)),
		Ok(None) => Ok(SqlValue::Null),
		Err(sqlx::Error::ColumnDecode { .. }) => {
			let text: Option<String> = row.try_get(index)?;
			Ok(text.map_or(SqlValue::Null, SqlValue::Text))
		}
		Err(error) => Err(error),
	}
}
