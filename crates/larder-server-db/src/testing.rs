// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scripted test doubles for the executor seam.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use larder_core::Recipe;

use crate::executor::{ExecResult, QueryExecutor};
use crate::value::{SqlRow, SqlValue};

enum Expectation {
	FetchOne {
		statement: String,
		args: Vec<SqlValue>,
		result: Result<SqlRow, sqlx::Error>,
	},
	FetchAll {
		statement: String,
		args: Vec<SqlValue>,
		result: Result<Vec<SqlRow>, sqlx::Error>,
	},
	FetchScalar {
		statement: String,
		args: Vec<SqlValue>,
		result: Result<u64, sqlx::Error>,
	},
	Execute {
		statement: String,
		args: Vec<SqlValue>,
		result: Result<ExecResult, sqlx::Error>,
	},
}

impl Expectation {
	fn kind(&self) -> &'static str {
		match self {
			Expectation::FetchOne { .. } => "fetch_one",
			Expectation::FetchAll { .. } => "fetch_all",
			Expectation::FetchScalar { .. } => "fetch_scalar",
			Expectation::Execute { .. } => "execute",
		}
	}
}

/// [`QueryExecutor`] that replays a scripted expectation queue.
///
/// Each expectation pins the exact statement text and bound arguments the
/// code under test must produce, in call order. Any deviation panics, and
/// [`MockExecutor::finish`] panics if scripted calls never happened.
///
/// Clones share the queue, so a test can keep one handle for scripting and
/// hand another to the repository under test.
#[derive(Clone, Default)]
pub struct MockExecutor {
	expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl MockExecutor {
	pub fn expect_fetch_one(
		&self,
		statement: &str,
		args: Vec<SqlValue>,
		result: Result<SqlRow, sqlx::Error>,
	) {
		self.push(Expectation::FetchOne {
			statement: statement.to_string(),
			args,
			result,
		});
	}

	pub fn expect_fetch_all(
		&self,
		statement: &str,
		args: Vec<SqlValue>,
		result: Result<Vec<SqlRow>, sqlx::Error>,
	) {
		self.push(Expectation::FetchAll {
			statement: statement.to_string(),
			args,
			result,
		});
	}

	pub fn expect_fetch_scalar(
		&self,
		statement: &str,
		args: Vec<SqlValue>,
		result: Result<u64, sqlx::Error>,
	) {
		self.push(Expectation::FetchScalar {
			statement: statement.to_string(),
			args,
			result,
		});
	}

	pub fn expect_execute(
		&self,
		statement: &str,
		args: Vec<SqlValue>,
		result: Result<ExecResult, sqlx::Error>,
	) {
		self.push(Expectation::Execute {
			statement: statement.to_string(),
			args,
			result,
		});
	}

	/// Assert every scripted expectation was consumed.
	pub fn finish(&self) {
		let queue = self.expectations.lock().unwrap();
		assert!(
			queue.is_empty(),
			"{} scripted expectation(s) never ran",
			queue.len()
		);
	}

	fn push(&self, expectation: Expectation) {
		self.expectations.lock().unwrap().push_back(expectation);
	}

	fn pop(&self, call: &str, statement: &str) -> Expectation {
		self.expectations
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| panic!("unexpected {call} of {statement:?}: nothing scripted"))
	}
}

#[async_trait]
impl QueryExecutor for MockExecutor {
	async fn fetch_one(&self, statement: &str, args: &[SqlValue]) -> Result<SqlRow, sqlx::Error> {
		match self.pop("fetch_one", statement) {
			Expectation::FetchOne {
				statement: expected,
				args: expected_args,
				result,
			} => {
				assert_eq!(statement, expected, "fetch_one statement mismatch");
				assert_eq!(args, expected_args.as_slice(), "fetch_one argument mismatch");
				result
			}
			other => panic!("scripted {} but fetch_one({statement:?}) ran", other.kind()),
		}
	}

	async fn fetch_all(
		&self,
		statement: &str,
		args: &[SqlValue],
	) -> Result<Vec<SqlRow>, sqlx::Error> {
		match self.pop("fetch_all", statement) {
			Expectation::FetchAll {
				statement: expected,
				args: expected_args,
				result,
			} => {
				assert_eq!(statement, expected, "fetch_all statement mismatch");
				assert_eq!(args, expected_args.as_slice(), "fetch_all argument mismatch");
				result
			}
			other => panic!("scripted {} but fetch_all({statement:?}) ran", other.kind()),
		}
	}

	async fn fetch_scalar(&self, statement: &str, args: &[SqlValue]) -> Result<u64, sqlx::Error> {
		match self.pop("fetch_scalar", statement) {
			Expectation::FetchScalar {
				statement: expected,
				args: expected_args,
				result,
			} => {
				assert_eq!(statement, expected, "fetch_scalar statement mismatch");
				assert_eq!(
					args,
					expected_args.as_slice(),
					"fetch_scalar argument mismatch"
				);
				result
			}
			other => panic!(
				"scripted {} but fetch_scalar({statement:?}) ran",
				other.kind()
			),
		}
	}

	async fn execute(
		&self,
		statement: &str,
		args: &[SqlValue],
	) -> Result<ExecResult, sqlx::Error> {
		match self.pop("execute", statement) {
			Expectation::Execute {
				statement: expected,
				args: expected_args,
				result,
			} => {
				assert_eq!(statement, expected, "execute statement mismatch");
				assert_eq!(args, expected_args.as_slice(), "execute argument mismatch");
				result
			}
			other => panic!("scripted {} but execute({statement:?}) ran", other.kind()),
		}
	}
}

/// Driver row for a recipe select, cells in canonical column order.
pub fn recipe_row(recipe: &Recipe) -> SqlRow {
	SqlRow::new(vec![
		SqlValue::UInt(recipe.id),
		SqlValue::Text(recipe.name.clone()),
		SqlValue::Text(recipe.source.clone()),
		SqlValue::Text(recipe.description.clone()),
		recipe.inspired_by_recipe_id.into(),
		SqlValue::UInt(recipe.created_on),
		recipe.updated_on.into(),
		recipe.archived_on.into(),
		SqlValue::UInt(recipe.belongs_to),
	])
}

/// Recipe row with cells rotated out of canonical order.
///
/// Decoding a live recipe from this row fails on the leading NULL, which is
/// how tests prove the decoders reject misordered result sets.
pub fn misordered_recipe_row(recipe: &Recipe) -> SqlRow {
	SqlRow::new(vec![
		recipe.archived_on.into(),
		SqlValue::Text(recipe.name.clone()),
		SqlValue::Text(recipe.source.clone()),
		SqlValue::Text(recipe.description.clone()),
		recipe.inspired_by_recipe_id.into(),
		SqlValue::UInt(recipe.created_on),
		recipe.updated_on.into(),
		SqlValue::UInt(recipe.belongs_to),
		SqlValue::UInt(recipe.id),
	])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_recipe_row_matches_canonical_order() {
		let recipe = Recipe {
			id: 123,
			inspired_by_recipe_id: Some(9),
			created_on: 1_603_900_000,
			belongs_to: 321,
			..Recipe::default()
		};

		let row = recipe_row(&recipe);
		assert_eq!(row.len(), 9);
		assert_eq!(row.uint(0).unwrap(), 123);
		assert_eq!(row.opt_uint(4).unwrap(), Some(9));
		assert_eq!(row.uint(5).unwrap(), 1_603_900_000);
		assert_eq!(row.uint(8).unwrap(), 321);
	}

	#[tokio::test]
	#[should_panic(expected = "nothing scripted")]
	async fn test_unscripted_call_panics() {
		let mock = MockExecutor::default();
		let _ = mock.fetch_scalar("SELECT 1", &[]).await;
	}

	#[test]
	#[should_panic(expected = "never ran")]
	fn test_finish_flags_unconsumed_expectations() {
		let mock = MockExecutor::default();
		mock.expect_fetch_scalar("SELECT 1", vec![], Ok(1));
		mock.finish();
	}
}
