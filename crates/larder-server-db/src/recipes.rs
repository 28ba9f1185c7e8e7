// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Recipe repository for database operations.
//!
//! This module provides database access for recipe management including:
//! - Owner-scoped single-recipe reads
//! - Live-recipe counts (per-user and table-wide)
//! - Paginated and unpaged list reads
//! - Recipe creation with database-stamped timestamps
//! - Updates and soft archiving

use std::sync::OnceLock;

use async_trait::async_trait;
use larder_core::{QueryFilter, Recipe, RecipeCreationInput, RecipeList};
use sqlx::mysql::MySqlPool;

use crate::error::DbError;
use crate::executor::{PoolExecutor, QueryExecutor};
use crate::query::{ComposeError, InsertBuilder, SelectBuilder, SqlStatement, UpdateBuilder};
use crate::value::{DecodeError, SqlRow};

const RECIPES_TABLE: &str = "recipes";

/// Result columns for recipe selects, in canonical order.
///
/// The decoder binds row cells positionally, so selects must request exactly
/// these columns in exactly this order.
const RECIPES_TABLE_COLUMNS: [&str; 9] = [
	"id",
	"name",
	"source",
	"description",
	"inspired_by_recipe_id",
	"created_on",
	"updated_on",
	"archived_on",
	"belongs_to",
];

/// Expression the database evaluates to the current unix time.
const CURRENT_UNIX_TIME_QUERY: &str = "UNIX_TIMESTAMP()";

const COUNT_COLUMN: &str = "COUNT(id)";

/// Statement text for the table-wide live count, built at most once per
/// process.
static ALL_RECIPES_COUNT_QUERY: OnceLock<String> = OnceLock::new();

#[async_trait]
pub trait RecipeStore: Send + Sync {
	async fn get_recipe(&self, recipe_id: u64, user_id: u64) -> Result<Recipe, DbError>;
	async fn get_recipe_count(&self, filter: &QueryFilter, user_id: u64) -> Result<u64, DbError>;
	async fn get_all_recipes_count(&self) -> Result<u64, DbError>;
	async fn get_recipes(&self, filter: &QueryFilter, user_id: u64)
		-> Result<RecipeList, DbError>;
	async fn get_all_recipes_for_user(&self, user_id: u64) -> Result<Vec<Recipe>, DbError>;
	async fn create_recipe(&self, input: &RecipeCreationInput) -> Result<Recipe, DbError>;
	async fn update_recipe(&self, recipe: &Recipe) -> Result<(), DbError>;
	async fn archive_recipe(&self, recipe_id: u64, user_id: u64) -> Result<(), DbError>;
}

/// Repository for recipe database operations.
///
/// Statements are composed deterministically and handed to the contained
/// [`QueryExecutor`]; production code backs it with a connection pool.
#[derive(Clone)]
pub struct RecipeRepository<E = PoolExecutor> {
	executor: E,
}

impl RecipeRepository<PoolExecutor> {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - MariaDB connection pool
	pub fn new(pool: MySqlPool) -> Self {
		Self::with_executor(PoolExecutor::new(pool))
	}
}

impl<E: QueryExecutor> RecipeRepository<E> {
	/// Create a repository over a specific executor.
	///
	/// Tests use this to swap in a scripted
	/// [`MockExecutor`](crate::testing::MockExecutor).
	pub fn with_executor(executor: E) -> Self {
		Self { executor }
	}

	// =========================================================================
	// Reads
	// =========================================================================

	fn build_get_recipe_query(&self, recipe_id: u64, user_id: u64) -> SqlStatement {
		let query = SelectBuilder::new(RECIPES_TABLE)
			.columns(RECIPES_TABLE_COLUMNS)
			.where_eq("belongs_to", user_id)
			.where_eq("id", recipe_id)
			.build();

		self.finish_statement(query)
	}

	/// Fetch a single recipe scoped to its owner.
	///
	/// # Arguments
	/// * `recipe_id` - The recipe's row ID
	/// * `user_id` - The owning user's row ID
	///
	/// # Errors
	/// When no recipe matches, the driver's no-rows sentinel passes through
	/// untouched; check with [`DbError::is_not_found`].
	#[tracing::instrument(skip(self), fields(recipe_id = %recipe_id, user_id = %user_id))]
	pub async fn get_recipe(&self, recipe_id: u64, user_id: u64) -> Result<Recipe, DbError> {
		let query = self.build_get_recipe_query(recipe_id, user_id);
		let row = self
			.executor
			.fetch_one(&query.statement, &query.args)
			.await?;

		Ok(self.row_to_recipe(&row)?)
	}

	// =========================================================================
	// Counts
	// =========================================================================

	fn build_get_recipe_count_query(&self, filter: &QueryFilter, user_id: u64) -> SqlStatement {
		let query = SelectBuilder::new(RECIPES_TABLE)
			.column(COUNT_COLUMN)
			.where_null("archived_on")
			.where_eq("belongs_to", user_id)
			.apply_filter(filter)
			.build();

		self.finish_statement(query)
	}

	/// Count a user's live recipes.
	///
	/// # Arguments
	/// * `filter` - Pagination and window constraints to apply
	/// * `user_id` - The owning user's row ID
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_recipe_count(
		&self,
		filter: &QueryFilter,
		user_id: u64,
	) -> Result<u64, DbError> {
		let query = self.build_get_recipe_count_query(filter, user_id);
		Ok(self
			.executor
			.fetch_scalar(&query.statement, &query.args)
			.await?)
	}

	/// Statement text for the unscoped live-recipe count.
	///
	/// Built once per process; every caller observes the same allocation.
	fn all_recipes_count_query(&self) -> &'static str {
		ALL_RECIPES_COUNT_QUERY
			.get_or_init(|| {
				let query = SelectBuilder::new(RECIPES_TABLE)
					.column(COUNT_COLUMN)
					.where_null("archived_on")
					.build();

				self.finish_statement(query).statement
			})
			.as_str()
	}

	/// Count every live recipe in the table, across all users.
	#[tracing::instrument(skip(self))]
	pub async fn get_all_recipes_count(&self) -> Result<u64, DbError> {
		let query = self.all_recipes_count_query();
		Ok(self.executor.fetch_scalar(query, &[]).await?)
	}

	// =========================================================================
	// Lists
	// =========================================================================

	fn build_get_recipes_query(&self, filter: &QueryFilter, user_id: u64) -> SqlStatement {
		let query = SelectBuilder::new(RECIPES_TABLE)
			.columns(RECIPES_TABLE_COLUMNS)
			.where_null("archived_on")
			.where_eq("belongs_to", user_id)
			.apply_filter(filter)
			.build();

		self.finish_statement(query)
	}

	/// Fetch a page of a user's live recipes plus the live total.
	///
	/// # Arguments
	/// * `filter` - Pagination and window constraints to apply
	/// * `user_id` - The owning user's row ID
	///
	/// # Returns
	/// A [`RecipeList`] echoing the filter's page and limit. `total_count`
	/// is the table-wide live count, not the size of the page.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_recipes(
		&self,
		filter: &QueryFilter,
		user_id: u64,
	) -> Result<RecipeList, DbError> {
		let query = self.build_get_recipes_query(filter, user_id);
		let rows = self
			.executor
			.fetch_all(&query.statement, &query.args)
			.await
			.map_err(|error| match error {
				sqlx::Error::RowNotFound => DbError::Sqlx(error),
				other => DbError::Query(other),
			})?;

		let recipes = self.rows_to_recipes(&rows).map_err(DbError::Scan)?;

		let total_count = self
			.get_all_recipes_count()
			.await
			.map_err(|error| DbError::Count(Box::new(error)))?;

		tracing::debug!(user_id = %user_id, count = recipes.len(), "listed recipes");
		Ok(RecipeList {
			page: filter.page,
			limit: filter.limit,
			total_count,
			recipes,
		})
	}

	fn build_get_all_recipes_for_user_query(&self, user_id: u64) -> SqlStatement {
		let query = SelectBuilder::new(RECIPES_TABLE)
			.columns(RECIPES_TABLE_COLUMNS)
			.where_null("archived_on")
			.where_eq("belongs_to", user_id)
			.build();

		self.finish_statement(query)
	}

	/// Fetch every live recipe belonging to a user, unpaged.
	///
	/// # Arguments
	/// * `user_id` - The owning user's row ID
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_all_recipes_for_user(&self, user_id: u64) -> Result<Vec<Recipe>, DbError> {
		let query = self.build_get_all_recipes_for_user_query(user_id);
		let rows = self
			.executor
			.fetch_all(&query.statement, &query.args)
			.await
			.map_err(|error| match error {
				sqlx::Error::RowNotFound => DbError::Sqlx(error),
				other => DbError::Query(other),
			})?;

		let recipes = self.rows_to_recipes(&rows).map_err(DbError::Scan)?;

		tracing::debug!(user_id = %user_id, count = recipes.len(), "listed recipes for user");
		Ok(recipes)
	}

	// =========================================================================
	// Writes
	// =========================================================================

	fn build_create_recipe_query(&self, input: &RecipeCreationInput) -> SqlStatement {
		let query = InsertBuilder::new(RECIPES_TABLE)
			.value("name", input.name.as_str())
			.value("source", input.source.as_str())
			.value("description", input.description.as_str())
			.value("inspired_by_recipe_id", input.inspired_by_recipe_id)
			.value("belongs_to", input.belongs_to)
			.value_expr("created_on", CURRENT_UNIX_TIME_QUERY)
			.build();

		self.finish_statement(query)
	}

	fn build_recipe_creation_time_query(&self, recipe_id: u64) -> SqlStatement {
		let query = SelectBuilder::new(RECIPES_TABLE)
			.column("created_on")
			.where_eq("id", recipe_id)
			.build();

		self.finish_statement(query)
	}

	/// Create a recipe, returning it with server-assigned fields filled in.
	///
	/// The insert stamps `created_on` inside the database. When the driver
	/// reports a usable insert ID the stamped time is read back; a failure
	/// there is logged and the returned `created_on` stays zero.
	///
	/// # Arguments
	/// * `input` - The caller-supplied recipe fields
	///
	/// # Errors
	/// Returns `DbError::Create` if the insert itself fails.
	#[tracing::instrument(skip(self, input), fields(user_id = %input.belongs_to))]
	pub async fn create_recipe(&self, input: &RecipeCreationInput) -> Result<Recipe, DbError> {
		let mut recipe = Recipe {
			name: input.name.clone(),
			source: input.source.clone(),
			description: input.description.clone(),
			inspired_by_recipe_id: input.inspired_by_recipe_id,
			belongs_to: input.belongs_to,
			..Recipe::default()
		};

		let query = self.build_create_recipe_query(input);
		let result = self
			.executor
			.execute(&query.statement, &query.args)
			.await
			.map_err(DbError::Create)?;

		if result.last_insert_id > 0 {
			recipe.id = result.last_insert_id;

			let time_query = self.build_recipe_creation_time_query(recipe.id);
			match self
				.executor
				.fetch_scalar(&time_query.statement, &time_query.args)
				.await
			{
				Ok(created_on) => recipe.created_on = created_on,
				Err(error) => {
					tracing::error!(%error, recipe_id = %recipe.id, "fetching creation time");
				}
			}
		}

		tracing::debug!(recipe_id = %recipe.id, user_id = %input.belongs_to, "recipe created");
		Ok(recipe)
	}

	fn build_update_recipe_query(&self, recipe: &Recipe) -> SqlStatement {
		let query = UpdateBuilder::new(RECIPES_TABLE)
			.set("name", recipe.name.as_str())
			.set("source", recipe.source.as_str())
			.set("description", recipe.description.as_str())
			.set("inspired_by_recipe_id", recipe.inspired_by_recipe_id)
			.set_expr("updated_on", CURRENT_UNIX_TIME_QUERY)
			.where_eq("belongs_to", recipe.belongs_to)
			.where_eq("id", recipe.id)
			.build();

		self.finish_statement(query)
	}

	/// Update a recipe's editable fields, stamping `updated_on` in the
	/// database.
	///
	/// Matching zero rows is not an error.
	///
	/// # Arguments
	/// * `recipe` - The recipe with updated fields
	#[tracing::instrument(skip(self, recipe), fields(recipe_id = %recipe.id, user_id = %recipe.belongs_to))]
	pub async fn update_recipe(&self, recipe: &Recipe) -> Result<(), DbError> {
		let query = self.build_update_recipe_query(recipe);
		self.executor.execute(&query.statement, &query.args).await?;

		tracing::debug!(recipe_id = %recipe.id, "recipe updated");
		Ok(())
	}

	fn build_archive_recipe_query(&self, recipe_id: u64, user_id: u64) -> SqlStatement {
		let query = UpdateBuilder::new(RECIPES_TABLE)
			.set_expr("updated_on", CURRENT_UNIX_TIME_QUERY)
			.set_expr("archived_on", CURRENT_UNIX_TIME_QUERY)
			.where_null("archived_on")
			.where_eq("belongs_to", user_id)
			.where_eq("id", recipe_id)
			.build();

		self.finish_statement(query)
	}

	/// Soft-archive a recipe, stamping both timestamps in the database.
	///
	/// Only live rows match the update, so repeating the call affects zero
	/// rows and still succeeds.
	///
	/// # Arguments
	/// * `recipe_id` - The recipe's row ID
	/// * `user_id` - The owning user's row ID
	#[tracing::instrument(skip(self), fields(recipe_id = %recipe_id, user_id = %user_id))]
	pub async fn archive_recipe(&self, recipe_id: u64, user_id: u64) -> Result<(), DbError> {
		let query = self.build_archive_recipe_query(recipe_id, user_id);
		self.executor.execute(&query.statement, &query.args).await?;

		tracing::debug!(recipe_id = %recipe_id, user_id = %user_id, "recipe archived");
		Ok(())
	}

	// =========================================================================
	// Helpers
	// =========================================================================

	fn row_to_recipe(&self, row: &SqlRow) -> Result<Recipe, DecodeError> {
		row.expect_columns(RECIPES_TABLE_COLUMNS.len())?;

		Ok(Recipe {
			id: row.uint(0)?,
			name: row.text(1)?,
			source: row.text(2)?,
			description: row.text(3)?,
			inspired_by_recipe_id: row.opt_uint(4)?,
			created_on: row.uint(5)?,
			updated_on: row.opt_uint(6)?,
			archived_on: row.opt_uint(7)?,
			belongs_to: row.uint(8)?,
		})
	}

	fn rows_to_recipes(&self, rows: &[SqlRow]) -> Result<Vec<Recipe>, DecodeError> {
		rows.iter().map(|row| self.row_to_recipe(row)).collect()
	}

	/// Swallow a composition failure, substituting an empty statement.
	///
	/// Composition only fails on structurally empty builders, which means a
	/// bug in this module rather than bad caller input. The empty statement
	/// is rejected by the server and surfaces through the usual error paths.
	fn finish_statement(&self, result: Result<SqlStatement, ComposeError>) -> SqlStatement {
		result.unwrap_or_else(|error| {
			tracing::error!(%error, "building query");
			SqlStatement::default()
		})
	}
}

#[async_trait]
impl<E: QueryExecutor> RecipeStore for RecipeRepository<E> {
	async fn get_recipe(&self, recipe_id: u64, user_id: u64) -> Result<Recipe, DbError> {
		self.get_recipe(recipe_id, user_id).await
	}

	async fn get_recipe_count(&self, filter: &QueryFilter, user_id: u64) -> Result<u64, DbError> {
		self.get_recipe_count(filter, user_id).await
	}

	async fn get_all_recipes_count(&self) -> Result<u64, DbError> {
		self.get_all_recipes_count().await
	}

	async fn get_recipes(
		&self,
		filter: &QueryFilter,
		user_id: u64,
	) -> Result<RecipeList, DbError> {
		self.get_recipes(filter, user_id).await
	}

	async fn get_all_recipes_for_user(&self, user_id: u64) -> Result<Vec<Recipe>, DbError> {
		self.get_all_recipes_for_user(user_id).await
	}

	async fn create_recipe(&self, input: &RecipeCreationInput) -> Result<Recipe, DbError> {
		self.create_recipe(input).await
	}

	async fn update_recipe(&self, recipe: &Recipe) -> Result<(), DbError> {
		self.update_recipe(recipe).await
	}

	async fn archive_recipe(&self, recipe_id: u64, user_id: u64) -> Result<(), DbError> {
		self.archive_recipe(recipe_id, user_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::executor::ExecResult;
	use crate::testing::{misordered_recipe_row, recipe_row, MockExecutor};
	use crate::value::SqlValue;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn get_recipe_statement_shape_is_id_independent(
			recipe_id in any::<u64>(),
			user_id in any::<u64>(),
		) {
			let repo = RecipeRepository::with_executor(MockExecutor::default());
			let query = repo.build_get_recipe_query(recipe_id, user_id);

			prop_assert_eq!(
				query.statement,
				"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE belongs_to = ? AND id = ?"
			);
			prop_assert_eq!(
				query.args,
				vec![SqlValue::UInt(user_id), SqlValue::UInt(recipe_id)]
			);
		}

		#[test]
		fn archive_always_binds_user_before_recipe(
			recipe_id in any::<u64>(),
			user_id in any::<u64>(),
		) {
			let repo = RecipeRepository::with_executor(MockExecutor::default());
			let query = repo.build_archive_recipe_query(recipe_id, user_id);

			prop_assert_eq!(
				query.args,
				vec![SqlValue::UInt(user_id), SqlValue::UInt(recipe_id)]
			);
		}

		#[test]
		fn list_and_count_statements_always_scope_live_rows(
			user_id in any::<u64>(),
			page in 0u64..10_000,
			limit in 0u64..10_000,
			created_after in proptest::option::of(any::<u64>()),
			created_before in proptest::option::of(any::<u64>()),
			updated_after in proptest::option::of(any::<u64>()),
			updated_before in proptest::option::of(any::<u64>()),
			descending in proptest::option::of(any::<bool>()),
		) {
			let filter = QueryFilter {
				page,
				limit,
				created_after,
				created_before,
				updated_after,
				updated_before,
				sort_by: descending.map(|descending| {
					if descending {
						larder_core::SortOrder::Descending
					} else {
						larder_core::SortOrder::Ascending
					}
				}),
			};
			let repo = RecipeRepository::with_executor(MockExecutor::default());

			for query in [
				repo.build_get_recipes_query(&filter, user_id),
				repo.build_get_recipe_count_query(&filter, user_id),
			] {
				prop_assert!(query.statement.contains("WHERE archived_on IS NULL AND belongs_to = ?"));
				prop_assert_eq!(query.args.first(), Some(&SqlValue::UInt(user_id)));
			}
		}
	}

	fn make_repo() -> (RecipeRepository<MockExecutor>, MockExecutor) {
		let executor = MockExecutor::default();
		(RecipeRepository::with_executor(executor.clone()), executor)
	}

	fn make_test_recipe() -> Recipe {
		Recipe {
			id: 123,
			name: "name".to_string(),
			source: "source".to_string(),
			description: "description".to_string(),
			inspired_by_recipe_id: None,
			created_on: 1_603_900_000,
			updated_on: None,
			archived_on: None,
			belongs_to: 321,
		}
	}

	fn make_test_input() -> RecipeCreationInput {
		RecipeCreationInput {
			name: "name".to_string(),
			source: "source".to_string(),
			description: "description".to_string(),
			inspired_by_recipe_id: None,
			belongs_to: 321,
		}
	}

	#[test]
	fn test_build_get_recipe_query() {
		let (repo, _) = make_repo();
		let query = repo.build_get_recipe_query(123, 321);

		assert_eq!(
			query.statement,
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE belongs_to = ? AND id = ?"
		);
		assert_eq!(query.args, vec![SqlValue::UInt(321), SqlValue::UInt(123)]);
	}

	#[tokio::test]
	async fn test_get_recipe() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_fetch_one(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE belongs_to = ? AND id = ?",
			vec![SqlValue::UInt(321), SqlValue::UInt(123)],
			Ok(recipe_row(&expected)),
		);

		let actual = repo.get_recipe(123, 321).await.unwrap();
		assert_eq!(actual, expected);
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_recipe_surfaces_no_rows() {
		let (repo, mock) = make_repo();

		mock.expect_fetch_one(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE belongs_to = ? AND id = ?",
			vec![SqlValue::UInt(321), SqlValue::UInt(123)],
			Err(sqlx::Error::RowNotFound),
		);

		let error = repo.get_recipe(123, 321).await.unwrap_err();
		assert!(error.is_not_found());
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_recipe_rejects_misordered_row() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_fetch_one(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE belongs_to = ? AND id = ?",
			vec![SqlValue::UInt(321), SqlValue::UInt(123)],
			Ok(misordered_recipe_row(&expected)),
		);

		let error = repo.get_recipe(123, 321).await.unwrap_err();
		assert!(matches!(
			error,
			DbError::Decode(DecodeError::UnexpectedNull { index: 0 })
		));
		mock.finish();
	}

	#[test]
	fn test_build_get_recipe_count_query() {
		let (repo, _) = make_repo();
		let query = repo.build_get_recipe_count_query(&QueryFilter::default(), 321);

		assert_eq!(
			query.statement,
			"SELECT COUNT(id) FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20"
		);
		assert_eq!(query.args, vec![SqlValue::UInt(321)]);
	}

	#[tokio::test]
	async fn test_get_recipe_count() {
		let (repo, mock) = make_repo();

		mock.expect_fetch_scalar(
			"SELECT COUNT(id) FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20",
			vec![SqlValue::UInt(321)],
			Ok(666),
		);

		let actual = repo
			.get_recipe_count(&QueryFilter::default(), 321)
			.await
			.unwrap();
		assert_eq!(actual, 666);
		mock.finish();
	}

	#[test]
	fn test_all_recipes_count_query_is_memoized() {
		let (repo, _) = make_repo();
		let (other, _) = make_repo();

		let first = repo.all_recipes_count_query();
		let second = other.all_recipes_count_query();

		assert_eq!(
			first,
			"SELECT COUNT(id) FROM recipes WHERE archived_on IS NULL"
		);
		assert_eq!(first.as_ptr(), second.as_ptr());
	}

	#[tokio::test]
	async fn test_get_all_recipes_count() {
		let (repo, mock) = make_repo();

		mock.expect_fetch_scalar(
			"SELECT COUNT(id) FROM recipes WHERE archived_on IS NULL",
			vec![],
			Ok(666),
		);

		let actual = repo.get_all_recipes_count().await.unwrap();
		assert_eq!(actual, 666);
		mock.finish();
	}

	#[test]
	fn test_build_get_recipes_query() {
		let (repo, _) = make_repo();
		let query = repo.build_get_recipes_query(&QueryFilter::default(), 321);

		assert_eq!(
			query.statement,
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20"
		);
		assert_eq!(query.args, vec![SqlValue::UInt(321)]);
	}

	#[tokio::test]
	async fn test_get_recipes() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20",
			vec![SqlValue::UInt(321)],
			Ok(vec![recipe_row(&expected)]),
		);
		mock.expect_fetch_scalar(
			"SELECT COUNT(id) FROM recipes WHERE archived_on IS NULL",
			vec![],
			Ok(666),
		);

		let actual = repo
			.get_recipes(&QueryFilter::default(), 321)
			.await
			.unwrap();
		assert_eq!(
			actual,
			RecipeList {
				page: 1,
				limit: 20,
				total_count: 666,
				recipes: vec![expected],
			}
		);
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_recipes_wraps_list_query_errors() {
		let (repo, mock) = make_repo();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20",
			vec![SqlValue::UInt(321)],
			Err(sqlx::Error::Protocol("blah".into())),
		);

		let error = repo
			.get_recipes(&QueryFilter::default(), 321)
			.await
			.unwrap_err();
		assert!(matches!(error, DbError::Query(_)));
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_recipes_passes_no_rows_through_unwrapped() {
		let (repo, mock) = make_repo();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20",
			vec![SqlValue::UInt(321)],
			Err(sqlx::Error::RowNotFound),
		);

		let error = repo
			.get_recipes(&QueryFilter::default(), 321)
			.await
			.unwrap_err();
		assert!(error.is_not_found());
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_recipes_wraps_scan_errors() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20",
			vec![SqlValue::UInt(321)],
			Ok(vec![misordered_recipe_row(&expected)]),
		);

		let error = repo
			.get_recipes(&QueryFilter::default(), 321)
			.await
			.unwrap_err();
		assert!(matches!(error, DbError::Scan(_)));
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_recipes_wraps_count_errors() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ? LIMIT 20",
			vec![SqlValue::UInt(321)],
			Ok(vec![recipe_row(&expected)]),
		);
		mock.expect_fetch_scalar(
			"SELECT COUNT(id) FROM recipes WHERE archived_on IS NULL",
			vec![],
			Err(sqlx::Error::Protocol("blah".into())),
		);

		let error = repo
			.get_recipes(&QueryFilter::default(), 321)
			.await
			.unwrap_err();
		assert!(matches!(error, DbError::Count(_)));
		mock.finish();
	}

	#[test]
	fn test_build_get_all_recipes_for_user_query() {
		let (repo, _) = make_repo();
		let query = repo.build_get_all_recipes_for_user_query(321);

		assert_eq!(
			query.statement,
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ?"
		);
		assert_eq!(query.args, vec![SqlValue::UInt(321)]);
	}

	#[tokio::test]
	async fn test_get_all_recipes_for_user() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ?",
			vec![SqlValue::UInt(321)],
			Ok(vec![recipe_row(&expected)]),
		);

		let actual = repo.get_all_recipes_for_user(321).await.unwrap();
		assert_eq!(actual, vec![expected]);
		mock.finish();
	}

	#[tokio::test]
	async fn test_get_all_recipes_for_user_passes_no_rows_through_unwrapped() {
		let (repo, mock) = make_repo();

		mock.expect_fetch_all(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE archived_on IS NULL AND belongs_to = ?",
			vec![SqlValue::UInt(321)],
			Err(sqlx::Error::RowNotFound),
		);

		let error = repo.get_all_recipes_for_user(321).await.unwrap_err();
		assert!(error.is_not_found());
		mock.finish();
	}

	#[test]
	fn test_build_create_recipe_query() {
		let (repo, _) = make_repo();
		let query = repo.build_create_recipe_query(&make_test_input());

		assert_eq!(
			query.statement,
			"INSERT INTO recipes (name,source,description,inspired_by_recipe_id,belongs_to,created_on) VALUES (?,?,?,?,?,UNIX_TIMESTAMP())"
		);
		assert_eq!(
			query.args,
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
			]
		);
	}

	#[tokio::test]
	async fn test_create_recipe() {
		let (repo, mock) = make_repo();
		let expected = make_test_recipe();

		mock.expect_execute(
			"INSERT INTO recipes (name,source,description,inspired_by_recipe_id,belongs_to,created_on) VALUES (?,?,?,?,?,UNIX_TIMESTAMP())",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
			],
			Ok(ExecResult {
				rows_affected: 1,
				last_insert_id: 123,
			}),
		);
		mock.expect_fetch_scalar(
			"SELECT created_on FROM recipes WHERE id = ?",
			vec![SqlValue::UInt(123)],
			Ok(expected.created_on),
		);

		let actual = repo.create_recipe(&make_test_input()).await.unwrap();
		assert_eq!(actual, expected);
		mock.finish();
	}

	#[tokio::test]
	async fn test_create_recipe_wraps_insert_errors() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"INSERT INTO recipes (name,source,description,inspired_by_recipe_id,belongs_to,created_on) VALUES (?,?,?,?,?,UNIX_TIMESTAMP())",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
			],
			Err(sqlx::Error::Protocol("blah".into())),
		);

		let error = repo.create_recipe(&make_test_input()).await.unwrap_err();
		assert!(matches!(error, DbError::Create(_)));
		mock.finish();
	}

	#[tokio::test]
	async fn test_create_recipe_tolerates_creation_time_fetch_failure() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"INSERT INTO recipes (name,source,description,inspired_by_recipe_id,belongs_to,created_on) VALUES (?,?,?,?,?,UNIX_TIMESTAMP())",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
			],
			Ok(ExecResult {
				rows_affected: 1,
				last_insert_id: 123,
			}),
		);
		mock.expect_fetch_scalar(
			"SELECT created_on FROM recipes WHERE id = ?",
			vec![SqlValue::UInt(123)],
			Err(sqlx::Error::Protocol("blah".into())),
		);

		let actual = repo.create_recipe(&make_test_input()).await.unwrap();
		assert_eq!(actual.id, 123);
		assert_eq!(actual.created_on, 0);
		mock.finish();
	}

	#[tokio::test]
	async fn test_create_recipe_skips_time_fetch_without_insert_id() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"INSERT INTO recipes (name,source,description,inspired_by_recipe_id,belongs_to,created_on) VALUES (?,?,?,?,?,UNIX_TIMESTAMP())",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
			],
			Ok(ExecResult {
				rows_affected: 1,
				last_insert_id: 0,
			}),
		);

		let actual = repo.create_recipe(&make_test_input()).await.unwrap();
		assert_eq!(actual.id, 0);
		assert_eq!(actual.created_on, 0);
		mock.finish();
	}

	#[tokio::test]
	async fn test_created_recipe_round_trips_through_get() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"INSERT INTO recipes (name,source,description,inspired_by_recipe_id,belongs_to,created_on) VALUES (?,?,?,?,?,UNIX_TIMESTAMP())",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
			],
			Ok(ExecResult {
				rows_affected: 1,
				last_insert_id: 123,
			}),
		);
		mock.expect_fetch_scalar(
			"SELECT created_on FROM recipes WHERE id = ?",
			vec![SqlValue::UInt(123)],
			Ok(1_603_900_000),
		);

		let created = repo.create_recipe(&make_test_input()).await.unwrap();

		mock.expect_fetch_one(
			"SELECT id, name, source, description, inspired_by_recipe_id, created_on, updated_on, archived_on, belongs_to FROM recipes WHERE belongs_to = ? AND id = ?",
			vec![SqlValue::UInt(321), SqlValue::UInt(123)],
			Ok(recipe_row(&created)),
		);

		let fetched = repo.get_recipe(created.id, created.belongs_to).await.unwrap();
		assert_eq!(fetched, created);
		mock.finish();
	}

	#[test]
	fn test_build_update_recipe_query() {
		let (repo, _) = make_repo();
		let query = repo.build_update_recipe_query(&make_test_recipe());

		assert_eq!(
			query.statement,
			"UPDATE recipes SET name = ?, source = ?, description = ?, inspired_by_recipe_id = ?, updated_on = UNIX_TIMESTAMP() WHERE belongs_to = ? AND id = ?"
		);
		assert_eq!(
			query.args,
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
				SqlValue::UInt(123),
			]
		);
	}

	#[tokio::test]
	async fn test_update_recipe() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"UPDATE recipes SET name = ?, source = ?, description = ?, inspired_by_recipe_id = ?, updated_on = UNIX_TIMESTAMP() WHERE belongs_to = ? AND id = ?",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
				SqlValue::UInt(123),
			],
			Ok(ExecResult {
				rows_affected: 1,
				last_insert_id: 0,
			}),
		);

		repo.update_recipe(&make_test_recipe()).await.unwrap();
		mock.finish();
	}

	#[tokio::test]
	async fn test_update_recipe_matching_zero_rows_is_ok() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"UPDATE recipes SET name = ?, source = ?, description = ?, inspired_by_recipe_id = ?, updated_on = UNIX_TIMESTAMP() WHERE belongs_to = ? AND id = ?",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
				SqlValue::UInt(123),
			],
			Ok(ExecResult::default()),
		);

		repo.update_recipe(&make_test_recipe()).await.unwrap();
		mock.finish();
	}

	#[tokio::test]
	async fn test_update_recipe_surfaces_driver_errors_unwrapped() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"UPDATE recipes SET name = ?, source = ?, description = ?, inspired_by_recipe_id = ?, updated_on = UNIX_TIMESTAMP() WHERE belongs_to = ? AND id = ?",
			vec![
				SqlValue::Text("name".to_string()),
				SqlValue::Text("source".to_string()),
				SqlValue::Text("description".to_string()),
				SqlValue::Null,
				SqlValue::UInt(321),
				SqlValue::UInt(123),
			],
			Err(sqlx::Error::Protocol("blah".into())),
		);

		let error = repo.update_recipe(&make_test_recipe()).await.unwrap_err();
		assert!(matches!(error, DbError::Sqlx(_)));
		mock.finish();
	}

	#[test]
	fn test_build_archive_recipe_query() {
		let (repo, _) = make_repo();
		let query = repo.build_archive_recipe_query(123, 321);

		assert_eq!(
			query.statement,
			"UPDATE recipes SET updated_on = UNIX_TIMESTAMP(), archived_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to = ? AND id = ?"
		);
		assert_eq!(query.args, vec![SqlValue::UInt(321), SqlValue::UInt(123)]);
	}

	#[tokio::test]
	async fn test_archive_recipe() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"UPDATE recipes SET updated_on = UNIX_TIMESTAMP(), archived_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to = ? AND id = ?",
			vec![SqlValue::UInt(321), SqlValue::UInt(123)],
			Ok(ExecResult {
				rows_affected: 1,
				last_insert_id: 0,
			}),
		);

		repo.archive_recipe(123, 321).await.unwrap();
		mock.finish();
	}

	#[tokio::test]
	async fn test_archive_recipe_repeat_is_idempotent() {
		let (repo, mock) = make_repo();

		mock.expect_execute(
			"UPDATE recipes SET updated_on = UNIX_TIMESTAMP(), archived_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to = ? AND id = ?",
			vec![SqlValue::UInt(321), SqlValue::UInt(123)],
			Ok(ExecResult::default()),
		);

		repo.archive_recipe(123, 321).await.unwrap();
		mock.finish();
	}
}
