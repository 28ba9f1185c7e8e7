// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Larder server.
//!
//! This crate persists recipes in MariaDB-compatible databases and exposes
//! them through the typed repository operations behind
//! [`recipes::RecipeStore`]. Statements are composed deterministically with
//! positional `?` placeholders; timestamps are assigned inside the database
//! via `UNIX_TIMESTAMP()`.
//!
//! # Overview
//!
//! The layer provides:
//! - Owner-scoped single reads, counts, and paginated recipe lists
//! - Recipe creation, updates, and soft archiving
//! - Deterministic parameterized SQL composition (`query`)
//! - A narrow execution seam over the driver (`executor`), scriptable in
//!   tests through `testing::MockExecutor`
//! - Connection pool construction for MariaDB (`pool`)
//!
//! # Example
//!
//! ```rust,no_run
//! use larder_server_db::pool::create_pool;
//! use larder_server_db::recipes::RecipeRepository;
//! use larder_server_db::QueryFilter;
//!
//! # tokio_test::block_on(async {
//! let pool = create_pool("mysql://larder@localhost/larder").await.unwrap();
//! let recipes = RecipeRepository::new(pool);
//!
//! let page = recipes.get_recipes(&QueryFilter::default(), 321).await.unwrap();
//! println!("{} of {} recipes", page.recipes.len(), page.total_count);
//! # });
//! ```

pub mod error;
pub mod executor;
pub mod pool;
pub mod query;
pub mod recipes;
pub mod testing;
pub mod value;

pub use error::{DbError, Result};
pub use executor::{ExecResult, PoolExecutor, QueryExecutor};
pub use pool::create_pool;
pub use query::{ComposeError, InsertBuilder, SelectBuilder, SqlStatement, UpdateBuilder};
pub use recipes::{RecipeRepository, RecipeStore};
pub use value::{DecodeError, SqlRow, SqlValue};

pub use larder_core::{QueryFilter, Recipe, RecipeCreationInput, RecipeList, SortOrder};
