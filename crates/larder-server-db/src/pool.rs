// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::mysql::{MySqlConnectOptions, MySqlPool};
use std::str::FromStr;

use crate::error::DbError;

/// Create a MySqlPool with the settings the recipe tables expect.
///
/// # Arguments
/// * `database_url` - MariaDB connection string (e.g., "mysql://larder@localhost/larder")
///
/// # Errors
/// Returns `DbError::Sqlx` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<MySqlPool, DbError> {
	let options = MySqlConnectOptions::from_str(database_url)?.charset("utf8mb4");

	let pool = MySqlPool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}
