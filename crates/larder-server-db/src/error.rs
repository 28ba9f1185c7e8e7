// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::value::DecodeError;

/// Errors surfaced by the recipe database layer.
///
/// The `Sqlx` and `Decode` variants are transparent passthroughs: single-row
/// reads return the driver's `RowNotFound` sentinel and per-slot decode
/// failures unchanged so callers can match on them directly. The remaining
/// variants add the operation context the list and create paths attach.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Decode error: {0}")]
	Decode(#[from] DecodeError),

	#[error("querying database for recipes: {0}")]
	Query(#[source] sqlx::Error),

	#[error("scanning response from database: {0}")]
	Scan(#[source] DecodeError),

	#[error("fetching recipe count: {0}")]
	Count(#[source] Box<DbError>),

	#[error("executing recipe creation query: {0}")]
	Create(#[source] sqlx::Error),
}

impl DbError {
	/// True when the driver reported zero rows for a single-row read.
	pub fn is_not_found(&self) -> bool {
		matches!(self, DbError::Sqlx(sqlx::Error::RowNotFound))
	}
}

pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_is_not_found_matches_row_not_found_only() {
		assert!(DbError::from(sqlx::Error::RowNotFound).is_not_found());

		let other = DbError::from(sqlx::Error::Protocol("boom".to_string()));
		assert!(!other.is_not_found());

		let wrapped = DbError::Query(sqlx::Error::RowNotFound);
		assert!(!wrapped.is_not_found());
	}

	#[test]
	fn test_wrapped_errors_preserve_source() {
		use std::error::Error as _;

		let error = DbError::Create(sqlx::Error::Protocol("boom".to_string()));
		assert!(error.to_string().starts_with("executing recipe creation query"));
		assert!(error.source().is_some());

		let count = DbError::Count(Box::new(DbError::from(sqlx::Error::RowNotFound)));
		assert!(count.to_string().starts_with("fetching recipe count"));
		assert!(count.source().unwrap().to_string().contains("no rows"));
	}
}
