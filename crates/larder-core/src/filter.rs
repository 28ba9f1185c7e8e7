// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! List query pagination and filtering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size applied when a caller does not specify a limit.
pub const DEFAULT_LIMIT: u64 = 20;

/// Direction applied to time-ordered list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum SortOrder {
	#[serde(rename = "asc")]
	Ascending,
	#[serde(rename = "desc")]
	Descending,
}

impl SortOrder {
	/// SQL keyword for this direction.
	pub fn as_sql(&self) -> &'static str {
		match self {
			Self::Ascending => "ASC",
			Self::Descending => "DESC",
		}
	}
}

impl fmt::Display for SortOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ascending => write!(f, "asc"),
			Self::Descending => write!(f, "desc"),
		}
	}
}

impl FromStr for SortOrder {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"asc" => Ok(Self::Ascending),
			"desc" => Ok(Self::Descending),
			_ => Err(format!("unknown sort order: {}", s)),
		}
	}
}

/// Caller-supplied pagination and filtering for list queries.
///
/// Page numbers are 1-based. A missing page or limit falls back to the first
/// page of [`DEFAULT_LIMIT`] results. The timestamp windows are unix seconds
/// and are applied as exclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QueryFilter {
	#[serde(default = "default_page")]
	pub page: u64,
	#[serde(default = "default_limit")]
	pub limit: u64,

	pub created_after: Option<u64>,
	pub created_before: Option<u64>,
	pub updated_after: Option<u64>,
	pub updated_before: Option<u64>,

	pub sort_by: Option<SortOrder>,
}

fn default_page() -> u64 {
	1
}

fn default_limit() -> u64 {
	DEFAULT_LIMIT
}

impl Default for QueryFilter {
	fn default() -> Self {
		Self {
			page: default_page(),
			limit: default_limit(),
			created_after: None,
			created_before: None,
			updated_after: None,
			updated_before: None,
			sort_by: None,
		}
	}
}

impl QueryFilter {
	/// Number of rows skipped before this page begins.
	///
	/// Page zero is treated the same as page one so the subtraction can
	/// never underflow.
	pub fn query_offset(&self) -> u64 {
		if self.page == 0 {
			return 0;
		}
		self.limit * (self.page - 1)
	}
}
