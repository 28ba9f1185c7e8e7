// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loosely typed SQL values and result rows.
//!
//! [`SqlValue`] travels in both directions: as a bind argument attached to a
//! composed statement and as a cell inside a fetched [`SqlRow`]. The row's
//! positional accessors are the scanner contract the recipe decoders are
//! written against.

/// A single SQL value, either bound to a placeholder or read from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
	Null,
	UInt(u64),
	Text(String),
}

impl SqlValue {
	fn type_name(&self) -> &'static str {
		match self {
			SqlValue::Null => "NULL",
			SqlValue::UInt(_) => "unsigned integer",
			SqlValue::Text(_) => "text",
		}
	}
}

impl From<u64> for SqlValue {
	fn from(value: u64) -> Self {
		SqlValue::UInt(value)
	}
}

impl From<Option<u64>> for SqlValue {
	fn from(value: Option<u64>) -> Self {
		match value {
			Some(value) => SqlValue::UInt(value),
			None => SqlValue::Null,
		}
	}
}

impl From<&str> for SqlValue {
	fn from(value: &str) -> Self {
		SqlValue::Text(value.to_string())
	}
}

impl From<String> for SqlValue {
	fn from(value: String) -> Self {
		SqlValue::Text(value)
	}
}

/// Failure while reading typed values out of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
	#[error("expected {expected} columns, row has {actual}")]
	ColumnCount { expected: usize, actual: usize },

	#[error("column {index} is unexpectedly NULL")]
	UnexpectedNull { index: usize },

	#[error("column {index} holds {actual}, expected {expected}")]
	TypeMismatch {
		index: usize,
		expected: &'static str,
		actual: &'static str,
	},
}

/// One result row, cells in the statement's column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlRow {
	cells: Vec<SqlValue>,
}

impl SqlRow {
	pub fn new(cells: Vec<SqlValue>) -> Self {
		Self { cells }
	}

	pub fn len(&self) -> usize {
		self.cells.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}

	/// Fail unless the row carries exactly `expected` columns.
	pub fn expect_columns(&self, expected: usize) -> Result<(), DecodeError> {
		if self.cells.len() != expected {
			return Err(DecodeError::ColumnCount {
				expected,
				actual: self.cells.len(),
			});
		}
		Ok(())
	}

	/// Read a non-nullable unsigned integer column.
	pub fn uint(&self, index: usize) -> Result<u64, DecodeError> {
		match self.cell(index)? {
			SqlValue::UInt(value) => Ok(*value),
			SqlValue::Null => Err(DecodeError::UnexpectedNull { index }),
			other => Err(DecodeError::TypeMismatch {
				index,
				expected: "unsigned integer",
				actual: other.type_name(),
			}),
		}
	}

	/// Read a nullable unsigned integer column.
	pub fn opt_uint(&self, index: usize) -> Result<Option<u64>, DecodeError> {
		match self.cell(index)? {
			SqlValue::Null => Ok(None),
			SqlValue::UInt(value) => Ok(Some(*value)),
			other => Err(DecodeError::TypeMismatch {
				index,
				expected: "unsigned integer",
				actual: other.type_name(),
			}),
		}
	}

	/// Read a non-nullable text column.
	pub fn text(&self, index: usize) -> Result<String, DecodeError> {
		match self.cell(index)? {
			SqlValue::Text(value) => Ok(value.clone()),
			SqlValue::Null => Err(DecodeError::UnexpectedNull { index }),
			other => Err(DecodeError::TypeMismatch {
				index,
				expected: "text",
				actual: other.type_name(),
			}),
		}
	}

	fn cell(&self, index: usize) -> Result<&SqlValue, DecodeError> {
		self.cells.get(index).ok_or(DecodeError::ColumnCount {
			expected: index + 1,
			actual: self.cells.len(),
		})
	}
}
