// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Larder recipe platform.
//!
//! This crate provides the shared domain types for recipes and list-query
//! pagination. It is consumed by the database layer (`larder-server-db`) and
//! by any API surface that serializes these types.
//!
//! # Overview
//!
//! The recipe model supports:
//! - Database-assigned ids and unix-second timestamps
//! - Soft deletion via an `archived_on` marker
//! - Provenance links between recipes (`inspired_by_recipe_id`)
//! - Paginated list results with 1-based page numbers
//!
//! # Example
//!
//! ```
//! use larder_core::{QueryFilter, RecipeCreationInput};
//!
//! let input = RecipeCreationInput {
//!     name: "coq au vin".to_string(),
//!     source: "grandmother's notebook".to_string(),
//!     belongs_to: 1,
//!     ..RecipeCreationInput::default()
//! };
//! assert!(input.inspired_by_recipe_id.is_none());
//!
//! // List queries default to the first page of twenty results.
//! let filter = QueryFilter::default();
//! assert_eq!(filter.page, 1);
//! assert_eq!(filter.query_offset(), 0);
//! ```

pub mod filter;
pub mod recipe;

pub use filter::{QueryFilter, SortOrder, DEFAULT_LIMIT};
pub use recipe::{Recipe, RecipeCreationInput, RecipeList};
