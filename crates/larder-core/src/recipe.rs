// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Recipe domain types.

use serde::{Deserialize, Serialize};

/// A stored recipe.
///
/// Timestamps are unix seconds assigned by the database. `updated_on` and
/// `archived_on` stay unset until the recipe is first updated or archived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Recipe {
	pub id: u64,
	pub name: String,
	pub source: String,
	pub description: String,
	/// Recipe this one was adapted from, if any.
	pub inspired_by_recipe_id: Option<u64>,

	pub created_on: u64,
	pub updated_on: Option<u64>,
	pub archived_on: Option<u64>,

	/// Owning user.
	pub belongs_to: u64,
}

/// Caller-supplied fields for creating a recipe.
///
/// The id and timestamps are assigned by the database during creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeCreationInput {
	pub name: String,
	pub source: String,
	pub description: String,
	pub inspired_by_recipe_id: Option<u64>,
	pub belongs_to: u64,
}

/// One page of recipes together with pagination bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeList {
	pub page: u64,
	pub limit: u64,
	/// Total live recipes in the store, not the size of this page.
	pub total_count: u64,
	pub recipes: Vec<Recipe>,
}
