//! # Meal Planner Core
//!
//! A household meal-planning and shopping-list library. Recipes are assigned
//! to days of a week plan, and a shopping list is derived from the week's
//! recipes: deduplicated, quantity-aggregated, and ordered by store-specific
//! aisle order. A shuffle operation fills a week with random recipes while
//! avoiding consecutive repeats of the same meal type.
//!
//! The crate operates on in-memory collections held by a [`planner::Planner`];
//! persistence, rendering, and authentication belong to the host application.

pub mod error;
pub mod model;
pub mod planner;
pub mod presenter;
pub mod quantity;
pub mod reconcile;
pub mod shuffle;
