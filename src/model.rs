//! # Domain Records
//!
//! Plain data records for the meal-planning core: the ingredient catalog,
//! stores and their aisle orderings, recipes, week plans, and shopping lists.
//! These are in-memory records, not persistence schemas; foreign keys are
//! plain `i64` ids resolved through [`crate::planner::Planner`].
//!
//! ## Core Concepts
//!
//! - **Week plan**: a 7-day schedule with at most one primary and one
//!   supplementary meal per day.
//! - **Pantry staple**: an ingredient assumed to be on hand; flagged on
//!   shopping lists for verification rather than purchase.
//! - **Stale list**: a shopping list whose linked week plan has been modified
//!   since the list was last generated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Categorises recipes by their primary base (used for shuffle diversity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealType {
    pub id: i64,
    /// Unique display name, e.g. "Pasta", "Rice"
    pub name: String,
}

/// Intrinsic category for ingredients (what type of product it is)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCategory {
    pub id: i64,
    /// Unique display name, e.g. "Produce", "Dairy"
    pub name: String,
}

/// A supermarket with its own aisle ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    /// At most one store is the default system-wide; see
    /// [`crate::planner::Planner::set_default_store`]
    pub is_default: bool,
}

/// Display rank of a shopping category within one store
///
/// Categories absent from a store's mapping rank last (sentinel order
/// [`crate::presenter::UNRANKED`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCategoryOrder {
    pub store_id: i64,
    pub category_id: i64,
    pub sort_order: u32,
}

/// A distinct ingredient that can be used in recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    /// Unique name, e.g. "Eggs"
    pub name: String,
    pub category_id: i64,
    /// If true, flagged on shopping lists for verification
    pub is_pantry_staple: bool,
    /// Informational only, e.g. "g", "ml", "medium", "tin"
    pub default_unit: String,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub ingredient_id: i64,
    /// Free text, e.g. "2", "400g", "a handful"
    pub quantity: String,
}

/// A meal recipe with its ingredient lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub meal_type_id: i64,
    /// Hidden from the shuffler's catalog when true
    pub is_archived: bool,
    /// Unique per ingredient within a recipe
    pub ingredients: Vec<RecipeIngredient>,
}

/// A meal plan for a specific week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub id: i64,
    pub start_date: NaiveDate,
    /// Bumped whenever the plan or any of its recipes' ingredient lists
    /// change; this is the staleness signal for derived shopping lists
    pub modified_at: DateTime<Utc>,
}

/// A single meal assigned to a day within a week plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub id: i64,
    pub week_plan_id: i64,
    /// 0 = start_date, 1 = start_date + 1 day, etc.
    pub day_offset: u8,
    /// May be empty when the day carries only a free-text note
    pub recipe_id: Option<i64>,
    /// e.g. "Eating out", "Leftovers"
    pub note: String,
    /// True for supplementary meals (e.g. kids' meals)
    pub is_supplementary: bool,
    /// The shuffler never deletes or reassigns a pinned meal
    pub is_pinned: bool,
    /// Who a supplementary meal is for, free text
    pub for_people: String,
}

/// A shopping list generated from a week plan (or ad-hoc)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    /// Null for ad-hoc lists with no backing plan
    pub week_plan_id: Option<i64>,
    pub store_id: Option<i64>,
    /// When this list was last generated from its week plan
    pub generated_at: Option<DateTime<Utc>>,
    /// At most one list is active system-wide; see
    /// [`crate::planner::Planner::activate_list`]
    pub is_active: bool,
}

impl ShoppingList {
    /// Whether the list is out of date with respect to its week plan.
    ///
    /// True iff the list is linked to `plan`, has been generated at least
    /// once, and the plan was modified after that generation. Reconciling
    /// always resets this by bumping `generated_at`.
    pub fn is_stale(&self, plan: &WeekPlan) -> bool {
        match (self.week_plan_id, self.generated_at) {
            (Some(plan_id), Some(generated_at)) => {
                plan_id == plan.id && plan.modified_at > generated_at
            }
            _ => false,
        }
    }
}

/// An item on a shopping list
///
/// Ingredient identity is the reconciliation key: at most one item per
/// (list, ingredient) when `ingredient_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: i64,
    pub shopping_list_id: i64,
    /// Null for free-text manual items
    pub ingredient_id: Option<i64>,
    pub name: String,
    pub category_id: Option<i64>,
    /// Aggregated display string, e.g. "600g" or "400g + 1 tin"
    pub quantities: String,
    pub is_checked: bool,
    /// Manually added item (never deleted by reconciliation)
    pub is_manual: bool,
    /// Item is a pantry staple (included for verification)
    pub is_pantry_item: bool,
    /// Keep the user's pantry flag even when the catalog disagrees
    pub is_pantry_override: bool,
    pub is_starred: bool,
}
