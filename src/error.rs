//! # Planner Error Types
//!
//! Error types for planner operations. Every fallible operation surfaces a
//! distinguishable invalid-reference failure; empty catalogs, all-pinned
//! weeks, and unparseable quantity text are valid states, not errors.

/// Errors raised by planner operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// A store id did not resolve to a record
    StoreNotFound(i64),
    /// A shopping category id did not resolve to a record
    CategoryNotFound(i64),
    /// An ingredient id did not resolve to a record
    IngredientNotFound(i64),
    /// A meal type id did not resolve to a record
    MealTypeNotFound(i64),
    /// A recipe id did not resolve to a record
    RecipeNotFound(i64),
    /// A week plan id did not resolve to a record
    PlanNotFound(i64),
    /// A planned meal id did not resolve to a record
    MealNotFound(i64),
    /// A shopping list id did not resolve to a record
    ListNotFound(i64),
    /// A shopping list item id did not resolve to a record
    ItemNotFound(i64),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::StoreNotFound(id) => write!(f, "store not found: {id}"),
            PlannerError::CategoryNotFound(id) => write!(f, "shopping category not found: {id}"),
            PlannerError::IngredientNotFound(id) => write!(f, "ingredient not found: {id}"),
            PlannerError::MealTypeNotFound(id) => write!(f, "meal type not found: {id}"),
            PlannerError::RecipeNotFound(id) => write!(f, "recipe not found: {id}"),
            PlannerError::PlanNotFound(id) => write!(f, "week plan not found: {id}"),
            PlannerError::MealNotFound(id) => write!(f, "planned meal not found: {id}"),
            PlannerError::ListNotFound(id) => write!(f, "shopping list not found: {id}"),
            PlannerError::ItemNotFound(id) => write!(f, "shopping list item not found: {id}"),
        }
    }
}

impl std::error::Error for PlannerError {}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, PlannerError>;
