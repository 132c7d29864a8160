//! # Planner Data Store
//!
//! `Planner` holds the in-memory record collections the core operates on:
//! the ingredient catalog, stores and aisle orderings, recipes, week plans,
//! and shopping lists. It plays the role of the backing data store; a host
//! application would map these operations onto its own persistence layer and
//! wrap each core call in a transaction boundary.
//!
//! Two system-wide invariants are enforced as explicit commands rather than
//! hidden save side effects: at most one store is the default
//! ([`Planner::set_default_store`]) and at most one shopping list is active
//! ([`Planner::activate_list`]).

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};

use crate::error::{PlannerError, Result};
use crate::model::{
    Ingredient, MealType, PlannedMeal, Recipe, RecipeIngredient, ShoppingCategory, ShoppingList,
    ShoppingListItem, Store, StoreCategoryOrder, WeekPlan,
};

/// In-memory data store for all planning records
#[derive(Debug, Default)]
pub struct Planner {
    next_id: i64,
    meal_types: Vec<MealType>,
    categories: Vec<ShoppingCategory>,
    stores: Vec<Store>,
    category_orders: Vec<StoreCategoryOrder>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    plans: Vec<WeekPlan>,
    meals: Vec<PlannedMeal>,
    lists: Vec<ShoppingList>,
    items: Vec<ShoppingListItem>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // --- Meal types and categories ---

    pub fn add_meal_type(&mut self, name: &str) -> i64 {
        let id = self.alloc_id();
        self.meal_types.push(MealType {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn meal_types(&self) -> &[MealType] {
        &self.meal_types
    }

    pub fn add_category(&mut self, name: &str) -> i64 {
        let id = self.alloc_id();
        self.categories.push(ShoppingCategory {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn category(&self, id: i64) -> Result<&ShoppingCategory> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or(PlannerError::CategoryNotFound(id))
    }

    // --- Stores ---

    /// Create a store. Making it the default clears the flag on every other
    /// store in the same step.
    pub fn add_store(&mut self, name: &str, is_default: bool) -> i64 {
        let id = self.alloc_id();
        if is_default {
            for store in &mut self.stores {
                store.is_default = false;
            }
        }
        self.stores.push(Store {
            id,
            name: name.to_string(),
            is_default,
        });
        info!("Created store '{name}' with ID {id} (default: {is_default})");
        id
    }

    pub fn store(&self, id: i64) -> Result<&Store> {
        self.stores
            .iter()
            .find(|s| s.id == id)
            .ok_or(PlannerError::StoreNotFound(id))
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    /// The store flagged as default, if any.
    pub fn default_store(&self) -> Option<&Store> {
        self.stores.iter().find(|s| s.is_default)
    }

    /// Make `store_id` the single default store, clearing the flag on all
    /// others.
    pub fn set_default_store(&mut self, store_id: i64) -> Result<()> {
        self.store(store_id)?;
        for store in &mut self.stores {
            store.is_default = store.id == store_id;
        }
        info!("Store {store_id} is now the default");
        Ok(())
    }

    /// Set the display rank of a category within a store (upsert).
    pub fn set_category_order(
        &mut self,
        store_id: i64,
        category_id: i64,
        sort_order: u32,
    ) -> Result<()> {
        self.store(store_id)?;
        self.category(category_id)?;

        match self
            .category_orders
            .iter_mut()
            .find(|o| o.store_id == store_id && o.category_id == category_id)
        {
            Some(existing) => existing.sort_order = sort_order,
            None => self.category_orders.push(StoreCategoryOrder {
                store_id,
                category_id,
                sort_order,
            }),
        }
        Ok(())
    }

    /// Category id to sort order for one store. Empty when the store has no
    /// configured ordering.
    pub fn category_order_map(&self, store_id: i64) -> HashMap<i64, u32> {
        self.category_orders
            .iter()
            .filter(|o| o.store_id == store_id)
            .map(|o| (o.category_id, o.sort_order))
            .collect()
    }

    // --- Ingredients ---

    pub fn add_ingredient(
        &mut self,
        name: &str,
        category_id: i64,
        is_pantry_staple: bool,
        default_unit: &str,
    ) -> Result<i64> {
        self.category(category_id)?;
        let id = self.alloc_id();
        self.ingredients.push(Ingredient {
            id,
            name: name.to_string(),
            category_id,
            is_pantry_staple,
            default_unit: default_unit.to_string(),
        });
        Ok(id)
    }

    pub fn ingredient(&self, id: i64) -> Result<&Ingredient> {
        self.ingredients
            .iter()
            .find(|i| i.id == id)
            .ok_or(PlannerError::IngredientNotFound(id))
    }

    // --- Recipes ---

    pub fn add_recipe(
        &mut self,
        name: &str,
        meal_type_id: i64,
        ingredients: Vec<RecipeIngredient>,
    ) -> Result<i64> {
        if !self.meal_types.iter().any(|t| t.id == meal_type_id) {
            return Err(PlannerError::MealTypeNotFound(meal_type_id));
        }
        for line in &ingredients {
            self.ingredient(line.ingredient_id)?;
        }

        let id = self.alloc_id();
        self.recipes.push(Recipe {
            id,
            name: name.to_string(),
            meal_type_id,
            is_archived: false,
            ingredients,
        });
        info!("Created recipe '{name}' with ID {id}");
        Ok(id)
    }

    pub fn recipe(&self, id: i64) -> Result<&Recipe> {
        self.recipes
            .iter()
            .find(|r| r.id == id)
            .ok_or(PlannerError::RecipeNotFound(id))
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Replace a recipe's ingredient lines. Week plans referencing the
    /// recipe are marked modified, since their derived shopping lists are now
    /// out of date.
    pub fn set_recipe_ingredients(
        &mut self,
        recipe_id: i64,
        ingredients: Vec<RecipeIngredient>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        for line in &ingredients {
            self.ingredient(line.ingredient_id)?;
        }
        let recipe = self
            .recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or(PlannerError::RecipeNotFound(recipe_id))?;
        recipe.ingredients = ingredients;

        let affected: Vec<i64> = self
            .meals
            .iter()
            .filter(|m| m.recipe_id == Some(recipe_id))
            .map(|m| m.week_plan_id)
            .collect();
        for plan in &mut self.plans {
            if affected.contains(&plan.id) {
                plan.modified_at = now;
            }
        }
        debug!("Updated ingredients for recipe {recipe_id}, touched {} plans", affected.len());
        Ok(())
    }

    /// Hide a recipe from the shuffler's catalog.
    pub fn archive_recipe(&mut self, recipe_id: i64) -> Result<()> {
        let recipe = self
            .recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or(PlannerError::RecipeNotFound(recipe_id))?;
        recipe.is_archived = true;
        Ok(())
    }

    // --- Week plans and planned meals ---

    pub fn add_week_plan(&mut self, start_date: NaiveDate, now: DateTime<Utc>) -> i64 {
        let id = self.alloc_id();
        self.plans.push(WeekPlan {
            id,
            start_date,
            modified_at: now,
        });
        info!("Created week plan {id} starting {start_date}");
        id
    }

    pub fn plan(&self, id: i64) -> Result<&WeekPlan> {
        self.plans
            .iter()
            .find(|p| p.id == id)
            .ok_or(PlannerError::PlanNotFound(id))
    }

    pub(crate) fn touch_plan(&mut self, plan_id: i64, now: DateTime<Utc>) -> Result<()> {
        let plan = self
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .ok_or(PlannerError::PlanNotFound(plan_id))?;
        plan.modified_at = now;
        Ok(())
    }

    /// Assign a recipe (or a bare note) to a day slot, replacing whatever the
    /// slot held before. Bumps the plan's modified timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_meal(
        &mut self,
        plan_id: i64,
        day_offset: u8,
        recipe_id: Option<i64>,
        note: &str,
        is_supplementary: bool,
        for_people: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.plan(plan_id)?;
        if let Some(rid) = recipe_id {
            self.recipe(rid)?;
        }

        // One primary and one supplementary meal per day
        self.meals.retain(|m| {
            !(m.week_plan_id == plan_id
                && m.day_offset == day_offset
                && m.is_supplementary == is_supplementary)
        });

        let id = self.alloc_id();
        self.meals.push(PlannedMeal {
            id,
            week_plan_id: plan_id,
            day_offset,
            recipe_id,
            note: note.to_string(),
            is_supplementary,
            is_pinned: false,
            for_people: for_people.to_string(),
        });
        self.touch_plan(plan_id, now)?;
        Ok(id)
    }

    /// Clear a day slot. Bumps the plan's modified timestamp.
    pub fn clear_meal(
        &mut self,
        plan_id: i64,
        day_offset: u8,
        is_supplementary: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.plan(plan_id)?;
        self.meals.retain(|m| {
            !(m.week_plan_id == plan_id
                && m.day_offset == day_offset
                && m.is_supplementary == is_supplementary)
        });
        self.touch_plan(plan_id, now)
    }

    /// Toggle the pin flag on a planned meal; returns the new state.
    pub fn toggle_pin(&mut self, meal_id: i64) -> Result<bool> {
        let meal = self
            .meals
            .iter_mut()
            .find(|m| m.id == meal_id)
            .ok_or(PlannerError::MealNotFound(meal_id))?;
        meal.is_pinned = !meal.is_pinned;
        Ok(meal.is_pinned)
    }

    /// All meals of a plan, primary meals before supplementary within a day.
    pub fn planned_meals_for(&self, plan_id: i64) -> Vec<&PlannedMeal> {
        let mut meals: Vec<&PlannedMeal> = self
            .meals
            .iter()
            .filter(|m| m.week_plan_id == plan_id)
            .collect();
        meals.sort_by_key(|m| (m.day_offset, m.is_supplementary));
        meals
    }

    /// Delete every unpinned primary meal of a plan (supplementary meals are
    /// untouched). Bumps the plan's modified timestamp; returns the number of
    /// meals removed.
    pub fn clear_unpinned_primary_meals(
        &mut self,
        plan_id: i64,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        self.plan(plan_id)?;
        let before = self.meals.len();
        self.meals.retain(|m| {
            !(m.week_plan_id == plan_id && !m.is_supplementary && !m.is_pinned)
        });
        let removed = before - self.meals.len();
        if removed > 0 {
            self.touch_plan(plan_id, now)?;
        }
        Ok(removed)
    }

    pub(crate) fn insert_meal(&mut self, mut meal: PlannedMeal) -> i64 {
        let id = self.alloc_id();
        meal.id = id;
        self.meals.push(meal);
        id
    }

    // --- Shopping lists ---

    /// Create a shopping list. An active list deactivates every other list
    /// in the same step.
    pub fn add_list(
        &mut self,
        name: &str,
        week_plan_id: Option<i64>,
        store_id: Option<i64>,
        is_active: bool,
    ) -> Result<i64> {
        if let Some(pid) = week_plan_id {
            self.plan(pid)?;
        }
        if let Some(sid) = store_id {
            self.store(sid)?;
        }
        if is_active {
            for list in &mut self.lists {
                list.is_active = false;
            }
        }

        let id = self.alloc_id();
        self.lists.push(ShoppingList {
            id,
            name: name.to_string(),
            week_plan_id,
            store_id,
            generated_at: None,
            is_active,
        });
        info!("Created shopping list '{name}' with ID {id}");
        Ok(id)
    }

    /// Make `list_id` the single active list, clearing the flag on all
    /// others.
    pub fn activate_list(&mut self, list_id: i64) -> Result<()> {
        self.list(list_id)?;
        for list in &mut self.lists {
            list.is_active = list.id == list_id;
        }
        Ok(())
    }

    pub fn list(&self, id: i64) -> Result<&ShoppingList> {
        self.lists
            .iter()
            .find(|l| l.id == id)
            .ok_or(PlannerError::ListNotFound(id))
    }

    pub(crate) fn list_mut(&mut self, id: i64) -> Result<&mut ShoppingList> {
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(PlannerError::ListNotFound(id))
    }

    /// The list already linked to a week plan, if one exists.
    pub fn list_for_plan(&self, plan_id: i64) -> Option<&ShoppingList> {
        self.lists.iter().find(|l| l.week_plan_id == Some(plan_id))
    }

    /// Whether a list is out of date with respect to its linked plan.
    pub fn list_is_stale(&self, list_id: i64) -> Result<bool> {
        let list = self.list(list_id)?;
        match list.week_plan_id {
            Some(plan_id) => Ok(list.is_stale(self.plan(plan_id)?)),
            None => Ok(false),
        }
    }

    // --- Shopping list items ---

    /// Add a manual item. When linked to a catalog ingredient the category
    /// comes from the ingredient; otherwise the caller's category is used.
    pub fn add_manual_item(
        &mut self,
        list_id: i64,
        name: &str,
        ingredient_id: Option<i64>,
        category_id: Option<i64>,
        quantities: &str,
    ) -> Result<i64> {
        self.list(list_id)?;
        let category_id = match ingredient_id {
            Some(ing_id) => Some(self.ingredient(ing_id)?.category_id),
            None => {
                if let Some(cid) = category_id {
                    self.category(cid)?;
                }
                category_id
            }
        };

        let id = self.alloc_id();
        self.items.push(ShoppingListItem {
            id,
            shopping_list_id: list_id,
            ingredient_id,
            name: name.to_string(),
            category_id,
            quantities: quantities.to_string(),
            is_checked: false,
            is_manual: true,
            is_pantry_item: false,
            is_pantry_override: false,
            is_starred: false,
        });
        Ok(id)
    }

    pub fn items_for(&self, list_id: i64) -> Vec<&ShoppingListItem> {
        self.items
            .iter()
            .filter(|i| i.shopping_list_id == list_id)
            .collect()
    }

    pub fn item(&self, id: i64) -> Result<&ShoppingListItem> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .ok_or(PlannerError::ItemNotFound(id))
    }

    pub fn toggle_checked(&mut self, item_id: i64) -> Result<bool> {
        let item = self.item_mut(item_id)?;
        item.is_checked = !item.is_checked;
        Ok(item.is_checked)
    }

    pub fn toggle_starred(&mut self, item_id: i64) -> Result<bool> {
        let item = self.item_mut(item_id)?;
        item.is_starred = !item.is_starred;
        Ok(item.is_starred)
    }

    /// Delete every checked item from a list, checked-off manual items
    /// included. Unchecked items are untouched; returns the number removed.
    pub fn clear_checked_items(&mut self, list_id: i64) -> Result<usize> {
        self.list(list_id)?;
        let before = self.items.len();
        self.items
            .retain(|i| !(i.shopping_list_id == list_id && i.is_checked));
        let removed = before - self.items.len();
        info!("Cleared {removed} checked item(s) from list {list_id}");
        Ok(removed)
    }

    /// Change or clear an item's category. A user override: reconciliation
    /// merges quantities without touching the category.
    pub fn set_item_category(&mut self, item_id: i64, category_id: Option<i64>) -> Result<()> {
        if let Some(cid) = category_id {
            self.category(cid)?;
        }
        let item = self.item_mut(item_id)?;
        item.category_id = category_id;
        Ok(())
    }

    /// Pin an item's pantry flag to a user-chosen value. Reconciliation
    /// stops updating the flag from the ingredient catalog.
    pub fn override_pantry_flag(&mut self, item_id: i64, is_pantry: bool) -> Result<()> {
        let item = self.item_mut(item_id)?;
        item.is_pantry_item = is_pantry;
        item.is_pantry_override = true;
        Ok(())
    }

    fn item_mut(&mut self, id: i64) -> Result<&mut ShoppingListItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(PlannerError::ItemNotFound(id))
    }

    pub(crate) fn items_vec_mut(&mut self) -> &mut Vec<ShoppingListItem> {
        &mut self.items
    }

    pub(crate) fn insert_item(&mut self, mut item: ShoppingListItem) -> i64 {
        let id = self.alloc_id();
        item.id = id;
        self.items.push(item);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_only_one_default_store() {
        let mut planner = Planner::new();
        let first = planner.add_store("Aldi", true);
        let second = planner.add_store("Tesco", true);

        assert!(!planner.store(first).unwrap().is_default);
        assert!(planner.store(second).unwrap().is_default);
        assert_eq!(planner.default_store().map(|s| s.id), Some(second));

        planner.set_default_store(first).unwrap();
        assert!(planner.store(first).unwrap().is_default);
        assert!(!planner.store(second).unwrap().is_default);
    }

    #[test]
    fn test_only_one_active_list() {
        let mut planner = Planner::new();
        let first = planner.add_list("A", None, None, true).unwrap();
        let second = planner.add_list("B", None, None, true).unwrap();

        assert!(!planner.list(first).unwrap().is_active);
        assert!(planner.list(second).unwrap().is_active);

        planner.activate_list(first).unwrap();
        assert!(planner.list(first).unwrap().is_active);
        assert!(!planner.list(second).unwrap().is_active);
    }

    #[test]
    fn test_assign_meal_replaces_slot_and_touches_plan() {
        let mut planner = Planner::new();
        let meal_type = planner.add_meal_type("Pasta");
        let recipe1 = planner.add_recipe("Carbonara", meal_type, vec![]).unwrap();
        let recipe2 = planner.add_recipe("Lasagne", meal_type, vec![]).unwrap();
        let plan = planner.add_week_plan(date(), t(1));

        planner
            .assign_meal(plan, 0, Some(recipe1), "", false, "", t(2))
            .unwrap();
        planner
            .assign_meal(plan, 0, Some(recipe2), "", false, "", t(3))
            .unwrap();

        let meals = planner.planned_meals_for(plan);
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].recipe_id, Some(recipe2));
        assert_eq!(planner.plan(plan).unwrap().modified_at, t(3));
    }

    #[test]
    fn test_supplementary_slot_is_independent() {
        let mut planner = Planner::new();
        let meal_type = planner.add_meal_type("Pasta");
        let recipe = planner.add_recipe("Carbonara", meal_type, vec![]).unwrap();
        let plan = planner.add_week_plan(date(), t(1));

        planner
            .assign_meal(plan, 0, Some(recipe), "", false, "", t(2))
            .unwrap();
        planner
            .assign_meal(plan, 0, Some(recipe), "", true, "the kids", t(2))
            .unwrap();

        assert_eq!(planner.planned_meals_for(plan).len(), 2);
    }

    #[test]
    fn test_recipe_ingredient_change_marks_plans_modified() {
        let mut planner = Planner::new();
        let meal_type = planner.add_meal_type("Pasta");
        let category = planner.add_category("Dairy");
        let eggs = planner.add_ingredient("Eggs", category, false, "").unwrap();
        let recipe = planner.add_recipe("Carbonara", meal_type, vec![]).unwrap();
        let plan = planner.add_week_plan(date(), t(1));
        planner
            .assign_meal(plan, 0, Some(recipe), "", false, "", t(2))
            .unwrap();

        planner
            .set_recipe_ingredients(
                recipe,
                vec![RecipeIngredient {
                    ingredient_id: eggs,
                    quantity: "2".to_string(),
                }],
                t(4),
            )
            .unwrap();

        assert_eq!(planner.plan(plan).unwrap().modified_at, t(4));
    }

    #[test]
    fn test_manual_item_inherits_ingredient_category() {
        let mut planner = Planner::new();
        let category = planner.add_category("Dairy");
        let milk = planner.add_ingredient("Milk", category, false, "L").unwrap();
        let list = planner.add_list("Shopping", None, None, true).unwrap();

        let item = planner
            .add_manual_item(list, "Milk", Some(milk), None, "1L")
            .unwrap();

        let item = planner.item(item).unwrap();
        assert!(item.is_manual);
        assert_eq!(item.category_id, Some(category));
    }

    #[test]
    fn test_clear_checked_only_removes_checked_items() {
        let mut planner = Planner::new();
        let list = planner.add_list("Shopping", None, None, true).unwrap();
        let bread = planner
            .add_manual_item(list, "Bread", None, None, "1 loaf")
            .unwrap();
        let milk = planner
            .add_manual_item(list, "Milk", None, None, "1L")
            .unwrap();
        planner
            .add_manual_item(list, "Apples", None, None, "6")
            .unwrap();
        planner.toggle_checked(bread).unwrap();
        planner.toggle_checked(milk).unwrap();

        let removed = planner.clear_checked_items(list).unwrap();

        assert_eq!(removed, 2);
        let remaining = planner.items_for(list);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Apples");
        assert!(!remaining[0].is_checked);
    }

    #[test]
    fn test_clear_checked_with_nothing_checked() {
        let mut planner = Planner::new();
        let list = planner.add_list("Shopping", None, None, true).unwrap();
        planner
            .add_manual_item(list, "Apples", None, None, "6")
            .unwrap();

        assert_eq!(planner.clear_checked_items(list).unwrap(), 0);
        assert_eq!(planner.items_for(list).len(), 1);
    }

    #[test]
    fn test_clear_checked_is_scoped_to_one_list() {
        let mut planner = Planner::new();
        let first = planner.add_list("A", None, None, false).unwrap();
        let second = planner.add_list("B", None, None, false).unwrap();
        let on_first = planner
            .add_manual_item(first, "Bread", None, None, "1 loaf")
            .unwrap();
        let on_second = planner
            .add_manual_item(second, "Bread", None, None, "1 loaf")
            .unwrap();
        planner.toggle_checked(on_first).unwrap();
        planner.toggle_checked(on_second).unwrap();

        assert_eq!(planner.clear_checked_items(first).unwrap(), 1);
        assert_eq!(planner.items_for(first).len(), 0);
        assert_eq!(planner.items_for(second).len(), 1);
    }

    #[test]
    fn test_set_item_category() {
        let mut planner = Planner::new();
        let produce = planner.add_category("Produce");
        let list = planner.add_list("Shopping", None, None, true).unwrap();
        let item = planner
            .add_manual_item(list, "Apples", None, None, "6")
            .unwrap();

        planner.set_item_category(item, Some(produce)).unwrap();
        assert_eq!(planner.item(item).unwrap().category_id, Some(produce));

        planner.set_item_category(item, None).unwrap();
        assert_eq!(planner.item(item).unwrap().category_id, None);

        assert_eq!(
            planner.set_item_category(item, Some(9999)),
            Err(crate::error::PlannerError::CategoryNotFound(9999))
        );
    }

    #[test]
    fn test_invalid_references_are_reported() {
        let mut planner = Planner::new();
        assert_eq!(
            planner.set_default_store(42),
            Err(crate::error::PlannerError::StoreNotFound(42))
        );
        assert_eq!(
            planner.plan(7).unwrap_err(),
            crate::error::PlannerError::PlanNotFound(7)
        );
    }
}
