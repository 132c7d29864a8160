//! # Meal Shuffle Module
//!
//! Fills a week plan with randomly chosen recipes, one primary meal per day,
//! while avoiding consecutive days sharing a meal type. Pinned meals are
//! preserved exactly; supplementary meals are never touched.
//!
//! The random source is caller-supplied (`&mut impl Rng`) so tests can seed
//! a deterministic generator.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::model::PlannedMeal;
use crate::planner::Planner;

/// Pick a meal type and recipe from the catalog, excluding `previous` unless
/// the exclusion would empty the choice (a single-type catalog falls back to
/// allowing repeats). Returns `None` only for an empty catalog.
fn choose_recipe<R: Rng>(
    catalog: &[(i64, Vec<i64>)],
    previous: Option<i64>,
    rng: &mut R,
) -> Option<(i64, i64)> {
    let eligible: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, (type_id, _))| Some(*type_id) != previous)
        .map(|(index, _)| index)
        .collect();
    let pool: Vec<usize> = if eligible.is_empty() {
        (0..catalog.len()).collect()
    } else {
        eligible
    };

    let index = *pool.choose(rng)?;
    let (type_id, recipes) = &catalog[index];
    let recipe_id = *recipes.choose(rng)?;
    Some((*type_id, recipe_id))
}

/// Assign random recipes to each unpinned day of a week plan.
///
/// Unpinned primary meals are deleted and replaced with fresh random picks;
/// pinned meals keep their day, recipe, and pin flag. Consecutive days never
/// share a meal type unless only one type exists in the catalog or a pinned
/// meal forces the repeat. A pinned day's meal type feeds the next day's
/// exclusion; a pinned note-only day feeds no exclusion.
///
/// Returns the resulting primary meals for days `0..num_days` in day order.
/// An empty recipe catalog (no active recipes) yields an empty result with
/// no creations.
pub fn shuffle_meals<R: Rng>(
    planner: &mut Planner,
    plan_id: i64,
    num_days: u8,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedMeal>> {
    planner.plan(plan_id)?;

    let pinned: Vec<PlannedMeal> = planner
        .planned_meals_for(plan_id)
        .into_iter()
        .filter(|m| m.is_pinned && !m.is_supplementary)
        .cloned()
        .collect();

    let removed = planner.clear_unpinned_primary_meals(plan_id, now)?;
    debug!("Cleared {removed} unpinned primary meals from plan {plan_id}");

    // Active recipes grouped by meal type, in meal-type order
    let mut catalog: Vec<(i64, Vec<i64>)> = Vec::new();
    for meal_type in planner.meal_types() {
        let recipes: Vec<i64> = planner
            .recipes()
            .iter()
            .filter(|r| r.meal_type_id == meal_type.id && !r.is_archived)
            .map(|r| r.id)
            .collect();
        if !recipes.is_empty() {
            catalog.push((meal_type.id, recipes));
        }
    }
    if catalog.is_empty() {
        info!("No active recipes available, shuffle of plan {plan_id} produced nothing");
        return Ok(Vec::new());
    }

    let mut result: Vec<PlannedMeal> = Vec::new();
    let mut previous_type: Option<i64> = None;
    let mut created = 0usize;

    for day_offset in 0..num_days {
        if let Some(meal) = pinned.iter().find(|m| m.day_offset == day_offset) {
            previous_type = match meal.recipe_id {
                Some(recipe_id) => Some(planner.recipe(recipe_id)?.meal_type_id),
                None => None,
            };
            result.push(meal.clone());
            continue;
        }

        let Some((type_id, recipe_id)) = choose_recipe(&catalog, previous_type, rng) else {
            break;
        };
        let mut meal = PlannedMeal {
            id: 0,
            week_plan_id: plan_id,
            day_offset,
            recipe_id: Some(recipe_id),
            note: String::new(),
            is_supplementary: false,
            is_pinned: false,
            for_people: String::new(),
        };
        meal.id = planner.insert_meal(meal.clone());
        result.push(meal);
        created += 1;
        previous_type = Some(type_id);
    }

    if created > 0 {
        planner.touch_plan(plan_id, now)?;
    }
    info!("Shuffled plan {plan_id}: kept {} pinned, created {created} meals", pinned.len());
    Ok(result)
}
