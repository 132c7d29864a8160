//! # Shopping List Reconciliation
//!
//! Converts a week plan's recipes into a deduplicated, quantity-aggregated
//! shopping list, and keeps an existing list in step with its plan while
//! preserving user edits (manual items, checked state, pantry overrides).
//!
//! Two modes exist:
//!
//! - **Augment** adds to existing quantities without removing anything;
//!   running it twice double-counts quantities.
//! - **Replace** fully recomputes recipe-derived items, deleting ones no
//!   longer referenced by any recipe in the plan. Manual items are never
//!   deleted. Replace is idempotent for unchanged recipe data.
//!
//! Reconciliation validates every reference and reads all recipe data before
//! the first write, so an error never leaves a partially-applied item set.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ShoppingListItem;
use crate::planner::Planner;
use crate::quantity::aggregate_quantities;

/// How reconciliation treats items already on the target list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Merge new quantities into existing items; delete nothing
    Augment,
    /// Recompute recipe-derived items from scratch, preserving manual items
    Replace,
}

/// A surviving item whose quantity text changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedEntry {
    pub name: String,
    pub old: String,
    pub new: String,
}

/// An item that was added to, or removed from, the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    pub quantities: String,
}

/// What a reconciliation run changed, in encounter order.
///
/// Entries are ordered lists rather than maps so that "first 3 updated
/// items" in the summary message is well-defined and reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub updated: Vec<UpdatedEntry>,
    pub added: Vec<ItemEntry>,
    pub removed: Vec<ItemEntry>,
}

impl ChangeReport {
    /// (updated, added, removed) counts
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.updated.len(), self.added.len(), self.removed.len())
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ingredient data collected across the plan's recipes, in first-seen order.
struct CollectedIngredient {
    ingredient_id: i64,
    name: String,
    category_id: i64,
    is_pantry: bool,
    quantities: Vec<String>,
}

/// Reconcile a week plan's recipes into a shopping list.
///
/// `store_id` defaults to the store flagged as default, else any store.
/// `list_id` names an explicit target; without one, the list already linked
/// to the plan is reused, else a fresh active list is created (deactivating
/// all others). The target's `generated_at` is stamped with `now`, which
/// clears staleness regardless of what else changes.
///
/// Returns the target list id and, when `track_changes` is set, a
/// [`ChangeReport`].
pub fn reconcile(
    planner: &mut Planner,
    plan_id: i64,
    store_id: Option<i64>,
    list_id: Option<i64>,
    mode: ReconcileMode,
    track_changes: bool,
    now: DateTime<Utc>,
) -> Result<(i64, Option<ChangeReport>)> {
    // Read phase: resolve references and collect recipe data. Any error
    // returns here, before the first write.
    let plan_start = planner.plan(plan_id)?.start_date;

    let resolved_store = match store_id {
        Some(id) => Some(planner.store(id)?.id),
        None => planner
            .default_store()
            .map(|s| s.id)
            .or_else(|| planner.stores().first().map(|s| s.id)),
    };

    let mut collected: Vec<CollectedIngredient> = Vec::new();
    for meal in planner.planned_meals_for(plan_id) {
        let Some(recipe_id) = meal.recipe_id else {
            continue;
        };
        let recipe = planner.recipe(recipe_id)?;
        for line in &recipe.ingredients {
            let ingredient = planner.ingredient(line.ingredient_id)?;
            match collected
                .iter_mut()
                .find(|c| c.ingredient_id == ingredient.id)
            {
                Some(entry) => entry.quantities.push(line.quantity.clone()),
                None => collected.push(CollectedIngredient {
                    ingredient_id: ingredient.id,
                    name: ingredient.name.clone(),
                    category_id: ingredient.category_id,
                    is_pantry: ingredient.is_pantry_staple,
                    quantities: vec![line.quantity.clone()],
                }),
            }
        }
    }
    debug!(
        "Collected {} distinct ingredients for plan {plan_id}",
        collected.len()
    );

    let target_list_id = match list_id {
        Some(id) => {
            planner.list(id)?;
            id
        }
        None => match planner.list_for_plan(plan_id) {
            Some(list) => list.id,
            None => {
                let name = format!("Shopping for week of {}", plan_start.format("%d %b %Y"));
                planner.add_list(&name, Some(plan_id), resolved_store, true)?
            }
        },
    };

    // Write phase: from here every step is infallible.
    planner.list_mut(target_list_id)?.generated_at = Some(now);

    // Replace mode drops every recipe-derived item up front; the deleted
    // (ingredient, quantity) pairs decide "updated" vs "removed" later.
    let mut prior: Vec<(Option<i64>, String, String)> = Vec::new();
    if mode == ReconcileMode::Replace {
        let items = planner.items_vec_mut();
        if track_changes {
            for item in items
                .iter()
                .filter(|i| i.shopping_list_id == target_list_id && !i.is_manual)
            {
                prior.push((
                    item.ingredient_id,
                    item.name.clone(),
                    item.quantities.clone(),
                ));
            }
        }
        items.retain(|i| !(i.shopping_list_id == target_list_id && !i.is_manual));
    }

    let mut report = ChangeReport::default();
    for entry in &collected {
        let aggregated = aggregate_quantities(&entry.quantities);

        let existing = planner.items_vec_mut().iter_mut().find(|i| {
            i.shopping_list_id == target_list_id && i.ingredient_id == Some(entry.ingredient_id)
        });
        match existing {
            Some(item) => {
                // Augment mode, or a manual item that survived Replace mode
                // with the same ingredient: merge the two quantity texts.
                let old = item.quantities.clone();
                let merged = aggregate_quantities(&[old.clone(), aggregated]);
                item.quantities = merged.clone();
                if !item.is_manual && !item.is_pantry_override {
                    item.is_pantry_item = entry.is_pantry;
                }
                if track_changes && merged != old {
                    report.updated.push(UpdatedEntry {
                        name: entry.name.clone(),
                        old,
                        new: merged,
                    });
                }
            }
            None => {
                planner.insert_item(ShoppingListItem {
                    id: 0,
                    shopping_list_id: target_list_id,
                    ingredient_id: Some(entry.ingredient_id),
                    name: entry.name.clone(),
                    category_id: Some(entry.category_id),
                    quantities: aggregated.clone(),
                    is_checked: false,
                    is_manual: false,
                    is_pantry_item: entry.is_pantry,
                    is_pantry_override: false,
                    is_starred: false,
                });
                if track_changes {
                    match prior
                        .iter()
                        .find(|(ing, _, _)| *ing == Some(entry.ingredient_id))
                    {
                        Some((_, _, old)) if *old != aggregated => {
                            report.updated.push(UpdatedEntry {
                                name: entry.name.clone(),
                                old: old.clone(),
                                new: aggregated,
                            });
                        }
                        Some(_) => {} // survived replacement with identical text
                        None => report.added.push(ItemEntry {
                            name: entry.name.clone(),
                            quantities: aggregated,
                        }),
                    }
                }
            }
        }
    }

    if track_changes {
        for (ingredient_id, name, old) in &prior {
            let still_referenced = ingredient_id
                .map(|id| collected.iter().any(|c| c.ingredient_id == id))
                .unwrap_or(false);
            if !still_referenced {
                report.removed.push(ItemEntry {
                    name: name.clone(),
                    quantities: old.clone(),
                });
            }
        }
    }

    info!(
        "Reconciled plan {plan_id} into list {target_list_id}: {} updated, {} added, {} removed",
        report.updated.len(),
        report.added.len(),
        report.removed.len()
    );
    Ok((target_list_id, track_changes.then_some(report)))
}

/// Render a change report as a one-line summary.
///
/// Up to the first three updates appear as `"Name: old → new"`, comma-joined,
/// followed by `"N more"` for the rest and a `"(X added, Y removed)"` clause
/// when either count is nonzero. An empty report renders `"no changes
/// needed"`.
pub fn format_change_summary(report: &ChangeReport) -> String {
    let (updated, added, removed) = report.counts();
    if updated == 0 && added == 0 && removed == 0 {
        return "no changes needed".to_string();
    }

    let mut segments: Vec<String> = Vec::new();
    if updated > 0 {
        let shown: Vec<String> = report
            .updated
            .iter()
            .take(3)
            .map(|u| format!("{}: {} → {}", u.name, u.old, u.new))
            .collect();
        segments.push(shown.join(", "));
        if updated > 3 {
            segments.push(format!("{} more", updated - 3));
        }
    }
    if added > 0 || removed > 0 {
        segments.push(format!("({added} added, {removed} removed)"));
    }
    segments.join(" ")
}
