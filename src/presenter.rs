//! # Shopping List Presentation
//!
//! Read-side grouping of a shopping list's items by store-specific category
//! order for display. Never mutates the list.

use log::debug;

use crate::error::Result;
use crate::model::ShoppingListItem;
use crate::planner::Planner;

/// Sentinel rank for categories a store has no configured order for, and for
/// items with no category at all. Ranks after every mapped category.
pub const UNRANKED: u32 = 999;

/// A run of items under one category heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    /// Category name, or "Other" for items with no category
    pub name: String,
    /// Display rank within the list's store
    pub sort_order: u32,
    pub items: Vec<ShoppingListItem>,
}

/// Group a list's items by category in store-specific aisle order.
///
/// Items sort by (unchecked first, category rank, case-insensitive name) and
/// are bucketed by category name; groups come back in rank order with
/// unranked categories last.
pub fn sorted_items(planner: &Planner, list_id: i64) -> Result<Vec<CategoryGroup>> {
    let list = planner.list(list_id)?;
    let category_order = list
        .store_id
        .map(|store_id| planner.category_order_map(store_id))
        .unwrap_or_default();

    let rank = |item: &ShoppingListItem| -> u32 {
        item.category_id
            .and_then(|cid| category_order.get(&cid).copied())
            .unwrap_or(UNRANKED)
    };

    let mut items: Vec<ShoppingListItem> = planner
        .items_for(list_id)
        .into_iter()
        .cloned()
        .collect();
    items.sort_by_key(|item| (item.is_checked, rank(item), item.name.to_lowercase()));

    let mut groups: Vec<CategoryGroup> = Vec::new();
    for item in items {
        let name = match item.category_id {
            Some(cid) => planner.category(cid)?.name.clone(),
            None => "Other".to_string(),
        };
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.items.push(item),
            None => {
                let sort_order = rank(&item);
                groups.push(CategoryGroup {
                    name,
                    sort_order,
                    items: vec![item],
                });
            }
        }
    }
    groups.sort_by_key(|g| g.sort_order);

    debug!("Presented list {list_id} as {} category groups", groups.len());
    Ok(groups)
}
