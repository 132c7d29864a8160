//! Integration tests for store-ordered shopping list presentation.

use mealplanner::planner::Planner;
use mealplanner::presenter::{sorted_items, UNRANKED};

struct Fixture {
    planner: Planner,
    list: i64,
}

/// Store with Produce ranked 1 and Dairy ranked 2; Bakery exists but has no
/// configured order.
fn setup() -> Fixture {
    let mut planner = Planner::new();

    let store = planner.add_store("Test Store", true);
    let produce = planner.add_category("Produce");
    let dairy = planner.add_category("Dairy");
    let bakery = planner.add_category("Bakery");
    planner.set_category_order(store, produce, 1).unwrap();
    planner.set_category_order(store, dairy, 2).unwrap();

    let list = planner
        .add_list("Groceries", None, Some(store), true)
        .unwrap();
    planner
        .add_manual_item(list, "Milk", None, Some(dairy), "1L")
        .unwrap();
    planner
        .add_manual_item(list, "Apples", None, Some(produce), "6")
        .unwrap();
    planner
        .add_manual_item(list, "Bagels", None, Some(bakery), "4")
        .unwrap();
    planner
        .add_manual_item(list, "Zip bags", None, None, "1 box")
        .unwrap();

    Fixture { planner, list }
}

#[test]
fn test_groups_follow_store_category_order() {
    let f = setup();

    let groups = sorted_items(&f.planner, f.list).unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Produce", "Dairy", "Bakery", "Other"]);
}

#[test]
fn test_unmapped_and_uncategorised_rank_last() {
    let f = setup();

    let groups = sorted_items(&f.planner, f.list).unwrap();
    assert_eq!(groups[0].sort_order, 1);
    assert_eq!(groups[1].sort_order, 2);
    assert_eq!(groups[2].sort_order, UNRANKED);
    assert_eq!(groups[3].sort_order, UNRANKED);
    // "Bagels" sorts before "Zip bags", so Bakery precedes Other
    assert_eq!(groups[2].name, "Bakery");
    assert_eq!(groups[3].name, "Other");
}

#[test]
fn test_checked_items_come_after_unchecked_within_group() {
    let mut f = setup();
    let produce = f
        .planner
        .items_for(f.list)
        .iter()
        .find(|i| i.name == "Apples")
        .and_then(|i| i.category_id)
        .unwrap();
    f.planner
        .add_manual_item(f.list, "Avocado", None, Some(produce), "2")
        .unwrap();
    let apples_id = f
        .planner
        .items_for(f.list)
        .iter()
        .find(|i| i.name == "Apples")
        .map(|i| i.id)
        .unwrap();
    f.planner.toggle_checked(apples_id).unwrap();

    let groups = sorted_items(&f.planner, f.list).unwrap();
    let produce_group = groups.iter().find(|g| g.name == "Produce").unwrap();
    let names: Vec<&str> = produce_group.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Avocado", "Apples"]);
    assert!(produce_group.items[1].is_checked);
}

#[test]
fn test_no_store_sorts_by_name_only() {
    let mut planner = Planner::new();
    let list = planner.add_list("Ad hoc", None, None, true).unwrap();
    planner
        .add_manual_item(list, "cherries", None, None, "1 bag")
        .unwrap();
    planner
        .add_manual_item(list, "Apples", None, None, "6")
        .unwrap();
    planner
        .add_manual_item(list, "bananas", None, None, "3")
        .unwrap();

    let groups = sorted_items(&planner, list).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Other");
    assert_eq!(groups[0].sort_order, UNRANKED);

    let names: Vec<&str> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
    // Case-insensitive name ordering
    assert_eq!(names, ["Apples", "bananas", "cherries"]);
}

#[test]
fn test_presentation_does_not_mutate_the_list() {
    let f = setup();
    let before: Vec<_> = f.planner.items_for(f.list).into_iter().cloned().collect();

    sorted_items(&f.planner, f.list).unwrap();

    let after: Vec<_> = f.planner.items_for(f.list).into_iter().cloned().collect();
    assert_eq!(before, after);
}
