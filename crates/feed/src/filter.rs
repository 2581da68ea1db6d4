// ABOUTME: Item filtering and limiting applied between parse and output.
// ABOUTME: Pure, order-preserving predicate filter plus a maximum-item cap.

use crate::models::Item;

/// A caller-supplied inclusion test, invoked once per item in order.
pub type ItemPredicate<'a> = &'a dyn Fn(&Item) -> bool;

/// Applies an optional inclusion predicate, then an optional item cap.
///
/// Original order is preserved; absence of either argument is a no-op for
/// that stage.
pub fn apply_filter(
    items: Vec<Item>,
    predicate: Option<ItemPredicate<'_>>,
    max_items: Option<usize>,
) -> Vec<Item> {
    let mut filtered: Vec<Item> = match predicate {
        Some(keep) => items.into_iter().filter(|item| keep(item)).collect(),
        None => items,
    };
    if let Some(max) = max_items {
        filtered.truncate(max);
    }
    filtered
}
