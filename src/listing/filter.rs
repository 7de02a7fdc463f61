//! Filter engine: reduces the catalog to cars matching the current criteria.
//!
//! Category, price and search predicates are ANDed. Output keeps catalog
//! order; sorting happens afterwards.

use super::models::{Car, Criteria};

/// Separator placed between feature tags before substring matching.
///
/// A single space lets multi-word search text span two adjacent tags
/// ("awd automatic") without letting text run across a tag boundary
/// ("dautomatic").
pub const FEATURE_SEPARATOR: &str = " ";

/// Returns the indices of the cars in `items` that pass every active filter.
pub fn filter_indices(items: &[Car], criteria: &Criteria) -> Vec<usize> {
    let needle = criteria.search_text.to_lowercase();

    items
        .iter()
        .enumerate()
        .filter(|(_, car)| matches_category(car, criteria.category.as_deref()))
        .filter(|(_, car)| {
            criteria
                .price_range
                .map_or(true, |range| range.contains(car.price_per_day))
        })
        .filter(|(_, car)| matches_search(car, &needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// Convenience wrapper returning the matching cars themselves.
pub fn filter<'a>(items: &'a [Car], criteria: &Criteria) -> Vec<&'a Car> {
    filter_indices(items, criteria)
        .into_iter()
        .map(|idx| &items[idx])
        .collect()
}

fn matches_category(car: &Car, category: Option<&str>) -> bool {
    match category {
        None | Some("") => true,
        Some(wanted) => car.category == wanted,
    }
}

/// `needle` must already be lowercased.
pub fn matches_search(car: &Car, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    if car.name.to_lowercase().contains(needle) || car.category.to_lowercase().contains(needle) {
        return true;
    }

    car.features
        .iter()
        .map(|f| f.to_lowercase())
        .collect::<Vec<_>>()
        .join(FEATURE_SEPARATOR)
        .contains(needle)
}
