//! Sort engine. All orderings are stable.

use super::models::{Car, SortKey};
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Reorders `indices` (positions into `items`) by `key`.
///
/// `SortKey::Unsorted` leaves the sequence untouched.
pub fn sort_indices(items: &[Car], indices: &mut [usize], key: SortKey) {
    if key == SortKey::NameAscending {
        let keys = items.iter().map(|c| collation_key(&c.name)).collect::<Vec<_>>();
        indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        return;
    }
    indices.sort_by(|&a, &b| compare(&items[a], &items[b], key));
}

/// Returns a sorted copy of `items`.
pub fn sort<'a>(items: &[&'a Car], key: SortKey) -> Vec<&'a Car> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| compare(a, b, key));
    sorted
}

/// Comparator for `key`; `Ordering::Equal` for every pair when unsorted.
pub fn compare(a: &Car, b: &Car, key: SortKey) -> Ordering {
    match key {
        SortKey::NameAscending => collation_key(&a.name).cmp(&collation_key(&b.name)),
        SortKey::PriceAscending => a.price_per_day.cmp(&b.price_per_day),
        SortKey::PriceDescending | SortKey::Popularity => b.price_per_day.cmp(&a.price_per_day),
        SortKey::Unsorted => Ordering::Equal,
    }
}

/// Accent- and case-insensitive key: "Škoda" sorts beside "skoda".
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: &str, name: &str, price: u32) -> Car {
        Car {
            id: id.into(),
            name: name.into(),
            category: "compact".into(),
            price_per_day: price,
            features: Vec::new(),
        }
    }

    fn order(items: &[Car], key: SortKey) -> Vec<&str> {
        let mut indices = (0..items.len()).collect::<Vec<_>>();
        sort_indices(items, &mut indices, key);
        indices.into_iter().map(|i| items[i].id.as_str()).collect()
    }

    #[test]
    fn test_name_ascending_ignores_case_and_accents() {
        let items = vec![
            car("1", "volvo XC90", 90),
            car("2", "Audi A4", 80),
            car("3", "Škoda Octavia", 50),
            car("4", "bmw i3", 70),
        ];
        assert_eq!(order(&items, SortKey::NameAscending), vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn test_price_orders() {
        let items = vec![car("1", "A", 90), car("2", "B", 30), car("3", "C", 60)];
        assert_eq!(order(&items, SortKey::PriceAscending), vec!["2", "3", "1"]);
        assert_eq!(order(&items, SortKey::PriceDescending), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_popularity_matches_price_descending() {
        let items = vec![
            car("1", "A", 90),
            car("2", "B", 30),
            car("3", "C", 90),
            car("4", "D", 60),
        ];
        assert_eq!(
            order(&items, SortKey::Popularity),
            order(&items, SortKey::PriceDescending)
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = vec![
            car("1", "Same", 50),
            car("2", "same", 50),
            car("3", "SAME", 50),
        ];
        assert_eq!(order(&items, SortKey::NameAscending), vec!["1", "2", "3"]);
        assert_eq!(order(&items, SortKey::PriceAscending), vec!["1", "2", "3"]);
        assert_eq!(order(&items, SortKey::PriceDescending), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unsorted_is_identity() {
        let items = vec![car("1", "Z", 90), car("2", "A", 10)];
        assert_eq!(order(&items, SortKey::Unsorted), vec!["1", "2"]);
    }

    #[test]
    fn test_sort_refs() {
        let items = vec![car("1", "Z", 90), car("2", "A", 10)];
        let refs = items.iter().collect::<Vec<_>>();
        let sorted = sort(&refs, SortKey::PriceAscending);
        assert_eq!(sorted[0].id, "2");
    }
}
