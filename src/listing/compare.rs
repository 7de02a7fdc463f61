//! Comparison set: a bounded, insertion-ordered selection of car ids.

use super::models::{Car, ComparisonRow, ComparisonView, COMPARE_CAPACITY, COMPARE_MINIMUM};
use crate::error::{ListingError, RejectReason, Result};

/// At most [`COMPARE_CAPACITY`] distinct ids, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSet {
    ids: Vec<String>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Adds `id`. Re-adding a present id is a no-op; a full set rejects and stays unchanged.
    pub fn add(&mut self, id: &str) -> Result<&Self> {
        if self.contains(id) {
            return Ok(self);
        }
        if self.ids.len() >= COMPARE_CAPACITY {
            return Err(ListingError::Rejected(RejectReason::MaxSizeExceeded));
        }
        self.ids.push(id.to_string());
        Ok(self)
    }

    /// Removes `id` if present.
    pub fn remove(&mut self, id: &str) -> &Self {
        self.ids.retain(|i| i != id);
        self
    }

    /// Removes `id` when present, otherwise adds it subject to the cap.
    pub fn toggle(&mut self, id: &str) -> Result<&Self> {
        if self.contains(id) {
            Ok(self.remove(id))
        } else {
            self.add(id)
        }
    }

    pub fn clear(&mut self) -> &Self {
        self.ids.clear();
        self
    }

    /// Resolves ids against `catalog` in insertion order. Ids absent from the catalog are skipped.
    pub fn snapshot(&self, catalog: &[Car]) -> Vec<Car> {
        self.ids
            .iter()
            .filter_map(|id| catalog.iter().find(|car| &car.id == id))
            .cloned()
            .collect()
    }

    /// Builds the side-by-side table. Fewer than two selected cars is refused.
    pub fn view(&self, catalog: &[Car]) -> Result<ComparisonView> {
        let cars = self.snapshot(catalog);
        if cars.len() < COMPARE_MINIMUM {
            return Err(ListingError::InsufficientSelection {
                selected: cars.len(),
            });
        }
        Ok(build_view(&cars))
    }
}

fn build_view(cars: &[Car]) -> ComparisonView {
    ComparisonView {
        columns: cars.iter().map(|c| c.name.clone()).collect(),
        rows: vec![
            row(cars, "Price", |c| format!("${}/day", c.price_per_day)),
            row(cars, "Category", |c| c.category.clone()),
            row(cars, "Availability", |_| "Available".to_string()),
            row(cars, "Features", |c| c.features.join(", ")),
        ],
    }
}

fn row(cars: &[Car], label: &str, value: impl Fn(&Car) -> String) -> ComparisonRow {
    ComparisonRow {
        label: label.to_string(),
        values: cars.iter().map(value).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: &str, name: &str, price: u32) -> Car {
        Car {
            id: id.into(),
            name: name.into(),
            category: "luxury".into(),
            price_per_day: price,
            features: vec!["Leather".into(), "GPS".into()],
        }
    }

    #[test]
    fn test_fourth_add_is_rejected() {
        let mut set = ComparisonSet::new();
        set.add("a").unwrap();
        set.add("b").unwrap();
        set.add("c").unwrap();

        let err = set.add("d").unwrap_err();
        assert!(matches!(
            err,
            ListingError::Rejected(RejectReason::MaxSizeExceeded)
        ));
        assert_eq!(set.ids(), &["a", "b", "c"]);
    }

    #[test]
    fn test_add_existing_is_noop_even_when_full() {
        let mut set = ComparisonSet::new();
        for id in ["a", "b", "c"] {
            set.add(id).unwrap();
        }
        assert!(set.add("b").is_ok());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = ComparisonSet::new();
        set.add("a").unwrap();
        set.remove("zzz");
        assert_eq!(set.ids(), &["a"]);
    }

    #[test]
    fn test_toggle_round_trip_preserves_order() {
        let mut set = ComparisonSet::new();
        set.toggle("a").unwrap();
        set.toggle("b").unwrap();
        set.toggle("c").unwrap();
        set.toggle("a").unwrap();
        assert_eq!(set.ids(), &["b", "c"]);

        set.toggle("d").unwrap();
        assert_eq!(set.ids(), &["b", "c", "d"]);
        assert!(set.toggle("e").is_err());

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_view_requires_two_cars() {
        let catalog = vec![car("a", "Bentley", 500), car("b", "Audi", 200)];
        let mut set = ComparisonSet::new();

        let err = set.view(&catalog).unwrap_err();
        assert!(matches!(err, ListingError::InsufficientSelection { selected: 0 }));

        set.add("b").unwrap();
        let err = set.view(&catalog).unwrap_err();
        assert!(matches!(err, ListingError::InsufficientSelection { selected: 1 }));

        set.add("a").unwrap();
        let view = set.view(&catalog).unwrap();
        assert_eq!(view.columns, vec!["Audi", "Bentley"]);
        assert_eq!(view.rows[0].label, "Price");
        assert_eq!(view.rows[0].values, vec!["$200/day", "$500/day"]);
        assert_eq!(view.rows[2].values, vec!["Available", "Available"]);
        assert_eq!(view.rows[3].values[0], "Leather, GPS");
    }
}
