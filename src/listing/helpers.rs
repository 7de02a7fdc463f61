//! Car Listing Helpers
//!
//! Small pure functions for session ids and display strings.

use super::models::Car;
use uuid::Uuid;

/// Returns the provided `listing_id` or creates a new UUID string when `None`.
pub fn get_or_create_listing_id(listing_id: Option<String>) -> String {
    listing_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Example output: `"5 of 14 cars"`.
pub fn format_count_summary(visible: usize, total: usize) -> String {
    format!("{} of {} cars", visible, total)
}

/// Example output: `"Porsche 911 vs Mini Cooper"`.
pub fn format_comparison_summary(cars: &[Car]) -> String {
    if cars.is_empty() {
        return "No cars selected for comparison.".to_string();
    }
    cars.iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ")
}

/// Produces a one-line listing of cars with their daily rate.
///
/// Example output: `"Mini Cooper ($69/day), Audi Q7 ($199/day)"`.
pub fn format_car_summary(cars: &[Car]) -> String {
    cars.iter()
        .map(|c| format!("{} (${}/day)", c.name, c.price_per_day))
        .collect::<Vec<_>>()
        .join(", ")
}
