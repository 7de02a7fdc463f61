//! Car catalog loading
//!
//! The catalog is read once at startup and shared read-only for the rest of
//! the process. A `cars.json` file in the assets directory replaces the
//! built-in fleet.

use super::models::Car;
use crate::error::{ListingError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name looked up inside the assets directory
pub const CATALOG_FILE: &str = "cars.json";

/// Reads a JSON array of cars from `path`, refusing duplicate ids.
pub fn load_from_path(path: &Path) -> Result<Vec<Car>> {
    let raw = std::fs::read_to_string(path)?;
    let cars: Vec<Car> = serde_json::from_str(&raw)?;
    ensure_unique_ids(&cars)?;
    Ok(cars)
}

/// Loads `assets_dir/cars.json` when it exists, otherwise the built-in fleet.
pub fn load_or_builtin(assets_dir: &Path) -> Result<Vec<Car>> {
    let path = catalog_path(assets_dir);
    if path.exists() {
        tracing::info!(path = %path.display(), "loading car catalog");
        return load_from_path(&path);
    }
    tracing::info!("no catalog file found, using built-in fleet");
    Ok(builtin_fleet())
}

pub fn catalog_path(assets_dir: &Path) -> PathBuf {
    assets_dir.join(CATALOG_FILE)
}

fn ensure_unique_ids(cars: &[Car]) -> Result<()> {
    let mut seen = HashSet::new();
    for car in cars {
        if !seen.insert(car.id.as_str()) {
            return Err(ListingError::DuplicateItem(car.id.clone()));
        }
    }
    Ok(())
}

/// Looks up one car by id.
pub fn find<'a>(cars: &'a [Car], id: &str) -> Result<&'a Car> {
    cars.iter()
        .find(|car| car.id == id)
        .ok_or_else(|| ListingError::UnknownItem(id.to_string()))
}

/// Counts cars per category, in first-seen catalog order.
pub fn category_counts(cars: &[Car]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for car in cars {
        match counts.iter_mut().find(|(category, _)| *category == car.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((car.category.clone(), 1)),
        }
    }
    counts
}

fn car(id: &str, name: &str, category: &str, price_per_day: u32, features: &[&str]) -> Car {
    Car {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price_per_day,
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

/// The showroom fleet used when no catalog file is provided.
pub fn builtin_fleet() -> Vec<Car> {
    vec![
        car("mercedes-s-class", "Mercedes S-Class", "luxury", 299, &["Leather Seats", "Massage", "Automatic"]),
        car("bmw-7-series", "BMW 7 Series", "luxury", 279, &["Leather Seats", "Heads-Up Display", "Automatic"]),
        car("tesla-model-s", "Tesla Model S", "electric", 189, &["Autopilot", "Long Range", "Automatic"]),
        car("tesla-model-3", "Tesla Model 3", "electric", 129, &["Autopilot", "Automatic"]),
        car("porsche-911", "Porsche 911", "sports", 399, &["Convertible", "Sport Mode", "Automatic"]),
        car("ford-mustang", "Ford Mustang", "sports", 159, &["V8", "Convertible", "Manual"]),
        car("range-rover", "Range Rover", "suv", 249, &["AWD", "Automatic", "7 Seats"]),
        car("jeep-wrangler", "Jeep Wrangler", "suv", 119, &["4WD", "Removable Roof", "Manual"]),
        car("toyota-rav4", "Toyota RAV4", "suv", 89, &["AWD", "Hybrid", "Automatic"]),
        car("audi-q7", "Audi Q7", "suv", 199, &["AWD", "Automatic", "7 Seats"]),
        car("honda-cr-v", "Honda CR-V", "suv", 95, &["AWD", "Automatic", "Apple CarPlay"]),
        car("mini-cooper", "Mini Cooper", "compact", 69, &["Manual", "Bluetooth"]),
        car("vw-golf", "Volkswagen Golf", "compact", 59, &["Automatic", "Bluetooth"]),
        car("toyota-sienna", "Toyota Sienna", "family", 109, &["8 Seats", "Hybrid", "Automatic"]),
    ]
}
