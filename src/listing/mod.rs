//! Car Listing Domain Module
//!
//! This module contains the listing controller and everything it is built from:
//! - Domain models (Car, Criteria, commands, render output)
//! - Filter, sort and pagination engines
//! - The bounded comparison set and debounced search
//! - Application state and catalog loading
//! - REST API handlers

pub mod catalog;
pub mod compare;
pub mod debounce;
pub mod filter;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod pagination;
pub mod sort;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use state::{AppState, ListingController, ListingState, ListingUpdate, SharedState};
