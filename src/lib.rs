//! Car Listing Library
//!
//! This library provides the listing controller for a car-rental catalog
//! (filtering, sorting, pagination, debounced search and a bounded comparison
//! set) together with REST and MCP (Model Context Protocol) surfaces.

// Domain modules
pub mod error;
pub mod listing;
pub mod mcp;

// Infrastructure
pub mod config;
pub mod router;
