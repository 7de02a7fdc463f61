//! Car Listing Domain Models
//!
//! This module contains the data structures shared by the filter, sort,
//! pagination and comparison engines, plus the payloads exchanged with the
//! rendering layer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Number of cars shown per page
pub const PAGE_SIZE: usize = 12;
/// Maximum number of cars held in the comparison set
pub const COMPARE_CAPACITY: usize = 3;
/// Minimum number of cars required to render a comparison table
pub const COMPARE_MINIMUM: usize = 2;
/// Quiescence window before pending search text is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

// =============================================================================
// Catalog Models
// =============================================================================

/// A single rentable car. Records are never mutated after the catalog loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    /// Unique, session-stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Category tag (luxury, electric, sports, suv, compact, family, ...)
    pub category: String,

    /// Daily rate in whole currency units
    pub price_per_day: u32,

    /// Free-text feature tags, in display order
    #[serde(default)]
    pub features: Vec<String>,
}

/// Inclusive price window. `max == None` means no upper limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl PriceRange {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Whether `price` falls inside the window. A range with `min > max` admits nothing.
    pub fn contains(&self, price: u32) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }

    /// Parses a select-box token such as `"100-200"` or `"500-+"`.
    ///
    /// Empty or malformed tokens return `None`, meaning "no price filter".
    pub fn parse(token: &str) -> Option<Self> {
        let (min, max) = token.trim().split_once('-')?;
        let min = min.trim().parse().ok()?;
        let max = match max.trim() {
            "+" | "" => None,
            bound => Some(bound.parse().ok()?),
        };
        Some(Self { min, max })
    }

    /// Builds a range from numeric bounds. Both absent, or either malformed, means no filter.
    pub fn from_bounds(min: Option<PriceBound>, max: Option<PriceBound>) -> Option<Self> {
        let amount = |bound: Option<PriceBound>| match bound {
            None => Some(None),
            Some(PriceBound::Amount(value)) => Some(Some(value)),
            Some(PriceBound::Malformed) => None,
        };

        match (amount(min)?, amount(max)?) {
            (None, None) => None,
            (min, max) => Some(Self::new(min.unwrap_or(0), max)),
        }
    }
}

/// One numeric price bound as sent by a client.
///
/// Negative, fractional and non-numeric input is kept as `Malformed` rather
/// than failing the whole command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBound {
    Amount(u32),
    Malformed,
}

impl From<&Value> for PriceBound {
    fn from(raw: &Value) -> Self {
        let amount = match raw {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        amount.map_or(Self::Malformed, Self::Amount)
    }
}

impl<'de> Deserialize<'de> for PriceBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from(&raw))
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    NameAscending,
    PriceAscending,
    PriceDescending,
    /// No popularity signal exists; this orders exactly like `PriceDescending`.
    Popularity,
    /// Unrecognized key: items keep their filtered order.
    Unsorted,
}

impl SortKey {
    pub fn as_token(&self) -> &'static str {
        match self {
            SortKey::NameAscending => "name-ascending",
            SortKey::PriceAscending => "price-ascending",
            SortKey::PriceDescending => "price-descending",
            SortKey::Popularity => "popularity",
            SortKey::Unsorted => "unsorted",
        }
    }
}

impl From<&str> for SortKey {
    fn from(token: &str) -> Self {
        match token.trim() {
            "name" | "name-ascending" => SortKey::NameAscending,
            "price-low" | "price-ascending" => SortKey::PriceAscending,
            "price-high" | "price-descending" => SortKey::PriceDescending,
            "popularity" => SortKey::Popularity,
            _ => SortKey::Unsorted,
        }
    }
}

impl From<String> for SortKey {
    fn from(token: String) -> Self {
        SortKey::from(token.as_str())
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_token().to_string()
    }
}

// =============================================================================
// Listing State Models
// =============================================================================

/// Current filter, sort and search selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// Exact, case-sensitive category match; `None` disables the filter
    pub category: Option<String>,

    /// Inclusive price window; `None` disables the filter
    pub price_range: Option<PriceRange>,

    pub sort_key: SortKey,

    /// Applied search text (after debouncing); empty disables the filter
    pub search_text: String,
}

/// 1-indexed page cursor with a fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Every event the listing controller consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ListingCommand {
    /// Empty or missing value clears the category filter
    SetCategory {
        #[serde(default)]
        value: Option<String>,
    },

    /// Numeric bounds; both absent or either malformed clears the price filter
    SetPriceRange {
        #[serde(default)]
        min: Option<PriceBound>,
        #[serde(default)]
        max: Option<PriceBound>,
    },

    /// Select-box token (`"0-100"`, `"500-+"`); unparseable clears the price filter
    SetPriceFilter { token: String },

    SetSortKey { key: SortKey },

    /// Debounced: takes effect after the quiescence window
    SetSearchText { text: String },

    /// Out-of-range pages are clamped, never rejected
    GoToPage { page: i64 },

    NextPage,

    PrevPage,

    ToggleCompare { id: String },

    RemoveCompare { id: String },

    ClearCompare,

    /// Restores default criteria; the comparison set is kept
    ResetFilters,

    /// Several criteria in one event, re-filtered once. Absent fields are left unchanged.
    #[serde(rename_all = "camelCase")]
    Browse {
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        price_filter: Option<String>,
        #[serde(default)]
        sort_key: Option<SortKey>,
        /// Applied immediately, bypassing the debounce window
        #[serde(default)]
        search_text: Option<String>,
        #[serde(default)]
        page: Option<i64>,
    },
}

// =============================================================================
// Render Output
// =============================================================================

/// What the rendering layer should display after a criteria or page change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInstruction {
    pub visible_items: Vec<Car>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Size of the full catalog
    pub total_count: usize,
    /// Number of cars passing the current filters
    pub visible_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub page_numbers: Vec<usize>,
    /// e.g. `"5 of 14 cars"`
    pub summary: String,
}

/// Current comparison selection, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutput {
    pub selected_items: Vec<Car>,
}

/// One labelled row of the comparison table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub values: Vec<String>,
}

/// Side-by-side comparison table, one column per selected car
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonView {
    pub columns: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

// =============================================================================
// REST Payloads
// =============================================================================

/// Input for the command endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInput {
    /// Optional listing session identifier
    pub listing_id: Option<String>,

    pub command: ListingCommand,
}

/// Input for endpoints that only address a listing session
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingIdInput {
    pub listing_id: Option<String>,
}

/// Response for command dispatch
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub listing_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderInstruction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonOutput>,

    /// True when search text was queued behind the debounce window
    pub scheduled: bool,
}

/// Body returned for refused operations
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub reason: String,
}
