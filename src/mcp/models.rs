//! MCP Protocol Models and Constants
//!
//! This module contains all data structures and constants related to the
//! Model Context Protocol (MCP) specification.

use serde::Deserialize;
use serde_json::Value;

// =============================================================================
// MCP Constants
// =============================================================================

/// Name of the tool that filters, sorts and pages the car listing
pub const BROWSE_TOOL_NAME: &str = "browse_cars";
/// Name of the tool that manages the comparison selection
pub const COMPARE_TOOL_NAME: &str = "compare_cars";
/// URI for the widget template
pub const WIDGET_TEMPLATE_URI: &str = "ui://widget/car-listing.html";
/// MIME type for the widget
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";
/// Server identifier
pub const SERVER_NAME: &str = "car-listing";
/// Protocol version for MCP
pub const PROTOCOL_VERSION: &str = "2024-11-05";

// =============================================================================
// MCP Protocol Models
// =============================================================================

/// Standard JSON-RPC 2.0 Request envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version (should be "2.0")
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,

    /// Method name to invoke
    pub method: String,

    /// Parameters for the method
    pub params: Option<Value>,

    /// Request identifier
    pub id: Option<Value>,
}

// =============================================================================
// Tool Inputs
// =============================================================================

/// Input for the browse_cars tool. Absent fields leave that criterion unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseInput {
    pub listing_id: Option<String>,

    /// Empty string clears the category filter
    pub category: Option<String>,

    /// Select-box token such as `"100-200"` or `"500-+"`
    pub price_range: Option<String>,

    /// `name`, `price-low`, `price-high` or `popularity`
    pub sort_by: Option<String>,

    /// Applied immediately; a tool call is a single discrete event
    pub search: Option<String>,

    pub page: Option<i64>,
}

/// What compare_cars should do with the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareAction {
    Toggle,
    Remove,
    Clear,
    View,
}

/// Input for the compare_cars tool
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareInput {
    pub listing_id: Option<String>,

    pub action: CompareAction,

    /// Required for toggle and remove
    pub car_id: Option<String>,
}
