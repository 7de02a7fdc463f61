//! MCP (Model Context Protocol) route handlers
//!
//! This module exposes the listing controller as MCP tools.
//! It exports `handle_tool_call` publicly to make it accessible for tests.

use super::{helpers::*, models::*};
use crate::listing::{
    helpers::{format_car_summary, format_comparison_summary, get_or_create_listing_id},
    models::{ListingCommand, SortKey},
    state::{AppState, ListingUpdate, SharedState},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::{json, Value};
use std::time::Instant;

/// Creates routes for MCP-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(handle_mcp).get(handle_mcp_sse))
        .route("/mcp", post(handle_mcp).get(handle_mcp_sse)) // Standard endpoint
        .route("/mcp/", post(handle_mcp).get(handle_mcp_sse)) // Trailing slash safety
}

/// Handle SSE (Server-Sent Events) handshake for GET requests
async fn handle_mcp_sse() -> impl IntoResponse {
    (
        [("content-type", "text/event-stream")],
        "event: endpoint\ndata: /mcp\n\n",
    )
}

/// Endpoint: POST /mcp
/// Handles the Model Context Protocol communication for POST requests.
async fn handle_mcp(
    State(state): State<SharedState>,
    body: Result<Json<JsonRpcRequest>, axum::extract::rejection::JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => {
            tracing::warn!(error = %e.body_text(), "JSON-RPC parse error");
            return (
                StatusCode::BAD_REQUEST,
                Json(rpc_error(Value::Null, -32700, "Parse error")),
            )
                .into_response();
        }
    };

    let id = req.id.unwrap_or(Value::Null);
    let method_name = req.method.as_str();
    let params = req.params.unwrap_or(Value::Null);

    tracing::info!(method = method_name, ?id, "MCP call");

    let response_body = match method_name {
        "initialize" => rpc_success(id, handle_initialize()),
        "notifications/initialized" => rpc_success(id, json!({})),
        "tools/list" => rpc_success(id, handle_tools_list()),
        "resources/list" => rpc_success(id, handle_resources_list()),
        "resources/read" => rpc_success(id, handle_resources_read(&state).await),
        "tools/call" => {
            let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
            let args = params.get("arguments").cloned().unwrap_or(Value::Null);

            match handle_tool_call(&state, tool_name, args) {
                Ok(result) => rpc_success(id, result),
                Err(msg) => rpc_error(id, -32602, msg), // Invalid params or refused operation
            }
        }
        "ping" => rpc_success(id, json!({})),
        _ => {
            tracing::warn!(method = method_name, "unknown MCP method");
            rpc_error(id, -32601, "Method not found")
        }
    };

    Json(response_body).into_response()
}

// =============================================================================
// MCP Method Handlers
// =============================================================================

/// Handles `initialize` request (Handshake).
fn handle_initialize() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": true },
            "resources": { "listChanged": true, "subscribe": true }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Handles `tools/list` request.
fn handle_tools_list() -> Value {
    json!({
        "tools": [
            {
                "name": BROWSE_TOOL_NAME,
                "title": "Browse rental cars",
                "description": "Filters, sorts and pages the rental fleet and returns the visible cars.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "listingId": { "type": "string" },
                        "category": { "type": "string" },
                        "priceRange": { "type": "string", "description": "e.g. 0-100, 100-200, 500-+" },
                        "sortBy": {
                            "type": "string",
                            "enum": ["name", "price-low", "price-high", "popularity"]
                        },
                        "search": { "type": "string" },
                        "page": { "type": "integer", "minimum": 1 }
                    },
                    "additionalProperties": false
                },
                "_meta": widget_meta(None)
            },
            {
                "name": COMPARE_TOOL_NAME,
                "title": "Compare cars",
                "description": "Selects up to three cars and builds a side-by-side comparison.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "listingId": { "type": "string" },
                        "action": {
                            "type": "string",
                            "enum": ["toggle", "remove", "clear", "view"]
                        },
                        "carId": { "type": "string" }
                    },
                    "required": ["action"],
                    "additionalProperties": false
                },
                "_meta": widget_meta(None)
            }
        ],
        "_meta": widget_meta(None)
    })
}

/// Handles `resources/list` request.
fn handle_resources_list() -> Value {
    json!({
        "resources": [{
            "name": "Browse rental cars",
            "uri": WIDGET_TEMPLATE_URI,
            "mimeType": WIDGET_MIME_TYPE,
            "_meta": widget_meta(None)
        }],
        "_meta": widget_meta(None)
    })
}

/// Handles `resources/read` request.
async fn handle_resources_read(state: &AppState) -> Value {
    let html = match state.load_widget_html().await {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(%err, "widget html unavailable");
            String::new()
        }
    };
    json!({
        "contents": [{
            "uri": WIDGET_TEMPLATE_URI,
            "mimeType": WIDGET_MIME_TYPE,
            "text": html,
            "_meta": widget_meta(None)
        }],
        "_meta": widget_meta(None)
    })
}

/// Handles `tools/call` request (Business Logic).
pub fn handle_tool_call(state: &AppState, name: &str, args: Value) -> Result<Value, String> {
    match name {
        BROWSE_TOOL_NAME => handle_browse_tool(state, args),
        COMPARE_TOOL_NAME => handle_compare_tool(state, args),
        _ => Err(format!("Unknown tool: {}", name)),
    }
}

/// Handles the browse_cars tool functionality
fn handle_browse_tool(state: &AppState, args: Value) -> Result<Value, String> {
    let input: BrowseInput = if args.is_null() {
        BrowseInput::default()
    } else {
        serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e))?
    };

    let listing_id = get_or_create_listing_id(input.listing_id);

    let command = ListingCommand::Browse {
        category: input.category,
        price_filter: input.price_range,
        sort_key: input.sort_by.map(SortKey::from),
        search_text: input.search,
        page: input.page,
    };

    let update = state.with_listing(&listing_id, |session| {
        session.controller.apply(command, Instant::now())
    });
    let render = match update.map_err(|e| e.to_string())? {
        ListingUpdate::Render(render) => render,
        _ => return Err("browse did not produce a listing".to_string()),
    };

    let message = format!(
        "Page {} of {} ({}): {}",
        render.current_page,
        render.total_pages,
        render.summary,
        format_car_summary(&render.visible_items)
    );

    Ok(json!({
        "content": [{ "type": "text", "text": message }],
        "structuredContent": {
            "listingId": listing_id,
            "render": render
        },
        "_meta": widget_meta(Some(&listing_id))
    }))
}

/// Handles the compare_cars tool functionality
fn handle_compare_tool(state: &AppState, args: Value) -> Result<Value, String> {
    let input: CompareInput =
        serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e))?;

    let listing_id = get_or_create_listing_id(input.listing_id);
    let car_id = || {
        input
            .car_id
            .clone()
            .ok_or_else(|| "carId is required for this action".to_string())
    };

    let command = match input.action {
        CompareAction::Toggle => Some(ListingCommand::ToggleCompare { id: car_id()? }),
        CompareAction::Remove => Some(ListingCommand::RemoveCompare { id: car_id()? }),
        CompareAction::Clear => Some(ListingCommand::ClearCompare),
        CompareAction::View => None,
    };

    let (mut structured, selected) = state.with_listing(&listing_id, |session| {
        let ctl = &mut session.controller;
        let table = match command {
            Some(command) => {
                ctl.apply(command, Instant::now()).map_err(|e| e.to_string())?;
                None
            }
            None => Some(ctl.comparison_view().map_err(|e| e.to_string())?),
        };

        let selected = ctl.comparison().selected_items;
        let mut structured = json!({ "selectedItems": selected });
        if let Some(table) = table {
            structured["table"] = json!(table);
        }
        Ok::<_, String>((structured, selected))
    })?;

    let message = format!(
        "Comparing {} car(s): {}",
        selected.len(),
        format_comparison_summary(&selected)
    );
    structured["listingId"] = json!(listing_id);

    Ok(json!({
        "content": [{ "type": "text", "text": message }],
        "structuredContent": structured,
        "_meta": widget_meta(Some(&listing_id))
    }))
}
