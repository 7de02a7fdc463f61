use anyhow::{Context, Result};
use car_listing::config::Config;
use car_listing::listing::AppState;
use car_listing::router::create_app_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,car_listing=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize application state
    let state = Arc::new(AppState::from_config(&config).context("Failed to load car catalog")?);
    tracing::info!(cars = state.catalog.len(), "catalog ready");

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use car_listing::listing::catalog::builtin_fleet;
    use car_listing::listing::state::AppState;
    use car_listing::mcp::handlers::handle_tool_call;
    use car_listing::mcp::models::{BROWSE_TOOL_NAME, COMPARE_TOOL_NAME};
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_tool_calls_share_listing_session() {
        let state = AppState::with_catalog(builtin_fleet(), PathBuf::from("assets"));
        let listing_id = "main-test";

        let args = json!({
            "listingId": listing_id,
            "category": "suv",
            "sortBy": "price-low"
        });
        let result = handle_tool_call(&state, BROWSE_TOOL_NAME, args).expect("Tool call failed");
        assert_eq!(result["structuredContent"]["render"]["visibleCount"], 5);

        for car_id in ["toyota-rav4", "honda-cr-v"] {
            let args = json!({ "listingId": listing_id, "action": "toggle", "carId": car_id });
            handle_tool_call(&state, COMPARE_TOOL_NAME, args).expect("Toggle failed");
        }

        let session = state.listings.get(listing_id).unwrap();
        assert_eq!(session.controller.state().criteria.category.as_deref(), Some("suv"));
        assert_eq!(session.controller.state().comparison.len(), 2);
    }

    #[test]
    fn test_browse_call_recomputes_once() {
        let state = AppState::with_catalog(builtin_fleet(), PathBuf::from("assets"));
        let args = json!({
            "listingId": "batched",
            "category": "suv",
            "priceRange": "0-200",
            "sortBy": "price-high",
            "search": "awd",
            "page": 1
        });
        handle_tool_call(&state, BROWSE_TOOL_NAME, args).expect("Tool call failed");

        let session = state.listings.get("batched").unwrap();
        let criteria = &session.controller.state().criteria;
        assert_eq!(criteria.search_text, "awd");
        assert!(criteria.price_range.is_some());
        assert_eq!(session.controller.recomputations(), 1);
    }
}
