//! REST API handlers for car listing operations
//!
//! Every endpoint addresses a listing session by `listingId`. A command
//! without one starts a new session; read-only views without one answer
//! from the default state and store nothing.

use super::{
    catalog,
    compare::ComparisonSet,
    debounce::DebounceTicket,
    helpers::*,
    models::*,
    state::{project, ListingUpdate, SharedState},
};
use crate::error::ListingError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Creates routes for listing-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/listing/command", post(dispatch_command))
        .route("/listing/view", post(view_listing))
        .route("/listing/categories", post(list_categories))
        .route("/listing/details", post(car_details))
        .route("/compare/view", post(view_comparison))
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        let status = match &self {
            ListingError::Rejected(_) => StatusCode::CONFLICT,
            ListingError::InsufficientSelection { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ListingError::UnknownItem(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            reason: self.reason().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Endpoint: POST /listing/command
/// Applies one listing command and returns what changed.
async fn dispatch_command(
    State(state): State<SharedState>,
    Json(payload): Json<CommandInput>,
) -> Result<Json<CommandResponse>, ListingError> {
    let listing_id = get_or_create_listing_id(payload.listing_id);

    let update = state.with_listing(&listing_id, |session| {
        let update = session.controller.apply(payload.command, Instant::now())?;

        if let ListingUpdate::SearchScheduled(ticket) = &update {
            // a newer keystroke supersedes the pending timer
            if let Some(timer) = session.search_timer.take() {
                timer.abort();
            }
            session.search_timer = Some(spawn_search_timer(
                state.clone(),
                listing_id.clone(),
                *ticket,
            ));
        }

        Ok::<_, ListingError>(update)
    })?;

    let mut response = CommandResponse {
        listing_id,
        render: None,
        comparison: None,
        scheduled: false,
    };

    match update {
        ListingUpdate::Render(render) => response.render = Some(render),
        ListingUpdate::Comparison(comparison) => response.comparison = Some(comparison),
        ListingUpdate::SearchScheduled(_) => response.scheduled = true,
    }

    Ok(Json(response))
}

/// Applies the pending search for `listing_id` once the debounce window passes.
pub fn spawn_search_timer(
    state: SharedState,
    listing_id: String,
    ticket: DebounceTicket,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(SEARCH_DEBOUNCE).await;

        let Some(mut session) = state.listings.get_mut(&listing_id) else {
            return;
        };

        if let Some(render) = session.controller.fire_search(ticket) {
            tracing::debug!(
                listing_id = %listing_id,
                visible = render.visible_count,
                "debounced search applied"
            );
        }
        // still pending means a newer timer owns the slot
        if !session.controller.has_pending_search() {
            session.search_timer = None;
        }
    })
}

/// Endpoint: POST /listing/view
/// Returns the current render instruction.
async fn view_listing(
    State(state): State<SharedState>,
    Json(payload): Json<ListingIdInput>,
) -> impl IntoResponse {
    let listing_id = payload.listing_id.filter(|id| !id.is_empty());

    let render = match &listing_id {
        Some(id) => state.with_listing(id, |session| {
            session
                .controller
                .settle(Instant::now())
                .unwrap_or_else(|| session.controller.render())
        }),
        None => project(&state.catalog, &Criteria::default(), &PageState::default()),
    };

    Json(json!({
        "listingId": listing_id,
        "render": render,
    }))
}

/// Endpoint: POST /compare/view
/// Returns the comparison table, refusing selections of fewer than two cars.
async fn view_comparison(
    State(state): State<SharedState>,
    Json(payload): Json<ListingIdInput>,
) -> Result<impl IntoResponse, ListingError> {
    let listing_id = payload.listing_id.filter(|id| !id.is_empty());

    let view = match &listing_id {
        Some(id) => state.with_listing(id, |session| session.controller.comparison_view())?,
        None => ComparisonSet::new().view(&state.catalog)?,
    };

    Ok(Json(json!({
        "listingId": listing_id,
        "comparison": view,
    })))
}

/// Endpoint: POST /listing/categories
/// Returns per-category car counts for quick navigation.
async fn list_categories(State(state): State<SharedState>) -> impl IntoResponse {
    let categories = catalog::category_counts(&state.catalog)
        .into_iter()
        .map(|(category, count)| json!({ "category": category, "count": count }))
        .collect::<Vec<_>>();

    Json(json!({ "categories": categories }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsInput {
    car_id: String,
}

/// Endpoint: POST /listing/details
/// Returns one car record for the details dialog.
async fn car_details(
    State(state): State<SharedState>,
    Json(payload): Json<DetailsInput>,
) -> Result<impl IntoResponse, ListingError> {
    let car = catalog::find(&state.catalog, &payload.car_id)?;

    Ok(Json(json!({ "car": car })))
}
