//! Car Listing State Management
//!
//! `ListingState` is the single owned source of truth for criteria, paging
//! and comparison selection. `ListingController` pairs it with the shared
//! catalog and the search debouncer and routes every command through one
//! transition function, so each event runs to completion before the next.

use super::catalog;
use super::compare::ComparisonSet;
use super::debounce::{DebounceTicket, SearchDebouncer};
use super::filter::filter_indices;
use super::helpers::format_count_summary;
use super::models::*;
use super::pagination::{clamp_page, total_pages, window};
use super::sort::sort_indices;
use crate::config::Config;
use crate::error::{ListingError, Result};
use dashmap::DashMap;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tokio::task::JoinHandle;

// =============================================================================
// Listing State
// =============================================================================

/// Everything the rendered view depends on besides the catalog itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingState {
    pub criteria: Criteria,
    pub page: PageState,
    pub comparison: ComparisonSet,
}

/// Outcome of applying one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingUpdate {
    /// Criteria or page changed; re-render the list
    Render(RenderInstruction),
    /// Comparison selection changed
    Comparison(ComparisonOutput),
    /// Search text is waiting out the debounce window
    SearchScheduled(DebounceTicket),
}

/// Filters then sorts `catalog`, returning catalog positions in display order.
pub fn order(catalog: &[Car], criteria: &Criteria) -> Vec<usize> {
    let mut indices = filter_indices(catalog, criteria);
    sort_indices(catalog, &mut indices, criteria.sort_key);
    indices
}

/// Pure projection of (catalog, criteria, page) into a render instruction.
pub fn project(catalog: &[Car], criteria: &Criteria, page: &PageState) -> RenderInstruction {
    build_render(catalog, &order(catalog, criteria), page)
}

fn build_render(catalog: &[Car], ordered: &[usize], page: &PageState) -> RenderInstruction {
    let requested = i64::try_from(page.current_page).unwrap_or(i64::MAX);
    let win = window(ordered.len(), page.page_size, requested);

    RenderInstruction {
        visible_items: ordered[win.range.clone()]
            .iter()
            .map(|&i| catalog[i].clone())
            .collect(),
        current_page: win.page,
        total_pages: win.total_pages,
        total_count: catalog.len(),
        visible_count: ordered.len(),
        has_prev: win.has_prev(),
        has_next: win.has_next(),
        page_numbers: (1..=win.total_pages).collect(),
        summary: format_count_summary(ordered.len(), catalog.len()),
    }
}

// =============================================================================
// Listing Controller
// =============================================================================

#[derive(Debug, Clone)]
pub struct ListingController {
    catalog: Arc<[Car]>,
    state: ListingState,
    /// Catalog positions passing the current criteria, in display order
    ordered: Vec<usize>,
    debouncer: SearchDebouncer,
    recomputations: u64,
}

impl ListingController {
    pub fn new(catalog: Arc<[Car]>) -> Self {
        Self::with_page_size(catalog, PAGE_SIZE)
    }

    pub fn with_page_size(catalog: Arc<[Car]>, page_size: usize) -> Self {
        let state = ListingState {
            page: PageState {
                current_page: 1,
                page_size: page_size.max(1),
            },
            ..Default::default()
        };
        let ordered = order(&catalog, &state.criteria);

        Self {
            catalog,
            state,
            ordered,
            debouncer: SearchDebouncer::new(SEARCH_DEBOUNCE),
            recomputations: 0,
        }
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn catalog(&self) -> &[Car] {
        &self.catalog
    }

    /// Number of filter passes run since construction
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Applies one command. Every state transition goes through here.
    pub fn apply(&mut self, command: ListingCommand, now: Instant) -> Result<ListingUpdate> {
        tracing::debug!(?command, "applying listing command");

        let update = match command {
            ListingCommand::SetCategory { value } => {
                ListingUpdate::Render(self.set_category(value))
            }
            ListingCommand::SetPriceRange { min, max } => {
                ListingUpdate::Render(self.set_price_range(PriceRange::from_bounds(min, max)))
            }
            ListingCommand::SetPriceFilter { token } => {
                ListingUpdate::Render(self.set_price_range(PriceRange::parse(&token)))
            }
            ListingCommand::SetSortKey { key } => ListingUpdate::Render(self.set_sort_key(key)),
            ListingCommand::SetSearchText { text } => {
                ListingUpdate::SearchScheduled(self.set_search_text(text, now))
            }
            ListingCommand::GoToPage { page } => ListingUpdate::Render(self.go_to_page(page)),
            ListingCommand::NextPage => ListingUpdate::Render(self.next_page()),
            ListingCommand::PrevPage => ListingUpdate::Render(self.prev_page()),
            ListingCommand::ToggleCompare { id } => {
                ListingUpdate::Comparison(self.toggle_compare(&id)?)
            }
            ListingCommand::RemoveCompare { id } => {
                ListingUpdate::Comparison(self.remove_compare(&id))
            }
            ListingCommand::ClearCompare => ListingUpdate::Comparison(self.clear_compare()),
            ListingCommand::ResetFilters => ListingUpdate::Render(self.reset_filters()),
            ListingCommand::Browse {
                category,
                price_filter,
                sort_key,
                search_text,
                page,
            } => ListingUpdate::Render(self.browse(
                category,
                price_filter,
                sort_key,
                search_text,
                page,
            )),
        };

        Ok(update)
    }

    // -------------------------------------------------------------------------
    // Criteria
    // -------------------------------------------------------------------------

    fn set_category(&mut self, value: Option<String>) -> RenderInstruction {
        self.state.criteria.category = value.filter(|v| !v.is_empty());
        self.recompute()
    }

    fn set_price_range(&mut self, range: Option<PriceRange>) -> RenderInstruction {
        self.state.criteria.price_range = range;
        self.recompute()
    }

    fn set_sort_key(&mut self, key: SortKey) -> RenderInstruction {
        self.state.criteria.sort_key = key;
        self.recompute()
    }

    /// Queues search text; nothing is re-filtered until the window elapses.
    fn set_search_text(&mut self, text: impl Into<String>, now: Instant) -> DebounceTicket {
        self.debouncer.submit(text, now)
    }

    /// Applies pending search text if its window has elapsed at `now`.
    pub fn settle(&mut self, now: Instant) -> Option<RenderInstruction> {
        let text = self.debouncer.poll(now)?;
        Some(self.apply_search(text))
    }

    /// Applies pending search text when `ticket` is the latest submission.
    pub fn fire_search(&mut self, ticket: DebounceTicket) -> Option<RenderInstruction> {
        let text = self.debouncer.fire(ticket)?;
        Some(self.apply_search(text))
    }

    /// Applies search text immediately, discarding anything pending.
    fn apply_search(&mut self, text: impl Into<String>) -> RenderInstruction {
        self.debouncer.cancel();
        self.state.criteria.search_text = text.into();
        self.recompute()
    }

    /// Applies every present field, then re-filters once.
    fn browse(
        &mut self,
        category: Option<String>,
        price_filter: Option<String>,
        sort_key: Option<SortKey>,
        search_text: Option<String>,
        page: Option<i64>,
    ) -> RenderInstruction {
        let changed = category.is_some()
            || price_filter.is_some()
            || sort_key.is_some()
            || search_text.is_some();

        let criteria = &mut self.state.criteria;
        if let Some(category) = category {
            criteria.category = Some(category).filter(|v| !v.is_empty());
        }
        if let Some(token) = price_filter {
            criteria.price_range = PriceRange::parse(&token);
        }
        if let Some(key) = sort_key {
            criteria.sort_key = key;
        }
        if let Some(text) = search_text {
            self.debouncer.cancel();
            criteria.search_text = text;
        }

        if changed {
            self.recompute();
        }
        match page {
            Some(page) => self.go_to_page(page),
            None => self.render(),
        }
    }

    fn reset_filters(&mut self) -> RenderInstruction {
        self.debouncer.cancel();
        self.state.criteria = Criteria::default();
        self.state.page.current_page = 1;
        self.recompute()
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    fn go_to_page(&mut self, page: i64) -> RenderInstruction {
        let total = self.total_pages();
        self.state.page.current_page = clamp_page(page, total);
        self.render()
    }

    fn next_page(&mut self) -> RenderInstruction {
        let next = self.current_page_i64().saturating_add(1);
        self.go_to_page(next)
    }

    fn prev_page(&mut self) -> RenderInstruction {
        let prev = self.current_page_i64().saturating_sub(1);
        self.go_to_page(prev)
    }

    fn current_page_i64(&self) -> i64 {
        i64::try_from(self.state.page.current_page).unwrap_or(i64::MAX)
    }

    fn total_pages(&self) -> usize {
        total_pages(self.ordered.len(), self.state.page.page_size)
    }

    // -------------------------------------------------------------------------
    // Comparison
    // -------------------------------------------------------------------------

    /// Toggles `id` in the comparison set. Ids outside the catalog are refused.
    fn toggle_compare(&mut self, id: &str) -> Result<ComparisonOutput> {
        if !self.state.comparison.contains(id) {
            self.details(id)?;
        }
        if let Err(err) = self.state.comparison.toggle(id) {
            tracing::warn!(car_id = id, %err, "comparison toggle rejected");
            return Err(err);
        }
        Ok(self.comparison())
    }

    fn remove_compare(&mut self, id: &str) -> ComparisonOutput {
        self.state.comparison.remove(id);
        self.comparison()
    }

    fn clear_compare(&mut self) -> ComparisonOutput {
        self.state.comparison.clear();
        self.comparison()
    }

    pub fn comparison(&self) -> ComparisonOutput {
        ComparisonOutput {
            selected_items: self.state.comparison.snapshot(&self.catalog),
        }
    }

    pub fn comparison_view(&self) -> Result<ComparisonView> {
        self.state.comparison.view(&self.catalog)
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    pub fn render(&self) -> RenderInstruction {
        build_render(&self.catalog, &self.ordered, &self.state.page)
    }

    /// Looks up a single car for the details dialog
    pub fn details(&self, id: &str) -> Result<&Car> {
        catalog::find(&self.catalog, id)
    }

    pub fn category_counts(&self) -> Vec<(String, usize)> {
        catalog::category_counts(&self.catalog)
    }

    /// Re-runs filter and sort, then clamps the page into the new range.
    fn recompute(&mut self) -> RenderInstruction {
        self.ordered = order(&self.catalog, &self.state.criteria);
        self.recomputations += 1;

        let total = self.total_pages();
        self.state.page.current_page = self.state.page.current_page.clamp(1, total);

        tracing::debug!(
            visible = self.ordered.len(),
            page = self.state.page.current_page,
            total_pages = total,
            "listing recomputed"
        );

        self.render()
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// One browsing session: its controller plus the pending search timer, if any
#[derive(Debug)]
pub struct ListingSession {
    pub controller: ListingController,
    pub search_timer: Option<JoinHandle<()>>,
}

impl ListingSession {
    pub fn new(catalog: Arc<[Car]>) -> Self {
        Self {
            controller: ListingController::new(catalog),
            search_timer: None,
        }
    }
}

/// Core application state: the read-only catalog and per-session listings
pub struct AppState {
    /// Loaded once; every controller shares it.
    pub catalog: Arc<[Car]>,

    /// Browsing sessions, keyed by listing_id.
    /// DashMap allows concurrent access without external Mutexes.
    pub listings: DashMap<String, ListingSession>,

    /// Path to the directory containing HTML assets.
    pub assets_dir: PathBuf,
}

impl AppState {
    /// Builds state from configuration. An explicit catalog path must load cleanly.
    pub fn from_config(config: &Config) -> Result<Self> {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let assets_dir = config
            .assets_dir
            .clone()
            .unwrap_or_else(|| Self::locate_assets_directory(&current_dir));
        tracing::info!(assets_dir = %assets_dir.display(), "using assets directory");

        let cars = match &config.catalog_path {
            Some(path) => catalog::load_from_path(path)?,
            None => catalog::load_or_builtin(&assets_dir)?,
        };

        tracing::info!(cars = cars.len(), "catalog loaded");
        Ok(Self::with_catalog(cars, assets_dir))
    }

    pub fn with_catalog(cars: Vec<Car>, assets_dir: PathBuf) -> Self {
        Self {
            catalog: Arc::from(cars),
            listings: DashMap::new(),
            assets_dir,
        }
    }

    /// Runs `f` against the session for `listing_id`, creating it on first use.
    pub fn with_listing<R>(&self, listing_id: &str, f: impl FnOnce(&mut ListingSession) -> R) -> R {
        let mut session = self
            .listings
            .entry(listing_id.to_string())
            .or_insert_with(|| ListingSession::new(self.catalog.clone()));
        f(&mut session)
    }

    /// Attempts to locate the assets directory using a multi-step strategy
    fn locate_assets_directory(current_dir: &Path) -> PathBuf {
        // 1. ./assets
        // 2. ../assets (if running from a subdir)
        // 3. Fallback to "assets" relative path

        if current_dir.join("assets").exists() {
            return current_dir.join("assets");
        }

        if let Some(parent) = current_dir.parent() {
            if parent.join("assets").exists() {
                return parent.join("assets");
            }
        }

        PathBuf::from("assets")
    }

    /// Reads the car-listing.html widget or a fallback build of it
    pub async fn load_widget_html(&self) -> Result<String> {
        let primary_html_path = self.assets_dir.join("car-listing.html");
        if primary_html_path.exists() {
            return Ok(tokio::fs::read_to_string(primary_html_path).await?);
        }

        // e.g. car-listing-123.html
        let fallback_path = self.find_fallback_html_file().await?;
        Ok(tokio::fs::read_to_string(fallback_path).await?)
    }

    async fn find_fallback_html_file(&self) -> Result<PathBuf> {
        let mut entries = tokio::fs::read_dir(&self.assets_dir).await?;

        let mut fallbacks = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with("car-listing-") && name.ends_with(".html") {
                    fallbacks.push(path);
                }
            }
        }

        // lexicographically last is the latest build
        fallbacks.sort();
        fallbacks.pop().ok_or_else(|| {
            ListingError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no car-listing widget html in assets directory",
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectReason;
    use std::time::Duration;

    fn controller() -> ListingController {
        ListingController::new(Arc::from(catalog::builtin_fleet()))
    }

    fn numbered_fleet(n: usize) -> Arc<[Car]> {
        (0..n)
            .map(|i| Car {
                id: format!("car-{i}"),
                name: format!("Car {i:03}"),
                category: if i % 2 == 0 { "suv".into() } else { "compact".into() },
                price_per_day: 50 + i as u32,
                features: Vec::new(),
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_defaults() {
        let ctl = controller();
        let state = ctl.state();
        assert_eq!(state.criteria.category, None);
        assert_eq!(state.criteria.price_range, None);
        assert_eq!(state.criteria.sort_key, SortKey::NameAscending);
        assert!(state.criteria.search_text.is_empty());
        assert_eq!(state.page.current_page, 1);
        assert!(state.comparison.is_empty());

        let render = ctl.render();
        assert_eq!(render.visible_count, 14);
        assert_eq!(render.total_pages, 2);
        assert_eq!(render.visible_items.len(), 12);
        assert_eq!(render.visible_items[0].name, "Audi Q7");
        assert_eq!(render.summary, "14 of 14 cars");
    }

    #[test]
    fn test_suv_price_ascending_scenario() {
        let mut ctl = controller();
        let now = Instant::now();

        ctl.apply(ListingCommand::SetCategory { value: Some("suv".into()) }, now)
            .unwrap();
        let update = ctl
            .apply(
                ListingCommand::SetSortKey {
                    key: SortKey::PriceAscending,
                },
                now,
            )
            .unwrap();

        let render = match update {
            ListingUpdate::Render(render) => render,
            other => panic!("expected render, got {other:?}"),
        };
        assert_eq!(render.visible_count, 5);
        assert_eq!(render.total_pages, 1);
        assert!(render
            .visible_items
            .windows(2)
            .all(|w| w[0].price_per_day <= w[1].price_per_day));
        assert!(!render.has_prev && !render.has_next);
    }

    #[test]
    fn test_page_clamping() {
        let mut ctl = ListingController::with_page_size(numbered_fleet(50), 12);

        assert_eq!(ctl.go_to_page(0).current_page, 1);
        let render = ctl.go_to_page(9999);
        assert_eq!(render.current_page, 5);
        assert_eq!(render.total_pages, 5);
        assert_eq!(render.visible_items.len(), 2);

        assert_eq!(ctl.next_page().current_page, 5);
        assert_eq!(ctl.prev_page().current_page, 4);
    }

    #[test]
    fn test_filter_change_clamps_current_page() {
        let mut ctl = ListingController::with_page_size(numbered_fleet(50), 12);
        ctl.go_to_page(5);

        let render = ctl.set_category(Some("suv".into()));
        assert_eq!(render.visible_count, 25);
        assert_eq!(render.total_pages, 3);
        assert_eq!(render.current_page, 3);
        assert_eq!(ctl.state().page.current_page, 3);

        let render = ctl.set_price_range(Some(PriceRange::new(1000, None)));
        assert_eq!(render.visible_count, 0);
        assert_eq!(render.current_page, 1);
        assert_eq!(render.total_pages, 1);
    }

    #[test]
    fn test_search_debounce_recomputes_once() {
        let mut ctl = controller();
        let start = Instant::now();
        let before = ctl.recomputations();

        for (ms, text) in [(0, "e"), (100, "el"), (200, "ele")] {
            let update = ctl
                .apply(
                    ListingCommand::SetSearchText { text: text.into() },
                    start + Duration::from_millis(ms),
                )
                .unwrap();
            assert!(matches!(update, ListingUpdate::SearchScheduled(_)));
            assert!(ctl.settle(start + Duration::from_millis(ms)).is_none());
        }
        assert_eq!(ctl.recomputations(), before);

        let render = ctl.settle(start + Duration::from_millis(500)).unwrap();
        assert_eq!(ctl.recomputations(), before + 1);
        assert_eq!(ctl.state().criteria.search_text, "ele");
        // only the electric cars carry "ele" in name, category or features
        assert_eq!(render.visible_count, 2);
        assert!(ctl.settle(start + Duration::from_millis(900)).is_none());
    }

    #[test]
    fn test_comparison_cap_and_guard() {
        let mut ctl = controller();
        let now = Instant::now();

        let toggle = |id: &str| ListingCommand::ToggleCompare { id: id.into() };
        ctl.apply(toggle("porsche-911"), now).unwrap();

        let err = ctl.comparison_view().unwrap_err();
        assert!(matches!(err, ListingError::InsufficientSelection { selected: 1 }));

        ctl.apply(toggle("mini-cooper"), now).unwrap();
        ctl.apply(toggle("tesla-model-3"), now).unwrap();
        let err = ctl.apply(toggle("audi-q7"), now).unwrap_err();
        assert!(matches!(
            err,
            ListingError::Rejected(RejectReason::MaxSizeExceeded)
        ));

        let names = ctl
            .comparison()
            .selected_items
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Porsche 911", "Mini Cooper", "Tesla Model 3"]);

        let view = ctl.comparison_view().unwrap();
        assert_eq!(view.columns.len(), 3);
    }

    #[test]
    fn test_comparison_survives_filter_changes() {
        let mut ctl = controller();
        ctl.toggle_compare("porsche-911").unwrap();
        ctl.set_category(Some("family".into()));
        ctl.reset_filters();
        assert_eq!(ctl.comparison().selected_items.len(), 1);

        ctl.clear_compare();
        assert!(ctl.comparison().selected_items.is_empty());
    }

    #[test]
    fn test_unknown_car_is_refused() {
        let mut ctl = controller();
        let err = ctl.toggle_compare("delorean").unwrap_err();
        assert!(matches!(err, ListingError::UnknownItem(id) if id == "delorean"));
        assert!(ctl.state().comparison.is_empty());
    }

    #[test]
    fn test_unparseable_price_token_clears_filter() {
        let mut ctl = controller();
        let now = Instant::now();
        ctl.apply(ListingCommand::SetPriceFilter { token: "0-100".into() }, now)
            .unwrap();
        assert_eq!(ctl.render().visible_count, 4);

        ctl.apply(ListingCommand::SetPriceFilter { token: "cheap".into() }, now)
            .unwrap();
        assert_eq!(ctl.state().criteria.price_range, None);
        assert_eq!(ctl.render().visible_count, 14);
    }

    #[test]
    fn test_browse_applies_all_fields_with_one_pass() {
        let mut ctl = controller();
        let now = Instant::now();
        ctl.set_search_text("pending", now);

        let update = ctl
            .apply(
                ListingCommand::Browse {
                    category: Some("suv".into()),
                    price_filter: Some("100-+".into()),
                    sort_key: Some(SortKey::PriceAscending),
                    search_text: Some(String::new()),
                    page: Some(7),
                },
                now,
            )
            .unwrap();

        let ListingUpdate::Render(render) = update else {
            panic!("expected render");
        };
        assert_eq!(ctl.recomputations(), 1);
        assert!(!ctl.has_pending_search());
        assert_eq!(render.current_page, 1);
        let names = render
            .visible_items
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Jeep Wrangler", "Audi Q7", "Range Rover"]);
    }

    #[test]
    fn test_browse_without_criteria_does_not_refilter() {
        let mut ctl = controller();
        let update = ctl
            .apply(
                ListingCommand::Browse {
                    category: None,
                    price_filter: None,
                    sort_key: None,
                    search_text: None,
                    page: Some(2),
                },
                Instant::now(),
            )
            .unwrap();

        assert!(matches!(update, ListingUpdate::Render(r) if r.current_page == 2));
        assert_eq!(ctl.recomputations(), 0);
    }

    #[test]
    fn test_render_matches_pure_projection() {
        let mut ctl = controller();
        ctl.set_sort_key(SortKey::Popularity);
        ctl.go_to_page(2);
        let state = ctl.state().clone();
        assert_eq!(
            ctl.render(),
            project(ctl.catalog(), &state.criteria, &state.page)
        );
    }

    #[test]
    fn test_from_config_loads_or_refuses_catalog() {
        let config = Config {
            assets_dir: Some(PathBuf::from("/nonexistent/assets")),
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.catalog.len(), 14);
        assert!(state.listings.is_empty());

        let dir = std::env::temp_dir().join(format!("car-listing-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let broken = dir.join("broken.json");
        std::fs::write(&broken, "not json").unwrap();

        let config = Config {
            catalog_path: Some(broken.clone()),
            ..config
        };
        let err = AppState::from_config(&config).err().unwrap();
        assert!(matches!(err, ListingError::Json(_)));
        std::fs::remove_file(&broken).unwrap();
    }

    #[test]
    fn test_with_listing_creates_sessions_lazily() {
        let state = AppState::with_catalog(catalog::builtin_fleet(), PathBuf::from("assets"));
        let visible = state.with_listing("abc", |s| s.controller.render().visible_count);
        assert_eq!(visible, 14);
        assert_eq!(state.listings.len(), 1);
    }
}
