//! Application state for the Silamba terminal storefront and admin console.
//!
//! `App` owns the query cache, the admin session, the local studio document
//! and all UI state. Network work runs in spawned tasks that report back
//! through an MPSC channel drained once per frame by `check_background_tasks`.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use silamba_core::api::ApiClient;
use silamba_core::auth::{AdminSession, AuthError};
use silamba_core::cache::{age_display, QueryCache};
use silamba_core::config::Config;
use silamba_core::forms::{
    blank_form, ConfirmDelete, Editable, FieldKind, FormEditor, FormError, RecordForm, Submission,
};
use silamba_core::models::{
    AdPosition, Advertisement, Banner, Category, Collection, Occasion, Offer, Record, Resource,
    SubCategory,
};
use silamba_core::present::{
    active_banners, active_offers, ads_at, subcategories_for, Autoplay, Carousel, FloatingAd,
    OfferPopup, RedirectPrompt, SessionFlags, Toast, AD_ROTATION_INTERVAL,
    BANNER_AUTOPLAY_INTERVAL,
};
use silamba_core::routes::Route;
use silamba_core::store::{
    Applied, ChangeChannel, ChangeNotice, DocumentStore, FileStorage, MemoryStorage,
    StorageBackend, StoreError, StudioDocument,
};
use silamba_core::upload::ImageUploader;
use silamba_core::utils::capitalize;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

const MAX_USERNAME_LENGTH: usize = 50;

const MAX_PASSWORD_LENGTH: usize = 128;

/// Longest local path accepted by the upload prompt.
const MAX_PATH_LENGTH: usize = 512;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How often the studio document is re-read for writes made elsewhere.
const DOCUMENT_SYNC_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Categories,
    Occasions,
    Offers,
    Admin,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Home, Tab::Categories, Tab::Occasions, Tab::Offers, Tab::Admin];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Categories => "Categories",
            Tab::Occasions => "Occasions",
            Tab::Offers => "Offers",
            Tab::Admin => "Admin",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Home => Tab::Categories,
            Tab::Categories => Tab::Occasions,
            Tab::Occasions => Tab::Offers,
            Tab::Offers => Tab::Admin,
            Tab::Admin => Tab::Home,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Home => Tab::Admin,
            Tab::Categories => Tab::Home,
            Tab::Occasions => Tab::Categories,
            Tab::Offers => Tab::Occasions,
            Tab::Admin => Tab::Offers,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    LoggingIn,
    EditingForm,
    UploadingImage,
    ConfirmingDelete,
    ConfirmingRedirect,
    ShowingOffer,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Full-screen page shown in place of the current tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    About,
    Contact,
    /// `title` names what was missing, `path` is what was asked for.
    NotFound { title: String, path: String },
}

impl Page {
    fn not_found(title: &str, path: String) -> Self {
        Page::NotFound {
            title: title.to_string(),
            path,
        }
    }
}

/// Where a storefront route points in the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Category(usize),
    SubCategories(usize),
    Occasion(usize),
    /// The collection it needs has not arrived yet.
    Waiting,
    Missing,
    /// Not a route into the catalog data.
    Elsewhere,
}

/// Resolve a storefront route against the loaded collections. `loaded`
/// says whether a collection has been fetched successfully.
pub fn locate_route(
    route: &Route,
    categories: &[Category],
    occasions: &[Occasion],
    loaded: impl Fn(Resource) -> bool,
) -> RouteTarget {
    let (found, resource, wrap): (Option<usize>, Resource, fn(usize) -> RouteTarget) = match route {
        Route::Category { slug } => (
            categories
                .iter()
                .position(|c| c.matches_slug(slug) || &c.id == slug),
            Resource::Categories,
            RouteTarget::Category,
        ),
        Route::SubCategories { category_id } => (
            categories.iter().position(|c| &c.id == category_id),
            Resource::Categories,
            RouteTarget::SubCategories,
        ),
        Route::Occasion { slug } => (
            occasions
                .iter()
                .position(|o| o.slug.as_deref() == Some(slug.as_str()) || &o.id == slug),
            Resource::Occasions,
            RouteTarget::Occasion,
        ),
        _ => return RouteTarget::Elsewhere,
    };
    match found {
        Some(index) => wrap(index),
        None if loaded(resource) => RouteTarget::Missing,
        None => RouteTarget::Waiting,
    }
}

/// The local studio document plus its change subscription.
struct LocalDocument {
    store: DocumentStore,
    rx: broadcast::Receiver<ChangeNotice>,
    next_sync: Instant,
}

/// One row of the admin record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub id: String,
    pub label: String,
    pub detail: String,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from spawned tasks back to the main loop.
enum RefreshResult {
    Banners(Vec<Banner>),
    Categories(Vec<Category>),
    SubCategories(Vec<SubCategory>),
    Occasions(Vec<Occasion>),
    Offers(Vec<Offer>),
    /// The single promo banner behind the once-per-session popup
    PromoBanner(Option<Banner>),
    /// A refetch failed but the previous copy is still shown
    StaleData { resource: Resource, message: String },
    FetchFailed { resource: Resource, message: String },
    Saved { resource: Resource, message: String },
    SaveFailed { message: String },
    Uploaded { key: String, url: String },
    UploadFailed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub cache: Arc<QueryCache<ApiClient>>,
    pub session: AdminSession,
    pub session_flags: SessionFlags,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Selection indices
    pub category_selection: usize,
    pub subcategory_selection: usize,
    pub occasion_selection: usize,
    pub offer_selection: usize,
    pub admin_collection: Collection,
    pub admin_selection: usize,

    // Catalog data
    pub banners: Vec<Banner>,
    pub categories: Vec<Category>,
    pub subcategories: Vec<SubCategory>,
    pub occasions: Vec<Occasion>,
    pub offers: Vec<Offer>,
    pub promo_banner: Option<Banner>,
    /// Placement ads from the local studio document
    pub advertisements: Vec<Advertisement>,
    pub loading: HashSet<Resource>,
    pub errors: HashMap<Resource, String>,
    pub last_updated: Option<DateTime<Utc>>,
    document: Option<LocalDocument>,

    // Presentation state
    pub page: Option<Page>,
    pub banner_carousel: Carousel,
    banner_autoplay: Autoplay,
    ad_carousels: HashMap<AdPosition, Carousel>,
    ad_autoplay: Autoplay,
    pub floating_ad: FloatingAd,
    pub offer_popup: OfferPopup,
    pub redirect: RedirectPrompt,
    pub toast: Option<Toast>,
    pub confirm_delete: ConfirmDelete,

    // Admin form state
    pub form: Option<Box<dyn FormEditor>>,
    pub form_error: Option<String>,
    pub upload_path: String,
    upload_field: Option<String>,

    /// Route requested on the command line, applied once data arrives
    pending_route: Option<Route>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    pub status_message: Option<String>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let data_dir = config
            .data_dir()
            .unwrap_or_else(|_| PathBuf::from("./silamba-data"));
        debug!(?data_dir, "Data directory configured");
        let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(data_dir)?);

        let api = ApiClient::new(config.api_base_url())?;
        info!(base_url = %api.base_url(), "Catalog server configured");
        let cache = Arc::new(QueryCache::new(api));

        let mut session = AdminSession::new(Arc::clone(&storage));
        if let Err(e) = session.load() {
            warn!(error = %e, "Failed to restore admin session");
        }

        let now = Instant::now();
        let document = Self::open_document(storage, now);
        let advertisements = document
            .as_ref()
            .and_then(|d| d.store.get().ok())
            .map(|doc| doc.advertisements.clone())
            .unwrap_or_default();

        let admin_collection = config
            .last_admin_tab
            .as_deref()
            .and_then(Collection::from_path)
            .unwrap_or(Collection::Remote(Resource::Banners));

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            cache,
            session,
            session_flags: SessionFlags::new(Arc::new(MemoryStorage::new())),

            state: AppState::Normal,
            current_tab: Tab::Home,
            focus: Focus::List,

            login_username: String::new(),
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,

            category_selection: 0,
            subcategory_selection: 0,
            occasion_selection: 0,
            offer_selection: 0,
            admin_collection,
            admin_selection: 0,

            banners: Vec::new(),
            categories: Vec::new(),
            subcategories: Vec::new(),
            occasions: Vec::new(),
            offers: Vec::new(),
            promo_banner: None,
            advertisements,
            loading: HashSet::new(),
            errors: HashMap::new(),
            last_updated: None,
            document,

            page: None,
            banner_carousel: Carousel::default(),
            banner_autoplay: Autoplay::new(BANNER_AUTOPLAY_INTERVAL, now),
            ad_carousels: HashMap::new(),
            ad_autoplay: Autoplay::new(AD_ROTATION_INTERVAL, now),
            floating_ad: FloatingAd::new(now),
            offer_popup: OfferPopup::new(),
            redirect: RedirectPrompt::default(),
            toast: None,
            confirm_delete: ConfirmDelete::default(),

            form: None,
            form_error: None,
            upload_path: String::new(),
            upload_field: None,

            pending_route: None,

            refresh_rx: rx,
            refresh_tx: tx,

            status_message: None,
        })
    }

    /// Placement ads live only in the local studio document.
    fn open_document(storage: Arc<dyn StorageBackend>, now: Instant) -> Option<LocalDocument> {
        let mut store = DocumentStore::new(storage, ChangeChannel::new());
        match store.load() {
            Ok(outcome) => {
                debug!(?outcome, "Studio document loaded");
                let rx = store.subscribe();
                Some(LocalDocument {
                    store,
                    rx,
                    next_sync: now + DOCUMENT_SYNC_INTERVAL,
                })
            }
            Err(e) => {
                warn!(error = %e, "Failed to load studio document");
                None
            }
        }
    }

    /// Pick up document writes from other windows or a `silamba doc` run.
    fn sync_document(&mut self, now: Instant) {
        let Some(document) = self.document.as_mut() else {
            return;
        };
        if now < document.next_sync {
            return;
        }
        document.next_sync = now + DOCUMENT_SYNC_INTERVAL;
        match document.store.sync(&mut document.rx) {
            Applied::Adopted => {
                info!("Studio document changed elsewhere, reloading advertisements");
                self.reload_advertisements();
            }
            Applied::Rejected { reason } => debug!(%reason, "Kept current studio document"),
            _ => {}
        }
    }

    fn reload_advertisements(&mut self) {
        if let Some(doc) = self.document.as_ref().and_then(|d| d.store.get().ok()) {
            self.advertisements = doc.advertisements.clone();
        }
        self.clamp_selections();
    }

    /// Edit and persist the studio document, then refresh the ads shown.
    fn edit_document(&mut self, edit: impl FnOnce(&mut StudioDocument)) -> Result<(), StoreError> {
        let document = self.document.as_mut().ok_or(StoreError::NotLoaded)?;
        document.store.update(edit)?;
        self.reload_advertisements();
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn switch_tab(&mut self, tab: Tab) {
        self.focus = Focus::List;
        self.page = None;
        if tab == Tab::Admin && !self.session.is_authenticated() {
            self.current_tab = Tab::Admin;
            self.start_login();
            return;
        }
        self.current_tab = tab;
    }

    /// Route describing what is on screen, shown in the title bar.
    pub fn current_route(&self) -> Route {
        match self.page {
            Some(Page::About) => return Route::About,
            Some(Page::Contact) => return Route::Contact,
            Some(Page::NotFound { ref path, .. }) => return Route::NotFound(path.clone()),
            None => {}
        }
        match self.current_tab {
            Tab::Home => Route::Home,
            Tab::Categories => match self.selected_category() {
                Some(category) if self.focus == Focus::Detail => Route::SubCategories {
                    category_id: category.id.clone(),
                },
                Some(category) => Route::Category {
                    slug: category.slug.clone().unwrap_or_else(|| category.id.clone()),
                },
                None => Route::Products,
            },
            Tab::Occasions => match self.occasions.get(self.occasion_selection) {
                Some(occasion) => Route::Occasion {
                    slug: occasion.slug.clone().unwrap_or_else(|| occasion.id.clone()),
                },
                None => Route::Home,
            },
            Tab::Offers => Route::Home,
            Tab::Admin if !self.session.is_authenticated() => Route::AdminLogin,
            Tab::Admin => Route::Admin(self.admin_collection),
        }
    }

    /// Jump to a route given on the command line.
    pub fn open_route(&mut self, route: Route) {
        match route {
            Route::Home => self.switch_tab(Tab::Home),
            Route::About => {
                self.switch_tab(Tab::Home);
                self.page = Some(Page::About);
            }
            Route::Contact => {
                self.switch_tab(Tab::Home);
                self.page = Some(Page::Contact);
            }
            Route::Products => self.switch_tab(Tab::Categories),
            Route::Category { .. } | Route::SubCategories { .. } => {
                self.switch_tab(Tab::Categories);
                self.pending_route = Some(route);
                self.apply_pending_route();
            }
            Route::Occasion { .. } => {
                self.switch_tab(Tab::Occasions);
                self.pending_route = Some(route);
                self.apply_pending_route();
            }
            Route::AdminLogin | Route::AdminDashboard => self.switch_tab(Tab::Admin),
            Route::Admin(collection) => {
                self.admin_collection = collection;
                self.switch_tab(Tab::Admin);
            }
            Route::NotFound(path) => {
                self.switch_tab(Tab::Home);
                self.page = Some(Page::not_found("Page Not Found", path));
            }
        }
    }

    /// Leave a full-screen page for the storefront home.
    pub fn close_page(&mut self) {
        if self.page.take().is_some() {
            self.current_tab = Tab::Home;
        }
    }

    /// A failed fetch leaves the route pending so the error shows instead
    /// of a not-found page.
    fn has_loaded(&self, resource: Resource) -> bool {
        !self.loading.contains(&resource) && self.cache.status(resource).cached_at.is_some()
    }

    fn apply_pending_route(&mut self) {
        let Some(route) = self.pending_route.clone() else {
            return;
        };
        let target = locate_route(&route, &self.categories, &self.occasions, |r| self.has_loaded(r));
        match target {
            RouteTarget::Waiting => return,
            RouteTarget::Category(i) => self.category_selection = i,
            RouteTarget::SubCategories(i) => {
                self.category_selection = i;
                self.focus = Focus::Detail;
            }
            RouteTarget::Occasion(i) => self.occasion_selection = i,
            RouteTarget::Missing => {
                let title = match route {
                    Route::Occasion { .. } => "Occasion Not Found",
                    _ => "Category Not Found",
                };
                info!(path = %route, "Requested page does not exist");
                self.page = Some(Page::not_found(title, route.path()));
            }
            RouteTarget::Elsewhere => {}
        }
        self.pending_route = None;
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    pub fn attempt_login(&mut self) {
        if self.login_username.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }
        match self.session.login(&self.login_username, &self.login_password) {
            Ok(()) => {
                self.login_password.clear();
                self.login_error = None;
                self.state = AppState::Normal;
                self.current_tab = Tab::Admin;
                self.toast = Some(Toast::success("Successfully logged in to admin portal.", Instant::now()));
            }
            Err(AuthError::InvalidCredentials) => {
                self.login_password.clear();
                self.login_error = Some("Invalid username or password".to_string());
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(format!("Login failed: {}", e));
            }
        }
    }

    pub fn cancel_login(&mut self) {
        self.login_password.clear();
        self.state = AppState::Normal;
        if !self.session.is_authenticated() {
            self.current_tab = Tab::Home;
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to clear admin flag");
        }
        self.current_tab = Tab::Home;
        self.status_message = Some("Logged out".to_string());
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Fetch every collection plus the promo banner.
    pub fn refresh_all_background(&mut self) {
        info!("Starting background refresh of all collections");
        for resource in Resource::ALL {
            self.refresh_resource(resource);
        }
        self.spawn_promo_fetch();
        self.status_message = Some("Loading catalog...".to_string());
    }

    /// Drop every cached collection and fetch again.
    pub fn force_refresh(&mut self) {
        self.cache.clear();
        self.refresh_all_background();
    }

    pub fn refresh_resource(&mut self, resource: Resource) {
        match resource {
            Resource::Banners => self.spawn_fetch::<Banner>(RefreshResult::Banners),
            Resource::Categories => self.spawn_fetch::<Category>(RefreshResult::Categories),
            Resource::SubCategories => self.spawn_fetch::<SubCategory>(RefreshResult::SubCategories),
            Resource::Occasions => self.spawn_fetch::<Occasion>(RefreshResult::Occasions),
            Resource::Offers => self.spawn_fetch::<Offer>(RefreshResult::Offers),
        }
    }

    fn spawn_fetch<T: Record>(&mut self, wrap: fn(Vec<T>) -> RefreshResult) {
        let resource = T::RESOURCE;
        self.loading.insert(resource);
        let cache = Arc::clone(&self.cache);
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match cache.get::<T>().await {
                Ok(query) => {
                    if let Some(err) = query.error {
                        let message = err.to_string();
                        Self::send_result(&tx, RefreshResult::StaleData { resource, message }).await;
                    }
                    Self::send_result(&tx, wrap(query.data)).await;
                }
                Err(e) => {
                    let message = e.to_string();
                    Self::send_result(&tx, RefreshResult::FetchFailed { resource, message }).await;
                }
            }
        });
    }

    fn spawn_promo_fetch(&self) {
        let cache = Arc::clone(&self.cache);
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match cache.source().get_banner().await {
                Ok(banner) => Self::send_result(&tx, RefreshResult::PromoBanner(banner)).await,
                // Not every server exposes the singular endpoint.
                Err(e) => debug!(error = %e, "No promo banner available"),
            }
        });
    }

    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_refresh_result(result);
        }
    }

    fn process_refresh_result(&mut self, result: RefreshResult) {
        let now = Instant::now();
        match result {
            RefreshResult::Banners(data) => {
                self.banners = data;
                self.finish_load(Resource::Banners);
            }
            RefreshResult::Categories(data) => {
                self.categories = data;
                self.finish_load(Resource::Categories);
            }
            RefreshResult::SubCategories(data) => {
                self.subcategories = data;
                self.finish_load(Resource::SubCategories);
            }
            RefreshResult::Occasions(data) => {
                self.occasions = data;
                self.finish_load(Resource::Occasions);
            }
            RefreshResult::Offers(data) => {
                self.offers = data;
                self.finish_load(Resource::Offers);
            }
            RefreshResult::PromoBanner(banner) => {
                self.offer_popup
                    .arm(banner.as_ref(), &self.session_flags, now);
                self.promo_banner = banner;
            }
            RefreshResult::StaleData { resource, message } => {
                warn!(%resource, %message, "Showing cached data after failed refetch");
                self.status_message = Some(format!(
                    "Showing cached {}: {}",
                    resource.display_name().to_lowercase(),
                    message
                ));
                self.errors.insert(resource, message);
            }
            RefreshResult::FetchFailed { resource, message } => {
                self.loading.remove(&resource);
                self.status_message = Some(format!(
                    "Failed to load {}: {}",
                    resource.display_name().to_lowercase(),
                    message
                ));
                self.errors.insert(resource, message);
            }
            RefreshResult::Saved { resource, message } => {
                self.toast = Some(Toast::success(message, now));
                self.status_message = None;
                self.refresh_resource(resource);
            }
            RefreshResult::SaveFailed { message } => {
                self.toast = Some(Toast::error(message, now));
                self.status_message = None;
            }
            RefreshResult::Uploaded { key, url } => {
                if let Some(form) = self.form.as_mut() {
                    form.set_value(&key, url);
                }
                self.toast = Some(Toast::success("Image uploaded and optimized", now));
            }
            RefreshResult::UploadFailed(message) => {
                self.toast = Some(Toast::error(message, now));
            }
        }
    }

    fn finish_load(&mut self, resource: Resource) {
        self.loading.remove(&resource);
        if self.cache.status(resource).last_error.is_none() {
            self.errors.remove(&resource);
        }
        self.last_updated = Some(Utc::now());
        if self.loading.is_empty() && self.errors.is_empty() {
            self.status_message = None;
        }
        self.clamp_selections();
        self.apply_pending_route();
    }

    fn clamp_selections(&mut self) {
        fn clamp(selection: &mut usize, len: usize) {
            if *selection >= len {
                *selection = len.saturating_sub(1);
            }
        }
        let categories = self.categories.len();
        clamp(&mut self.category_selection, categories);
        let subcategories = self.selected_subcategories().len();
        clamp(&mut self.subcategory_selection, subcategories);
        let occasions = self.occasions.len();
        clamp(&mut self.occasion_selection, occasions);
        let offers = self.visible_offers().len();
        clamp(&mut self.offer_selection, offers);
        let rows = self.admin_rows().len();
        clamp(&mut self.admin_selection, rows);
    }

    /// Age of the oldest cached collection, for the status bar.
    pub fn cache_age(&self) -> String {
        Resource::ALL
            .iter()
            .filter_map(|r| self.cache.status(*r).cached_at)
            .min()
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }

    // =========================================================================
    // Timed presentation state
    // =========================================================================

    /// Advance carousels, open the promo popup and expire toasts.
    pub fn tick(&mut self, now: Instant) {
        let banners = self.active_banner_list().len();
        self.banner_carousel.set_len(banners);
        let paused = self.current_tab != Tab::Home;
        if self.banner_autoplay.is_paused() != paused {
            self.banner_autoplay.set_paused(paused, now);
        }
        self.banner_autoplay.drive(&mut self.banner_carousel, now);

        for position in AdPosition::ALL {
            let len = self.ads_in(position).len();
            self.ad_carousels.entry(position).or_default().set_len(len);
        }
        if self.ad_autoplay.due(now) {
            for carousel in self.ad_carousels.values_mut() {
                carousel.tick();
            }
        }

        self.sync_document(now);

        self.offer_popup.tick(now);
        if self.offer_popup.is_open()
            && self.state == AppState::Normal
            && self.current_tab != Tab::Admin
        {
            self.state = AppState::ShowingOffer;
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    pub fn next_banner(&mut self, forward: bool) {
        if forward {
            self.banner_carousel.tick();
        } else {
            self.banner_carousel.prev();
        }
        self.banner_autoplay.restart(Instant::now());
    }

    pub fn dismiss_offer(&mut self) {
        self.offer_popup.dismiss(&self.session_flags);
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Outbound links
    // =========================================================================

    /// Ask before leaving for an external link.
    pub fn open_link(&mut self, label: &str, url: &str) {
        if url.trim().is_empty() {
            self.status_message = Some(format!("{} has no link", label));
            return;
        }
        self.redirect.open(label, url);
        self.state = AppState::ConfirmingRedirect;
    }

    pub fn confirm_redirect(&mut self) {
        self.state = AppState::Normal;
        if let Some(url) = self.redirect.confirm() {
            match open_in_browser(&url) {
                Ok(()) => self.status_message = Some(format!("Opened {}", url)),
                Err(e) => {
                    warn!(error = %e, %url, "Failed to launch browser");
                    self.status_message = Some(format!("Open manually: {}", url));
                }
            }
        }
    }

    pub fn cancel_redirect(&mut self) {
        self.redirect.cancel();
        self.state = AppState::Normal;
    }

    /// Follow the link of whatever is selected on the current tab.
    pub fn activate_selection(&mut self) {
        let target = match self.current_tab {
            Tab::Home => self
                .banner_carousel
                .current(&self.active_banner_list())
                .filter(|b| b.has_cta())
                .map(|b| (b.title.clone(), b.cta_link.clone())),
            Tab::Categories if self.focus == Focus::List => {
                self.focus = Focus::Detail;
                self.subcategory_selection = 0;
                None
            }
            Tab::Categories => self
                .selected_subcategories()
                .get(self.subcategory_selection)
                .map(|s| (s.name.clone(), s.external_url.clone())),
            Tab::Occasions => self
                .occasions
                .get(self.occasion_selection)
                .map(|o| (o.name.clone(), o.outbound_link().unwrap_or_default().to_string())),
            Tab::Offers => self
                .visible_offers()
                .get(self.offer_selection)
                .map(|o| (o.title.clone(), o.link.clone())),
            Tab::Admin => {
                self.open_edit_form();
                None
            }
        };
        if let Some((label, url)) = target {
            self.open_link(&label, &url);
        }
    }

    // =========================================================================
    // Storefront views
    // =========================================================================

    pub fn active_banner_list(&self) -> Vec<&Banner> {
        active_banners(&self.banners)
    }

    pub fn visible_offers(&self) -> Vec<&Offer> {
        active_offers(&self.offers)
    }

    pub fn ads_in(&self, position: AdPosition) -> Vec<&Advertisement> {
        ads_at(&self.advertisements, position)
    }

    /// The ad currently rotated into `position`, with its 1-based place
    /// among the slot's ads.
    pub fn slot_ad(&self, position: AdPosition) -> Option<(&Advertisement, usize, usize)> {
        let ads = self.ads_in(position);
        let index = self.ad_carousels.get(&position).map_or(0, Carousel::index);
        let index = if index < ads.len() { index } else { 0 };
        ads.get(index).map(|ad| (*ad, index + 1, ads.len()))
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.categories.get(self.category_selection)
    }

    /// Sub-categories of the selected category. Categories that carry their
    /// children inline (older data) fall back to those.
    pub fn selected_subcategories(&self) -> Vec<&SubCategory> {
        let Some(category) = self.selected_category() else {
            return Vec::new();
        };
        let linked = subcategories_for(&self.subcategories, &category.id);
        if linked.is_empty() {
            category.subcategories.iter().collect()
        } else {
            linked
        }
    }

    pub fn category_name(&self, id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Length of the list the arrow keys currently move through.
    pub fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Home => 0,
            Tab::Categories if self.focus == Focus::Detail => self.selected_subcategories().len(),
            Tab::Categories => self.categories.len(),
            Tab::Occasions => self.occasions.len(),
            Tab::Offers => self.visible_offers().len(),
            Tab::Admin => self.admin_rows().len(),
        }
    }

    pub fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Home => None,
            Tab::Categories if self.focus == Focus::Detail => Some(&mut self.subcategory_selection),
            Tab::Categories => Some(&mut self.category_selection),
            Tab::Occasions => Some(&mut self.occasion_selection),
            Tab::Offers => Some(&mut self.offer_selection),
            Tab::Admin => Some(&mut self.admin_selection),
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_list_len();
        let on_category_list = self.current_tab == Tab::Categories && self.focus == Focus::List;
        if let Some(selection) = self.current_selection_mut() {
            *selection = step(*selection, delta, len);
        }
        if on_category_list {
            self.subcategory_selection = 0;
        }
    }

    // =========================================================================
    // Admin console
    // =========================================================================

    pub fn cycle_admin_collection(&mut self, forward: bool) {
        let all = Collection::ALL;
        let index = all.iter().position(|c| *c == self.admin_collection).unwrap_or(0);
        self.admin_collection = all[step_wrapping(index, forward, all.len())];
        self.admin_selection = 0;
        self.config.last_admin_tab = Some(self.admin_collection.path().to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    pub fn admin_rows(&self) -> Vec<AdminRow> {
        fn row(id: &str, label: &str, detail: String) -> AdminRow {
            AdminRow {
                id: id.to_string(),
                label: label.to_string(),
                detail,
            }
        }
        let Some(resource) = self.admin_collection.resource() else {
            return self
                .advertisements
                .iter()
                .map(|a| {
                    let state = if a.active { "" } else { " (hidden)" };
                    row(&a.id, &a.title, format!("{}{}", a.position, state))
                })
                .collect();
        };
        match resource {
            Resource::Banners => self
                .banners
                .iter()
                .map(|b| row(&b.id, &b.title, if b.is_active { "active" } else { "hidden" }.to_string()))
                .collect(),
            Resource::Categories => self
                .categories
                .iter()
                .map(|c| {
                    let featured = if c.is_featured() { " ★" } else { "" };
                    row(&c.id, &c.name, format!("/{}{}", c.slug.as_deref().unwrap_or(&c.id), featured))
                })
                .collect(),
            Resource::SubCategories => self
                .subcategories
                .iter()
                .map(|s| {
                    let parent = self.category_name(&s.category_id).unwrap_or("(no category)");
                    row(&s.id, &s.name, parent.to_string())
                })
                .collect(),
            Resource::Occasions => self
                .occasions
                .iter()
                .map(|o| row(&o.id, &o.name, o.slug.clone().unwrap_or_default()))
                .collect(),
            Resource::Offers => self
                .offers
                .iter()
                .map(|o| {
                    let state = if o.is_active { "" } else { " (inactive)" };
                    row(&o.id, &o.title, format!("{} {}{}", o.discount, o.code_display(), state))
                })
                .collect(),
        }
    }

    pub fn open_new_form(&mut self) {
        let mut form = blank_form(self.admin_collection);
        if self.admin_collection == Collection::Remote(Resource::SubCategories) {
            if let Some(category) = self.categories.first() {
                form.set_value("categoryId", category.id.clone());
            }
        }
        self.form = Some(form);
        self.form_error = None;
        self.state = AppState::EditingForm;
    }

    pub fn open_edit_form(&mut self) {
        let index = self.admin_selection;
        let form: Option<Box<dyn FormEditor>> = match self.admin_collection {
            Collection::Remote(Resource::Banners) => edit_form(&self.banners, index),
            Collection::Remote(Resource::Categories) => edit_form(&self.categories, index),
            Collection::Remote(Resource::SubCategories) => edit_form(&self.subcategories, index),
            Collection::Remote(Resource::Occasions) => edit_form(&self.occasions, index),
            Collection::Remote(Resource::Offers) => edit_form(&self.offers, index),
            Collection::Advertisements => edit_form(&self.advertisements, index),
        };
        if let Some(form) = form {
            self.form = Some(form);
            self.form_error = None;
            self.state = AppState::EditingForm;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.form_error = None;
        self.state = AppState::Normal;
    }

    /// Step the focused category picker through the loaded categories.
    pub fn cycle_form_category(&mut self, forward: bool) {
        let ids: Vec<String> = self.categories.iter().map(|c| c.id.clone()).collect();
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let Some(spec) = form.fields().get(form.focus()) else {
            return;
        };
        if spec.kind != FieldKind::CategoryRef || ids.is_empty() {
            return;
        }
        let current = form.value_at(form.focus());
        let next = match ids.iter().position(|id| id == current) {
            Some(i) => step_wrapping(i, forward, ids.len()),
            None => 0,
        };
        form.set_value(spec.key, ids[next].clone());
    }

    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let collection = form.collection();
        let id = form.editing_id().map(str::to_string);
        match form.submit_value() {
            Ok(submission) => {
                self.form = None;
                self.form_error = None;
                self.state = AppState::Normal;
                match collection.resource() {
                    Some(resource) => {
                        self.status_message = Some("Saving...".to_string());
                        self.spawn_save(resource, id, submission);
                    }
                    None => self.save_advertisement(submission),
                }
            }
            Err(FormError::Validation(e)) => self.form_error = Some(e.to_string()),
            Err(e) => {
                error!(error = %e, "Failed to prepare record");
                self.form_error = Some(e.to_string());
            }
        }
    }

    /// Ads are written straight into the local document.
    fn save_advertisement(&mut self, submission: Submission<Value>) {
        let success = submission.success_message(Collection::Advertisements);
        let failure = submission.failure_message(Collection::Advertisements);
        let result = serde_json::from_value::<Advertisement>(submission.record().clone())
            .map_err(StoreError::from)
            .and_then(|ad| {
                self.edit_document(|doc| {
                    doc.upsert_advertisement(ad);
                })
            });
        self.finish_local_edit(result, success, failure);
    }

    fn finish_local_edit(&mut self, result: Result<(), StoreError>, success: String, failure: String) {
        let now = Instant::now();
        match result {
            Ok(()) => {
                info!(%success, "Studio document updated");
                self.status_message = Some(success.clone());
                self.toast = Some(Toast::success(success, now));
            }
            Err(e) => {
                error!(error = %e, "Studio document update failed");
                self.status_message = Some(failure.clone());
                self.toast = Some(Toast::error(failure, now));
            }
        }
    }

    /// Show or hide the selected ad without opening the form.
    pub fn toggle_selected_ad(&mut self) {
        if self.admin_collection != Collection::Advertisements {
            return;
        }
        let Some(row) = self.admin_rows().into_iter().nth(self.admin_selection) else {
            return;
        };
        let mut shown = None;
        let result = self.edit_document(|doc| shown = doc.toggle_advertisement(&row.id));
        let state = if shown == Some(true) { "shown" } else { "hidden" };
        self.finish_local_edit(
            result,
            format!("{} is now {}", row.label, state),
            "Failed to update advertisement".to_string(),
        );
    }

    fn spawn_save(&self, resource: Resource, id: Option<String>, submission: Submission<Value>) {
        let cache = Arc::clone(&self.cache);
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let success = submission.success_message(resource);
            let failure = submission.failure_message(resource);
            let result = match submission {
                Submission::Create(record) => cache.create_value(resource, record).await.map(|_| ()),
                Submission::Update(record) => {
                    let id = id.unwrap_or_default();
                    cache.update_value(resource, &id, record).await.map(|_| ())
                }
            };
            let message = match result {
                Ok(()) => RefreshResult::Saved {
                    resource,
                    message: success,
                },
                Err(e) => {
                    error!(%resource, error = %e, "Save failed");
                    RefreshResult::SaveFailed { message: failure }
                }
            };
            Self::send_result(&tx, message).await;
        });
    }

    pub fn request_delete(&mut self) {
        if let Some(row) = self.admin_rows().get(self.admin_selection) {
            self.confirm_delete
                .request(self.admin_collection, row.id.clone(), row.label.clone());
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_pending_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(target) = self.confirm_delete.confirm() else {
            return;
        };
        let Some(resource) = target.collection.resource() else {
            let result = self.edit_document(|doc| {
                doc.remove_advertisement(&target.id);
            });
            self.finish_local_edit(
                result,
                "Advertisement deleted successfully".to_string(),
                "Failed to delete advertisement".to_string(),
            );
            return;
        };
        let cache = Arc::clone(&self.cache);
        let tx = self.refresh_tx.clone();
        self.status_message = Some("Deleting...".to_string());

        tokio::spawn(async move {
            let noun = capitalize(resource.singular());
            let message = match cache.delete_value(resource, &target.id).await {
                Ok(()) => RefreshResult::Saved {
                    resource,
                    message: format!("{} deleted successfully", noun),
                },
                Err(e) => {
                    error!(%resource, id = %target.id, error = %e, "Delete failed");
                    RefreshResult::SaveFailed {
                        message: format!("Failed to delete {}", resource.singular()),
                    }
                }
            };
            Self::send_result(&tx, message).await;
        });
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete.cancel();
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Image upload
    // =========================================================================

    /// Open the path prompt when an image field is focused.
    pub fn start_upload(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let Some(spec) = form.fields().get(form.focus()) else {
            return;
        };
        if !spec.key.to_lowercase().contains("image") {
            self.form_error = Some("Uploads go into an image field".to_string());
            return;
        }
        self.upload_field = Some(spec.key.to_string());
        self.upload_path.clear();
        self.state = AppState::UploadingImage;
    }

    pub fn cancel_upload(&mut self) {
        self.upload_field = None;
        self.state = AppState::EditingForm;
    }

    pub fn submit_upload(&mut self) {
        self.state = AppState::EditingForm;
        let Some(key) = self.upload_field.take() else {
            return;
        };
        let path = PathBuf::from(self.upload_path.trim());
        let uploader = match self
            .config
            .upload_target()
            .and_then(ImageUploader::new)
        {
            Ok(uploader) => uploader,
            Err(e) => {
                self.form_error = Some(e.to_string());
                return;
            }
        };
        let tx = self.refresh_tx.clone();
        self.status_message = Some(format!("Uploading {}...", path.display()));

        tokio::spawn(async move {
            let message = match uploader.upload_file(&path).await {
                Ok(url) => RefreshResult::Uploaded { key, url },
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Upload failed");
                    RefreshResult::UploadFailed(e.to_string())
                }
            };
            Self::send_result(&tx, message).await;
        });
    }
}

fn edit_form<T: Editable>(records: &[T], index: usize) -> Option<Box<dyn FormEditor>> {
    records
        .get(index)
        .map(|r| Box::new(RecordForm::edit(r.clone())) as Box<dyn FormEditor>)
}

/// Move `selection` by `delta` within `0..len`, clamping at both ends.
pub fn step(selection: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let moved = selection as isize + delta;
    moved.clamp(0, len as isize - 1) as usize
}

fn step_wrapping(index: usize, forward: bool, len: usize) -> usize {
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

/// Hand a URL to the desktop's default opener.
fn open_in_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        std::process::Command::new("xdg-open")
    };
    command
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_path_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PATH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Home.next(), Tab::Categories);
        assert_eq!(Tab::Categories.next(), Tab::Occasions);
        assert_eq!(Tab::Occasions.next(), Tab::Offers);
        assert_eq!(Tab::Offers.next(), Tab::Admin);
        assert_eq!(Tab::Admin.next(), Tab::Home);
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Home.prev(), Tab::Admin);
        assert_eq!(Tab::Admin.prev(), Tab::Offers);
        assert_eq!(Tab::Offers.prev(), Tab::Occasions);
        assert_eq!(Tab::Occasions.prev(), Tab::Categories);
        assert_eq!(Tab::Categories.prev(), Tab::Home);
    }

    #[test]
    fn test_step_clamps() {
        assert_eq!(step(0, -1, 5), 0);
        assert_eq!(step(4, 1, 5), 4);
        assert_eq!(step(2, PAGE_SCROLL_SIZE as isize, 5), 4);
        assert_eq!(step(3, 1, 0), 0);
    }

    #[test]
    fn test_step_wrapping() {
        assert_eq!(step_wrapping(2, true, 3), 0);
        assert_eq!(step_wrapping(0, false, 3), 2);
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_path_char() {
        assert!(can_add_path_char(0, '/'));
        assert!(can_add_path_char(0, ' '));
        assert!(!can_add_path_char(MAX_PATH_LENGTH, 'a'));
        assert!(!can_add_path_char(0, '\t'));
    }

    fn category(id: &str, slug: &str) -> Category {
        Category {
            id: id.to_string(),
            name: slug.to_string(),
            slug: Some(slug.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_locate_route_finds_loaded_category() {
        let categories = vec![category("1", "albums"), category("2", "frames")];
        let route = Route::parse("/category/frames");
        assert_eq!(
            locate_route(&route, &categories, &[], |_| true),
            RouteTarget::Category(1)
        );
        let route = Route::parse("/subcategories/1");
        assert_eq!(
            locate_route(&route, &categories, &[], |_| true),
            RouteTarget::SubCategories(0)
        );
    }

    #[test]
    fn test_locate_route_waits_then_reports_missing() {
        let route = Route::parse("/category/does-not-exist");
        assert_eq!(
            locate_route(&route, &[], &[], |_| false),
            RouteTarget::Waiting
        );
        let categories = vec![category("1", "albums")];
        assert_eq!(
            locate_route(&route, &categories, &[], |r| r == Resource::Categories),
            RouteTarget::Missing
        );
        let route = Route::parse("/occasion/diwali");
        assert_eq!(
            locate_route(&route, &categories, &[], |r| r == Resource::Categories),
            RouteTarget::Waiting
        );
        assert_eq!(
            locate_route(&Route::About, &categories, &[], |_| false),
            RouteTarget::Elsewhere
        );
    }

    #[test]
    fn test_not_found_page_title() {
        let page = Page::not_found("Category Not Found", "/category/x".to_string());
        assert_eq!(
            page,
            Page::NotFound {
                title: "Category Not Found".to_string(),
                path: "/category/x".to_string(),
            }
        );
    }
}
