//! Application state: the single owner of session, catalog, filters,
//! results and bucket.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use sift_cache::{Cache, Credentials, SessionStore};
use tracing::{debug, warn};

use crate::api::Api;
use crate::bucket::{
    BucketItem, BucketManager, BucketOutcome, BucketVariant, DurableBucket, RemoteBucket,
};
use crate::catalog::{CategorySchemaStore, CategorySelection, CheckAllState};
use crate::ids::CategoryId;
use crate::notice::Notice;
use crate::search::{compose, on_result, FilterStateEngine, FilterValue, ResultRecord, SearchOutcome};
use crate::sequence::SequenceGuard;
use crate::session::{SessionManager, SessionStatus};
use crate::SiftError;

/// Which screen the front end should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Authentication,
    Search,
}

/// Application state store.
///
/// All methods take `&self`; locks are never held across an await, so
/// operations may overlap. Responses to superseded category and search
/// requests are dropped.
pub struct AppState<A: Api + 'static> {
    api: Arc<A>,
    cache: Cache,
    variant: BucketVariant,
    session: SessionManager,
    view: Mutex<View>,
    catalog: RwLock<Arc<CategorySchemaStore>>,
    selection: Mutex<CategorySelection>,
    filters: Mutex<FilterStateEngine>,
    results: Mutex<Vec<ResultRecord>>,
    bucket: RwLock<Option<Arc<BucketManager>>>,
    notices: Mutex<Vec<Notice>>,
    category_seq: SequenceGuard,
    search_seq: SequenceGuard,
}

impl<A: Api + 'static> AppState<A> {
    /// Create the store. Durable slots (session and offline bucket) live
    /// in `cache`.
    pub fn new(api: Arc<A>, cache: Cache, variant: BucketVariant) -> Self {
        let session = SessionManager::new(api.clone(), SessionStore::new(cache.clone()));
        Self {
            api,
            cache,
            variant,
            session,
            view: Mutex::new(View::Authentication),
            catalog: RwLock::new(Arc::new(CategorySchemaStore::default())),
            selection: Mutex::new(CategorySelection::new()),
            filters: Mutex::new(FilterStateEngine::new()),
            results: Mutex::new(Vec::new()),
            bucket: RwLock::new(None),
            notices: Mutex::new(Vec::new()),
            category_seq: SequenceGuard::new(),
            search_seq: SequenceGuard::new(),
        }
    }

    /// Restore a persisted session and, if valid, load categories and bucket.
    pub async fn start(&self) -> Result<View, SiftError> {
        match self.session.restore().await {
            Ok(SessionStatus::Authenticated(_)) => self.enter_search().await,
            Ok(SessionStatus::Expired) => {
                self.reset();
                self.notify(Notice::info("Session expired"));
                Ok(View::Authentication)
            }
            Ok(SessionStatus::LoggedOut) => {
                self.reset();
                Ok(View::Authentication)
            }
            Err(e) => {
                self.notify(Notice::for_error(&e));
                Err(e)
            }
        }
    }

    /// Log in, then load categories and bucket.
    pub async fn login(
        &self,
        username: &str,
        organization: &str,
        password: &str,
        remember: bool,
    ) -> Result<Credentials, SiftError> {
        let credentials = self
            .session
            .login(username, organization, password, remember)
            .await
            .inspect_err(|e| self.notify(Notice::for_error(e)))?;
        self.enter_search().await?;
        Ok(credentials)
    }

    /// Log out and drop all session-bound state.
    pub async fn logout(&self) -> Result<(), SiftError> {
        self.session.logout().await?;
        self.reset();
        Ok(())
    }

    async fn enter_search(&self) -> Result<View, SiftError> {
        let token = self.session.require_token()?;
        let manager = Arc::new(self.build_bucket(&token));
        *self.bucket.write() = Some(manager.clone());

        manager.load().await.map_err(|e| self.handle_failure(e))?;
        self.load_categories().await?;
        *self.view.lock() = View::Search;
        Ok(View::Search)
    }

    fn build_bucket(&self, token: &str) -> BucketManager {
        match self.variant {
            BucketVariant::Offline => BucketManager::new(DurableBucket::new(self.cache.clone())),
            BucketVariant::Remote => BucketManager::new(RemoteBucket::new(self.api.clone(), token)),
        }
    }

    fn reset(&self) {
        *self.view.lock() = View::Authentication;
        *self.catalog.write() = Arc::new(CategorySchemaStore::default());
        self.selection.lock().clear();
        self.filters.lock().reset();
        self.results.lock().clear();
        *self.bucket.write() = None;
    }

    /// Fetch category schemas, replacing the current store.
    pub async fn load_categories(&self) -> Result<Arc<CategorySchemaStore>, SiftError> {
        let token = self.session.require_token()?;
        let ticket = self.category_seq.issue();
        let response = self.api.get_categories(&token).await;

        if !self.category_seq.is_current(ticket) {
            debug!(?ticket, "discarding superseded categories response");
            return Ok(self.catalog());
        }
        let store = Arc::new(
            CategorySchemaStore::from_response(response).map_err(|e| self.handle_failure(e))?,
        );
        *self.catalog.write() = store.clone();
        Ok(store)
    }

    /// The current category store.
    pub fn catalog(&self) -> Arc<CategorySchemaStore> {
        self.catalog.read().clone()
    }

    /// Scope searches to a category.
    pub fn select_category(&self, id: &str) -> Result<(), SiftError> {
        if !self.catalog.read().contains(id) {
            return Err(SiftError::CategoryNotFound(id.to_string()));
        }
        self.selection.lock().select(id);
        Ok(())
    }

    /// Unscope a category. Its filter values are kept.
    pub fn deselect_category(&self, id: &str) -> bool {
        self.selection.lock().deselect(id)
    }

    /// Scope searches to every known category.
    pub fn select_all_categories(&self) {
        let catalog = self.catalog();
        self.selection.lock().select_all(&catalog);
    }

    /// Selected category ids.
    pub fn selected_categories(&self) -> Vec<CategoryId> {
        self.selection.lock().selected().to_vec()
    }

    /// State of the "select all" control.
    pub fn check_all_state(&self) -> CheckAllState {
        let catalog = self.catalog();
        self.selection.lock().check_all_state(&catalog)
    }

    /// Set a filter from a JSON value, interpreted against the filter's type.
    ///
    /// Shapes that do not match the type are stored verbatim.
    pub fn set_filter(
        &self,
        category: &str,
        filter: &str,
        raw: Value,
    ) -> Result<FilterValue, SiftError> {
        let catalog = self.catalog();
        let schema = catalog
            .get(category)
            .ok_or_else(|| SiftError::CategoryNotFound(category.to_string()))?
            .filter(filter)
            .ok_or_else(|| SiftError::FilterNotFound {
                category: category.to_string(),
                filter: filter.to_string(),
            })?;

        let value = FilterValue::from_json(&schema.kind, raw);
        if !value.conforms_to(&schema.kind) {
            warn!(category, filter, kind = %schema.kind, "filter value does not match its type");
        }
        self.set_filter_value(category, filter, value.clone());
        Ok(value)
    }

    /// Store a typed filter value.
    pub fn set_filter_value(&self, category: &str, filter: &str, value: FilterValue) {
        self.filters.lock().set_filter_value(category, filter, value);
    }

    /// Snapshot of the filter engine.
    pub fn filters(&self) -> FilterStateEngine {
        self.filters.lock().clone()
    }

    /// Run a search over the selected categories with the stored filters.
    ///
    /// Returns `None` when a later search was issued before this one
    /// answered.
    pub async fn search(&self, text: &str) -> Result<Option<SearchOutcome>, SiftError> {
        let token = self.session.require_token()?;
        let query = {
            let selection = self.selection.lock();
            let filters = self.filters.lock();
            compose(text, selection.selected(), filters.state())
        };

        let ticket = self.search_seq.issue();
        let response = self.api.search(&token, &query).await;
        if !self.search_seq.is_current(ticket) {
            debug!(?ticket, "discarding superseded search response");
            return Ok(None);
        }

        let outcome = on_result(response, &self.catalog());
        match &outcome {
            SearchOutcome::Matches(records) => {
                *self.results.lock() = records.clone();
                self.notify(Notice::info("Search completed"));
            }
            SearchOutcome::NoMatches => {
                self.results.lock().clear();
                self.notify(Notice::info("Nothing found"));
            }
            SearchOutcome::Failed(e) if e.is_auth_failure() => {
                self.expire_session();
            }
            SearchOutcome::Failed(_) => {
                self.notify(Notice::error("Search failed"));
            }
        }
        Ok(Some(outcome))
    }

    /// Records of the last applied search.
    pub fn results(&self) -> Vec<ResultRecord> {
        self.results.lock().clone()
    }

    /// The bucket of the current session.
    pub fn bucket(&self) -> Result<Arc<BucketManager>, SiftError> {
        self.bucket.read().clone().ok_or(SiftError::LoggedOut)
    }

    /// Add a document to the bucket.
    pub async fn add_to_bucket(&self, item: BucketItem) -> Result<BucketOutcome, SiftError> {
        let manager = self.bucket()?;
        let outcome = manager.add(item).await.map_err(|e| self.handle_failure(e))?;
        self.notify(Notice::for_bucket(outcome));
        Ok(outcome)
    }

    /// Remove a document from the bucket.
    pub async fn remove_from_bucket(&self, item: &BucketItem) -> Result<BucketOutcome, SiftError> {
        let manager = self.bucket()?;
        let outcome = manager
            .remove(item)
            .await
            .map_err(|e| self.handle_failure(e))?;
        self.notify(Notice::for_bucket(outcome));
        Ok(outcome)
    }

    /// Empty the bucket.
    pub async fn clear_bucket(&self) -> Result<BucketOutcome, SiftError> {
        let manager = self.bucket()?;
        let outcome = manager.clear().await.map_err(|e| self.handle_failure(e))?;
        self.notify(Notice::for_bucket(outcome));
        Ok(outcome)
    }

    /// The screen to show.
    pub fn view(&self) -> View {
        *self.view.lock()
    }

    /// The logged-in user.
    pub fn credentials(&self) -> Option<Credentials> {
        self.session.credentials()
    }

    /// Take all pending notices.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    fn notify(&self, notice: Notice) {
        debug!(level = ?notice.level, message = %notice.message, "notice");
        self.notices.lock().push(notice);
    }

    fn expire_session(&self) {
        if let Err(e) = self.session.invalidate() {
            warn!(error = %e, "failed to clear stored session");
        }
        self.reset();
        self.notify(Notice::info("Session expired"));
    }

    fn handle_failure(&self, error: SiftError) -> SiftError {
        if error.is_auth_failure() {
            self.expire_session();
        } else {
            self.notify(Notice::for_error(&error));
        }
        error
    }
}
