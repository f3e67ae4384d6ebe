//! Paginated resource view - the admin tables for users, wallets and transactions
//!
//! One state machine, instantiated per [`Resource`]. The view never patches
//! rows locally: every mutation is followed by a full reload, and every load
//! replaces the current page wholesale.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::page::MAX_PAGE_SIZE;
use crate::domain::result::{Error, Result};
use crate::domain::{Page, PageRequest, Resource, ResourceFilters, SortDirection, WalletsResource};
use crate::ports::{AdminBackend, ResourceSource};
use crate::services::fence::{LoadTicket, RequestFence};

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// The backend call a load resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCall<F> {
    List { request: PageRequest, filters: F },
    Search { query: String, request: PageRequest },
}

/// A load that has been issued but not yet applied
#[derive(Debug, Clone)]
pub struct PendingLoad<F> {
    pub ticket: LoadTicket,
    pub call: FetchCall<F>,
}

/// What [`PaginatedResourceView::apply`] did with a response
#[derive(Debug)]
pub enum LoadStatus {
    Applied,
    /// A newer load was issued meanwhile; the response was dropped
    Stale,
    /// The response was for a page past the end; the view moved to this page
    Reanchored(u32),
    Failed(Error),
}

pub struct PaginatedResourceView<R: Resource> {
    source: Arc<dyn ResourceSource<R>>,
    query: String,
    page: u32,
    size: u32,
    sort_by: String,
    sort_dir: SortDirection,
    filters: R::Filters,
    current: Page<R::Item>,
    loaded: bool,
    loading: bool,
    error: Option<String>,
    fence: RequestFence,
}

impl<R: Resource> PaginatedResourceView<R> {
    pub fn new(source: Arc<dyn ResourceSource<R>>) -> Self {
        Self {
            source,
            query: String::new(),
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: R::DEFAULT_SORT.to_string(),
            sort_dir: SortDirection::Desc,
            filters: R::Filters::default(),
            current: Page::empty(DEFAULT_PAGE_SIZE),
            loaded: false,
            loading: false,
            error: None,
            fence: RequestFence::new(),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Requested page index
    pub fn page_index(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_dir(&self) -> SortDirection {
        self.sort_dir
    }

    pub fn filters(&self) -> &R::Filters {
        &self.filters
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Last successfully applied page
    pub fn page(&self) -> &Page<R::Item> {
        &self.current
    }

    pub fn rows(&self) -> &[R::Item] {
        &self.current.content
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Page buttons to render around the current page
    pub fn window(&self) -> Range<u32> {
        self.current.window()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 0;
    }

    pub fn set_filters(&mut self, filters: R::Filters) {
        self.filters = filters;
        self.page = 0;
    }

    pub fn set_size(&mut self, size: u32) -> Result<()> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(Error::validation(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        self.size = size;
        self.page = 0;
        Ok(())
    }

    /// Column-header click: flip on the current field, descending on a new one
    pub fn toggle_sort(&mut self, field: &str) -> Result<()> {
        Self::check_sort_field(field)?;
        if field == self.sort_by {
            self.sort_dir = self.sort_dir.flipped();
        } else {
            self.sort_by = field.to_string();
            self.sort_dir = SortDirection::Desc;
        }
        self.page = 0;
        Ok(())
    }

    pub fn set_sort(&mut self, field: &str, dir: SortDirection) -> Result<()> {
        Self::check_sort_field(field)?;
        self.sort_by = field.to_string();
        self.sort_dir = dir;
        self.page = 0;
        Ok(())
    }

    /// Jump to `page`, clamped into the range known from the last load
    pub fn go_to_page(&mut self, page: u32) -> u32 {
        self.page = if self.loaded {
            page.min(self.current.last_index())
        } else {
            page
        };
        self.page
    }

    /// Advance unless on the last page; returns whether the page changed
    pub fn next_page(&mut self) -> bool {
        if self.current.last {
            return false;
        }
        self.page = self.current.number + 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current.first {
            return false;
        }
        self.page = self.current.number.saturating_sub(1);
        true
    }

    fn check_sort_field(field: &str) -> Result<()> {
        if R::SORT_FIELDS.contains(&field) {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Cannot sort {} by '{}' (expected one of: {})",
                R::LABEL,
                field,
                R::SORT_FIELDS.join(", ")
            )))
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Snapshot the current state into a call and take a new ticket
    pub fn prepare_load(&mut self) -> PendingLoad<R::Filters> {
        let request = PageRequest {
            page: self.page,
            size: self.size,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir,
        };
        let query = self.query.trim();
        let call = if query.is_empty() {
            FetchCall::List {
                request,
                filters: self.filters.clone(),
            }
        } else {
            FetchCall::Search {
                query: query.to_string(),
                request,
            }
        };
        self.loading = true;
        PendingLoad {
            ticket: self.fence.issue(),
            call,
        }
    }

    pub async fn fetch(&self, pending: &PendingLoad<R::Filters>) -> Result<Page<R::Item>> {
        match &pending.call {
            FetchCall::List { request, filters } => self.source.list(request, filters).await,
            FetchCall::Search { query, request } => self.source.search(query, request).await,
        }
    }

    /// Install a response if its ticket is still current
    pub fn apply(&mut self, ticket: LoadTicket, result: Result<Page<R::Item>>) -> LoadStatus {
        if !self.fence.is_current(ticket) {
            debug!(resource = R::LABEL, "discarding stale page response");
            return LoadStatus::Stale;
        }
        self.loading = false;

        let page = match result.and_then(|page| {
            if page.is_past_end() {
                return Ok(page);
            }
            page.validate().map(|_| page)
        }) {
            Ok(page) => page,
            Err(e) => {
                warn!(resource = R::LABEL, error = %e, "page load failed");
                self.error = Some(e.user_message());
                return LoadStatus::Failed(e);
            }
        };

        if page.is_past_end() {
            let last = page.last_index();
            debug!(resource = R::LABEL, requested = page.number, last, "re-anchoring past-end page");
            self.page = last;
            return LoadStatus::Reanchored(last);
        }

        self.page = page.number;
        self.current = page;
        self.loaded = true;
        self.error = None;
        LoadStatus::Applied
    }

    /// Fetch the page described by the current state
    pub async fn load(&mut self) -> Result<()> {
        let mut reanchored = false;
        loop {
            let pending = self.prepare_load();
            let result = self.fetch(&pending).await;
            match self.apply(pending.ticket, result) {
                LoadStatus::Applied | LoadStatus::Stale => return Ok(()),
                LoadStatus::Failed(e) => return Err(e),
                LoadStatus::Reanchored(_) if !reanchored => reanchored = true,
                LoadStatus::Reanchored(page) => {
                    let e = Error::InvalidResponse(format!(
                        "page {} is still out of range after re-anchoring",
                        page
                    ));
                    self.error = Some(e.user_message());
                    return Err(e);
                }
            }
        }
    }

    // =========================================================================
    // Row actions
    // =========================================================================

    /// Flip a row's active flag, then reload
    pub async fn toggle_status(&mut self, id: i64) -> Result<()> {
        if !R::TOGGLEABLE {
            return Err(Error::validation(format!("{} cannot be toggled", R::LABEL)));
        }
        if let Err(e) = self.source.toggle_status(id).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        self.load().await
    }
}

impl PaginatedResourceView<WalletsResource> {
    /// Resync one wallet's balance from the chain, then reload
    pub async fn refresh_balance(&mut self, admin: &dyn AdminBackend, wallet_id: i64) -> Result<()> {
        if let Err(e) = admin.refresh_wallet_balance(wallet_id).await {
            self.error = Some(e.user_message());
            return Err(e);
        }
        self.load().await
    }
}
