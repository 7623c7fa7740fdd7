// Listings view state shared between the client and the UI layer
//
// Every load takes a `Ticket` from the store before it starts. A result is
// applied only when its ticket is newer than the last applied one, so the
// latest request wins no matter the order responses arrive in.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error};

use crate::client::{ApiError, HotelClient, HotelPage, HotelSource, HttpSource, Pagination};
use crate::listing::{Listings, NormalizedListing, SkippedRoom};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Deals,
    Recommended,
    Page(u32),
    Search(String),
    HotelDetails(String),
}

impl Operation {
    /// Message shown to the user when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Deals => "Failed to fetch tonight deals",
            Operation::Recommended => "Failed to fetch recommended stays",
            Operation::Page(_) => "Failed to fetch hotels",
            Operation::Search(_) => "Failed to search hotels",
            Operation::HotelDetails(_) => "Failed to fetch hotel details",
        }
    }
}

/// Result of a successful load, ready to be applied to the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loaded {
    pub listings: Vec<NormalizedListing>,
    pub pagination: Pagination,
    pub skipped: Vec<SkippedRoom>,
}

impl From<HotelPage> for Loaded {
    fn from(page: HotelPage) -> Self {
        Loaded {
            listings: page.listings,
            pagination: page.pagination,
            skipped: page.skipped,
        }
    }
}

impl From<Listings> for Loaded {
    fn from(listings: Listings) -> Self {
        Loaded {
            listings: listings.listings,
            pagination: Pagination::default(),
            skipped: listings.skipped,
        }
    }
}

impl From<Option<NormalizedListing>> for Loaded {
    fn from(listing: Option<NormalizedListing>) -> Self {
        Loaded {
            listings: listing.into_iter().collect(),
            ..Loaded::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingsView {
    pub listings: Vec<NormalizedListing>,
    pub pagination: Pagination,
    /// Rooms dropped while flattening the current listings.
    pub skipped: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl ListingsView {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Handle for one in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub operation: Operation,
}

#[derive(Default)]
struct StoreInner {
    issued: u64,
    applied: u64,
    view: ListingsView,
    last_operation: Option<Operation>,
}

#[derive(Default)]
pub struct ListingsStore {
    inner: Mutex<StoreInner>,
}

impl ListingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, operation: Operation) -> Ticket {
        let mut inner = self.inner.lock();
        inner.issued += 1;
        inner.last_operation = Some(operation.clone());
        inner.view.loading = true;
        Ticket {
            seq: inner.issued,
            operation,
        }
    }

    /// Apply a finished load. Returns `false` when a newer load has already
    /// been applied and this result was dropped.
    pub fn complete(&self, ticket: &Ticket, result: Result<Loaded, ApiError>) -> bool {
        let mut inner = self.inner.lock();
        if ticket.seq <= inner.applied {
            debug!(seq = ticket.seq, applied = inner.applied, "discarding stale result");
            return false;
        }
        inner.applied = ticket.seq;

        match result {
            Ok(loaded) => {
                inner.view.listings = loaded.listings;
                inner.view.pagination = loaded.pagination;
                inner.view.skipped = loaded.skipped.len();
                inner.view.error = None;
            }
            Err(e) => {
                error!(operation = ?ticket.operation, error = %e, "load failed");
                inner.view.listings.clear();
                inner.view.pagination = Pagination::default();
                inner.view.skipped = 0;
                inner.view.error = Some(ticket.operation.failure_message().to_string());
            }
        }
        inner.view.loading = inner.issued > inner.applied;
        true
    }

    pub fn snapshot(&self) -> ListingsView {
        self.inner.lock().view.clone()
    }

    pub fn last_operation(&self) -> Option<Operation> {
        self.inner.lock().last_operation.clone()
    }
}

/// Runs client operations and records their outcome in a [`ListingsStore`].
pub struct HotelsController<S = HttpSource> {
    client: Arc<HotelClient<S>>,
    store: Arc<ListingsStore>,
}

impl<S: HotelSource> HotelsController<S> {
    pub fn new(client: Arc<HotelClient<S>>) -> Self {
        Self {
            client,
            store: Arc::new(ListingsStore::new()),
        }
    }

    pub fn client(&self) -> &HotelClient<S> {
        &self.client
    }

    pub fn store(&self) -> Arc<ListingsStore> {
        Arc::clone(&self.store)
    }

    pub fn view(&self) -> ListingsView {
        self.store.snapshot()
    }

    pub async fn load_deals(&self) -> ListingsView {
        self.run(Operation::Deals).await
    }

    pub async fn load_recommended(&self) -> ListingsView {
        self.run(Operation::Recommended).await
    }

    pub async fn load_page(&self, page: u32) -> ListingsView {
        self.run(Operation::Page(page)).await
    }

    pub async fn search(&self, query: &str) -> ListingsView {
        self.run(Operation::Search(query.to_string())).await
    }

    pub async fn load_hotel_details(&self, hotel_id: &str) -> ListingsView {
        self.run(Operation::HotelDetails(hotel_id.to_string())).await
    }

    /// Re-run the most recent operation, if any.
    pub async fn retry(&self) -> Option<ListingsView> {
        let operation = self.store.last_operation()?;
        Some(self.run(operation).await)
    }

    async fn run(&self, operation: Operation) -> ListingsView {
        let ticket = self.store.begin(operation);
        let result = match &ticket.operation {
            Operation::Deals => self.client.fetch_deals().await.map(Loaded::from),
            Operation::Recommended => self.client.fetch_recommended().await.map(Loaded::from),
            Operation::Page(page) => self.client.fetch_page(*page).await.map(Loaded::from),
            Operation::Search(query) => self.client.search(query).await.map(Loaded::from),
            Operation::HotelDetails(id) => {
                self.client.fetch_hotel_details(id).await.map(Loaded::from)
            }
        };
        self.store.complete(&ticket, result);
        self.store.snapshot()
    }
}
