use std::sync::Arc;
use autorent_core::{AssetLookup, BookingEngine};
use autorent_store::JsonStore;
use crate::middleware::DebugLog;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub bookings: Arc<BookingEngine>,
    pub assets: Arc<dyn AssetLookup>,
    pub debug: Arc<DebugLog>,
}

impl AppState {
    pub fn new(store: Arc<JsonStore>, assets: Arc<dyn AssetLookup>) -> Self {
        Self {
            bookings: Arc::new(BookingEngine::new(store.clone())),
            store,
            assets,
            debug: Arc::new(DebugLog::default()),
        }
    }
}
