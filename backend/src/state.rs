//! Shared application state handed to every handler as `web::Data<AppState>`.

use crate::error::CatalogError;
use crate::publish::PublishWorkflow;
use crate::store::CourseStore;
use actix_web::web;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub publisher: Arc<PublishWorkflow>,
    /// Where uploaded course images are written and served from.
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CourseStore>,
        publisher: Arc<PublishWorkflow>,
        uploads_dir: PathBuf,
    ) -> Self {
        AppState {
            store,
            publisher,
            uploads_dir,
        }
    }

    /// Runs a store call on actix's blocking pool.
    pub async fn with_store<F, R>(&self, f: F) -> Result<R, CatalogError>
    where
        F: FnOnce(&dyn CourseStore) -> Result<R, CatalogError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.store.clone();
        web::block(move || f(store.as_ref()))
            .await
            .map_err(|e| CatalogError::StoreUnavailable(e.to_string()))?
    }
}
