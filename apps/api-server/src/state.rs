//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use quill_infra::database::{
    SeaOrmCategoryRepository, SeaOrmCommentRepository, SeaOrmLocationRepository,
    SeaOrmPostRepository, SeaOrmUserRepository,
};
use quill_infra::memory::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryLocationRepository,
    MemoryPostRepository, MemoryStore, MemoryUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub page_size: u64,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Connects to Postgres when `DATABASE_URL` is configured; otherwise
    /// falls back to in-memory repositories with a warning.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some(db_config) = &config.database {
            match db_config.connect().await {
                Ok(db) => {
                    tracing::info!("Application state initialized (postgres)");
                    return Self {
                        users: Arc::new(SeaOrmUserRepository::new(db.clone())),
                        categories: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
                        locations: Arc::new(SeaOrmLocationRepository::new(db.clone())),
                        posts: Arc::new(SeaOrmPostRepository::new(db.clone())),
                        comments: Arc::new(SeaOrmCommentRepository::new(db)),
                        page_size: config.page_size,
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        let (state, _) = Self::in_memory(config.page_size);
        state
    }

    /// In-memory state over a fresh store. The store handle is returned so
    /// callers (the fallback path, tests) can seed categories and locations.
    pub fn in_memory(page_size: u64) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());

        let state = Self {
            users: Arc::new(MemoryUserRepository::new(store.clone())),
            categories: Arc::new(MemoryCategoryRepository::new(store.clone())),
            locations: Arc::new(MemoryLocationRepository::new(store.clone())),
            posts: Arc::new(MemoryPostRepository::new(store.clone())),
            comments: Arc::new(MemoryCommentRepository::new(store.clone())),
            page_size,
        };

        (state, store)
    }
}
