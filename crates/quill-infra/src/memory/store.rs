use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Location, Post, User};

/// Shared backing store for the in-memory repositories.
///
/// One store is shared by all five repositories so cross-entity reads
/// (usernames in listings, comment counts) see a single consistent map set.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) users: RwLock<HashMap<Uuid, User>>,
    pub(crate) categories: RwLock<HashMap<Uuid, Category>>,
    pub(crate) locations: RwLock<HashMap<Uuid, Location>>,
    pub(crate) posts: RwLock<HashMap<Uuid, Post>>,
    pub(crate) comments: RwLock<HashMap<Uuid, Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Categories are authored out of band; in memory mode they are seeded
    /// through this helper.
    pub async fn add_category(&self, category: Category) {
        self.categories
            .write()
            .await
            .insert(category.id, category);
    }

    /// Locations likewise.
    pub async fn add_location(&self, location: Location) {
        self.locations.write().await.insert(location.id, location);
    }
}
