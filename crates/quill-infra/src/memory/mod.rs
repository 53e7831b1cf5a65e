//! In-memory repositories - used as fallback when no database is configured,
//! and as the backing store for handler tests. Data is lost on restart.

mod repos;
mod store;

pub use repos::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryLocationRepository,
    MemoryPostRepository, MemoryUserRepository,
};
pub use store::MemoryStore;
