//! PostgreSQL persistence via SeaORM.

mod connections;
pub mod entity;
mod repos;

pub use connections::DatabaseConfig;
pub use repos::{
    SeaOrmCategoryRepository, SeaOrmCommentRepository, SeaOrmLocationRepository,
    SeaOrmPostRepository, SeaOrmUserRepository,
};

#[cfg(test)]
mod tests;
