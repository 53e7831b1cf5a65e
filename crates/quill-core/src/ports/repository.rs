use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentView, Location, Post, PostDetail, PostSummary, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn insert(&self, user: User) -> Result<User, RepoError>;
}

/// Category repository. Categories are authored out of band (seeding or a
/// separate admin surface); this service only reads them.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError>;

    /// Lookup by slug, restricted to published categories.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Published categories, ordered by title - the authoring choice list.
    async fn list_published(&self) -> Result<Vec<Category>, RepoError>;
}

/// Location repository; read-only for the same reason as categories.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError>;

    /// Published locations, ordered by name - the authoring choice list.
    async fn list_published(&self) -> Result<Vec<Location>, RepoError>;
}

/// Post repository.
///
/// The listing methods join author, category, and location, annotate each
/// row with its comment count, and order by `pub_date` descending.
/// `list_public` and `list_by_category` apply the public visibility filter
/// (post published, category published, `pub_date <= now`); `list_by_author`
/// returns the author's full history unfiltered.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError>;

    async fn list_public(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError>;

    async fn list_by_category(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError>;

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError>;

    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Delete a post and, by cascade, its comments.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Fetch a comment by id, scoped to the post it must belong to.
    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError>;

    /// All comments under a post with author usernames, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError>;

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
