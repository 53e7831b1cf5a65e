use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use quill_core::domain::{
    Category, Comment, CommentView, Location, Post, PostDetail, PostSummary, User,
};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest, Paginator};
use quill_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::store::MemoryStore;

fn dangling(entity: &str) -> RepoError {
    RepoError::Query(format!("dangling {entity} reference"))
}

/// In-memory user repository.
pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// In-memory category repository.
pub struct MemoryCategoryRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCategoryRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.categories.read().await.get(&id).cloned())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .store
            .categories
            .read()
            .await
            .values()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }

    async fn list_published(&self) -> Result<Vec<Category>, RepoError> {
        let mut published: Vec<Category> = self
            .store
            .categories
            .read()
            .await
            .values()
            .filter(|c| c.is_published)
            .cloned()
            .collect();
        published.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(published)
    }
}

/// In-memory location repository.
pub struct MemoryLocationRepository {
    store: Arc<MemoryStore>,
}

impl MemoryLocationRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.store.locations.read().await.get(&id).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Location>, RepoError> {
        let mut published: Vec<Location> = self
            .store
            .locations
            .read()
            .await
            .values()
            .filter(|l| l.is_published)
            .cloned()
            .collect();
        published.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(published)
    }
}

/// In-memory post repository.
pub struct MemoryPostRepository {
    store: Arc<MemoryStore>,
}

impl MemoryPostRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Join a post against the other maps the way the SQL listings do.
    async fn summarize(&self, post: &Post) -> Result<PostSummary, RepoError> {
        let users = self.store.users.read().await;
        let categories = self.store.categories.read().await;
        let locations = self.store.locations.read().await;
        let comments = self.store.comments.read().await;

        let author = users.get(&post.author_id).ok_or_else(|| dangling("author"))?;
        let category = categories
            .get(&post.category_id)
            .ok_or_else(|| dangling("category"))?;
        let location_name = post
            .location_id
            .and_then(|id| locations.get(&id))
            .map(|l| l.name.clone());
        let comment_count = comments.values().filter(|c| c.post_id == post.id).count() as i64;

        Ok(PostSummary {
            id: post.id,
            title: post.title.clone(),
            text: post.text.clone(),
            image_url: post.image_url.clone(),
            pub_date: post.pub_date,
            is_published: post.is_published,
            author_username: author.username.clone(),
            category_title: category.title.clone(),
            category_slug: category.slug.clone(),
            location_name,
            comment_count,
        })
    }

    /// Filter, order newest-first, clamp the page, then join the page slice.
    async fn list_where(
        &self,
        filter: impl Fn(&Post) -> bool,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let mut matched: Vec<Post> = self
            .store
            .posts
            .read()
            .await
            .values()
            .filter(|p| filter(p))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(a.id.cmp(&b.id)));

        let paginator = Paginator::new(matched.len() as u64, page.per_page);
        let offset = paginator.offset(page.number) as usize;
        let slice = matched
            .into_iter()
            .skip(offset)
            .take(paginator.per_page as usize);

        let mut items = Vec::new();
        for post in slice {
            items.push(self.summarize(&post).await?);
        }

        Ok(paginator.page(items, page.number))
    }

    async fn category_published(&self, category_id: Uuid) -> bool {
        self.store
            .categories
            .read()
            .await
            .get(&category_id)
            .map(|c| c.is_published)
            .unwrap_or(false)
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError> {
        let Some(post) = self.store.posts.read().await.get(&id).cloned() else {
            return Ok(None);
        };

        let users = self.store.users.read().await;
        let categories = self.store.categories.read().await;
        let locations = self.store.locations.read().await;

        let author = users.get(&post.author_id).ok_or_else(|| dangling("author"))?;
        let category = categories
            .get(&post.category_id)
            .ok_or_else(|| dangling("category"))?;
        let location_name = post
            .location_id
            .and_then(|lid| locations.get(&lid))
            .map(|l| l.name.clone());

        Ok(Some(PostDetail {
            author_username: author.username.clone(),
            category_title: category.title.clone(),
            category_slug: category.slug.clone(),
            category_is_published: category.is_published,
            location_name,
            post,
        }))
    }

    async fn list_public(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        // Snapshot category flags first; the filter closure cannot await.
        let published_categories: Vec<Uuid> = self
            .store
            .categories
            .read()
            .await
            .values()
            .filter(|c| c.is_published)
            .map(|c| c.id)
            .collect();

        self.list_where(
            |p| {
                p.is_published
                    && p.pub_date <= now
                    && published_categories.contains(&p.category_id)
            },
            page,
        )
        .await
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        self.list_where(
            |p| p.category_id == category_id && p.is_published && p.pub_date <= now,
            page,
        )
        .await
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        self.list_where(|p| p.author_id == author_id, page).await
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.store.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.posts.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        // Cascade, as the FK does in Postgres.
        self.store
            .comments
            .write()
            .await
            .retain(|_, c| c.post_id != id);
        Ok(())
    }
}

/// In-memory comment repository.
pub struct MemoryCommentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCommentRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .store
            .comments
            .read()
            .await
            .get(&comment_id)
            .filter(|c| c.post_id == post_id)
            .cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let users = self.store.users.read().await;
        let comments = self.store.comments.read().await;

        let mut views = Vec::new();
        for comment in comments.values().filter(|c| c.post_id == post_id) {
            let author = users
                .get(&comment.author_id)
                .ok_or_else(|| dangling("author"))?;
            views.push(CommentView {
                id: comment.id,
                post_id: comment.post_id,
                author_id: comment.author_id,
                author_username: author.username.clone(),
                text: comment.text.clone(),
                created_at: comment.created_at,
            });
        }
        views.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(views)
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.store
            .comments
            .write()
            .await
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.store.comments.write().await;
        if !comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.comments.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
