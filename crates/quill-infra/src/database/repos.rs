//! SeaORM repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use quill_core::domain::{
    Category, Comment, CommentView, Location, Post, PostDetail, PostSummary, User,
};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest, Paginator};
use quill_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::entity::{category, comment, location, post, user};

fn query_err(e: sea_orm::DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn constraint_err(e: sea_orm::DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// SeaORM user repository.
pub struct SeaOrmUserRepository {
    db: DbConn,
}

impl SeaOrmUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(entity)
            .insert(&self.db)
            .await
            .map_err(constraint_err)?;

        Ok(model.into())
    }
}

/// SeaORM category repository.
pub struct SeaOrmCategoryRepository {
    db: DbConn,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_published(&self) -> Result<Vec<Category>, RepoError> {
        let result = category::Entity::find()
            .filter(category::Column::IsPublished.eq(true))
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// SeaORM location repository.
pub struct SeaOrmLocationRepository {
    db: DbConn,
}

impl SeaOrmLocationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocationRepository for SeaOrmLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        let result = location::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_published(&self) -> Result<Vec<Location>, RepoError> {
        let result = location::Entity::find()
            .filter(location::Column::IsPublished.eq(true))
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Listing row produced by the joined, comment-counting select.
#[derive(Debug, FromQueryResult)]
struct PostSummaryRow {
    id: Uuid,
    title: String,
    text: String,
    image_url: Option<String>,
    pub_date: sea_orm::prelude::DateTimeWithTimeZone,
    is_published: bool,
    author_username: String,
    category_title: String,
    category_slug: String,
    location_name: Option<String>,
    comment_count: i64,
}

impl From<PostSummaryRow> for PostSummary {
    fn from(row: PostSummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            image_url: row.image_url,
            pub_date: row.pub_date.into(),
            is_published: row.is_published,
            author_username: row.author_username,
            category_title: row.category_title,
            category_slug: row.category_slug,
            location_name: row.location_name,
            comment_count: row.comment_count,
        }
    }
}

/// Detail row: the post plus the joined display fields.
#[derive(Debug, FromQueryResult)]
struct PostDetailRow {
    id: Uuid,
    author_id: Uuid,
    category_id: Uuid,
    location_id: Option<Uuid>,
    title: String,
    text: String,
    image_url: Option<String>,
    pub_date: sea_orm::prelude::DateTimeWithTimeZone,
    is_published: bool,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    author_username: String,
    category_title: String,
    category_slug: String,
    category_is_published: bool,
    location_name: Option<String>,
}

impl From<PostDetailRow> for PostDetail {
    fn from(row: PostDetailRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                author_id: row.author_id,
                category_id: row.category_id,
                location_id: row.location_id,
                title: row.title,
                text: row.text,
                image_url: row.image_url,
                pub_date: row.pub_date.into(),
                is_published: row.is_published,
                created_at: row.created_at.into(),
            },
            author_username: row.author_username,
            category_title: row.category_title,
            category_slug: row.category_slug,
            category_is_published: row.category_is_published,
            location_name: row.location_name,
        }
    }
}

/// SeaORM post repository.
pub struct SeaOrmPostRepository {
    db: DbConn,
}

impl SeaOrmPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Base listing select: joins author/category/location, annotates the
    /// grouped comment count, newest first.
    fn summary_select() -> Select<post::Entity> {
        post::Entity::find()
            .join(JoinType::InnerJoin, post::Relation::Author.def())
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .join(JoinType::LeftJoin, post::Relation::Location.def())
            .join(JoinType::LeftJoin, post::Relation::Comments.def())
            .column_as(user::Column::Username, "author_username")
            .column_as(category::Column::Title, "category_title")
            .column_as(category::Column::Slug, "category_slug")
            .column_as(location::Column::Name, "location_name")
            .column_as(comment::Column::Id.count(), "comment_count")
            .group_by(post::Column::Id)
            .group_by(user::Column::Id)
            .group_by(category::Column::Id)
            .group_by(location::Column::Id)
            .order_by_desc(post::Column::PubDate)
    }

    async fn paginate(
        &self,
        select: Select<post::Entity>,
        count: Select<post::Entity>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let total = count.count(&self.db).await.map_err(query_err)?;

        let paginator = Paginator::new(total, page.per_page);
        let rows = select
            .offset(paginator.offset(page.number))
            .limit(paginator.per_page)
            .into_model::<PostSummaryRow>()
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(paginator.page(rows.into_iter().map(Into::into).collect(), page.number))
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError> {
        let result = post::Entity::find_by_id(id)
            .join(JoinType::InnerJoin, post::Relation::Author.def())
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .join(JoinType::LeftJoin, post::Relation::Location.def())
            .column_as(user::Column::Username, "author_username")
            .column_as(category::Column::Title, "category_title")
            .column_as(category::Column::Slug, "category_slug")
            .column_as(category::Column::IsPublished, "category_is_published")
            .column_as(location::Column::Name, "location_name")
            .into_model::<PostDetailRow>()
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_public(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let select = Self::summary_select()
            .filter(post::Column::IsPublished.eq(true))
            .filter(category::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now));

        let count = post::Entity::find()
            .join(JoinType::InnerJoin, post::Relation::Category.def())
            .filter(post::Column::IsPublished.eq(true))
            .filter(category::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now));

        self.paginate(select, count, page).await
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let select = Self::summary_select()
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now));

        let count = post::Entity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now));

        self.paginate(select, count, page).await
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        let select = Self::summary_select().filter(post::Column::AuthorId.eq(author_id));

        let count = post::Entity::find().filter(post::Column::AuthorId.eq(author_id));

        self.paginate(select, count, page).await
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(entity)
            .insert(&self.db)
            .await
            .map_err(constraint_err)?;

        Ok(model.into())
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(entity)
            .update(&self.db)
            .await
            .map_err(query_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = post::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// Comment row with the author's username joined in.
#[derive(Debug, FromQueryResult)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    text: String,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
    author_username: String,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            text: row.text,
            created_at: row.created_at.into(),
        }
    }
}

/// SeaORM comment repository.
pub struct SeaOrmCommentRepository {
    db: DbConn,
}

impl SeaOrmCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for SeaOrmCommentRepository {
    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let result = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .join(JoinType::InnerJoin, comment::Relation::Author.def())
            .column_as(user::Column::Username, "author_username")
            .order_by_asc(comment::Column::CreatedAt)
            .into_model::<CommentRow>()
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(entity)
            .insert(&self.db)
            .await
            .map_err(constraint_err)?;

        Ok(model.into())
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(entity)
            .update(&self.db)
            .await
            .map_err(query_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = comment::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
