//! Blog handlers: listings, post CRUD, comments.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::{Category, Comment, CommentView, Location, Post, PostDetail, PostSummary};
use quill_core::pagination::{Page, PageRequest};
use quill_shared::dto::{
    CategoryDto, CategoryPageDto, CommentDto, CommentPayload, ListQuery, LocationDto, PageDto,
    PostDetailDto, PostFormDto, PostPayload, PostSummaryDto,
};

use crate::forms;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::see_other;

fn post_path(id: Uuid) -> String {
    format!("/posts/{id}/")
}

fn profile_path(username: &str) -> String {
    format!("/profile/{username}/")
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

fn comment_not_found() -> AppError {
    AppError::NotFound("Comment not found".to_string())
}

fn summary_dto(summary: PostSummary) -> PostSummaryDto {
    PostSummaryDto {
        id: summary.id,
        title: summary.title,
        text: summary.text,
        image_url: summary.image_url,
        pub_date: summary.pub_date,
        author_username: summary.author_username,
        category_title: summary.category_title,
        category_slug: summary.category_slug,
        location_name: summary.location_name,
        comment_count: summary.comment_count,
    }
}

pub(super) fn page_dto(page: Page<PostSummary>) -> PageDto<PostSummaryDto> {
    let page = page.map(summary_dto);
    PageDto {
        items: page.items,
        page: page.number,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}

fn comment_dto(view: CommentView) -> CommentDto {
    CommentDto {
        id: view.id,
        post_id: view.post_id,
        author_id: view.author_id,
        author_username: view.author_username,
        text: view.text,
        created_at: view.created_at,
    }
}

fn detail_dto(detail: PostDetail, comments: Vec<CommentView>) -> PostDetailDto {
    PostDetailDto {
        id: detail.post.id,
        title: detail.post.title,
        text: detail.post.text,
        image_url: detail.post.image_url,
        pub_date: detail.post.pub_date,
        is_published: detail.post.is_published,
        author_id: detail.post.author_id,
        author_username: detail.author_username,
        category_title: detail.category_title,
        category_slug: detail.category_slug,
        location_name: detail.location_name,
        comments: comments.into_iter().map(comment_dto).collect(),
    }
}

fn category_dto(category: Category) -> CategoryDto {
    CategoryDto {
        id: category.id,
        title: category.title,
        slug: category.slug,
    }
}

fn location_dto(location: Location) -> LocationDto {
    LocationDto {
        id: location.id,
        name: location.name,
    }
}

/// The published-only choice lists offered by the post form.
async fn form_choices(state: &AppState) -> AppResult<(Vec<CategoryDto>, Vec<LocationDto>)> {
    let categories = state.categories.list_published().await?;
    let locations = state.locations.list_published().await?;
    Ok((
        categories.into_iter().map(category_dto).collect(),
        locations.into_iter().map(location_dto).collect(),
    ))
}

/// Prefilled form values of an existing post.
fn post_values(post: &Post) -> PostPayload {
    PostPayload {
        title: Some(post.title.clone()),
        text: Some(post.text.clone()),
        pub_date: Some(post.pub_date),
        category_id: Some(post.category_id),
        location_id: post.location_id,
        image_url: post.image_url.clone(),
    }
}

/// GET / - paginated public posts, newest first.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_public(
            Utc::now(),
            PageRequest::new(query.page.unwrap_or(1), state.page_size),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page_dto(page)))
}

/// GET /posts/{id}/ - post detail with comments.
///
/// Hidden posts (unpublished, unpublished category, or future-dated) are
/// indistinguishable from missing ones for everybody but their author.
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let detail = state
        .posts
        .find_detail(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    let viewer_id = viewer.0.map(|identity| identity.user_id);
    if !detail.is_visible_to(viewer_id, Utc::now()) {
        return Err(post_not_found());
    }

    let comments = state.comments.list_for_post(post_id).await?;

    Ok(HttpResponse::Ok().json(detail_dto(detail, comments)))
}

/// GET /category/{slug}/ - published posts of a published category.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let page = state
        .posts
        .list_by_category(
            category.id,
            Utc::now(),
            PageRequest::new(query.page.unwrap_or(1), state.page_size),
        )
        .await?;

    Ok(HttpResponse::Ok().json(CategoryPageDto {
        category: category_dto(category),
        posts: page_dto(page),
    }))
}

/// GET /posts/create/ - the empty post form.
pub async fn create_post_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let (categories, locations) = form_choices(&state).await?;

    Ok(HttpResponse::Ok().json(PostFormDto {
        values: None,
        categories,
        locations,
    }))
}

/// POST /posts/create/ - create a post, then redirect to the author's profile.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let valid = forms::validate_post(
        &body,
        state.categories.as_ref(),
        state.locations.as_ref(),
    )
    .await?;

    let post = Post::new(
        identity.user_id,
        valid.category_id,
        valid.location_id,
        valid.title,
        valid.text,
        valid.image_url,
        valid.pub_date,
    );
    state.posts.insert(post).await?;

    Ok(see_other(profile_path(&identity.username)))
}

/// GET /posts/{id}/edit/ - the prefilled post form; non-authors are
/// redirected to the post instead.
pub async fn edit_post_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    if post.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    let (categories, locations) = form_choices(&state).await?;

    Ok(HttpResponse::Ok().json(PostFormDto {
        values: Some(post_values(&post)),
        categories,
        locations,
    }))
}

/// POST /posts/{id}/edit/ - update a post, then redirect to its detail.
pub async fn edit_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    if post.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    let valid = forms::validate_post(
        &body,
        state.categories.as_ref(),
        state.locations.as_ref(),
    )
    .await?;

    let updated = Post {
        title: valid.title,
        text: valid.text,
        pub_date: valid.pub_date,
        category_id: valid.category_id,
        location_id: valid.location_id,
        image_url: valid.image_url,
        ..post
    };
    state.posts.update(updated).await?;

    Ok(see_other(post_path(post_id)))
}

/// GET /posts/{id}/delete/ - the deletion confirmation payload.
pub async fn delete_post_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let detail = state
        .posts
        .find_detail(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    if detail.post.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    let comments = state.comments.list_for_post(post_id).await?;

    Ok(HttpResponse::Ok().json(detail_dto(detail, comments)))
}

/// POST /posts/{id}/delete/ - delete a post, then redirect to the profile.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    if post.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    state.posts.delete(post_id).await?;

    Ok(see_other(profile_path(&identity.username)))
}

/// POST /posts/{id}/comment/ - add a comment, then redirect to the post.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentPayload>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    let text = forms::validate_comment(&body)?;

    let comment = Comment::new(post.id, identity.user_id, text);
    state.comments.insert(comment).await?;

    Ok(see_other(post_path(post_id)))
}

/// GET /posts/{id}/comments/{cid}/edit/ - the prefilled comment form.
pub async fn edit_comment_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;

    if comment.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    Ok(HttpResponse::Ok().json(CommentDto {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        author_username: identity.username,
        text: comment.text,
        created_at: comment.created_at,
    }))
}

/// POST /posts/{id}/comments/{cid}/edit/ - update a comment.
pub async fn edit_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentPayload>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;

    if comment.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    let text = forms::validate_comment(&body)?;

    let updated = Comment { text, ..comment };
    state.comments.update(updated).await?;

    Ok(see_other(post_path(post_id)))
}

/// GET /posts/{id}/comments/{cid}/delete/ - the deletion confirmation payload.
pub async fn delete_comment_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;

    if comment.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    Ok(HttpResponse::Ok().json(CommentDto {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        author_username: identity.username,
        text: comment.text,
        created_at: comment.created_at,
    }))
}

/// POST /posts/{id}/comments/{cid}/delete/ - delete a comment.
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;

    if comment.author_id != identity.user_id {
        return Ok(see_other(post_path(post_id)));
    }

    state.comments.delete(comment_id).await?;

    Ok(see_other(post_path(post_id)))
}
