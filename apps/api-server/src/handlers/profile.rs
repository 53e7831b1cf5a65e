//! User profile handler.

use actix_web::{HttpResponse, web};

use quill_core::pagination::PageRequest;
use quill_shared::dto::{ListQuery, ProfileDto};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::blog::page_dto;

/// GET /profile/{username}/ - a user's full posting history, paginated.
///
/// No visibility filter applies here: the profile shows the author's
/// unpublished and future-dated posts to every visitor, as the index page
/// never will.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let page = state
        .posts
        .list_by_author(
            user.id,
            PageRequest::new(query.page.unwrap_or(1), state.page_size),
        )
        .await?;

    let is_owner = viewer.0.map(|identity| identity.user_id) == Some(user.id);

    Ok(HttpResponse::Ok().json(ProfileDto {
        username: user.username,
        is_owner,
        posts: page_dto(page),
    }))
}
