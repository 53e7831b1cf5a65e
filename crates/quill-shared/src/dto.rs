//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Submitted post form data. Fields are optional so missing ones surface
/// as field-level validation messages rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image_url: Option<String>,
}

/// Submitted comment form data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPayload {
    pub text: Option<String>,
}

/// Query string of the paginated listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
}

/// One page of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// A post as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub author_username: String,
    pub category_title: String,
    pub category_slug: String,
    pub location_name: Option<String>,
    pub comment_count: i64,
}

/// A comment as shown under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The detail page: the full post plus its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailDto {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author_id: Uuid,
    pub author_username: String,
    pub category_title: String,
    pub category_slug: String,
    pub location_name: Option<String>,
    pub comments: Vec<CommentDto>,
}

/// A selectable category in the post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// A selectable location in the post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDto {
    pub id: Uuid,
    pub name: String,
}

/// The post form: choice lists plus current values when editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormDto {
    pub values: Option<PostPayload>,
    pub categories: Vec<CategoryDto>,
    pub locations: Vec<LocationDto>,
}

/// A category listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageDto {
    pub category: CategoryDto,
    pub posts: PageDto<PostSummaryDto>,
}

/// A user profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDto {
    pub username: String,
    pub is_owner: bool,
    pub posts: PageDto<PostSummaryDto>,
}
