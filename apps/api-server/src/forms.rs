//! Form validation for post and comment submissions.
//!
//! The category and location choices are restricted to published entries,
//! independent of what the edited post currently holds: a post filed under
//! a since-unpublished category still displays it in the prefilled form,
//! but resubmitting it is rejected like any other invalid choice.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use quill_core::ports::{CategoryRepository, LocationRepository};
use quill_shared::dto::{CommentPayload, PostPayload};

use crate::middleware::error::AppError;

const MAX_TITLE_LEN: usize = 256;

/// A post payload that passed validation.
#[derive(Debug, Clone)]
pub struct ValidPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub image_url: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Validate a submitted post form.
pub async fn validate_post(
    payload: &PostPayload,
    categories: &dyn CategoryRepository,
    locations: &dyn LocationRepository,
) -> Result<ValidPost, AppError> {
    let mut errors = Vec::new();

    let title = non_empty(payload.title.as_deref());
    match &title {
        None => errors.push("title: this field is required".to_string()),
        Some(t) if t.len() > MAX_TITLE_LEN => {
            errors.push(format!("title: at most {MAX_TITLE_LEN} characters"));
        }
        _ => {}
    }

    let text = non_empty(payload.text.as_deref());
    if text.is_none() {
        errors.push("text: this field is required".to_string());
    }

    if payload.pub_date.is_none() {
        errors.push("pub_date: this field is required".to_string());
    }

    match payload.category_id {
        None => errors.push("category: this field is required".to_string()),
        Some(id) => match categories.find_by_id(id).await? {
            Some(category) if category.is_published => {}
            _ => errors.push("category: select a valid choice".to_string()),
        },
    }

    if let Some(id) = payload.location_id {
        match locations.find_by_id(id).await? {
            Some(location) if location.is_published => {}
            _ => errors.push("location: select a valid choice".to_string()),
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // All unwraps guarded by the error collection above.
    Ok(ValidPost {
        title: title.unwrap(),
        text: text.unwrap(),
        pub_date: payload.pub_date.unwrap(),
        category_id: payload.category_id.unwrap(),
        location_id: payload.location_id,
        image_url: non_empty(payload.image_url.as_deref()),
    })
}

/// Validate a submitted comment form.
pub fn validate_comment(payload: &CommentPayload) -> Result<String, AppError> {
    non_empty(payload.text.as_deref())
        .ok_or_else(|| AppError::Validation(vec!["text: this field is required".to_string()]))
}
