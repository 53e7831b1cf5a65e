use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity - a publication section posts are filed under.
///
/// Unpublished categories hide every post filed under them and are not
/// offered as a choice when authoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

impl Category {
    pub fn new(title: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            is_published: true,
        }
    }
}
