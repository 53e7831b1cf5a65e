use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location entity - an optional place tag for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub is_published: bool,
}

impl Location {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            is_published: true,
        }
    }
}
