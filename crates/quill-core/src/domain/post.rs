use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog post authored by a user.
///
/// `pub_date` may lie in the future: the post then stays hidden from the
/// public listings until that moment, while remaining visible to its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Posts start published; the flag is only ever
    /// cleared by moderation, outside this service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        location_id: Option<Uuid>,
        title: String,
        text: String,
        image_url: Option<String>,
        pub_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            location_id,
            title,
            text,
            image_url,
            pub_date,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Listing row: a post joined with its author, category, location,
/// and the count of its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author_username: String,
    pub category_title: String,
    pub category_slug: String,
    pub location_name: Option<String>,
    pub comment_count: i64,
}

/// Detail row: the full post plus the joined names the detail page shows,
/// and the category flag the visibility rule needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub author_username: String,
    pub category_title: String,
    pub category_slug: String,
    pub category_is_published: bool,
    pub location_name: Option<String>,
}

impl PostDetail {
    /// A post is publicly visible iff it is published, its category is
    /// published, and its publish date has passed.
    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.post.is_published && self.category_is_published && self.post.pub_date <= now
    }

    /// The author may always view their own post; everyone else gets the
    /// public rule.
    pub fn is_visible_to(&self, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
        self.is_publicly_visible(now) || viewer == Some(self.post.author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn detail(is_published: bool, category_is_published: bool, age_hours: i64) -> PostDetail {
        let now = Utc::now();
        let mut post = Post::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            "Title".to_string(),
            "Text".to_string(),
            None,
            now - TimeDelta::hours(age_hours),
        );
        post.is_published = is_published;
        PostDetail {
            post,
            author_username: "alice".to_string(),
            category_title: "General".to_string(),
            category_slug: "general".to_string(),
            category_is_published,
            location_name: None,
        }
    }

    #[test]
    fn published_past_post_is_public() {
        assert!(detail(true, true, 1).is_publicly_visible(Utc::now()));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        assert!(!detail(false, true, 1).is_publicly_visible(Utc::now()));
    }

    #[test]
    fn post_in_unpublished_category_is_hidden() {
        assert!(!detail(true, false, 1).is_publicly_visible(Utc::now()));
    }

    #[test]
    fn future_dated_post_is_hidden() {
        assert!(!detail(true, true, -1).is_publicly_visible(Utc::now()));
    }

    #[test]
    fn author_sees_hidden_post() {
        let d = detail(false, false, -1);
        let author = d.post.author_id;
        assert!(d.is_visible_to(Some(author), Utc::now()));
        assert!(!d.is_visible_to(Some(Uuid::new_v4()), Utc::now()));
        assert!(!d.is_visible_to(None, Utc::now()));
    }
}
