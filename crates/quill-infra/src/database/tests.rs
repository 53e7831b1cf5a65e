use crate::database::entity::{comment, post, user};
use crate::database::repos::{
    SeaOrmCommentRepository, SeaOrmPostRepository, SeaOrmUserRepository,
};
use quill_core::ports::{CommentRepository, PostRepository, UserRepository};
use sea_orm::{DatabaseBackend, MockDatabase};

#[tokio::test]
async fn find_post_by_id() {
    let post_id = uuid::Uuid::new_v4();
    let author_id = uuid::Uuid::new_v4();
    let category_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            author_id,
            category_id,
            location_id: None,
            title: "Test Post".to_owned(),
            text: "Body".to_owned(),
            image_url: None,
            pub_date: now.into(),
            is_published: true,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = SeaOrmPostRepository::new(db);

    let post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn find_user_by_username() {
    let user_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            username: "alice".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = SeaOrmUserRepository::new(db);

    let found = repo.find_by_username("alice").await.unwrap().unwrap();

    assert_eq!(found.id, user_id);
    assert_eq!(found.username, "alice");
}

#[tokio::test]
async fn find_comment_scoped_to_post() {
    let comment_id = uuid::Uuid::new_v4();
    let post_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![comment::Model {
            id: comment_id,
            post_id,
            author_id: uuid::Uuid::new_v4(),
            text: "Nice post".to_owned(),
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = SeaOrmCommentRepository::new(db);

    let found = repo.find_in_post(post_id, comment_id).await.unwrap();

    assert!(found.is_some());
    assert_eq!(found.unwrap().post_id, post_id);
}
