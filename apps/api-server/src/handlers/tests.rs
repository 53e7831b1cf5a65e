use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::domain::{Category, Post, User};
use quill_core::ports::{PasswordService, TokenService};
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use quill_shared::ErrorResponse;
use quill_shared::dto::{
    AuthResponse, CategoryPageDto, CommentDto, CommentPayload, PageDto, PostDetailDto, PostFormDto,
    PostPayload, PostSummaryDto, ProfileDto, SignupRequest,
};

use crate::state::AppState;

struct TestCtx {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    store: Arc<quill_infra::memory::MemoryStore>,
    category: Category,
}

impl TestCtx {
    async fn new() -> Self {
        let (state, store) = AppState::in_memory(10);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let category = Category::new("General".to_string(), "general".to_string());
        store.add_category(category.clone()).await;

        Self {
            state,
            tokens,
            passwords,
            store,
            category,
        }
    }

    /// Register a user directly in the store and mint them a token.
    async fn user(&self, username: &str) -> (User, String) {
        let user = User::new(username.to_string(), "unused-hash".to_string());
        self.state.users.insert(user.clone()).await.unwrap();
        let token = self.tokens.generate_token(user.id, username).unwrap();
        (user, token)
    }

    /// Insert a published post dated `hours_ago` hours in the past
    /// (negative values date it in the future).
    async fn post_for(&self, user: &User, hours_ago: i64) -> Post {
        let post = Post::new(
            user.id,
            self.category.id,
            None,
            format!("Post {hours_ago}"),
            "Body".to_string(),
            None,
            Utc::now() - TimeDelta::hours(hours_ago),
        );
        self.state.posts.insert(post).await.unwrap()
    }

    fn payload(&self) -> PostPayload {
        PostPayload {
            title: Some("Fresh post".to_string()),
            text: Some("Contents".to_string()),
            pub_date: Some(Utc::now()),
            category_id: Some(self.category.id),
            location_id: None,
            image_url: None,
        }
    }
}

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .app_data(web::Data::new($ctx.tokens.clone()))
                .app_data(web::Data::new($ctx.passwords.clone()))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn index_lists_only_publicly_visible_posts() {
    let ctx = TestCtx::new().await;
    let (alice, _) = ctx.user("alice").await;

    let visible = ctx.post_for(&alice, 1).await;
    ctx.post_for(&alice, -1).await; // future-dated

    let mut unpublished = Post::new(
        alice.id,
        ctx.category.id,
        None,
        "Draft".to_string(),
        "Body".to_string(),
        None,
        Utc::now() - TimeDelta::hours(2),
    );
    unpublished.is_published = false;
    ctx.state.posts.insert(unpublished).await.unwrap();

    let app = app!(ctx);
    let page: PageDto<PostSummaryDto> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, visible.id);
    assert_eq!(page.items[0].author_username, "alice");
}

#[actix_web::test]
async fn hidden_post_detail_is_author_only() {
    let ctx = TestCtx::new().await;
    let (alice, alice_token) = ctx.user("alice").await;
    let (_bob, bob_token) = ctx.user("bob").await;
    let future = ctx.post_for(&alice, -1).await;

    let app = app!(ctx);
    let uri = format!("/posts/{}/", future.id);

    // Anonymous and other users see a 404, not a permission error.
    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&bob_token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The author always gets through.
    let detail: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&alice_token))
            .to_request(),
    )
    .await;
    assert_eq!(detail.id, future.id);
}

#[actix_web::test]
async fn out_of_range_page_clamps_to_last() {
    let ctx = TestCtx::new().await;
    let (alice, _) = ctx.user("alice").await;
    for h in 1..=15 {
        ctx.post_for(&alice, h).await;
    }

    let app = app!(ctx);
    let page: PageDto<PostSummaryDto> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=99").to_request(),
    )
    .await;

    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 5);
}

#[actix_web::test]
async fn create_post_requires_auth_and_redirects_to_profile() {
    let ctx = TestCtx::new().await;
    let (_alice, token) = ctx.user("alice").await;
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .set_json(ctx.payload())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(bearer(&token))
            .set_json(ctx.payload())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/profile/alice/"
    );

    let profile: ProfileDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/alice/").to_request(),
    )
    .await;
    assert_eq!(profile.posts.total_items, 1);
    assert!(!profile.is_owner);
}

#[actix_web::test]
async fn create_post_validation_failure_returns_422() {
    let ctx = TestCtx::new().await;
    let (_alice, token) = ctx.user("alice").await;
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(bearer(&token))
            .set_json(PostPayload::default())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn unpublished_category_is_not_offered_and_rejected() {
    let ctx = TestCtx::new().await;
    let (_alice, token) = ctx.user("alice").await;

    let mut unlisted = Category::new("Unlisted".to_string(), "unlisted".to_string());
    unlisted.is_published = false;
    ctx.store.add_category(unlisted.clone()).await;

    let app = app!(ctx);

    let form: PostFormDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/posts/create/")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert!(form.categories.iter().all(|c| c.id != unlisted.id));

    let mut payload = ctx.payload();
    payload.category_id = Some(unlisted.id);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(bearer(&token))
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn edit_rejects_category_unpublished_since_filing() {
    let ctx = TestCtx::new().await;
    let (alice, token) = ctx.user("alice").await;
    let post = ctx.post_for(&alice, 1).await;

    let mut retired = ctx.category.clone();
    retired.is_published = false;
    ctx.store.add_category(retired).await;

    let app = app!(ctx);

    // Resubmitting the post's own category fails now that it is unpublished.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(bearer(&token))
            .set_json(ctx.payload())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The prefilled form still shows the retired category as the current
    // value, just not as a selectable choice.
    let form: PostFormDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(form.values.unwrap().category_id, Some(ctx.category.id));
    assert!(form.categories.is_empty());
}

#[actix_web::test]
async fn non_author_edit_redirects_and_leaves_post_unchanged() {
    let ctx = TestCtx::new().await;
    let (alice, alice_token) = ctx.user("alice").await;
    let (_bob, bob_token) = ctx.user("bob").await;
    let post = ctx.post_for(&alice, 1).await;

    let app = app!(ctx);
    let uri = format!("/posts/{}/edit/", post.id);

    let mut payload = ctx.payload();
    payload.title = Some("Hijacked".to_string());
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&bob_token))
            .set_json(payload)
            .to_request(),
    )
    .await;

    // Soft-fail: a redirect to the post, not a 403.
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("/posts/{}/", post.id)
    );

    let detail: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .insert_header(bearer(&alice_token))
            .to_request(),
    )
    .await;
    assert_eq!(detail.title, post.title);
}

#[actix_web::test]
async fn author_edits_own_post() {
    let ctx = TestCtx::new().await;
    let (alice, token) = ctx.user("alice").await;
    let post = ctx.post_for(&alice, 1).await;

    let app = app!(ctx);

    // Prefilled form first.
    let form: PostFormDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(form.values.unwrap().title.unwrap(), post.title);

    let mut payload = ctx.payload();
    payload.title = Some("Revised".to_string());
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(bearer(&token))
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let detail: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(detail.title, "Revised");
}

#[actix_web::test]
async fn delete_post_confirm_then_delete() {
    let ctx = TestCtx::new().await;
    let (alice, token) = ctx.user("alice").await;
    let post = ctx.post_for(&alice, 1).await;

    let app = app!(ctx);

    let confirm: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/delete/", post.id))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(confirm.id, post.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", post.id))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comment_lifecycle_updates_comment_count() {
    let ctx = TestCtx::new().await;
    let (alice, alice_token) = ctx.user("alice").await;
    let (_bob, bob_token) = ctx.user("bob").await;
    let post = ctx.post_for(&alice, 1).await;

    let app = app!(ctx);
    let detail_uri = format!("/posts/{}/", post.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .insert_header(bearer(&bob_token))
            .set_json(CommentPayload {
                text: Some("Great read".to_string()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let detail: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&detail_uri).to_request(),
    )
    .await;
    assert_eq!(detail.comments.len(), 1);
    let comment_id = detail.comments[0].id;

    let page: PageDto<PostSummaryDto> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(page.items[0].comment_count, 1);

    // Alice is not the comment's author: redirect, no deletion.
    let delete_uri = format!("/posts/{}/comments/{}/delete/", post.id, comment_id);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&delete_uri)
            .insert_header(bearer(&alice_token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // Bob confirms and deletes.
    let confirm: CommentDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&delete_uri)
            .insert_header(bearer(&bob_token))
            .to_request(),
    )
    .await;
    assert_eq!(confirm.text, "Great read");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&delete_uri)
            .insert_header(bearer(&bob_token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let detail: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&detail_uri).to_request(),
    )
    .await;
    assert!(detail.comments.is_empty());

    let page: PageDto<PostSummaryDto> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(page.items[0].comment_count, 0);
}

#[actix_web::test]
async fn edit_comment_as_author() {
    let ctx = TestCtx::new().await;
    let (alice, _) = ctx.user("alice").await;
    let (bob, bob_token) = ctx.user("bob").await;
    let post = ctx.post_for(&alice, 1).await;

    let comment = ctx
        .state
        .comments
        .insert(quill_core::domain::Comment::new(
            post.id,
            bob.id,
            "typo".to_string(),
        ))
        .await
        .unwrap();

    let app = app!(ctx);
    let edit_uri = format!("/posts/{}/comments/{}/edit/", post.id, comment.id);

    let form: CommentDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&edit_uri)
            .insert_header(bearer(&bob_token))
            .to_request(),
    )
    .await;
    assert_eq!(form.text, "typo");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&edit_uri)
            .insert_header(bearer(&bob_token))
            .set_json(CommentPayload {
                text: Some("fixed".to_string()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let detail: PostDetailDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(detail.comments[0].text, "fixed");
}

#[actix_web::test]
async fn category_listing_and_unpublished_category_404() {
    let ctx = TestCtx::new().await;
    let (alice, _) = ctx.user("alice").await;
    ctx.post_for(&alice, 1).await;

    let mut unlisted = Category::new("Unlisted".to_string(), "unlisted".to_string());
    unlisted.is_published = false;
    ctx.store.add_category(unlisted).await;

    let app = app!(ctx);

    let page: CategoryPageDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/category/general/").to_request(),
    )
    .await;
    assert_eq!(page.category.slug, "general");
    assert_eq!(page.posts.total_items, 1);

    for slug in ["unlisted", "missing"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/category/{slug}/"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn signup_logs_in_and_rejects_duplicates() {
    let ctx = TestCtx::new().await;
    let app = app!(ctx);

    let auth: AuthResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_json(SignupRequest {
                username: "carol".to_string(),
                password: "correct horse".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(auth.token_type, "Bearer");

    // The signup token works immediately.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(bearer(&auth.access_token))
            .set_json(ctx.payload())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_json(SignupRequest {
                username: "carol".to_string(),
                password: "another pass".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_verifies_password() {
    let ctx = TestCtx::new().await;
    let hash = ctx.passwords.hash("swordfish1").unwrap();
    ctx.state
        .users
        .insert(User::new("dave".to_string(), hash))
        .await
        .unwrap();

    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(quill_shared::dto::LoginRequest {
                username: "dave".to_string(),
                password: "wrong".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let auth: AuthResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(quill_shared::dto::LoginRequest {
                username: "dave".to_string(),
                password: "swordfish1".to_string(),
            })
            .to_request(),
    )
    .await;
    assert!(!auth.access_token.is_empty());
}

#[actix_web::test]
async fn profile_of_unknown_user_404s_and_owner_flag_set() {
    let ctx = TestCtx::new().await;
    let (_alice, token) = ctx.user("alice").await;
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/ghost/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let profile: ProfileDto = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/alice/")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert!(profile.is_owner);
}

#[actix_web::test]
async fn unmatched_route_renders_dedicated_404() {
    let ctx = TestCtx::new().await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/no/such/route/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.status, 404);
    assert_eq!(body.title, "Not Found");
}

#[actix_web::test]
async fn comment_on_missing_post_404s() {
    let ctx = TestCtx::new().await;
    let (_alice, token) = ctx.user("alice").await;
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", Uuid::new_v4()))
            .insert_header(bearer(&token))
            .set_json(CommentPayload {
                text: Some("hello?".to_string()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
