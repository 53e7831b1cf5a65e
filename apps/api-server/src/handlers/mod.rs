//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;
mod pages;
mod profile;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(blog::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/registration/", web::post().to(auth::signup))
                .route("/login", web::post().to(auth::login)),
        )
        .service(
            web::scope("/posts")
                // Literal segment registered first so it never parses as an id.
                .route("/create/", web::get().to(blog::create_post_form))
                .route("/create/", web::post().to(blog::create_post))
                .route("/{post_id}/", web::get().to(blog::post_detail))
                .route("/{post_id}/edit/", web::get().to(blog::edit_post_form))
                .route("/{post_id}/edit/", web::post().to(blog::edit_post))
                .route("/{post_id}/delete/", web::get().to(blog::delete_post_confirm))
                .route("/{post_id}/delete/", web::post().to(blog::delete_post))
                .route("/{post_id}/comment/", web::post().to(blog::add_comment))
                .route(
                    "/{post_id}/comments/{comment_id}/edit/",
                    web::get().to(blog::edit_comment_form),
                )
                .route(
                    "/{post_id}/comments/{comment_id}/edit/",
                    web::post().to(blog::edit_comment),
                )
                .route(
                    "/{post_id}/comments/{comment_id}/delete/",
                    web::get().to(blog::delete_comment_confirm),
                )
                .route(
                    "/{post_id}/comments/{comment_id}/delete/",
                    web::post().to(blog::delete_comment),
                ),
        )
        .route("/category/{slug}/", web::get().to(blog::category_posts))
        .route("/profile/{username}/", web::get().to(profile::profile))
        .service(
            web::scope("/pages")
                .route("/about/", web::get().to(pages::about))
                .route("/rules/", web::get().to(pages::rules)),
        )
        .default_service(web::route().to(pages::not_found));
}

/// 303 See Other - the GET-after-POST response, also used for the
/// ownership soft-fail redirect.
pub(crate) fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}
