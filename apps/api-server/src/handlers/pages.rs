//! Static pages and the dedicated not-found page.

use actix_web::HttpResponse;
use serde::Serialize;

use quill_shared::ErrorResponse;

#[derive(Serialize)]
struct PageBody {
    title: &'static str,
    text: &'static str,
}

/// GET /pages/about/
pub async fn about() -> HttpResponse {
    HttpResponse::Ok().json(PageBody {
        title: "About",
        text: "Quill is a small blog publishing service: write posts, file \
               them under categories, and discuss them in the comments.",
    })
}

/// GET /pages/rules/
pub async fn rules() -> HttpResponse {
    HttpResponse::Ok().json(PageBody {
        title: "Rules",
        text: "Be kind. You can only edit and delete your own posts and \
               comments.",
    })
}

/// Default handler for unmatched routes - the dedicated 404 page.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found(
        "The requested page does not exist",
    ))
}
