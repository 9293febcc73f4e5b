//! Endpoint listing served at the documentation path.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
struct Endpoint {
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct ApiDocs {
    title: &'static str,
    version: &'static str,
    endpoints: &'static [Endpoint],
}

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "GET",
        path: "/posts/list?page=&sortField=&sortOrder=",
        description: "List ads, 10 per page, sorted by creation or price (asc|desc)",
    },
    Endpoint {
        method: "GET",
        path: "/posts?id=&fields=description",
        description: "Get one ad by id; name and price, plus description on request",
    },
    Endpoint {
        method: "POST",
        path: "/posts",
        description: "Create an ad from {name, description, price}; name and price are required",
    },
    Endpoint {
        method: "GET",
        path: "/health",
        description: "Service health",
    },
];

/// GET /docs
pub async fn api_docs() -> HttpResponse {
    HttpResponse::Ok().json(ApiDocs {
        title: "Ads service API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}
