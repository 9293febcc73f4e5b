//! Ad handlers.

use actix_web::{HttpResponse, web};

use ads_core::NewAd;
use ads_shared::dto::{AdResponse, CreateAdRequest, CreatedAdResponse, GetAdQuery, ListAdsQuery};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /posts
pub async fn add_post(
    state: web::Data<AppState>,
    body: web::Json<CreateAdRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.is_empty() || req.price == 0.0 {
        tracing::debug!("Required ad fields name or price are missing");
        return Err(AppError::BadRequest(
            "required fields name and price are missing".to_string(),
        ));
    }

    let ad = NewAd::new(req.name, req.description, req.price);
    let id = state.ads.add_post(ad).await?;

    Ok(HttpResponse::Ok().json(CreatedAdResponse { id }))
}

/// GET /posts?id=<hex>&fields=description
pub async fn get_specific_post(
    state: web::Data<AppState>,
    query: web::Query<GetAdQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) else {
        tracing::debug!("Missing id parameter");
        return Err(AppError::BadRequest("missing id parameter".to_string()));
    };

    let ad = state.ads.get_specific_post(id).await?;
    if !ad.is_complete() {
        tracing::debug!(ad_id = %ad.id, "Stored ad is missing required fields");
        return Err(AppError::BadRequest(
            "ad is missing required fields".to_string(),
        ));
    }

    let description = query.wants_description().then_some(ad.description);
    Ok(HttpResponse::Ok().json(AdResponse {
        name: ad.name,
        description,
        price: ad.price,
    }))
}

/// GET /posts/list?page=&sortField=&sortOrder=
pub async fn get_list_post(
    state: web::Data<AppState>,
    query: web::Query<ListAdsQuery>,
) -> AppResult<HttpResponse> {
    let ads = state
        .ads
        .get_list_post(query.page(), query.sort_field(), query.sort_order())
        .await?;

    let response: Vec<AdResponse> = ads
        .into_iter()
        .map(|ad| AdResponse {
            name: ad.name,
            description: None,
            price: ad.price,
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
