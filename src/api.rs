use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{ApiError, ValidationError};
use crate::models::ReviewInput;
use crate::store::ReviewStore;

type Store = web::Data<dyn ReviewStore>;

/// Query string for `GET /reviews/filter`
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub rating: Option<String>,
}

impl FilterQuery {
    /// Absent or empty means "no rating", which matches nothing
    fn rating(&self) -> Result<Option<i64>, ValidationError> {
        match self.rating.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ValidationError::RatingNotInteger),
        }
    }
}

/// Register the review routes, plus extractor configs that answer malformed
/// requests with the same JSON error body as the handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .service(
        web::resource("/reviews")
            .route(web::get().to(list_reviews))
            .route(web::post().to(create_review)),
    )
    .service(web::resource("/reviews/filter").route(web::get().to(filter_reviews)))
    .service(
        web::resource("/reviews/{id}")
            .route(web::get().to(get_review))
            .route(web::put().to(update_review))
            .route(web::delete().to(delete_review)),
    );
}

async fn list_reviews(store: Store) -> Result<HttpResponse, ApiError> {
    let reviews = store.list_all().await?;
    debug!(count = reviews.len(), "Listing reviews");
    Ok(HttpResponse::Ok().json(reviews))
}

async fn filter_reviews(
    store: Store,
    query: web::Query<FilterQuery>,
) -> Result<HttpResponse, ApiError> {
    let rating = query.rating()?;
    let reviews = store.list_by_rating(rating).await?;
    debug!(?rating, count = reviews.len(), "Filtered reviews");
    Ok(HttpResponse::Ok().json(reviews))
}

async fn get_review(store: Store, id: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let review = store.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(review))
}

async fn create_review(
    store: Store,
    body: web::Json<ReviewInput>,
) -> Result<HttpResponse, ApiError> {
    let draft = body.into_inner().validate()?;
    let review = store.insert(draft).await?;

    info!(id = review.id, title = %review.title, "Created review");

    Ok(HttpResponse::Ok().json(review))
}

async fn update_review(
    store: Store,
    id: web::Path<i64>,
    body: web::Json<ReviewInput>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let draft = body.into_inner().validate()?;
    let review = store.update(id, draft).await?;

    info!(id, "Updated review");

    Ok(HttpResponse::Ok().json(review))
}

async fn delete_review(store: Store, id: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    store.remove(id).await?;

    info!(id, "Deleted review");

    Ok(HttpResponse::Ok().json(json!({ "message": "Review deleted" })))
}
