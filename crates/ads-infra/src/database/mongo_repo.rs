//! MongoDB repository implementation.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::FindOptions;

use ads_core::{Ad, AdRepository, NewAd, PageRequest, RepoError};

use super::connection::DatabaseConnection;
use super::document::{AdDocument, inserted_id_hex, parse_id};

/// MongoDB ad repository over the configured collection.
#[derive(Clone)]
pub struct MongoAdRepository {
    collection: Collection<AdDocument>,
}

impl MongoAdRepository {
    pub fn new(conn: &DatabaseConnection) -> Self {
        Self::from_collection(conn.collection())
    }

    pub fn from_collection(collection: Collection<AdDocument>) -> Self {
        Self { collection }
    }
}

fn storage_error(context: &'static str) -> impl FnOnce(mongodb::error::Error) -> RepoError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        RepoError::Storage(e.to_string())
    }
}

fn id_filter(oid: ObjectId) -> Document {
    doc! { "_id": oid }
}

fn found_or_missing(found: Option<AdDocument>, id: &str) -> Result<Ad, RepoError> {
    match found {
        Some(document) => Ad::try_from(document),
        None => {
            tracing::debug!(ad_id = %id, "Ad not found");
            Err(RepoError::NotFound(id.to_string()))
        }
    }
}

/// Sort, skip and limit for one listing page.
///
/// Returns `None` when the page starts beyond the largest offset the server
/// accepts (`i64::MAX`); such a page is empty.
fn list_options(request: &PageRequest) -> Option<FindOptions> {
    let skip = request.skip();
    if i64::try_from(skip).is_err() {
        return None;
    }

    let mut sort = Document::new();
    sort.insert(request.sort_field.as_str(), request.sort_order.direction());

    Some(
        FindOptions::builder()
            .sort(sort)
            .skip(skip)
            .limit(request.limit() as i64)
            .build(),
    )
}

#[async_trait]
impl AdRepository for MongoAdRepository {
    async fn add_post(&self, ad: NewAd) -> Result<String, RepoError> {
        if let Err(e) = ad.ensure_complete() {
            tracing::debug!(error = %e, "Rejecting incomplete ad");
            return Err(e.into());
        }

        let document = AdDocument::from(ad);
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(storage_error("Failed to insert ad"))?;

        inserted_id_hex(&result.inserted_id).inspect_err(|e| {
            tracing::debug!(error = %e, "Inserted id is not an ObjectId");
        })
    }

    async fn get_specific_post(&self, id: &str) -> Result<Ad, RepoError> {
        let oid = parse_id(id).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to decode ad id");
        })?;

        let found = self
            .collection
            .find_one(id_filter(oid))
            .await
            .map_err(storage_error("Failed to look up ad by id"))?;

        found_or_missing(found, id)
    }

    async fn get_list_post(
        &self,
        page: u64,
        sort_field: &str,
        sort_order: &str,
    ) -> Result<Vec<Ad>, RepoError> {
        let request = PageRequest::parse(page, sort_field, sort_order).map_err(|e| {
            tracing::warn!(error = %e, "Rejecting ad listing");
            RepoError::from(e)
        })?;

        tracing::debug!(
            page = request.page,
            sort_field = %request.sort_field,
            sort_order = %request.sort_order,
            "Listing ads"
        );

        let Some(options) = list_options(&request) else {
            tracing::debug!(page = request.page, "Page starts past the last offset");
            return Ok(Vec::new());
        };

        let cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(storage_error("Failed to list ads"))?;

        let documents: Vec<AdDocument> = cursor
            .try_collect()
            .await
            .map_err(storage_error("Failed to decode ad listing"))?;

        documents.into_iter().map(Ad::try_from).collect()
    }
}
