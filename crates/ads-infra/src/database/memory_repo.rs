//! In-memory ad repository - used for tests and local development.

use std::cmp::Ordering;

use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document, oid::ObjectId};
use tokio::sync::RwLock;

use ads_core::{Ad, AdRepository, NewAd, PageRequest, RepoError, SortOrder};

use super::document::{AdDocument, parse_id};

/// In-memory repository with the same ordering rules as the MongoDB one.
///
/// Documents keep insertion order, sorts are stable, and sort keys compare
/// by BSON type order with missing fields first.
/// Note: Data is lost on process restart.
pub struct InMemoryAdRepository {
    store: RwLock<Vec<Document>>,
}

impl InMemoryAdRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

impl Default for InMemoryAdRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(document: Document) -> Result<Ad, RepoError> {
    let doc: AdDocument =
        bson::from_document(document).map_err(|e| RepoError::Storage(e.to_string()))?;
    Ad::try_from(doc)
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 1,
        Some(Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_)) => 2,
        Some(Bson::String(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(_) => 10,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        (Some(x), Some(y)) => match (as_number(x), as_number(y)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[async_trait]
impl AdRepository for InMemoryAdRepository {
    async fn add_post(&self, ad: NewAd) -> Result<String, RepoError> {
        if let Err(e) = ad.ensure_complete() {
            tracing::debug!(error = %e, "Rejecting incomplete ad");
            return Err(e.into());
        }

        let id = ObjectId::new();
        let mut document = AdDocument::from(ad);
        document.id = Some(id);
        let document =
            bson::to_document(&document).map_err(|e| RepoError::Storage(e.to_string()))?;

        self.store.write().await.push(document);
        Ok(id.to_hex())
    }

    async fn get_specific_post(&self, id: &str) -> Result<Ad, RepoError> {
        let oid = parse_id(id).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to decode ad id");
        })?;

        let store = self.store.read().await;
        let found = store
            .iter()
            .find(|doc| doc.get_object_id("_id").is_ok_and(|stored| stored == oid))
            .cloned();
        drop(store);

        match found {
            Some(document) => decode(document),
            None => {
                tracing::debug!(ad_id = %id, "Ad not found");
                Err(RepoError::NotFound(id.to_string()))
            }
        }
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

        let mut documents = self.store.read().await.clone();
        documents.sort_by(|a, b| {
            let ordering = compare_values(
                a.get(&request.sort_field),
                b.get(&request.sort_field),
            );
            match request.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        documents
            .into_iter()
            .skip(request.skip() as usize)
            .take(request.limit() as usize)
            .map(decode)
            .collect()
    }
}
