use async_trait::async_trait;

use crate::domain::{Ad, NewAd};
use crate::error::RepoError;

/// Ad repository - create, point lookup and paginated listing.
///
/// Implementations share one long-lived storage handle across concurrent
/// calls and never retry a failed operation.
#[async_trait]
pub trait AdRepository: Send + Sync {
    /// Insert an ad and return its storage-assigned identifier, hex-encoded.
    async fn add_post(&self, ad: NewAd) -> Result<String, RepoError>;

    /// Fetch one ad by its hex-encoded identifier.
    async fn get_specific_post(&self, id: &str) -> Result<Ad, RepoError>;

    /// List one page of ads ordered by `sort_field` in `sort_order` (`asc` or `desc`).
    async fn get_list_post(
        &self,
        page: u64,
        sort_field: &str,
        sort_order: &str,
    ) -> Result<Vec<Ad>, RepoError>;
}
