//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to publish a new ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
}

/// Response carrying the identifier of a created ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedAdResponse {
    pub id: String,
}

/// Ad as returned by lookups and listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdResponse {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetAdQuery {
    pub id: Option<String>,
    /// `description` to include the ad description.
    pub fields: Option<String>,
}

impl GetAdQuery {
    pub fn wants_description(&self) -> bool {
        self.fields.as_deref() == Some("description")
    }
}

/// Query string of `GET /posts/list`.
///
/// `page` stays a string so that an unparsable value falls back to page 1
/// instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAdsQuery {
    pub page: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

impl ListAdsQuery {
    pub const DEFAULT_SORT_FIELD: &'static str = "creation";

    /// Requested page, `1` when absent, unparsable or below one.
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn sort_field(&self) -> &str {
        match self.sort_field.as_deref() {
            Some(field) if !field.is_empty() => field,
            _ => Self::DEFAULT_SORT_FIELD,
        }
    }

    /// Raw sort order; validation is left to the repository.
    pub fn sort_order(&self) -> &str {
        self.sort_order.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_query(page: Option<&str>) -> ListAdsQuery {
        ListAdsQuery {
            page: page.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(list_query(None).page(), 1);
        assert_eq!(list_query(Some("abc")).page(), 1);
        assert_eq!(list_query(Some("0")).page(), 1);
        assert_eq!(list_query(Some("-2")).page(), 1);
        assert_eq!(list_query(Some("4")).page(), 4);
    }

    #[test]
    fn sort_field_defaults_to_creation() {
        assert_eq!(list_query(None).sort_field(), "creation");
        let query = ListAdsQuery {
            sort_field: Some("price".into()),
            ..Default::default()
        };
        assert_eq!(query.sort_field(), "price");
    }

    #[test]
    fn list_query_uses_camel_case_names() {
        let query: ListAdsQuery =
            serde_json::from_str(r#"{"page":"2","sortField":"price","sortOrder":"desc"}"#)
                .unwrap();
        assert_eq!(query.page(), 2);
        assert_eq!(query.sort_field(), "price");
        assert_eq!(query.sort_order(), "desc");
    }

    #[test]
    fn description_is_omitted_when_absent() {
        let body = AdResponse {
            name: "bike".into(),
            description: None,
            price: 10.5,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"name":"bike","price":10.5}"#
        );
    }
}
