//! BSON mapping for stored ads.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, oid::ObjectId};
use serde::{Deserialize, Serialize};

use ads_core::domain::round_price;
use ads_core::{Ad, NewAd, RepoError};

/// An ad as persisted in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    pub creation: bson::DateTime,
}

/// Conversion from a submitted ad. The identifier is left to storage.
impl From<NewAd> for AdDocument {
    fn from(ad: NewAd) -> Self {
        Self {
            id: None,
            name: ad.name,
            description: ad.description,
            price: round_price(ad.price),
            creation: bson::DateTime::from_millis(ad.creation.timestamp_millis()),
        }
    }
}

/// Conversion from a stored document to the domain ad.
impl TryFrom<AdDocument> for Ad {
    type Error = RepoError;

    fn try_from(doc: AdDocument) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .ok_or_else(|| RepoError::Encoding("document has no _id".to_string()))?;
        let millis = doc.creation.timestamp_millis();
        let creation = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            RepoError::Storage(format!("creation timestamp {millis} is out of range"))
        })?;

        Ok(Self {
            id: id.to_hex(),
            name: doc.name,
            description: doc.description,
            price: doc.price,
            creation,
        })
    }
}

/// Decode a hex identifier supplied by a caller.
pub fn parse_id(hex: &str) -> Result<ObjectId, RepoError> {
    ObjectId::parse_str(hex).map_err(|_| RepoError::InvalidIdentifier(hex.to_string()))
}

/// Hex-encode an identifier returned by an insert.
pub fn inserted_id_hex(id: &Bson) -> Result<String, RepoError> {
    id.as_object_id()
        .map(|oid| oid.to_hex())
        .ok_or_else(|| RepoError::Encoding(format!("expected ObjectId, got {id}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn new_ad_document_omits_id() {
        let creation = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let doc = AdDocument::from(NewAd::created_at("bike", "red", 120.456, creation));

        let raw = bson::to_document(&doc).unwrap();
        assert!(!raw.contains_key("_id"));
        assert_eq!(raw.get_f64("price").unwrap(), 120.46);
        assert_eq!(raw.get_str("name").unwrap(), "bike");
        assert_eq!(
            raw.get_datetime("creation").unwrap().timestamp_millis(),
            creation.timestamp_millis()
        );
    }

    #[test]
    fn stored_document_maps_to_ad() {
        let id = ObjectId::new();
        let creation = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut doc = AdDocument::from(NewAd::created_at("bike", "red", 120.0, creation));
        doc.id = Some(id);

        let ad = Ad::try_from(doc).unwrap();
        assert_eq!(ad.id, id.to_hex());
        assert_eq!(ad.creation, creation);
        assert_eq!(ad.description, "red");
    }

    #[test]
    fn document_without_id_is_an_encoding_error() {
        let doc = AdDocument::from(NewAd::new("bike", "", 1.0));
        assert!(matches!(Ad::try_from(doc), Err(RepoError::Encoding(_))));
    }

    #[test]
    fn parse_id_accepts_only_object_id_hex() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);

        for bad in ["", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", "65f0a1b2c3d4e5f6a7b8c9d0ff"] {
            assert!(
                matches!(parse_id(bad), Err(RepoError::InvalidIdentifier(ref s)) if s == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn inserted_id_must_be_object_id() {
        let id = ObjectId::new();
        assert_eq!(inserted_id_hex(&Bson::ObjectId(id)).unwrap(), id.to_hex());
        assert!(matches!(
            inserted_id_hex(&Bson::Int32(7)),
            Err(RepoError::Encoding(_))
        ));
        assert!(matches!(
            inserted_id_hex(&Bson::String(id.to_hex())),
            Err(RepoError::Encoding(_))
        ));
    }

    #[test]
    fn missing_optional_fields_decode_as_empty() {
        let raw = bson::doc! {
            "_id": ObjectId::new(),
            "creation": bson::DateTime::now(),
        };
        let doc: AdDocument = bson::from_document(raw).unwrap();
        assert!(doc.name.is_empty());
        assert_eq!(doc.price, 0.0);
        assert!(!Ad::try_from(doc).unwrap().is_complete());
    }
}
