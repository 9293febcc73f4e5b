use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A stored classified ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    /// Hex-encoded storage identifier.
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub creation: DateTime<Utc>,
}

impl Ad {
    /// An ad without a name or with a zero price is not fit to be served.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && self.price != 0.0
    }
}

/// An ad submitted for insertion. The identifier is assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAd {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub creation: DateTime<Utc>,
}

impl NewAd {
    /// Create a new ad stamped with the current time.
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self::created_at(name, description, price, Utc::now())
    }

    /// Create a new ad with an explicit creation time.
    pub fn created_at(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        creation: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price: round_price(price),
            creation,
        }
    }

    /// Check the fields required before the ad may be persisted.
    pub fn ensure_complete(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::MissingName);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::InvalidPrice);
        }
        if round_price(self.price) == 0.0 {
            return Err(DomainError::MissingPrice);
        }
        Ok(())
    }
}

/// Round a price to two fractional digits.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
