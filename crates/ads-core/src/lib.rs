//! # Ads Core
//!
//! The domain layer of the ads service.
//! This crate holds the classified-ad model, its validation rules and the
//! repository port. It has no storage or transport dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use domain::{Ad, NewAd, PAGE_SIZE, PageRequest, SortOrder};
pub use error::{DomainError, RepoError};
pub use ports::AdRepository;
