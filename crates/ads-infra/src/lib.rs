//! # Ads Infrastructure
//!
//! Concrete implementations of the ports defined in `ads-core`:
//! the MongoDB connection manager and the ad repositories.

pub mod database;

pub use database::{
    ConnectError, DatabaseConnection, InMemoryAdRepository, MongoAdRepository, MongoConfig,
};
