//! Database connection management and ad repositories.

mod connection;
mod document;
mod memory_repo;
mod mongo_repo;

pub use connection::{
    BoxError, ConnectError, Connector, DatabaseConnection, MongoConfig, MongoConnector,
    connect_with_retry,
};
pub use document::{AdDocument, inserted_id_hex, parse_id};
pub use memory_repo::InMemoryAdRepository;
pub use mongo_repo::MongoAdRepository;
