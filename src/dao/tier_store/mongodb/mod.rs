//! MongoDB backend mirroring the JSON document into a single-document
//! collection.

pub mod config;
mod connection;
mod error;
pub mod store;

pub use error::MongoDaoError;
pub use store::MongoTierStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::Decode { .. } => StorageError::corrupted(err.to_string(), err),
            _ => StorageError::unavailable(err.to_string(), err),
        }
    }
}
