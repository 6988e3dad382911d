//! Connection configuration for the MongoDB backend.

use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DB: &str = "tierlist";

/// Parsed connection options plus the target database name.
#[derive(Clone)]
pub struct MongoConfig {
    /// Driver client options parsed from the URI.
    pub options: ClientOptions,
    /// Database holding the tier document collection.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse a connection URI, taking the database name from its path when
    /// present and falling back to `tierlist`.
    pub async fn from_uri(uri: &str) -> MongoResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;

        let database_name = options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DB.to_owned());

        Ok(Self {
            options,
            database_name,
        })
    }
}
