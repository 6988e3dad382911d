//! MongoDB-specific error taxonomy.

use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors raised by the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The client could not be constructed from the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The initial ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Driver error from the last attempt.
        #[source]
        source: MongoError,
    },
    /// A routine health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Writing the document snapshot failed.
    #[error("failed to save tier document")]
    SaveDocument {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading the document snapshot failed.
    #[error("failed to load tier document")]
    LoadDocument {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The stored snapshot could not be decoded into the document model.
    #[error("failed to decode stored tier document")]
    Decode {
        /// Decoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
