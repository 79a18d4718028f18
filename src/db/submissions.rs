use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

use super::{BoxError, StorageError, SubmissionStore};
use crate::config::MongoConfig;
use crate::models::{Submission, SubmissionId};

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    database: Database,
    collection: Collection<Submission>,
}

impl MongoStore {
    /// Build a client for the configured cluster. The driver connects
    /// lazily, so an unreachable server only surfaces on first use.
    pub async fn connect(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let collection = database.collection::<Submission>(&config.collection);

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB client configured"
        );

        Ok(Self {
            database,
            collection,
        })
    }
}

#[async_trait]
impl SubmissionStore for MongoStore {
    #[tracing::instrument(name = "Saving submission", skip_all)]
    async fn store(&self, submission: &Submission) -> Result<SubmissionId, StorageError> {
        let result = self.collection.insert_one(submission).await?;

        let id = match result.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => result.inserted_id.to_string(),
        };
        tracing::debug!(%id, "Submission stored");

        Ok(SubmissionId(id))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        let bucket: fn(BoxError) -> StorageError = match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => {
                StorageError::Duplicate
            }
            ErrorKind::Write(_) => StorageError::Rejected,
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. } => StorageError::Unavailable,
            _ => StorageError::Other,
        };
        bucket(Box::new(err))
    }
}
