use std::sync::Arc;
use std::time::Duration;

use mongodb::options::ClientOptions;
use mongodb::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::InMemoryGradeStore;
use crate::database::mongo::MongoGradeStore;
use crate::database::store::{DynGradeStore, GradeStore, StoreError};

/// Database used when neither the config nor the URL names one
const DEFAULT_DB_NAME: &str = "bookStoreDB";

/// Errors from connection bootstrap
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(#[source] mongodb::error::Error),

    #[error("Could not create database client: {0}")]
    Client(#[source] mongodb::error::Error),

    #[error("Database at {url} is unreachable: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: StoreError,
    },
}

/// Establishes the single store handle the service runs with
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to the configured backend and verify it with one round trip.
    ///
    /// The returned handle is shared by every request for the lifetime of the
    /// process. There is no retry: a failure here must stop startup.
    pub async fn connect(config: &DatabaseConfig) -> Result<DynGradeStore, DatabaseError> {
        match config.store {
            StoreBackend::Memory => {
                info!("Using in-memory record store");
                Ok(Arc::new(InMemoryGradeStore::new()))
            }
            StoreBackend::Mongo => {
                let store = Self::connect_mongo(config).await?;
                Ok(Arc::new(store))
            }
        }
    }

    async fn connect_mongo(config: &DatabaseConfig) -> Result<MongoGradeStore, DatabaseError> {
        let redacted = Self::redact_url(&config.url);

        let mut options = ClientOptions::parse(config.url.as_str())
            .await
            .map_err(DatabaseError::InvalidDatabaseUrl)?;
        let timeout = Duration::from_secs(config.connection_timeout);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let database_name = Self::resolve_database_name(config, options.default_database.as_deref());
        let client = Client::with_options(options).map_err(DatabaseError::Client)?;
        let store = MongoGradeStore::new(client.database(&database_name), &config.collection);

        // The driver connects lazily, so ping to surface failures before listening
        if let Err(source) = store.ping().await {
            error!("Failed to reach {}: {}", redacted, source);
            return Err(DatabaseError::Unreachable {
                url: redacted,
                source,
            });
        }

        info!(
            "Connected to {} (database: {}, collection: {})",
            redacted, database_name, config.collection
        );
        Ok(store)
    }

    /// Explicit name wins, then the URL's default database, then the fallback
    fn resolve_database_name(config: &DatabaseConfig, from_url: Option<&str>) -> String {
        config
            .name
            .as_deref()
            .or(from_url)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DB_NAME)
            .to_string()
    }

    /// Strip credentials from a connection string before it reaches the logs
    fn redact_url(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.into()
            }
            // Multi-host seed lists do not parse as a single URL
            Err(_) => match raw.split_once('@') {
                Some((scheme_and_user, hosts)) => {
                    let scheme = scheme_and_user.split("://").next().unwrap_or("mongodb");
                    format!("{}://***@{}", scheme, hosts)
                }
                None => raw.to_string(),
            },
        }
    }
}
