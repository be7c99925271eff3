//! Client session and init-check evaluation over the MongoDB driver.
//!
//! The session wraps one driver client per logical target collection. All
//! boundary calls take `&self` and may run concurrently from any number of
//! tasks; the driver's connection pool owns the concurrency discipline, and
//! this layer adds no locking, retries, or caching of its own.

use crate::config::ConnectionConfig;
use crate::error::{AtlasLinkError, Result};
use crate::models::InitCheck;
use async_trait::async_trait;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options::{ClientOptions, Tls, TlsOptions},
};
use tracing::debug;

/// Application name stamped on derived client options so deployments can
/// attribute connections.
const APP_NAME: &str = "atlaslink";

/// Topology questions the init check asks of a deployment.
///
/// This is the narrow boundary surface behind
/// [`evaluate_init_check`]; anything that can list databases and
/// collections and count documents can stand in for a live deployment.
#[async_trait]
pub trait NamespaceProbe: Send + Sync {
    /// Lists the database names visible to the current credentials.
    async fn database_names(&self) -> Result<Vec<String>>;

    /// Lists the collection names within `database`.
    async fn collection_names(&self, database: &str) -> Result<Vec<String>>;

    /// Counts documents in `collection` with a match-all filter.
    async fn count_documents(&self, database: &str, collection: &str) -> Result<u64>;
}

/// Evaluates the init check against any [`NamespaceProbe`].
///
/// The order is part of the contract: each step is strictly more expensive
/// than the one before it, and once a step decides, later steps are not
/// issued at all. Every call re-evaluates from scratch; nothing is memoized.
///
/// # Errors
/// The first failing step's transport error propagates unmodified.
pub async fn evaluate_init_check<P>(
    probe: &P,
    database: &str,
    collection: &str,
) -> Result<InitCheck>
where
    P: NamespaceProbe + ?Sized,
{
    let databases = probe.database_names().await?;
    if !databases.iter().any(|name| name == database) {
        return Ok(InitCheck::DatabaseMissing);
    }

    let collections = probe.collection_names(database).await?;
    if !collections.iter().any(|name| name == collection) {
        return Ok(InitCheck::CollectionMissing);
    }

    let count = probe.count_documents(database, collection).await?;
    if count == 0 {
        Ok(InitCheck::CollectionEmpty)
    } else {
        Ok(InitCheck::CollectionNonEmpty)
    }
}

/// Session bound to one target collection of an Atlas-style deployment.
///
/// Construction resolves the DNS seed list while deriving client options but
/// establishes no connection to the deployment; driver handles stay lazy
/// until the first boundary call. The session can be shared freely across
/// tasks since every method takes `&self` and holds no per-call state.
///
/// # Security
/// The password inside [`ConnectionConfig`] is consumed during construction
/// and not retained; the session keeps only the client and the target
/// database and collection names.
#[derive(Clone)]
pub struct ClientSession {
    client: Client,
    database: String,
    collection: String,
}

impl ClientSession {
    /// Creates a session from validated connection parameters.
    ///
    /// Builds the fixed DNS-seed-list URI with the password percent-encoded,
    /// derives client options from it, and forces TLS on. The driver's
    /// rustls stack negotiates TLS 1.2 as the protocol floor and rejects
    /// anything older.
    ///
    /// # Errors
    /// - [`AtlasLinkError::Configuration`] if a required field is empty
    /// - [`AtlasLinkError::Connection`] if client options cannot be derived
    ///   from the URI (malformed host, unsupported scheme, unresolvable
    ///   seed list) or the client cannot be constructed from them
    pub async fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let target = config.to_string();
        debug!("deriving client options for {}", target);

        let uri = config.connection_uri();
        let mut options = ClientOptions::parse(uri.as_str())
            .await
            .map_err(|e| AtlasLinkError::connection_failed(target.clone(), e))?;

        options.tls = Some(Tls::Enabled(TlsOptions::default()));
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options)
            .map_err(|e| AtlasLinkError::connection_failed(target, e))?;

        Ok(Self {
            client,
            database: config.database().to_string(),
            collection: config.collection().to_string(),
        })
    }

    /// Wraps an already constructed driver client.
    ///
    /// For callers that need driver options beyond what the fixed URI
    /// template expresses, and for tests targeting local deployments where
    /// the DNS-seed-list scheme does not apply.
    ///
    /// # Errors
    /// Returns a configuration error if either name is empty.
    pub fn from_client(
        client: Client,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let database = database.into();
        let collection = collection.into();

        if database.is_empty() {
            return Err(AtlasLinkError::configuration("database cannot be empty"));
        }

        if collection.is_empty() {
            return Err(AtlasLinkError::configuration("collection cannot be empty"));
        }

        Ok(Self {
            client,
            database,
            collection,
        })
    }

    /// Handle to the configured database. Pure, performs no I/O.
    pub fn database(&self) -> Database {
        self.client.database(&self.database)
    }

    /// Typed handle to the configured collection. Pure, performs no I/O.
    ///
    /// Callers must not assume the collection exists; run
    /// [`collection_init_check`](Self::collection_init_check) first when
    /// initialization safety matters.
    pub fn collection<T>(&self) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.database().collection(&self.collection)
    }

    /// Reports whether `name` is among the databases visible to the current
    /// credentials.
    ///
    /// # Errors
    /// Driver failures surface as transport errors; no internal retries.
    pub async fn database_exists(&self, name: &str) -> Result<bool> {
        let names = self.database_names().await?;
        Ok(names.iter().any(|candidate| candidate == name))
    }

    /// Reports whether `name` is among the collections of `database`.
    ///
    /// The listing is issued through the passed handle, so it reflects
    /// whichever deployment that handle belongs to.
    ///
    /// # Errors
    /// Driver failures surface as transport errors; no internal retries.
    pub async fn collection_exists(&self, database: &Database, name: &str) -> Result<bool> {
        let names = database
            .list_collection_names()
            .await
            .map_err(|e| AtlasLinkError::transport("list collection names", e))?;
        Ok(names.iter().any(|candidate| candidate == name))
    }

    /// Verifies the deployment is reachable with the current credentials by
    /// issuing the `ping` command against the `admin` database.
    ///
    /// # Errors
    /// Returns a transport error if the deployment cannot be reached.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AtlasLinkError::transport("ping", e))?;

        Ok(())
    }

    /// Runs the ordered init check against the configured target.
    ///
    /// See [`evaluate_init_check`] for the step order and short-circuit
    /// contract.
    ///
    /// # Errors
    /// The first failing step's transport error propagates unmodified.
    pub async fn collection_init_check(&self) -> Result<InitCheck> {
        evaluate_init_check(self, &self.database, &self.collection).await
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NamespaceProbe for ClientSession {
    async fn database_names(&self) -> Result<Vec<String>> {
        self.client
            .list_database_names()
            .await
            .map_err(|e| AtlasLinkError::transport("list database names", e))
    }

    async fn collection_names(&self, database: &str) -> Result<Vec<String>> {
        self.client
            .database(database)
            .list_collection_names()
            .await
            .map_err(|e| AtlasLinkError::transport("list collection names", e))
    }

    async fn count_documents(&self, database: &str, collection: &str) -> Result<u64> {
        self.client
            .database(database)
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(|e| AtlasLinkError::transport("count documents", e))
    }
}
