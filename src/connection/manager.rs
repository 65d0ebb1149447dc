//! Core ConnectionManager struct and basic connection methods.

use std::time::Duration;

use mongodb::Client;
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use tokio::runtime::Runtime;

use crate::error::{Error, Result};

const APP_NAME: &str = "mongo-tour";

/// Runs MongoDB driver calls to completion on its own Tokio runtime.
///
/// Handles (`Client`, names) are passed into every method; the manager keeps
/// no connection state of its own.
pub struct ConnectionManager {
    /// Tokio runtime for MongoDB async operations
    pub(crate) runtime: Runtime,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new()?;
        Ok(Self { runtime })
    }

    /// Connect to MongoDB and verify the server answers a ping (runs in Tokio runtime).
    ///
    /// `timeout` bounds both server selection and the ping round trip.
    pub fn connect(&self, uri: &str, timeout: Duration) -> Result<Client> {
        let uri = uri.to_string();
        self.runtime.block_on(async {
            let mut options = ClientOptions::parse(&uri).await?;
            options.app_name = Some(APP_NAME.to_string());
            options.server_selection_timeout = Some(timeout);
            let client = Client::with_options(options)?;

            let admin = client.database("admin");
            let ping = admin.run_command(doc! { "ping": 1 });
            match tokio::time::timeout(timeout, ping).await {
                Ok(result) => result?,
                Err(_) => return Err(Error::Timeout(format!("No ping reply from {uri}"))),
            };

            log::debug!("Connected to {uri}");
            Ok(client)
        })
    }

    /// List collections in a database (runs in Tokio runtime)
    pub fn list_collections(&self, client: &Client, database: &str) -> Result<Vec<String>> {
        let client = client.clone();
        let database = database.to_string();
        self.runtime.block_on(async {
            let db = client.database(&database);
            let mut collections = db.list_collection_names().await?;
            collections.sort_unstable_by_key(|name| name.to_lowercase());
            Ok(collections)
        })
    }

    /// Drop a collection in a database (runs in Tokio runtime)
    pub fn drop_collection(&self, client: &Client, database: &str, collection: &str) -> Result<()> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();
        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            coll.drop().await?;
            Ok(())
        })
    }

    /// Drop a database (runs in Tokio runtime)
    pub fn drop_database(&self, client: &Client, database: &str) -> Result<()> {
        let client = client.clone();
        let database = database.to_string();
        self.runtime.block_on(async {
            let db = client.database(&database);
            db.drop().await?;
            Ok(())
        })
    }
}
