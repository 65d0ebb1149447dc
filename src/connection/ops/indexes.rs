//! Index operations for MongoDB collections.

use mongodb::bson::Document;
use mongodb::{Client, IndexModel};

use crate::connection::ConnectionManager;
use crate::connection::types::IndexSummary;
use crate::error::Result;

impl ConnectionManager {
    /// List indexes for a collection (runs in Tokio runtime)
    pub fn list_indexes(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
    ) -> Result<Vec<IndexSummary>> {
        use futures::TryStreamExt;

        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let cursor = coll.list_indexes().await?;
            let indexes: Vec<IndexModel> = cursor.try_collect().await?;
            Ok(indexes.into_iter().map(IndexSummary::from).collect())
        })
    }

    /// Create an index on `keys` without an explicit name (runs in Tokio runtime).
    ///
    /// Returns the name the server assigned, `{field}_{order}` joined by `_`.
    pub fn create_index(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        keys: Document,
    ) -> Result<String> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let index = IndexModel::builder().keys(keys).build();
            let result = coll.create_index(index).await?;
            Ok(result.index_name)
        })
    }

    /// Drop an index by name in a collection (runs in Tokio runtime)
    pub fn drop_index(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        name: &str,
    ) -> Result<()> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();
        let name = name.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            coll.drop_index(name).await?;
            Ok(())
        })
    }
}
