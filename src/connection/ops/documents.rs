//! Document CRUD operations for MongoDB collections.

use mongodb::Client;
use mongodb::bson::{Bson, Document};

use crate::connection::ConnectionManager;
use crate::connection::types::{FindDocumentsOptions, UpdateSummary};
use crate::error::Result;

impl ConnectionManager {
    /// Find documents in a collection (runs in Tokio runtime)
    pub fn find_documents(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        opts: FindDocumentsOptions,
    ) -> Result<Vec<Document>> {
        use futures::TryStreamExt;

        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();
        let filter = opts.filter.unwrap_or_default();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);

            let mut options = mongodb::options::FindOptions::default();
            options.skip = opts.skip;
            options.limit = opts.limit;
            options.sort = opts.sort;
            options.projection = opts.projection;

            let cursor = coll.find(filter).with_options(options).await?;
            let documents: Vec<Document> = cursor.try_collect().await?;
            Ok(documents)
        })
    }

    /// Count documents matching a filter (runs in Tokio runtime)
    pub fn count_documents(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> Result<u64> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let count = coll.count_documents(filter).await?;
            Ok(count)
        })
    }

    /// Insert a document into a collection, returning its `_id` (runs in Tokio runtime)
    pub fn insert_document(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        document: Document,
    ) -> Result<Bson> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let result = coll.insert_one(document).await?;
            Ok(result.inserted_id)
        })
    }

    /// Insert multiple documents in one round trip (runs in Tokio runtime).
    ///
    /// Returns the inserted count; an empty batch is not sent.
    pub fn insert_documents(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let result = coll.insert_many(documents).await?;
            Ok(result.inserted_ids.len())
        })
    }

    /// Update multiple documents (runs in Tokio runtime).
    ///
    /// With `upsert` set and nothing matching, a new document built from the
    /// filter and the update is inserted instead.
    pub fn update_many(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateSummary> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let result = coll.update_many(filter, update).upsert(upsert).await?;
            Ok(UpdateSummary::from(result))
        })
    }

    /// Replace the first document matching a filter, keeping its `_id` (runs in Tokio runtime)
    pub fn replace_one(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        filter: Document,
        replacement: Document,
    ) -> Result<UpdateSummary> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let result = coll.replace_one(filter, replacement).await?;
            Ok(UpdateSummary::from(result))
        })
    }

    /// Delete multiple documents by filter (runs in Tokio runtime)
    pub fn delete_documents(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> Result<u64> {
        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let result = coll.delete_many(filter).await?;
            Ok(result.deleted_count)
        })
    }
}
