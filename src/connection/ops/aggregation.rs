//! Aggregation pipeline operations.

use mongodb::Client;
use mongodb::bson::{Document, doc};

use crate::connection::ConnectionManager;
use crate::error::Result;

impl ConnectionManager {
    /// Run an aggregation pipeline for a collection (runs in Tokio runtime)
    pub fn aggregate_pipeline(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>> {
        use futures::TryStreamExt;

        let client = client.clone();
        let database = database.to_string();
        let collection = collection.to_string();

        self.runtime.block_on(async {
            let coll = client.database(&database).collection::<Document>(&collection);
            let cursor = coll.aggregate(pipeline).await?;
            let docs: Vec<Document> = cursor.try_collect().await?;
            Ok(docs)
        })
    }
}

/// Build a pipeline that averages the elements of an array field per group.
///
/// Stages: `$unwind` the array into one row per element, `$group` by
/// `group_key` computing `$avg` into `output_field`, `$sort` by that average
/// descending, then `$limit`.
pub fn array_average_pipeline(
    array_field: &str,
    group_key: &str,
    output_field: &str,
    limit: i64,
) -> Vec<Document> {
    let mut group = doc! { "_id": format!("${group_key}") };
    group.insert(output_field, doc! { "$avg": format!("${array_field}") });
    let mut sort = Document::new();
    sort.insert(output_field, -1);

    vec![
        doc! { "$unwind": format!("${array_field}") },
        doc! { "$group": group },
        doc! { "$sort": sort },
        doc! { "$limit": limit },
    ]
}
