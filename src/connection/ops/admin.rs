//! Database commands: user administration and collection metadata.

use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::{ReadPreference, SelectionCriteria};

use crate::connection::ConnectionManager;
use crate::error::Result;

/// Server error code for `dropUser` on a user that does not exist.
const USER_NOT_FOUND: i32 = 11;

impl ConnectionManager {
    /// Run a raw command against a database (runs in Tokio runtime)
    pub fn run_command(
        &self,
        client: &Client,
        database: &str,
        command: Document,
    ) -> Result<Document> {
        let client = client.clone();
        let database = database.to_string();

        self.runtime.block_on(async {
            let reply = client.database(&database).run_command(command).await?;
            Ok(reply)
        })
    }

    /// Remove a database user (runs in Tokio runtime).
    ///
    /// Returns `false` when the user did not exist.
    pub fn drop_user(&self, client: &Client, database: &str, name: &str) -> Result<bool> {
        let client = client.clone();
        let database = database.to_string();
        let name = name.to_string();

        self.runtime.block_on(async {
            let db = client.database(&database);
            match db.run_command(doc! { "dropUser": name.as_str() }).await {
                Ok(_) => Ok(true),
                Err(err) if is_user_not_found(&err) => {
                    log::debug!("User {name} not present in {database}, nothing to drop");
                    Ok(false)
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    /// Create a database user, routing the command to the primary (runs in Tokio runtime)
    pub fn create_user(
        &self,
        client: &Client,
        database: &str,
        name: &str,
        password: &str,
        roles: &[String],
    ) -> Result<()> {
        let client = client.clone();
        let database = database.to_string();
        let command = doc! {
            "createUser": name,
            "pwd": password,
            "roles": roles.iter().map(|role| Bson::String(role.clone())).collect::<Vec<_>>(),
        };

        self.runtime.block_on(async {
            client
                .database(&database)
                .run_command(command)
                .selection_criteria(SelectionCriteria::ReadPreference(ReadPreference::Primary))
                .await?;
            Ok(())
        })
    }

    /// Enumerate collections through the `listCollections` command (runs in Tokio runtime).
    ///
    /// Only the first batch of the returned cursor is read.
    pub fn list_collections_command(
        &self,
        client: &Client,
        database: &str,
    ) -> Result<Vec<String>> {
        let reply = self.run_command(client, database, doc! { "listCollections": 1 })?;
        Ok(collection_names_from_reply(&reply))
    }
}

fn is_user_not_found(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(cmd) if cmd.code == USER_NOT_FOUND)
}

/// Extract collection names from a `listCollections` reply's `cursor.firstBatch`.
pub fn collection_names_from_reply(reply: &Document) -> Vec<String> {
    let Ok(batch) = reply.get_document("cursor").and_then(|cursor| cursor.get_array("firstBatch"))
    else {
        return Vec::new();
    };

    let mut names: Vec<String> = batch
        .iter()
        .filter_map(|entry| entry.as_document())
        .filter_map(|spec| spec.get_str("name").ok())
        .map(str::to_string)
        .collect();
    names.sort_unstable_by_key(|name| name.to_lowercase());
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_read_from_first_batch() {
        let reply = doc! {
            "cursor": {
                "id": 0_i64,
                "ns": "testDB.$cmd.listCollections",
                "firstBatch": [
                    { "name": "users", "type": "collection" },
                    { "name": "fs.files", "type": "collection" },
                    { "name": "Colors", "type": "collection" },
                ],
            },
            "ok": 1.0,
        };
        assert_eq!(collection_names_from_reply(&reply), ["Colors", "fs.files", "users"]);
    }

    #[test]
    fn malformed_reply_yields_no_names() {
        assert!(collection_names_from_reply(&doc! { "ok": 1.0 }).is_empty());
        assert!(collection_names_from_reply(&doc! { "cursor": { "id": 0_i64 } }).is_empty());
    }
}
