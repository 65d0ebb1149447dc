//! Bulk import of JSON Lines files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use mongodb::Client;
use mongodb::bson::Document;

use crate::connection::ConnectionManager;
use crate::error::{Error, Result};

impl ConnectionManager {
    /// Import a JSON Lines file into a collection in a single `insert_many` round trip.
    ///
    /// Every non-blank line must hold one JSON document (Extended JSON is
    /// accepted). The whole file is parsed before anything is sent, so a bad
    /// line leaves the collection untouched. Returns the inserted count.
    pub fn import_json_lines(
        &self,
        client: &Client,
        database: &str,
        collection: &str,
        path: &Path,
    ) -> Result<u64> {
        let batch = read_json_lines(path)?;
        if batch.is_empty() {
            log::info!("{} holds no documents, nothing to import", path.display());
            return Ok(0);
        }

        log::debug!("Importing {} documents into {database}.{collection}", batch.len());
        let inserted = self.insert_documents(client, database, collection, batch)?;
        Ok(inserted as u64)
    }
}

/// Parse a JSON Lines file into documents, skipping blank lines.
pub fn read_json_lines(path: &Path) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(path)?);
    let mut batch = Vec::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let doc = crate::bson::parse_document_from_json(trimmed)
            .map_err(|e| Error::Parse(format!("{} line {}: {e}", path.display(), line_no + 1)))?;
        batch.push(doc);
    }

    Ok(batch)
}
