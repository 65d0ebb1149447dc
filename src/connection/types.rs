use mongodb::IndexModel;
use mongodb::bson::{Bson, DateTime, Document};
use mongodb::gridfs::FilesCollectionDocument;
use mongodb::results::UpdateResult;
use serde::{Deserialize, Serialize};

/// Options for finding documents
#[derive(Clone, Debug, Default)]
pub struct FindDocumentsOptions {
    pub filter: Option<Document>,
    pub sort: Option<Document>,
    pub projection: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindDocumentsOptions {
    pub fn filter(filter: Document) -> Self {
        Self { filter: Some(filter), ..Default::default() }
    }
}

/// Counts reported by an update or replace.
///
/// `matched` can exceed `modified` when a matched document already held the
/// new values.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateSummary {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<Bson>,
}

impl From<UpdateResult> for UpdateSummary {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted_id: result.upserted_id,
        }
    }
}

/// GridFS bucket settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSettings {
    /// Prefix of the `<name>.files` and `<name>.chunks` collections
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: u32,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self { bucket_name: default_bucket_name(), chunk_size_bytes: default_chunk_size_bytes() }
    }
}

fn default_bucket_name() -> String {
    "fs".to_string()
}

fn default_chunk_size_bytes() -> u32 {
    255 * 1024
}

/// Which stored revision of a filename to read.
///
/// Revisions are ordered by upload date. Non-negative numbers count from the
/// original upload, negative numbers count back from the newest one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum FileRevision {
    Latest,
    #[default]
    Original,
    Nth(i32),
}

impl FileRevision {
    pub fn as_i32(self) -> i32 {
        match self {
            FileRevision::Latest => -1,
            FileRevision::Original => 0,
            FileRevision::Nth(n) => n,
        }
    }

    pub fn label(self) -> String {
        match self {
            FileRevision::Latest => "latest".to_string(),
            FileRevision::Original => "original".to_string(),
            FileRevision::Nth(n) => format!("revision {n}"),
        }
    }
}

impl From<i32> for FileRevision {
    fn from(value: i32) -> Self {
        match value {
            -1 => FileRevision::Latest,
            0 => FileRevision::Original,
            n => FileRevision::Nth(n),
        }
    }
}

impl From<FileRevision> for i32 {
    fn from(value: FileRevision) -> Self {
        value.as_i32()
    }
}

/// Metadata of a file stored in a GridFS bucket
#[derive(Clone, Debug, PartialEq)]
pub struct StoredFile {
    pub id: Bson,
    pub filename: Option<String>,
    pub length: u64,
    pub chunk_size: u32,
    pub upload_date: DateTime,
}

impl From<FilesCollectionDocument> for StoredFile {
    fn from(file: FilesCollectionDocument) -> Self {
        Self {
            id: file.id,
            filename: file.filename,
            length: file.length,
            chunk_size: file.chunk_size_bytes,
            upload_date: file.upload_date,
        }
    }
}

/// A listed index with the fields worth printing
#[derive(Clone, Debug, PartialEq)]
pub struct IndexSummary {
    pub name: String,
    pub keys: Document,
    pub unique: bool,
}

impl From<IndexModel> for IndexSummary {
    fn from(index: IndexModel) -> Self {
        let options = index.options.as_ref();
        let name = options
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| default_index_name(&index.keys));
        let unique = options.and_then(|o| o.unique).unwrap_or(false);
        Self { name, keys: index.keys, unique }
    }
}

/// Name the server assigns to an index created without an explicit name,
/// e.g. `{login: 1, age: -1}` becomes `login_1_age_-1`.
pub fn default_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, order)| {
            let order = match order {
                Bson::Int32(n) => n.to_string(),
                Bson::Int64(n) => n.to_string(),
                Bson::Double(n) if n.fract() == 0.0 => format!("{}", *n as i64),
                Bson::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{field}_{order}")
        })
        .collect::<Vec<_>>()
        .join("_")
}
