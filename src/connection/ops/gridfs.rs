//! GridFS file storage: streaming uploads and downloads, metadata lookup, deletion.
//!
//! Local files are opened inside each call and closed when it returns, on
//! every path. An upload that fails part way is aborted so no orphaned chunks
//! are left in the bucket.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use futures::io::{AllowStdIo, AsyncRead, AsyncWriteExt};
use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};
use mongodb::gridfs::GridFsBucket;
use mongodb::options::GridFsBucketOptions;
use tempfile::NamedTempFile;

use crate::connection::ConnectionManager;
use crate::connection::types::{BucketSettings, FileRevision, StoredFile};
use crate::error::Result;

fn bucket(client: &Client, database: &str, settings: &BucketSettings) -> GridFsBucket {
    let mut options = GridFsBucketOptions::default();
    options.bucket_name = Some(settings.bucket_name.clone());
    options.chunk_size_bytes = Some(settings.chunk_size_bytes);
    client.database(database).gridfs_bucket(options)
}

/// Copy a download stream into a local file, returning the number of bytes written.
///
/// Bytes land in a temp file beside `path` that replaces it only once the
/// stream is fully read, so a failed download leaves `path` untouched.
async fn write_stream_to_path<R: AsyncRead>(stream: R, path: &Path) -> Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = AllowStdIo::new(BufWriter::new(tmp));
    let written = futures::io::copy(stream, &mut writer).await?;

    let mut buffered = writer.into_inner();
    buffered.flush()?;
    let tmp = buffered.into_inner().map_err(|e| e.into_error())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(written)
}

impl ConnectionManager {
    /// Stream a local file into the bucket under `filename` (runs in Tokio runtime).
    ///
    /// Returns the generated file id.
    pub fn upload_file(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        path: &Path,
        filename: &str,
    ) -> Result<Bson> {
        let bucket = bucket(client, database, settings);
        let filename = filename.to_string();
        let source = File::open(path)?;

        self.runtime.block_on(async move {
            let mut upload = bucket.open_upload_stream(&filename).await?;
            let id = upload.id().clone();

            let reader = AllowStdIo::new(BufReader::new(source));
            let copied = match futures::io::copy(reader, &mut upload).await {
                Ok(copied) => copied,
                Err(err) => {
                    if let Err(abort_err) = upload.abort().await {
                        log::warn!("Failed to abort GridFS upload of {filename}: {abort_err}");
                    }
                    return Err(err.into());
                }
            };
            upload.close().await?;

            log::debug!("Uploaded {filename} ({copied} bytes) as {id}");
            Ok(id)
        })
    }

    /// Find stored files matching a filter, oldest upload first (runs in Tokio runtime)
    pub fn find_files(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        filter: Document,
    ) -> Result<Vec<StoredFile>> {
        use futures::TryStreamExt;

        let bucket = bucket(client, database, settings);

        self.runtime.block_on(async move {
            let cursor = bucket.find(filter).await?;
            let mut files: Vec<StoredFile> = cursor.map_ok(StoredFile::from).try_collect().await?;
            files.sort_by_key(|file| file.upload_date);
            Ok(files)
        })
    }

    /// All stored revisions of a filename, oldest first
    pub fn file_revisions(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        filename: &str,
    ) -> Result<Vec<StoredFile>> {
        self.find_files(client, database, settings, doc! { "filename": filename })
    }

    /// Id of the newest revision stored under a filename
    pub fn latest_file_id(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        filename: &str,
    ) -> Result<Option<Bson>> {
        let revisions = self.file_revisions(client, database, settings, filename)?;
        Ok(revisions.into_iter().last().map(|file| file.id))
    }

    /// Metadata document of the file with the given id
    pub fn file_by_id(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        id: &Bson,
    ) -> Result<Option<StoredFile>> {
        let files = self.find_files(client, database, settings, doc! { "_id": id.clone() })?;
        Ok(files.into_iter().next())
    }

    /// Download the file with the given id to a local path (runs in Tokio runtime)
    pub fn download_file(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        id: &Bson,
        path: &Path,
    ) -> Result<u64> {
        let bucket = bucket(client, database, settings);
        let id = id.clone();

        self.runtime.block_on(async move {
            let stream = bucket.open_download_stream(id).await?;
            write_stream_to_path(stream, path).await
        })
    }

    /// Download a revision selected by filename to a local path (runs in Tokio runtime)
    pub fn download_file_by_name(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        filename: &str,
        revision: FileRevision,
        path: &Path,
    ) -> Result<u64> {
        let bucket = bucket(client, database, settings);
        let filename = filename.to_string();

        self.runtime.block_on(async move {
            let stream = bucket
                .open_download_stream_by_name(filename)
                .revision(revision.as_i32())
                .await?;
            write_stream_to_path(stream, path).await
        })
    }

    /// Delete a file's metadata and all of its chunks (runs in Tokio runtime)
    pub fn delete_file(
        &self,
        client: &Client,
        database: &str,
        settings: &BucketSettings,
        id: &Bson,
    ) -> Result<()> {
        let bucket = bucket(client, database, settings);
        let id = id.clone();

        self.runtime.block_on(async move {
            bucket.delete(id).await?;
            Ok(())
        })
    }
}
