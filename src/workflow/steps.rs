//! The tour's steps, in execution order.

use mongodb::bson::{Bson, Document};

use super::fixtures::{self, AGGREGATE_LIMIT, PROJECTION_LIMIT};
use super::{FnStep, StepContext, WorkflowStep};
use crate::bson::{
    bson_value_preview, document_to_compact_extjson_string, document_to_relaxed_extjson_string,
};
use crate::connection::{FindDocumentsOptions, IndexSummary, array_average_pipeline};
use crate::error::Result;

const PREVIEW_LEN: usize = 40;

/// Every step of the tour, in the order it runs.
pub fn tour_steps() -> Vec<Box<dyn WorkflowStep>> {
    let steps = [
        FnStep::new("insert many", insert_many),
        FnStep::new("find", find_by_full_name),
        FnStep::new("find with projection", find_with_projection),
        FnStep::new("find with pattern", find_with_pattern),
        FnStep::new("aggregate", aggregate_average_age),
        FnStep::new("drop collection", drop_collection),
        FnStep::new("insert one by one", insert_singles),
        FnStep::new("update many", update_many),
        FnStep::new("replace one", replace_one),
        FnStep::new("delete many", delete_many),
        FnStep::new("drop user", drop_user),
        FnStep::new("create user", create_user),
        FnStep::new("list collections", list_collections),
        FnStep::new("upload file", upload_file),
        FnStep::new("file metadata", file_metadata),
        FnStep::new("download file", download_file),
        FnStep::new("download file by name", download_file_by_name),
        FnStep::new("delete file", delete_file),
        FnStep::new("create index", create_index),
        FnStep::new("list indexes", list_indexes),
        FnStep::new("drop index", drop_index),
        FnStep::new("bulk import", bulk_import),
    ];
    steps.into_iter().map(|step| Box::new(step) as Box<dyn WorkflowStep>).collect()
}

fn log_documents(label: &str, docs: &[Document]) {
    for doc in docs {
        log::debug!("{label}: {}", document_to_compact_extjson_string(doc));
    }
}

fn find(ctx: &StepContext<'_>, opts: FindDocumentsOptions) -> Result<Vec<Document>> {
    let config = ctx.config;
    ctx.manager.find_documents(ctx.client, &config.database, &config.collection, opts)
}

fn insert_many(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let inserted = ctx.manager.insert_documents(
        ctx.client,
        &config.database,
        &config.collection,
        fixtures::users_batch(),
    )?;
    Ok(format!("Inserted {inserted} document(s)"))
}

fn find_by_full_name(ctx: &mut StepContext<'_>) -> Result<String> {
    let docs = find(ctx, FindDocumentsOptions::filter(fixtures::full_name_filter()))?;
    log_documents("find", &docs);
    Ok(format!("Found {} document(s) named Ivan Tsygan", docs.len()))
}

fn find_with_projection(ctx: &mut StepContext<'_>) -> Result<String> {
    let opts = FindDocumentsOptions {
        filter: Some(fixtures::first_name_filter()),
        projection: Some(fixtures::name_projection()),
        limit: Some(PROJECTION_LIMIT),
        ..Default::default()
    };
    let docs = find(ctx, opts)?;
    log_documents("projection", &docs);
    Ok(format!("Projected {} document(s) onto firstname, lastname", docs.len()))
}

fn find_with_pattern(ctx: &mut StepContext<'_>) -> Result<String> {
    let docs = find(ctx, FindDocumentsOptions::filter(fixtures::lastname_pattern_filter()))?;
    log_documents("pattern", &docs);
    Ok(format!("Found {} document(s) with lastname matching /gan/i", docs.len()))
}

fn aggregate_average_age(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let pipeline = array_average_pipeline("age", "login", "avgAge", AGGREGATE_LIMIT);
    let groups = ctx.manager.aggregate_pipeline(
        ctx.client,
        &config.database,
        &config.collection,
        pipeline,
    )?;
    log_documents("aggregate", &groups);

    let averages: Vec<String> = groups
        .iter()
        .map(|group| {
            let login = group.get("_id").map(|id| bson_value_preview(id, PREVIEW_LEN));
            let avg = group.get("avgAge").map(|avg| bson_value_preview(avg, PREVIEW_LEN));
            format!("{}={}", login.unwrap_or_default(), avg.unwrap_or_default())
        })
        .collect();
    Ok(format!("Average age per login: {}", averages.join(", ")))
}

fn drop_collection(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    ctx.manager.drop_collection(ctx.client, &config.database, &config.collection)?;
    Ok(format!("Dropped collection {}", config.collection))
}

fn insert_singles(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let mut ids = Vec::new();
    for user in fixtures::single_users() {
        let id =
            ctx.manager.insert_document(ctx.client, &config.database, &config.collection, user)?;
        ids.push(bson_value_preview(&id, PREVIEW_LEN));
    }
    Ok(format!("Inserted {} document(s) one by one: {}", ids.len(), ids.join(", ")))
}

fn update_many(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let summary = ctx.manager.update_many(
        ctx.client,
        &config.database,
        &config.collection,
        fixtures::first_name_filter(),
        fixtures::lastname_update(),
        true,
    )?;

    let mut line = format!(
        "Matched {} document(s), modified {} document(s)",
        summary.matched, summary.modified
    );
    if let Some(id) = &summary.upserted_id {
        line.push_str(&format!(", upserted {}", bson_value_preview(id, PREVIEW_LEN)));
    }
    Ok(line)
}

fn replace_one(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let summary = ctx.manager.replace_one(
        ctx.client,
        &config.database,
        &config.collection,
        fixtures::login_filter("user_1"),
        fixtures::replacement_body(),
    )?;
    Ok(format!("Replaced {} of {} matched document(s)", summary.modified, summary.matched))
}

fn delete_many(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let deleted = ctx.manager.delete_documents(
        ctx.client,
        &config.database,
        &config.collection,
        fixtures::login_filter("user_3"),
    )?;
    Ok(format!("Deleted {deleted} document(s)"))
}

fn drop_user(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let name = &config.user.name;
    if ctx.manager.drop_user(ctx.client, &config.database, name)? {
        Ok(format!("Dropped user {name}"))
    } else {
        Ok(format!("User {name} did not exist"))
    }
}

fn create_user(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let user = &config.user;
    ctx.manager.create_user(ctx.client, &config.database, &user.name, &user.password, &user.roles)?;
    Ok(format!("Created user {} with roles [{}]", user.name, user.roles.join(", ")))
}

fn list_collections(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let names = ctx.manager.list_collections_command(ctx.client, &config.database)?;
    Ok(format!("Collections in {}: [{}]", config.database, names.join(", ")))
}

fn upload_file(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let files = &config.files;
    let filename = files.upload_filename();
    let id = ctx.manager.upload_file(
        ctx.client,
        &config.database,
        &files.bucket,
        &files.upload_path,
        &filename,
    )?;
    let summary = format!("Uploaded {filename} as {}", bson_value_preview(&id, PREVIEW_LEN));
    ctx.set_uploaded_file(Some(id));
    Ok(summary)
}

fn file_metadata(ctx: &mut StepContext<'_>) -> Result<String> {
    // Only meaningful once the upload step stored something.
    ctx.uploaded_file()?;
    let config = ctx.config;
    let files = &config.files;
    let filename = files.upload_filename();

    let Some(latest) =
        ctx.manager.latest_file_id(ctx.client, &config.database, &files.bucket, &filename)?
    else {
        return Ok(format!("No file stored under {filename}"));
    };
    let Some(stored) =
        ctx.manager.file_by_id(ctx.client, &config.database, &files.bucket, &latest)?
    else {
        return Ok(format!("No file stored under id {}", bson_value_preview(&latest, PREVIEW_LEN)));
    };
    let revisions =
        ctx.manager.file_revisions(ctx.client, &config.database, &files.bucket, &filename)?;

    Ok(format!(
        "{} revision(s) of {filename}; latest {} is {} bytes uploaded {}",
        revisions.len(),
        bson_value_preview(&stored.id, PREVIEW_LEN),
        stored.length,
        bson_value_preview(&Bson::DateTime(stored.upload_date), PREVIEW_LEN),
    ))
}

fn download_file(ctx: &mut StepContext<'_>) -> Result<String> {
    let id = ctx.uploaded_file()?;
    let config = ctx.config;
    let files = &config.files;
    let written = ctx.manager.download_file(
        ctx.client,
        &config.database,
        &files.bucket,
        &id,
        &files.download_path,
    )?;
    Ok(format!("Downloaded {written} bytes to {}", files.download_path.display()))
}

fn download_file_by_name(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let files = &config.files;
    let filename = files.upload_filename();
    let written = ctx.manager.download_file_by_name(
        ctx.client,
        &config.database,
        &files.bucket,
        &filename,
        files.revision,
        &files.download_path,
    )?;
    Ok(format!(
        "Downloaded {} of {filename} ({written} bytes) to {}",
        files.revision.label(),
        files.download_path.display()
    ))
}

fn delete_file(ctx: &mut StepContext<'_>) -> Result<String> {
    let id = ctx.uploaded_file()?;
    let config = ctx.config;
    ctx.manager.delete_file(ctx.client, &config.database, &config.files.bucket, &id)?;
    ctx.set_uploaded_file(None);
    Ok(format!("Deleted file {}", bson_value_preview(&id, PREVIEW_LEN)))
}

fn create_index(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let name = ctx.manager.create_index(
        ctx.client,
        &config.database,
        &config.collection,
        fixtures::index_keys(),
    )?;
    let summary = format!("Created index {name}");
    ctx.set_created_index(Some(name));
    Ok(summary)
}

fn list_indexes(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let indexes = ctx.manager.list_indexes(ctx.client, &config.database, &config.collection)?;
    for index in &indexes {
        log::debug!("index {}: {}", index.name, document_to_relaxed_extjson_string(&index.keys));
    }
    let descriptors: Vec<String> = indexes.iter().map(describe_index).collect();
    Ok(format!("Indexes on {}: [{}]", config.collection, descriptors.join(", ")))
}

/// `name {keys}` with the keys as single-line relaxed Extended JSON.
fn describe_index(index: &IndexSummary) -> String {
    let unique = if index.unique { " unique" } else { "" };
    format!("{}{unique} {}", index.name, document_to_compact_extjson_string(&index.keys))
}

fn drop_index(ctx: &mut StepContext<'_>) -> Result<String> {
    let name = ctx.created_index()?;
    let config = ctx.config;
    ctx.manager.drop_index(ctx.client, &config.database, &config.collection, &name)?;
    ctx.set_created_index(None);
    Ok(format!("Dropped index {name}"))
}

fn bulk_import(ctx: &mut StepContext<'_>) -> Result<String> {
    let config = ctx.config;
    let path = &config.files.import_path;
    let inserted = ctx.manager.import_json_lines(
        ctx.client,
        &config.database,
        &config.import_collection,
        path,
    )?;
    Ok(format!(
        "Inserted {inserted} document(s) from {} into {}",
        path.display(),
        config.import_collection
    ))
}
