// ABOUTME: Implementation of 'jpom-admin files' commands
// ABOUTME: Lists, uploads, edits, downloads, deletes and inspects stored files

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use jpom_client::api::file_storage::{
    self, EditParams, FileMeta, FileStatus, ListParams, RemoteDownloadParams, StoredFile,
};
use jpom_client::api::upload::{self, UploadOptions, UploadOutcome, DEFAULT_CHUNK_SIZE};
use jpom_client::Dispatcher;

use super::{FilesCommand, MetaArgs};

pub async fn run(dispatcher: &Dispatcher, cmd: FilesCommand) -> Result<()> {
    match cmd {
        FilesCommand::List { page, limit, name } => list_files(dispatcher, page, limit, name).await,
        FilesCommand::Upload {
            path,
            chunk_size,
            meta,
        } => upload_file(dispatcher, &path, chunk_size, meta).await,
        FilesCommand::Edit { id, name, meta } => edit_file(dispatcher, id, name, meta).await,
        FilesCommand::RemoteDownload { url, meta } => remote_download(dispatcher, url, meta).await,
        FilesCommand::Exists { md5 } => file_exists(dispatcher, &md5).await,
        FilesCommand::Delete { id } => delete_file(dispatcher, &id).await,
        FilesCommand::TriggerUrl { id, rebuild } => trigger_url(dispatcher, &id, rebuild).await,
    }
}

impl From<MetaArgs> for FileMeta {
    fn from(args: MetaArgs) -> Self {
        FileMeta {
            description: args.description,
            alias_code: args.alias_code,
            keep_day: args.keep_day,
            global: args.global,
        }
    }
}

async fn list_files(
    dispatcher: &Dispatcher,
    page: u32,
    limit: u32,
    name: Option<String>,
) -> Result<()> {
    let params = ListParams {
        page,
        limit,
        name,
        ..ListParams::default()
    };
    let result = file_storage::list(dispatcher, &params)
        .await
        .context("Failed to list files")?;

    if result.result.is_empty() {
        println!("{}", "No files found".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("Files (page {}, {} total)", page, result.total).bold()
    );
    println!();

    for file in &result.result {
        print_file(file);
        println!();
    }

    Ok(())
}

fn print_file(file: &StoredFile) {
    println!(
        "{} {}",
        file.name.as_deref().unwrap_or("(unnamed)").bold(),
        format!("({})", file.id).dimmed()
    );
    if let Some(size) = file.size {
        println!("    {}: {}", "Size".dimmed(), format_size(size));
    }
    if let Some(source) = file.source() {
        println!("    {}: {}", "Source".dimmed(), source);
    }
    if let Some(status) = file.status() {
        let colored = match status {
            FileStatus::Success => status.to_string().green(),
            FileStatus::Downloading => status.to_string().yellow(),
            FileStatus::Failed => status.to_string().red(),
        };
        println!("    {}: {}", "Status".dimmed(), colored);
    }
    if let Some(ref desc) = file.description {
        if !desc.is_empty() {
            println!("    {}: {}", "Description".dimmed(), desc);
        }
    }
    if let Some(ref alias) = file.alias_code {
        if !alias.is_empty() {
            println!("    {}: {}", "Alias".dimmed(), alias);
        }
    }
}

async fn upload_file(
    dispatcher: &Dispatcher,
    path: &Path,
    chunk_size: Option<usize>,
    meta: MetaArgs,
) -> Result<()> {
    let options = UploadOptions {
        chunk_size: chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
        meta: meta.into(),
    };

    println!("{} {}...", "Uploading".dimmed(), path.display());
    let outcome = upload::upload_file(dispatcher, path, &options, |p| {
        println!(
            "  [{}/{}] {} / {}",
            p.uploaded_slices,
            p.total_slices,
            format_size(p.uploaded_bytes),
            format_size(p.total_bytes)
        );
    })
    .await
    .with_context(|| format!("Failed to upload {}", path.display()))?;

    match outcome {
        UploadOutcome::AlreadyExists(file) => {
            println!("{}", "File already stored".yellow().bold());
            print_file(&file);
        }
        UploadOutcome::Uploaded {
            file_sum_md5,
            slices,
        } => {
            println!("{}", "File uploaded".green().bold());
            println!("  {}: {}", "MD5".dimmed(), file_sum_md5);
            println!("  {}: {}", "Shards".dimmed(), slices);
        }
    }

    Ok(())
}

async fn edit_file(
    dispatcher: &Dispatcher,
    id: String,
    name: Option<String>,
    meta: MetaArgs,
) -> Result<()> {
    let params = EditParams {
        id: id.clone(),
        name,
        meta: meta.into(),
    };
    file_storage::edit(dispatcher, &params)
        .await
        .context("Failed to edit file")?;

    println!("{} {}", "File updated:".green().bold(), id);
    Ok(())
}

async fn remote_download(dispatcher: &Dispatcher, url: String, meta: MetaArgs) -> Result<()> {
    let params = RemoteDownloadParams {
        url: url.clone(),
        meta: meta.into(),
    };
    file_storage::remote_download(dispatcher, &params)
        .await
        .context("Failed to start remote download")?;

    println!("{} {}", "Download started:".green().bold(), url);
    println!(
        "  {}",
        "Progress is shown by 'jpom-admin files list'".dimmed()
    );
    Ok(())
}

async fn file_exists(dispatcher: &Dispatcher, md5: &str) -> Result<()> {
    let found = file_storage::has_file(dispatcher, md5)
        .await
        .context("Failed to look up file")?;
    match found {
        Some(file) => {
            println!("{}", "File is stored".green().bold());
            print_file(&file);
        }
        None => println!("{}", "No file with that checksum".dimmed()),
    }
    Ok(())
}

async fn delete_file(dispatcher: &Dispatcher, id: &str) -> Result<()> {
    file_storage::delete(dispatcher, id)
        .await
        .context("Failed to delete file")?;

    println!("{} {}", "File deleted:".green().bold(), id);
    Ok(())
}

async fn trigger_url(dispatcher: &Dispatcher, id: &str, rebuild: bool) -> Result<()> {
    let trigger = file_storage::trigger_url(dispatcher, id, rebuild)
        .await
        .context("Failed to fetch trigger URL")?;

    println!("{}", "Trigger URL".bold());
    println!("  {}", trigger.trigger_url);
    if let Some(token) = trigger.trigger_token {
        println!("  {}: {}", "Token".dimmed(), token);
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
