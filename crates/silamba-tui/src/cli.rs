//! Non-interactive commands.
//!
//! ```text
//! silamba doc show|export|reset
//! silamba list <resource>
//! silamba upload <file>
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use silamba_core::api::ApiClient;
use silamba_core::config::Config;
use silamba_core::models::Resource;
use silamba_core::store::{ChangeChannel, DocumentStore, FileStorage, LoadOutcome};
use silamba_core::upload::ImageUploader;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DocShow,
    DocExport,
    DocReset,
    List(Resource),
    Upload(PathBuf),
}

pub const USAGE: &str = "usage: silamba [PATH]
       silamba doc show|export|reset
       silamba list banners|categories|subcategories|occasions|offers
       silamba upload <file>";

impl Command {
    /// `Ok(None)` means no command: start the interactive UI.
    pub fn parse(args: &[String]) -> Result<Option<Self>> {
        let Some(first) = args.first() else {
            return Ok(None);
        };
        let command = match (first.as_str(), args.get(1).map(String::as_str)) {
            ("doc", Some("show")) => Command::DocShow,
            ("doc", Some("export")) => Command::DocExport,
            ("doc", Some("reset")) => Command::DocReset,
            ("list", Some(name)) => match Resource::from_path(name) {
                Some(resource) => Command::List(resource),
                None => bail!("unknown resource `{}`\n{}", name, USAGE),
            },
            ("upload", Some(path)) => Command::Upload(PathBuf::from(path)),
            (path, None) if path.starts_with('/') => return Ok(None),
            _ => bail!("{}", USAGE),
        };
        Ok(Some(command))
    }
}

pub async fn run(command: Command) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    match command {
        Command::DocShow => doc_show(&config),
        Command::DocExport => {
            let store = open_store(&config)?;
            println!("{}", store.export_pretty()?);
            Ok(())
        }
        Command::DocReset => {
            let mut store = open_store(&config)?;
            store.reset()?;
            info!("Studio document reset to defaults");
            eprintln!("Studio document reset to defaults.");
            Ok(())
        }
        Command::List(resource) => list(&config, resource).await,
        Command::Upload(path) => upload(&config, &path).await,
    }
}

fn open_store(config: &Config) -> Result<DocumentStore> {
    let dir = config.data_dir()?;
    let storage = FileStorage::new(dir.clone())
        .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
    let mut store = DocumentStore::new(Arc::new(storage), ChangeChannel::new());
    match store.load()? {
        LoadOutcome::Persisted => {}
        LoadOutcome::Defaulted => eprintln!("No studio document found; wrote the default."),
        LoadOutcome::ReplacedInvalid { reason } => {
            eprintln!("Stored document was invalid ({}); replaced with the default.", reason)
        }
    }
    Ok(store)
}

fn doc_show(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let doc = store.get()?;
    println!("key: {}", store.key());
    println!("banners:        {}", doc.banners.len());
    println!("categories:     {}", doc.categories.len());
    println!("occasions:      {}", doc.occasions.len());
    println!("advertisements: {}", doc.advertisements.len());
    for category in &doc.categories {
        println!("  {} ({} sub-categories)", category.name, category.subcategories.len());
    }
    Ok(())
}

async fn list(config: &Config, resource: Resource) -> Result<()> {
    let client = ApiClient::new(config.api_base_url())?;
    let records = client
        .list_raw(resource)
        .await
        .with_context(|| format!("Failed to list {} from {}", resource, client.base_url()))?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    eprintln!("{} {}", records.len(), resource.display_name().to_lowercase());
    Ok(())
}

async fn upload(config: &Config, path: &Path) -> Result<()> {
    let uploader = ImageUploader::new(config.upload_target()?)?;
    let url = uploader
        .upload_file(path)
        .await
        .with_context(|| format!("Failed to upload {}", path.display()))?;
    println!("{}", url);
    Ok(())
}
