//! etn CLI: share an image and open shared images from the command line.
//!
//! Set ETN_API_URL to point at the API (default http://localhost:4000).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use etn_cli::api_client::ApiClient;
use etn_cli::{init_tracing, truncate_string};
use etn_core::ShareableLink;
use serde::Serialize;

const DATA_URL_PREVIEW_CHARS: usize = 64;

#[derive(Parser)]
#[command(name = "etn", about = "Share images through etn.lol links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and print its shareable link
    Upload {
        /// Path to the image file
        file: PathBuf,
    },
    /// Fetch a shared image by link or id
    View {
        /// Shareable link (https://etn.lol/?view=<id>) or bare image id
        link: String,
        /// Write the image bytes to this path instead of printing metadata
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Id from a full link, or the argument itself when it carries no query.
fn resolve_id(link: &str) -> anyhow::Result<String> {
    if link.contains('?') {
        ShareableLink::view_id(link)
            .ok_or_else(|| anyhow::anyhow!("Link has no 'view' parameter: {}", link))
    } else if link.trim().is_empty() {
        Err(anyhow::anyhow!("Image id is empty"))
    } else {
        Ok(link.trim().to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let client = ApiClient::from_env().context("Failed to create API client")?;
    tracing::debug!(base_url = %client.base_url(), "Using etn API");

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file } => {
            let response = client.upload_image(&file).await?;
            eprintln!("{}", response.status);
            print_json(&response)?;
        }
        Commands::View { link, out } => {
            let id = resolve_id(&link)?;
            let image = client.get_image(&id).await?;
            match out {
                Some(path) => {
                    let bytes = image.bytes()?;
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    print_json(&serde_json::json!({
                        "id": image.id,
                        "filename": image.filename,
                        "mime_type": image.mime_type,
                        "size": bytes.len(),
                        "written_to": path.display().to_string(),
                    }))?;
                }
                None => {
                    print_json(&serde_json::json!({
                        "id": image.id,
                        "filename": image.filename,
                        "mime_type": image.mime_type,
                        "size": image.size,
                        "data_url": truncate_string(&image.data_url, DATA_URL_PREVIEW_CHARS),
                    }))?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_id_from_link_or_bare_id() {
        assert_eq!(resolve_id("https://etn.lol/?view=abc123").unwrap(), "abc123");
        assert_eq!(resolve_id("abc123").unwrap(), "abc123");
        assert!(resolve_id("https://etn.lol/?other=1").is_err());
        assert!(resolve_id("  ").is_err());
    }
}
