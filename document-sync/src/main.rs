use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use document_sync::config::get_configuration;
use document_sync::ingest::UploadFile;
use document_sync::models::{Document, DocumentStatus};
use document_sync::search::{CategoryFilter, DocumentFilter};
use document_sync::services::DocumentClient;
use document_sync::sync::Resolution;
use document_sync::{DeleteOutcome, DocumentSession};
use service_core::capabilities::LoggingSpeech;
use service_core::observability::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser)]
#[command(name = "smartdocs")]
#[command(about = "Upload documents and follow their processing status")]
#[command(version)]
struct Cli {
    /// Overrides backend.base_url from configuration
    #[arg(long, env = "SMARTDOCS_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the document list in sync and print it on every change
    Watch,
    /// Upload one file and wait for its summary
    Upload { path: PathBuf },
    /// Delete a document by id
    Delete { id: String },
    /// Show a document and resolve its summary
    Show {
        id: String,
        /// Read the summary aloud once resolved
        #[arg(long)]
        speak: bool,
    },
    /// Search documents by name, category or summary
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long, default_value = "all")]
        category: String,
    },
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn print_documents(documents: &[Document]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(documents)?);
    Ok(())
}

fn print_resolution(id: &str, resolution: &Resolution) {
    match resolution.detail() {
        Some(detail) => {
            println!("{}: {}", id, detail.summary);
            if !detail.categories.is_empty() {
                println!("categories: {}", detail.categories.join(", "));
            }
        }
        None => match resolution.notice() {
            Some(message) => println!("{}: {}", id, message),
            None => println!("{}: cancelled", id),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = get_configuration().context("Failed to load configuration")?;
    if let Some(url) = cli.backend_url {
        settings.backend.base_url = url;
    }

    init_tracing(
        "document-sync",
        &settings.logging.level,
        settings.logging.otlp_endpoint.as_deref(),
    )?;

    let client = Arc::new(DocumentClient::new(&settings.backend)?);
    tracing::info!(backend = %client.base_url(), "Document backend configured");
    let mut session = DocumentSession::new(client, settings);

    match cli.command {
        Commands::Watch => {
            session.start();
            let mut snapshots = session.subscribe();
            let mut notices = session.notices();
            let shutdown = shutdown_signal();
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let documents = snapshots.borrow_and_update().clone();
                        print_documents(&documents)?;
                    }
                    Ok(notice) = notices.recv() => {
                        println!("[{:?}] {}", notice.level, notice.message);
                    }
                }
            }
        }
        Commands::Upload { path } => {
            let file = UploadFile::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let doc = session.upload(vec![file]).await?;
            println!("Uploaded {} as {}", doc.name, doc.id);

            session.start();
            let mut snapshots = session.subscribe();
            let status = tokio::select! {
                _ = shutdown_signal() => None,
                result = snapshots.wait_for(|docs| {
                    docs.iter().any(|d| d.id == doc.id && d.status.is_terminal())
                }) => match result {
                    Ok(docs) => docs.iter().find(|d| d.id == doc.id).map(|d| d.status),
                    Err(_) => None,
                },
            };

            match status {
                Some(DocumentStatus::Processed) => {
                    if let Some(mut view) = session.open(&doc.id).await {
                        let resolution = view.wait().await;
                        print_resolution(&doc.id, &resolution);
                    }
                }
                Some(status) => println!("{}: {}", doc.id, status),
                None => println!("{}: still pending", doc.id),
            }
        }
        Commands::Delete { id } => {
            session.refresh_now().await?;
            match session.delete(&id).await? {
                DeleteOutcome::Deleted => println!("Deleted {}", id),
                DeleteOutcome::NotPresent => println!("No document with id {}", id),
            }
        }
        Commands::Show { id, speak } => {
            session.refresh_now().await?;
            let Some(mut view) = session.open(&id).await else {
                bail!("No document with id {}", id);
            };
            let resolution = tokio::select! {
                _ = shutdown_signal() => Resolution::Cancelled,
                resolution = view.wait() => resolution,
            };
            if let Some(doc) = view.current().document {
                println!("{} ({}, {})", doc.name, doc.file_type, doc.status);
            }
            print_resolution(&id, &resolution);
            if speak {
                view.toggle_speech(&LoggingSpeech);
            }
            view.close();
        }
        Commands::Search { query, category } => {
            session.refresh_now().await?;
            let filter = DocumentFilter::new(query, CategoryFilter::parse(&category));
            print_documents(&session.search(&filter).await)?;
            println!("categories: {}", session.category_options().await.join(", "));
        }
    }

    session.shutdown().await;
    Ok(())
}
