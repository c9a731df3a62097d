//! Command line interface
//!
//! One-shot commands print a single JSON document on stdout; logs go to
//! stderr. `serve` keeps the change consumer running until Ctrl-C.

use catalog_application::domain_services::CatalogServiceInterface;
use catalog_domain::error::{Error, Result};
use catalog_infrastructure::config::ConfigLoader;
use catalog_infrastructure::di::{CatalogApp, init_app, list_available_providers};
use catalog_infrastructure::logging::init_logging;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command line interface for the product catalog
#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "Product catalog - cached reads and queue-announced writes")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Catalog commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Connect, run the change consumer and wait for Ctrl-C
    Serve {
        /// Print the processed-message log as JSON on shutdown
        #[arg(long)]
        print_processed: bool,
    },
    /// List all products with their cache provenance
    List,
    /// Create a product
    Create {
        /// Product name
        #[arg(long)]
        name: String,
        /// Unit price, must be positive
        #[arg(long)]
        price: f64,
    },
    /// Replace the name and price of a product
    Update {
        /// Product id
        #[arg(long)]
        id: i64,
        /// New name
        #[arg(long)]
        name: String,
        /// New price
        #[arg(long)]
        price: f64,
    },
    /// Delete a product
    Delete {
        /// Product id
        #[arg(long)]
        id: i64,
    },
    /// Drop the cached product snapshot
    ClearCache,
    /// Publish a raw JSON payload on the product queue
    Enqueue {
        /// JSON document to publish
        #[arg(long)]
        payload: String,
    },
    /// List registered store, cache and queue providers
    Providers,
}

/// Parse configuration, build the application and dispatch the command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.command == Command::Providers {
        println!("{}", serde_json::to_string_pretty(&list_available_providers())?);
        return Ok(());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load()?;
    init_logging(&config.logging)?;

    // Only `serve` drains the queue; one-shot commands leave messages for it.
    if !matches!(cli.command, Command::Serve { .. }) {
        config.consumer.enabled = false;
    }

    let app = init_app(config).await?;
    let result = match &cli.command {
        Command::Serve { print_processed } => serve(&app, *print_processed).await,
        command => one_shot(&app, command).await,
    };
    app.shutdown().await;
    result
}

/// Run a one-shot command against the catalog service
///
/// `serve` is rejected: it needs the whole application, not only the
/// service.
pub async fn execute(
    service: &dyn CatalogServiceInterface,
    command: &Command,
) -> Result<serde_json::Value> {
    let output = match command {
        Command::List => serde_json::to_value(service.list_products().await?)?,
        Command::Create { name, price } => {
            serde_json::to_value(service.create_product(name, *price).await?)?
        }
        Command::Update { id, name, price } => {
            serde_json::to_value(service.update_product(*id, name, *price).await?)?
        }
        Command::Delete { id } => serde_json::to_value(service.delete_product(*id).await?)?,
        Command::ClearCache => json!({ "cleared": service.clear_cache().await? }),
        Command::Enqueue { payload } => {
            let payload: serde_json::Value = serde_json::from_str(payload)?;
            service.enqueue_raw(&payload).await?;
            json!({ "queued": payload })
        }
        Command::Providers => serde_json::to_value(list_available_providers())?,
        Command::Serve { .. } => {
            return Err(Error::validation("serve is not a one-shot command"));
        }
    };
    Ok(output)
}

async fn one_shot(app: &CatalogApp, command: &Command) -> anyhow::Result<()> {
    let output = execute(app.service().as_ref(), command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Processed-message log as a JSON document
///
/// Bodies that are valid JSON are embedded as-is, anything else as a string.
pub fn processed_report(messages: &[String]) -> serde_json::Value {
    let processed: Vec<serde_json::Value> = messages
        .iter()
        .map(|body| {
            serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.clone()))
        })
        .collect();
    json!({ "count": processed.len(), "processed": processed })
}

async fn serve(app: &CatalogApp, print_processed: bool) -> anyhow::Result<()> {
    let result = wait_for_shutdown(app).await;

    let processed = app.processed_messages();
    info!(count = processed.len(), "Processed messages this session");
    if print_processed {
        println!("{}", serde_json::to_string_pretty(&processed_report(&processed))?);
    }
    result
}

async fn wait_for_shutdown(app: &CatalogApp) -> anyhow::Result<()> {
    let Some(mut consumer_task) = app.start_consumer() else {
        warn!("Change consumer disabled; only waiting for Ctrl-C");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    };

    info!(queue = %app.config.queue.name, "Catalog serving, press Ctrl-C to stop");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown requested");
        }
        finished = &mut consumer_task => {
            // A lost connection is not retried; the supervisor restarts us.
            finished??;
            info!("Delivery stream closed by the broker");
        }
    }
    Ok(())
}
