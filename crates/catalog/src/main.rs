//! Product Catalog - Entry Point
//!
//! Binary entry point for the `catalog` command line. Lives in the facade
//! crate next to the library so both share one set of re-exports.

// Force-link catalog-providers to ensure linkme registrations are included
extern crate catalog_providers;

use catalog::{Cli, run};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}
