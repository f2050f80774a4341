//! `gudang`: thin operational CLI over the local finished-goods catalog.
//!
//! Useful for smoke-testing the ERP endpoint and for poking at the on-disk
//! store without a UI host.

use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;

use gudang_core::{freshness_threshold, needs_sync};
use gudang_remote::{RemoteClient, RemoteConfig};
use gudang_store::{CatalogQueries, ProductStore};
use gudang_sync::{SyncOrchestrator, SyncOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gudang_observability::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("sync") => sync().await,
        Some("status") => status().await,
        Some("search") => match args.get(1) {
            Some(term) => search(term).await,
            None => bail!("usage: gudang search <term>"),
        },
        Some("categories") => categories().await,
        Some("wipe") => wipe().await,
        _ => bail!("usage: gudang <sync|status|search <term>|categories|wipe>"),
    }
}

async fn sync() -> anyhow::Result<()> {
    let config = RemoteConfig::from_env()?;
    let store = Arc::new(ProductStore::at_default_path()?);
    let remote = Arc::new(RemoteClient::new(config));
    let orchestrator = Arc::new(SyncOrchestrator::new(store, remote));

    let progress = orchestrator.subscribe_progress();
    let printer = std::thread::spawn(move || {
        while let Ok(update) = progress.recv() {
            println!("[{:>3}%] {:?}: {}", update.percent, update.phase, update.message);
        }
    });

    let outcome = orchestrator.run_sync().await;
    drop(orchestrator);
    let _ = printer.join();

    match outcome? {
        SyncOutcome::Completed(report) => {
            println!(
                "synced {} products at {}",
                report.record_count,
                report.synced_at.to_rfc3339()
            );
        }
        SyncOutcome::AlreadyRunning => println!("a sync is already in flight"),
    }
    Ok(())
}

async fn status() -> anyhow::Result<()> {
    let store = Arc::new(ProductStore::at_default_path()?);
    let queries = CatalogQueries::new(store);

    match queries.last_sync().await? {
        Some(meta) => {
            let stale = needs_sync(Some(&meta), Utc::now(), freshness_threshold());
            println!(
                "last sync: {} ({} products, {})",
                meta.synced_at.to_rfc3339(),
                meta.record_count,
                if stale { "stale" } else { "fresh" }
            );
        }
        None => println!("never synced"),
    }
    Ok(())
}

async fn search(term: &str) -> anyhow::Result<()> {
    let store = Arc::new(ProductStore::at_default_path()?);
    let queries = CatalogQueries::new(store);

    let products = queries.search(term).await?;
    for product in &products {
        println!(
            "{}\t{}\t{}\t{}",
            product.id, product.code, product.name, product.category_name
        );
    }
    println!("{} match(es)", products.len());
    Ok(())
}

async fn categories() -> anyhow::Result<()> {
    let store = Arc::new(ProductStore::at_default_path()?);
    let queries = CatalogQueries::new(store);

    for category in queries.categories().await? {
        println!("{}\t{}\t{} product(s)", category.id, category.name, category.product_count);
    }
    Ok(())
}

async fn wipe() -> anyhow::Result<()> {
    let store = ProductStore::at_default_path()?;
    store.wipe().await?;
    println!("local catalog wiped");
    Ok(())
}
