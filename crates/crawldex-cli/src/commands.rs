use anyhow::Context;
use crawldex_catalog::ResultStore;
use crawldex_core::ProductQuery;
use serde_json::Value;

use crate::Commands;

/// Executes one subcommand against the store and returns its JSON output.
pub(crate) fn run(command: Commands, store: &ResultStore, page_size: usize) -> anyhow::Result<Value> {
    let value = match command {
        Commands::List => serde_json::to_value(
            store
                .list()
                .with_context(|| format!("failed to list {}", store.dir().display()))?,
        )?,
        Commands::Show { filename } => store
            .detail(&filename)
            .with_context(|| format!("failed to load {filename}"))?,
        Commands::Stats { filename } => serde_json::to_value(
            store
                .statistics(&filename)
                .with_context(|| format!("failed to compute statistics for {filename}"))?,
        )?,
        Commands::Products {
            filename,
            source,
            min_price,
            max_price,
            sort,
            page,
            per_page,
        } => {
            let query = ProductQuery {
                source,
                min_price,
                max_price,
                sort: sort.into(),
                page,
                per_page: per_page.or(Some(page_size)),
            };
            serde_json::to_value(
                store
                    .products(&filename, &query)
                    .with_context(|| format!("failed to browse products of {filename}"))?,
            )?
        }
    };
    Ok(value)
}
