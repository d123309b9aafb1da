//! Simple Search Example
//!
//! Runs a keyword search against a running engine and prints the hits.
//! Reads `config.json` when present, otherwise targets localhost:9200.
//!
//! Run with: cargo run --example simple_search -- <index> [keywords...]

use lodestone::{Client, ClientConfig, SimpleSearchRequest};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lodestone=debug,lodestone_core=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = ClientConfig::load("config.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load config.json, using defaults");
        ClientConfig::default()
    });

    let mut args = std::env::args().skip(1);
    let index = args.next().unwrap_or_else(|| "pages".to_string());
    let keywords = args.collect::<Vec<_>>().join(" ");

    tracing::info!("Searching {} on {} for {:?}", index, config.host, keywords);

    let client = Client::from_config(&config);
    let results = client.simple_search(&SimpleSearchRequest::new(&index, "", keywords, 0, 10))?;

    println!(
        "🔍 {} hits in {} ms ({} of {} shards ok)",
        results.hits.total, results.took, results.shards.successful, results.shards.total
    );
    for (i, hit) in results.hits.hits.iter().enumerate() {
        println!(
            "   {}. {} (score: {:.4})",
            i + 1,
            hit.id,
            hit.score.unwrap_or_default()
        );
        if let Some(source) = &hit.source {
            println!("      {}", source);
        }
    }

    Ok(())
}
