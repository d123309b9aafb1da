//! Document Round Trip Example
//!
//! Writes a document whose id is a URL, reads it back on its own and through
//! multi-get, then prints the index description.
//!
//! Run with: cargo run --example document_roundtrip

use lodestone::{Client, ClientConfig, DocumentRef, MGetDocumentsRequest, PutDocumentRequest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Page {
    title: String,
    description: String,
    #[serde(rename = "displayUrl")]
    display_url: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lodestone=debug")),
        )
        .init();

    let config = ClientConfig::load("config.json").unwrap_or_default();
    let client = Client::from_config(&config);

    let id = "http://example.com/guides/../rust?lang=en";
    let page = Page {
        title: "Rust guide".to_string(),
        description: "Ownership, borrowing and lifetimes".to_string(),
        display_url: "example.com/rust".to_string(),
    };

    let put = client.put_document(&PutDocumentRequest::new("pages", "page", id, &page))?;
    println!(
        "📝 {} {} (version {})",
        if put.created { "Created" } else { "Updated" },
        put.id,
        put.version
    );

    let got = client.get_document(&DocumentRef::new("pages", "page", id))?;
    match got.source_as::<Page>()? {
        Some(stored) => println!("   Title: {}", stored.title),
        None => println!("   Not found"),
    }

    let many = client.mget_documents(&MGetDocumentsRequest::new(vec![
        DocumentRef::new("pages", "page", id),
        DocumentRef::new("pages", "page", "http://example.com/missing"),
    ]))?;
    for doc in &many.docs {
        match &doc.error {
            Some(error) => println!("   {} failed: {}", doc.id, error),
            None => println!("   {} found={}", doc.id, doc.found),
        }
    }

    for (name, description) in client.get_index_description("pages")? {
        println!(
            "📦 {}: shards={} replicas={} aliases={:?}",
            name,
            description.settings.index.number_of_shards,
            description.settings.index.number_of_replicas,
            description.aliases
        );
    }

    Ok(())
}
