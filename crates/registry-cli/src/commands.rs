use crate::cli::Commands;
use anyhow::{Context, Result};
use doc_registry::display::{
    format_deadline, format_timestamp, gateway_links, or_dash, short_owner,
};
use doc_registry::{
    DocumentRecord, PinFile, RegistrationForm, RegistrationState, RegistryApp, RegistryConfig,
};
use std::path::Path;
use tracing::warn;

/// Load the configuration file (if any), apply environment overrides, then
/// switch to the named network when one is given
pub fn load_config(path: Option<&Path>, network: Option<&str>) -> Result<RegistryConfig> {
    let config = match path {
        Some(path) => RegistryConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RegistryConfig::default(),
    };
    let config = config.apply_env();

    match network {
        Some(name) => Ok(config.with_network(name)?),
        None => Ok(config),
    }
}

/// Content hash of the document the last run registered
fn registered_hash(state: &RegistrationState) -> Option<&str> {
    match state {
        RegistrationState::Succeeded { content_hash, .. } => Some(content_hash),
        _ => None,
    }
}

pub async fn execute(command: Commands, config: RegistryConfig) -> Result<()> {
    let mut app = RegistryApp::from_config(&config)?;

    match command {
        Commands::Connect => {
            let session = app.connect().await?;
            println!("Connected: 0x{:x}", session.account);
            println!("Chain ID: {} ({})", session.chain_id, config.chain.name);
        }

        Commands::Register {
            file,
            category,
            authors,
            deadline,
        } => {
            if !config.can_pin() {
                warn!("No pinning credential configured (PINATA_JWT); the upload will likely be refused");
            }

            let form = RegistrationForm {
                file: Some(
                    PinFile::from_path(&file)
                        .await
                        .with_context(|| format!("Failed to read {}", file.display()))?,
                ),
                category,
                authors,
                deadline,
            };

            let mut app = app.with_status_observer(|state| {
                if let Some(line) = state.status_line() {
                    println!("{}", line);
                }
            });

            app.connect().await?;
            let receipt = app.register(&form).await?;
            println!("Block: {}", receipt.block_number.map_or("-".to_string(), |b| b.to_string()));

            if let Some(content_hash) = registered_hash(app.state()) {
                for link in gateway_links(app.gateway_url(), content_hash) {
                    println!("  {}", link);
                }
            }
            println!();
            print_table(app.gateway_url(), &app.visible_documents());
        }

        Commands::List { category, owner } => {
            app.set_category_filter(category);
            app.set_owner_filter(owner);
            app.refresh().await;
            if let Some(error) = app.last_error() {
                anyhow::bail!("Failed to fetch documents: {}", error);
            }
            print_table(app.gateway_url(), &app.visible_documents());
        }

        Commands::Show { id } => {
            let record = app
                .document(id)
                .await
                .with_context(|| format!("Document {} not found", id))?;
            print_record(app.gateway_url(), &record);
        }
    }

    Ok(())
}

fn table_row(gateway_url: &str, record: &DocumentRecord) -> String {
    format!(
        "{:<5} {:<16} {:<13} {:<20} {:<10} {:<23} {}{}",
        record.id,
        or_dash(&record.category),
        short_owner(record),
        or_dash(&record.authors),
        format_deadline(record.deadline),
        format_timestamp(record.upload_timestamp),
        gateway_url,
        record.content_hash
    )
}

fn print_table(gateway_url: &str, records: &[&DocumentRecord]) {
    if records.is_empty() {
        println!("No documents found.");
        return;
    }

    println!(
        "{:<5} {:<16} {:<13} {:<20} {:<10} {:<23} {}",
        "ID", "Category", "Owner", "Authors", "Deadline", "Uploaded", "IPFS"
    );
    for record in records {
        println!("{}", table_row(gateway_url, record));
    }
}

fn print_record(gateway_url: &str, record: &DocumentRecord) {
    println!("Document {{");
    println!("    id: {},", record.id);
    println!("    content_hash: \"{}\",", record.content_hash);
    println!("    owner: \"{}\",", record.owner_hex());
    println!("    category: \"{}\",", record.category);
    println!("    authors: \"{}\",", record.authors);
    println!("    deadline: {},", format_deadline(record.deadline));
    println!("    uploaded: \"{}\",", format_timestamp(record.upload_timestamp));
    println!("    links: [");
    for link in gateway_links(gateway_url, &record.content_hash) {
        println!("        \"{}\",", link);
    }
    println!("    ],");
    println!("}}");
}
