///
/// This module implements the CLI interface for publishing-sync: command parsing,
/// argument validation and the async entrypoint used by `main` and the tests.
///
/// All domain logic (taxon trees, visibility, the asset worker and its queue)
/// lives in the [`publishing-sync-core`] crate. This module only wires the HTTP
/// clients from [`crate::services`] into it and prints the results.
///
/// ## How To Use
/// - For command-line users: run the `publishing-sync` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`publishing-sync-core`]: ../../publishing-sync-core/
use crate::load_config::load_config;
use crate::services::Services;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use publishing_sync_core::contract::AttributeMap;
use publishing_sync_core::jobs::{AssetUpdateJob, InMemoryJobQueue, JobQueue};
use publishing_sync_core::tag_form::TaxonomyTagForm;
use publishing_sync_core::taxonomy::EditionTaxonsFetcher;
use publishing_sync_core::worker::{AssetManagerUpdateAssetWorker, UpdateOutcome};
use std::path::PathBuf;

/// CLI for publishing-sync: inspect taxon tagging and synchronise asset state.
#[derive(Parser)]
#[clap(
    name = "publishing-sync",
    version,
    about = "Inspect taxonomy tagging and synchronise asset draft state with the asset manager"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the visible taxons tagged to a content item
    Taxons {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        content_id: String,
    },
    /// Print the taxonomy tag form of a content item
    Tags {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        content_id: String,
    },
    /// Run the asset update worker once for a legacy path
    UpdateAsset {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        legacy_url_path: String,
        /// Desired attribute as key=value; the value is parsed as JSON when possible
        #[clap(long = "attribute", value_parser = parse_attribute)]
        attributes: Vec<(String, serde_json::Value)>,
    },
    /// Set the draft flag of several assets through the job queue
    SetDraft {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        #[clap(long, action = clap::ArgAction::Set)]
        draft: bool,
        #[clap(required = true)]
        legacy_url_paths: Vec<String>,
    },
}

/// Parse `key=value`, reading the value as JSON and falling back to a plain string.
pub fn parse_attribute(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("attribute name is empty in {raw:?}"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn services_from(config: PathBuf) -> Result<Services> {
    let config = load_config(config)?;
    Services::from_config(&config)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Taxons { config, content_id } => {
            let services = services_from(config)?;
            tracing::info!(command = "taxons", content_id = %content_id, "Fetching visible taxons");
            let fetcher = EditionTaxonsFetcher::new(
                content_id.as_str(),
                services.publishing_api.as_ref(),
                services.taxonomy.as_ref(),
            );
            let taxons = fetcher
                .fetch()
                .await
                .with_context(|| format!("Failed to fetch taxons for {content_id}"))?;
            if taxons.is_empty() {
                println!("No visible taxons for {content_id}");
            }
            for taxon in &taxons {
                println!(
                    "{}  {}  ({})",
                    taxon.content_id,
                    taxon.breadcrumb().join(" > "),
                    taxon.base_path
                );
            }
            Ok(())
        }
        Commands::Tags { config, content_id } => {
            let services = services_from(config)?;
            tracing::info!(command = "tags", content_id = %content_id, "Loading taxonomy tag form");
            let taxonomy = services.taxonomy.as_ref();
            let form = TaxonomyTagForm::load(&content_id, services.publishing_api.as_ref())
                .await
                .with_context(|| format!("Failed to load links for {content_id}"))?;
            let classification = form
                .classify(taxonomy)
                .await
                .with_context(|| format!("Failed to classify taxons of {content_id}"))?;
            println!("content_id: {}", form.content_id);
            println!("previous_version: {:?}", form.previous_version);
            println!("selected: {:?}", form.selected_taxons);
            println!("published: {:?}", classification.published);
            println!("visible_draft: {:?}", classification.visible_draft);
            println!("invisible_draft: {:?}", classification.invisible_draft);
            Ok(())
        }
        Commands::UpdateAsset {
            config,
            legacy_url_path,
            attributes,
        } => {
            let services = services_from(config)?;
            let attributes: AttributeMap = attributes.into_iter().collect();
            tracing::info!(command = "update-asset", legacy_url_path = %legacy_url_path, "Running asset update worker");
            let worker = AssetManagerUpdateAssetWorker::new(services.asset_manager.as_ref());
            match worker
                .perform(&legacy_url_path, &attributes)
                .await
                .with_context(|| format!("Asset update failed for {legacy_url_path}"))?
            {
                UpdateOutcome::Updated { asset_id } => println!("Updated asset {asset_id}"),
                UpdateOutcome::Unchanged => println!("Asset already up to date"),
            }
            Ok(())
        }
        Commands::SetDraft {
            config,
            draft,
            legacy_url_paths,
        } => {
            let services = services_from(config)?;
            let queue = InMemoryJobQueue::new(services.max_attempts);
            for path in legacy_url_paths {
                queue.enqueue(AssetUpdateJob::set_draft(path, draft)).await?;
            }
            let worker = AssetManagerUpdateAssetWorker::new(services.asset_manager.as_ref());
            let report = queue.drain(&worker).await;
            tracing::info!(command = "set-draft", ?report, "Draft state synchronisation complete");
            println!(
                "Updated: {}, already up to date: {}, failed: {}",
                report.updated.len(),
                report.unchanged,
                report.dead.len()
            );
            if report.dead.is_empty() {
                Ok(())
            } else {
                for dead in &report.dead {
                    eprintln!("[ERROR] {}: {}", dead.job.legacy_url_path, dead.last_error);
                }
                Err(anyhow::anyhow!("{} asset update(s) failed", report.dead.len()))
            }
        }
    }
}
