//! Arguments et exécution de la commande principale
//!
//! Une exécution: récupération du flux, pipeline, puis écriture du
//! GeoJSON et du rapport. Aucune destination n'est remplacée tant que
//! les deux fichiers ne sont pas écrits.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use crate::config::{Config, DEFAULT_PRESET};
use crate::export::{build_document, commit_all, render_document, stage_document};
use crate::fetch::{fetch, FeedSource};
use crate::pipeline::{self, Clock, SystemClock};
use crate::report::StatsReport;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Config preset name (diro) or path to a JSON config
    #[arg(long, default_value = DEFAULT_PRESET)]
    pub config: String,

    /// DATEX II feed URL (overrides config and DATEX_URL)
    #[arg(long, conflicts_with = "input")]
    pub url: Option<String>,

    /// Read the feed from a local XML file instead of fetching it
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output GeoJSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output statistics report
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// HTTP timeout in seconds (overrides config and DATEX_TIMEOUT)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Run the pipeline without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

/// Charge la configuration et applique, dans l'ordre, l'environnement puis la CLI
pub fn load_config(args: &RunArgs) -> Result<Config> {
    let mut config = Config::resolve(&args.config)
        .context(format!("Failed to load config: {}", args.config))?;
    config.apply_env();
    config.apply_overrides(
        args.url.clone(),
        args.timeout,
        args.output.clone(),
        args.stats.clone(),
    );
    config.validate()?;
    Ok(config)
}

/// Exécute la commande principale
pub async fn cmd_run(args: &RunArgs) -> Result<()> {
    let start = Instant::now();
    let config = load_config(args)?;

    let source = match &args.input {
        Some(path) => FeedSource::File(path.clone()),
        None => FeedSource::Url(config.feed_url.clone()),
    };

    info!(
        source = %source.label(),
        config = %args.config,
        timeout_secs = config.timeout_secs,
        dry_run = args.dry_run,
        "Starting run"
    );

    let xml = fetch(&source, config.timeout())
        .await
        .inspect_err(|e| {
            if e.is_timeout() {
                warn!(timeout_secs = config.timeout_secs, "Feed request timed out");
            }
        })
        .context("Failed to retrieve DATEX II feed")?;

    let clock = SystemClock;
    let output = pipeline::run(&xml, &config, &clock).context("Failed to process DATEX II feed")?;

    let generated_at = clock.now();
    let document = build_document(&output.features, &output.stats, &config.labels, generated_at)?;
    let report = StatsReport::new(&output.stats, &config, generated_at);

    if args.dry_run {
        let bytes = render_document(&document)?.len();
        info!(bytes, "Dry run: no file written");
    } else {
        // Les deux fichiers temporaires existent avant le premier renommage
        let staged = vec![
            stage_document(&document, &config.output.geojson)?,
            report.stage_to_file(&config.output.stats)?,
        ];
        commit_all(staged)?;
        info!(
            geojson = %config.output.geojson.display(),
            stats = %config.output.stats.display(),
            features = output.features.len(),
            "Outputs written"
        );
    }

    report.display();

    info!(
        summary = %report.summary(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Run completed"
    );

    Ok(())
}
