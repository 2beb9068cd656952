//! `triage`: offline run of the triage pipeline.
//!
//! Usage: `triage [platform=]posts.json ...`
//! Reads config from `$TRIAGE_CONFIG_PATH`, seen keys from `$TRIAGE_SEEN_PATH`,
//! prints `{ items, summary, counts }` as JSON to stdout.

use anyhow::{Context, Result};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opinion_triage::collect::{collect_all, FixtureCollector, PostCollector, DEFAULT_PLATFORM_PRIORITY};
use opinion_triage::config::{config_path_from_env, load_config_from};
use opinion_triage::normalize::platforms::source_offset;
use opinion_triage::report::render_markdown;
use opinion_triage::store::{load_seen_keys, save_seen_keys, seen_path_from_env};
use opinion_triage::TriagePipeline;

fn flag(name: &str) -> bool {
    std::env::var(name).ok().is_some_and(|v| v == "1")
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triage=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing prometheus recorder")?;

    let config_path = config_path_from_env();
    let config = load_config_from(&config_path)?;
    let pipeline = TriagePipeline::new(config)
        .with_context(|| format!("invalid triage config {}", config_path.display()))?;

    let collectors: Vec<Arc<dyn PostCollector>> = std::env::args()
        .skip(1)
        .map(|arg| Arc::new(FixtureCollector::from_arg(&arg)) as Arc<dyn PostCollector>)
        .collect();
    if collectors.is_empty() {
        anyhow::bail!("usage: triage [platform=]posts.json ...");
    }

    let seen_path = seen_path_from_env();
    let seen = load_seen_keys(&seen_path)?;

    let posts = collect_all(collectors, &DEFAULT_PLATFORM_PRIORITY).await;
    let now = Utc::now();
    let out = pipeline.run(posts, &seen, now);

    save_seen_keys(&seen_path, &out.seen)?;
    info!(target: "triage", seen = out.seen.len(), path = %seen_path.display(), "seen keys saved");

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "items": out.items,
            "summary": out.summary,
            "counts": out.counts,
        }))?
    );

    if flag("TRIAGE_REPORT") {
        let today = now.with_timezone(&source_offset()).date_naive();
        eprintln!("{}", render_markdown(&out.summary, today));
    }
    if flag("TRIAGE_METRICS") {
        eprintln!("{}", metrics.render());
    }

    Ok(())
}
