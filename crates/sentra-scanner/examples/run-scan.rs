//! Example: run a scan against a target using the real subprocess adapters.
//!
//! Requires the crawler and template scanner binaries on PATH, and
//! optionally `OPENAI_API_KEY` for plain-language explanations.
//!
//! ```sh
//! cargo run --example run-scan -- https://example.com
//! ```

use sentra_core::{AppConfig, ScanMode};
use sentra_detect::{DetectorConfig, TemplateDetector};
use sentra_discovery::{CrawlerConfig, CrawlerDiscovery};
use sentra_llm::{FindingInterpreter, LlmInterpreter, OpenAiProvider, PlaceholderInterpreter};
use sentra_scanner::ScanOrchestrator;
use sentra_store::JobStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let config = AppConfig::load_with_env()?;

    let store = Arc::new(JobStore::open(config.store.resolved_snapshot_path()?).await?);
    let discovery = Arc::new(CrawlerDiscovery::with_config(CrawlerConfig::from(
        &config.discovery,
    )));
    let detector = Arc::new(TemplateDetector::with_config(DetectorConfig::from(
        &config.detection,
    )));

    let interpreter: Arc<dyn FindingInterpreter> = match std::env::var("OPENAI_API_KEY") {
        Ok(api_key) if config.llm.enabled => {
            let provider = OpenAiProvider::with_model(api_key, config.llm.model.clone())?
                .with_base_url(config.llm.base_url.clone());
            Arc::new(LlmInterpreter::new(Arc::new(provider)))
        }
        _ => {
            eprintln!("LLM interpretation unavailable, findings will carry placeholder text");
            Arc::new(PlaceholderInterpreter)
        }
    };

    let orchestrator = ScanOrchestrator::new(store, discovery, detector, interpreter)
        .with_max_findings(config.scanning.max_findings);

    let scan_id = orchestrator.submit(&target, ScanMode::Quick).await?;
    println!("Scan {scan_id} submitted for {target}, polling...");

    loop {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        let job = orchestrator.status(&scan_id).await?;
        println!("  status: {}", job.status);

        if !job.status.is_terminal() {
            continue;
        }

        if let Some(error) = &job.error {
            println!("\nScan failed: {error}");
        }

        if let Some(result) = &job.result {
            println!(
                "\nScanned {} endpoints in {:.1}s, {} issues worth fixing:",
                result.summary.total_endpoints,
                result.summary.duration_seconds,
                result.summary.top_issues_count,
            );
            for finding in &result.findings {
                println!("\n• [{}] {} (score {:.1})", finding.severity, finding.title, finding.score);
                println!("    What: {}", finding.interpretation.what_is_wrong);
                println!("    Why:  {}", finding.interpretation.why_it_matters);
                println!("    Fix:  {}", finding.interpretation.how_to_fix);
            }
        }

        break;
    }

    Ok(())
}
